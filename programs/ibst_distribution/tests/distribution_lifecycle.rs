/**
 * Distribution Lifecycle Tests
 *
 * Drives the host ledger through a full allocation, cliff, vesting and
 * company disbursement timeline.
 *
 * Made by LabsX402 for Solana
 * https://x.com/LabsX402
 */

use anchor_lang::prelude::Pubkey;
use ibst_distribution::{
    ledger::{
        run_allocations, run_distribution, AllocationRow, DistributionConfig, DistributionLedger,
        LedgerEvent, MemoryTokenLedger, SharedLedger, DEFAULT_DECIMALS,
    },
    state::AllocationCategory,
    DistributionError, SECONDS_PER_DAY,
};

const START: i64 = 1_700_000_000;
const UNIT: u128 = 1_000_000_000_000_000_000;

fn key(n: u8) -> Pubkey {
    Pubkey::new_from_array([n; 32])
}

fn owner() -> Pubkey {
    key(1)
}
fn company_wallet() -> Pubkey {
    key(2)
}
fn custodian() -> Pubkey {
    key(3)
}
fn presale1() -> Pubkey {
    key(4)
}
fn presale2() -> Pubkey {
    key(5)
}
fn presale3() -> Pubkey {
    key(6)
}
fn manual1() -> Pubkey {
    key(7)
}
fn manual2() -> Pubkey {
    key(8)
}
fn admin() -> Pubkey {
    key(9)
}
fn outsider() -> Pubkey {
    key(10)
}

fn days(n: i64) -> i64 {
    START + n * SECONDS_PER_DAY
}

fn ledger() -> DistributionLedger<MemoryTokenLedger> {
    let config = DistributionConfig::with_decimals(
        owner(),
        START,
        company_wallet(),
        custodian(),
        DEFAULT_DECIMALS,
    )
    .unwrap();
    let token = MemoryTokenLedger::new(custodian(), config.total_supply, DEFAULT_DECIMALS);
    DistributionLedger::new(config, token).unwrap()
}

/// Owner allocates 50M to presale1, admin allocates 450M to presale2
fn allocated_ledger() -> DistributionLedger<MemoryTokenLedger> {
    let mut l = ledger();
    l.set_admin(&owner(), admin(), true).unwrap();
    l.set_allocation(&owner(), presale1(), 50_000_000 * UNIT).unwrap();
    l.set_allocation(&admin(), presale2(), 450_000_000 * UNIT).unwrap();
    l
}

#[test]
fn construction_seeds_the_company_allocation() {
    let l = ledger();
    assert_eq!(l.owner(), owner());
    assert_eq!(l.start_time(), START);
    assert_eq!(l.company_wallet(), company_wallet());
    assert_eq!(l.total_supply(), 14_000_000_000 * UNIT);
    assert_eq!(l.grand_total_allocated(), 13_500_000_000 * UNIT);
    assert_eq!(l.company_remaining_allocation(), 13_500_000_000 * UNIT);
    assert_eq!(l.token().balance_of(&custodian()), 14_000_000_000 * UNIT);

    let company = l.allocation(&company_wallet());
    assert_eq!(company.category, AllocationCategory::Company);
    assert_eq!(company.cliff_end, START);
    assert_eq!(company.vesting_end, START);
    assert_eq!(company.amount_claimed, 0);
}

#[test]
fn admin_management() {
    let mut l = ledger();

    l.set_admin(&owner(), company_wallet(), true).unwrap();
    assert!(l.is_admin(&company_wallet()));
    l.set_admin(&owner(), company_wallet(), false).unwrap();
    assert!(!l.is_admin(&company_wallet()));

    l.set_admin(&owner(), admin(), true).unwrap();
    assert_eq!(
        l.set_admin(&outsider(), presale3(), true),
        Err(DistributionError::Unauthorized)
    );
    assert_eq!(
        l.set_admin(&admin(), presale3(), true),
        Err(DistributionError::Unauthorized)
    );
    assert!(!l.is_admin(&presale3()));
}

#[test]
fn allocations_fill_the_supply_exactly() {
    let mut l = ledger();
    l.set_admin(&owner(), admin(), true).unwrap();

    l.set_allocation(&owner(), presale1(), 50_000_000 * UNIT).unwrap();
    assert_eq!(l.grand_total_allocated(), 13_550_000_000 * UNIT);

    let record = l.allocation(&presale1());
    assert_eq!(record.category, AllocationCategory::Presale);
    assert_eq!(record.cliff_end, days(180));
    assert_eq!(record.vesting_end, days(545));

    assert_eq!(
        l.set_allocation(&owner(), presale1(), 1_000_000 * UNIT),
        Err(DistributionError::AlreadyAllocated)
    );
    assert_eq!(
        l.set_allocation(&owner(), company_wallet(), 1_000_000 * UNIT),
        Err(DistributionError::InvalidBeneficiary)
    );
    assert_eq!(
        l.set_allocation(&outsider(), presale2(), 1_000_000 * UNIT),
        Err(DistributionError::Unauthorized)
    );

    l.set_allocation(&admin(), presale2(), 450_000_000 * UNIT).unwrap();
    assert_eq!(l.grand_total_allocated(), l.total_supply());

    assert_eq!(
        l.set_allocation(&owner(), presale3(), 1_000 * UNIT),
        Err(DistributionError::SupplyExceeded)
    );
    assert_eq!(l.allocation(&presale3()).total_allocated, 0);

    let listed: Vec<Pubkey> = l.allocations().map(|(identity, _)| *identity).collect();
    assert_eq!(listed, vec![company_wallet(), presale1(), presale2()]);
}

#[test]
fn full_timeline() {
    let mut l = allocated_ledger();

    // Before start
    assert_eq!(
        l.transfer_tokens(START - 1, &presale1()),
        Err(DistributionError::NotStarted)
    );
    assert_eq!(
        l.manual_contribution(&owner(), START - 1, manual1(), 20_000 * UNIT),
        Err(DistributionError::NotStarted)
    );

    // 3 months in
    let now = days(90);
    assert_eq!(
        l.manual_contribution(&owner(), now, company_wallet(), 1_000_000_000 * UNIT),
        Err(DistributionError::InvalidBeneficiary)
    );
    assert_eq!(l.company_remaining_allocation(), 13_500_000_000 * UNIT);
    assert_eq!(
        l.transfer_tokens(now, &company_wallet()),
        Err(DistributionError::InvalidBeneficiary)
    );
    assert_eq!(
        l.manual_contribution(&owner(), now, manual1(), 0),
        Err(DistributionError::ZeroAmount)
    );
    assert_eq!(
        l.manual_contribution(&outsider(), now, manual1(), 1_000_000_000 * UNIT),
        Err(DistributionError::Unauthorized)
    );
    assert_eq!(
        l.transfer_tokens(now, &presale1()),
        Err(DistributionError::CliffNotReached)
    );

    l.manual_contribution(&owner(), now, manual1(), 4_000_000_000 * UNIT)
        .unwrap();
    assert_eq!(l.company_remaining_allocation(), 9_500_000_000 * UNIT);
    l.manual_contribution(&admin(), now, manual1(), 2_000_000_000 * UNIT)
        .unwrap();
    assert_eq!(l.token().balance_of(&manual1()), 6_000_000_000 * UNIT);

    // 9 months in: 90 of the 365 ramp days have elapsed
    let now = days(270);
    assert_eq!(l.claimable(now, &presale1()).unwrap(), 12_328_767_123_287_671_232_876_712);
    let released = l.transfer_tokens(now, &presale1()).unwrap();
    assert_eq!(released, 12_328_767_123_287_671_232_876_712);
    assert_eq!(l.token().balance_of(&presale1()), released);
    assert_eq!(l.claimable(now, &presale1()).unwrap(), 0);

    l.manual_contribution(&owner(), now, manual2(), 3_000_000_000 * UNIT)
        .unwrap();
    assert_eq!(
        l.manual_contribution(&owner(), now, manual2(), 5_000_000_000 * UNIT),
        Err(DistributionError::CompanyAllocationExceeded)
    );
    assert_eq!(l.company_remaining_allocation(), 4_500_000_000 * UNIT);

    // Vesting complete
    let now = days(545);
    l.transfer_tokens(now, &presale1()).unwrap();
    assert_eq!(l.token().balance_of(&presale1()), 50_000_000 * UNIT);
    assert_eq!(l.transfer_tokens(now, &presale2()).unwrap(), 450_000_000 * UNIT);
    assert_eq!(
        l.transfer_tokens(now + SECONDS_PER_DAY, &presale1()),
        Err(DistributionError::NothingToClaim)
    );

    // Custodian keeps exactly the unspent company allocation
    assert_eq!(l.token().balance_of(&custodian()), 4_500_000_000 * UNIT);
    assert_eq!(l.grand_total_allocated(), l.total_supply());

    let claims = l
        .events()
        .iter()
        .filter(|event| matches!(event, LedgerEvent::TokensClaimed(_)))
        .count();
    assert_eq!(claims, 3);
}

#[test]
fn company_contributions_stop_at_the_cap() {
    let mut l = ledger();
    let now = days(1);

    l.manual_contribution(&owner(), now, manual1(), 4_000_000_000 * UNIT)
        .unwrap();
    assert_eq!(
        l.manual_contribution(&owner(), now, manual1(), 10_000_000_000 * UNIT),
        Err(DistributionError::CompanyAllocationExceeded)
    );
    assert_eq!(l.company_remaining_allocation(), 9_500_000_000 * UNIT);
    assert_eq!(l.token().balance_of(&manual1()), 4_000_000_000 * UNIT);

    l.manual_contribution(&owner(), now, manual2(), 9_500_000_000 * UNIT)
        .unwrap();
    assert_eq!(l.company_remaining_allocation(), 0);
    assert_eq!(
        l.manual_contribution(&owner(), now, manual1(), 1),
        Err(DistributionError::CompanyAllocationExceeded)
    );
}

#[test]
fn contributions_never_stay_in_custody() {
    let mut l = ledger();
    let now = days(90);

    for recipient in [company_wallet(), custodian(), Pubkey::default()] {
        assert_eq!(
            l.manual_contribution(&owner(), now, recipient, 1_000 * UNIT),
            Err(DistributionError::InvalidBeneficiary)
        );
    }
    assert_eq!(l.company_remaining_allocation(), 13_500_000_000 * UNIT);
    assert_eq!(l.token().balance_of(&custodian()), 14_000_000_000 * UNIT);
    assert!(l.events().is_empty());

    // Every accepted contribution leaves custody in full
    l.manual_contribution(&owner(), now, manual1(), 1_000 * UNIT).unwrap();
    assert_eq!(
        l.token().balance_of(&custodian()),
        14_000_000_000 * UNIT - 1_000 * UNIT
    );
}

#[test]
fn periodic_claims_follow_the_linear_ramp() {
    let mut l = allocated_ledger();
    let total = 450_000_000 * UNIT;
    let ramp = (545 - 180) * SECONDS_PER_DAY;

    let mut claimed = 0;
    for day in [200, 273, 365, 456, 500, 545] {
        let now = days(day);
        let elapsed = (now - days(180)) as u128;
        let expected = (total * elapsed / ramp as u128).min(total);

        claimed += l.transfer_tokens(now, &presale2()).unwrap();
        assert_eq!(claimed, expected);
        assert_eq!(l.allocation(&presale2()).amount_claimed, expected);
    }
    assert_eq!(claimed, total);
    assert_eq!(l.allocation(&presale2()).remaining(), 0);
}

#[test]
fn batch_runs_over_the_timeline() {
    let mut l = ledger();
    let rows = vec![
        AllocationRow { beneficiary: presale1(), amount: 50_000_000 * UNIT },
        AllocationRow { beneficiary: presale2(), amount: 450_000_000 * UNIT },
        AllocationRow { beneficiary: presale1(), amount: 1 },
        AllocationRow { beneficiary: presale3(), amount: 1_000 * UNIT },
    ];
    let report = run_allocations(&mut l, &owner(), &rows).unwrap();
    assert_eq!(report.completed(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.total_amount, 500_000_000 * UNIT);

    let identities = [presale1(), presale2(), presale3()];
    let report = run_distribution(&mut l, days(545), &identities).unwrap();
    assert_eq!(report.completed(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.total_amount, 500_000_000 * UNIT);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_claims_are_serialized() {
    let mut l = ledger();
    let beneficiaries: Vec<Pubkey> = (20..28).map(key).collect();
    for beneficiary in &beneficiaries {
        l.set_allocation(&owner(), *beneficiary, 365 * UNIT).unwrap();
    }
    let shared = SharedLedger::new(l);
    let now = days(180 + 100);

    // Two racing claims per beneficiary: exactly one releases tokens
    let mut handles = Vec::new();
    for beneficiary in beneficiaries.iter().chain(beneficiaries.iter()) {
        let handle = shared.clone();
        let beneficiary = *beneficiary;
        handles.push(tokio::spawn(async move {
            handle.transact(|ledger| ledger.transfer_tokens(now, &beneficiary))
        }));
    }

    let mut released = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(amount) => released += amount,
            Err(DistributionError::NothingToClaim) => rejected += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(rejected, beneficiaries.len());
    assert_eq!(released, 100 * UNIT * beneficiaries.len() as u128);
    shared
        .transact(|ledger| {
            for beneficiary in &beneficiaries {
                assert_eq!(ledger.token().balance_of(beneficiary), 100 * UNIT);
                assert_eq!(ledger.allocation(beneficiary).amount_claimed, 100 * UNIT);
            }
            Ok(())
        })
        .unwrap();
}
