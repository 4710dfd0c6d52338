/**
 * Batch Tooling
 *
 * Bulk allocation from delimited `identity,amount` rows and bulk claim runs.
 * Per-item failures are recorded and the run continues; a consistency fault
 * halts it.
 *
 * Made by LabsX402 for Solana
 * https://x.com/LabsX402
 */

use std::str::FromStr;

use anchor_lang::prelude::*;

use super::DistributionLedger;
use crate::{token::TokenLedger, DistributionError, LedgerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationRow {
    pub beneficiary: Pubkey,
    /// Base units
    pub amount: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Completed { amount: u128 },
    /// Precondition not met, nothing to do for this identity
    Skipped(DistributionError),
    Failed(DistributionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub identity: Pubkey,
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
    /// Sum of completed amounts
    pub total_amount: u128,
}

impl BatchReport {
    pub fn completed(&self) -> usize {
        self.count(|outcome| matches!(outcome, BatchOutcome::Completed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, BatchOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, BatchOutcome::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&BatchOutcome) -> bool) -> usize {
        self.items.iter().filter(|item| predicate(&item.outcome)).count()
    }

    fn record(&mut self, identity: Pubkey, outcome: BatchOutcome) -> LedgerResult<()> {
        if let BatchOutcome::Completed { amount } = outcome {
            self.total_amount = self
                .total_amount
                .checked_add(amount)
                .ok_or(DistributionError::MathOverflow)?;
        }
        self.items.push(BatchItem { identity, outcome });
        Ok(())
    }
}

/// Parse `identity,amount` lines (`;` also accepted). Amounts are whole
/// tokens scaled by `10^decimals`. Blank lines and `#` comments are ignored,
/// malformed rows are logged and skipped.
pub fn parse_allocation_rows(input: &str, decimals: u8) -> LedgerResult<Vec<AllocationRow>> {
    let scale = 10u128
        .checked_pow(decimals as u32)
        .ok_or(DistributionError::InvalidConfig)?;

    let mut rows = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split(|c: char| c == ',' || c == ';').map(str::trim);
        let (identity, amount) = match (fields.next(), fields.next()) {
            (Some(identity), Some(amount)) => (identity, amount),
            _ => {
                msg!("Row {}: expected identity and amount, skipped", index + 1);
                continue;
            }
        };

        let beneficiary = match Pubkey::from_str(identity) {
            Ok(key) if key != Pubkey::default() => key,
            _ => {
                msg!("Row {}: invalid identity {:?}, skipped", index + 1, identity);
                continue;
            }
        };

        let amount = match amount.parse::<u128>().ok().and_then(|n| n.checked_mul(scale)) {
            Some(amount) if amount > 0 => amount,
            _ => {
                msg!("Row {}: invalid amount {:?} for {}, skipped", index + 1, amount, beneficiary);
                continue;
            }
        };

        rows.push(AllocationRow { beneficiary, amount });
    }

    Ok(rows)
}

/// Register every row not yet allocated
pub fn run_allocations<T: TokenLedger>(
    ledger: &mut DistributionLedger<T>,
    caller: &Pubkey,
    rows: &[AllocationRow],
) -> LedgerResult<BatchReport> {
    let mut report = BatchReport::default();

    for row in rows {
        let existing = ledger.allocation(&row.beneficiary);
        if existing.is_allocated() {
            msg!(
                "Skipped {}: already holds {}",
                row.beneficiary,
                existing.total_allocated
            );
            report.record(
                row.beneficiary,
                BatchOutcome::Skipped(DistributionError::AlreadyAllocated),
            )?;
            continue;
        }

        let outcome = match ledger.set_allocation(caller, row.beneficiary, row.amount) {
            Ok(()) => BatchOutcome::Completed { amount: row.amount },
            Err(DistributionError::InternalConsistencyFault) => {
                return Err(DistributionError::InternalConsistencyFault)
            }
            Err(err) => {
                msg!("Allocation of {} to {} failed: {:?}", row.amount, row.beneficiary, err);
                BatchOutcome::Failed(err)
            }
        };
        report.record(row.beneficiary, outcome)?;
    }

    msg!(
        "Allocated {} to {} accounts ({} skipped, {} failed)",
        report.total_amount,
        report.completed(),
        report.skipped(),
        report.failed()
    );
    Ok(report)
}

/// Claim for every identity at `now`
pub fn run_distribution<T: TokenLedger>(
    ledger: &mut DistributionLedger<T>,
    now: i64,
    identities: &[Pubkey],
) -> LedgerResult<BatchReport> {
    let mut report = BatchReport::default();

    for identity in identities {
        let outcome = match ledger.transfer_tokens(now, identity) {
            Ok(amount) => BatchOutcome::Completed { amount },
            Err(DistributionError::InternalConsistencyFault) => {
                return Err(DistributionError::InternalConsistencyFault)
            }
            Err(
                err @ (DistributionError::NotStarted
                | DistributionError::NoAllocation
                | DistributionError::InvalidBeneficiary
                | DistributionError::CliffNotReached
                | DistributionError::NothingToClaim),
            ) => {
                msg!("Skipped {}: {:?}", identity, err);
                BatchOutcome::Skipped(err)
            }
            Err(err) => {
                msg!("Claim for {} failed: {:?}", identity, err);
                BatchOutcome::Failed(err)
            }
        };
        report.record(*identity, outcome)?;
    }

    msg!(
        "Distributed {} to {} accounts ({} skipped, {} failed)",
        report.total_amount,
        report.completed(),
        report.skipped(),
        report.failed()
    );
    Ok(report)
}
