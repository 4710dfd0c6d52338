/**
 * Distribution State
 *
 * Global distribution account: owner/admin access control, supply
 * conservation and the allocation/claim/contribution state transitions.
 * Callers and timestamps are explicit so the same transitions run on-chain
 * and in the host ledger.
 *
 * Made by LabsX402 for Solana
 * https://x.com/LabsX402
 */

use anchor_lang::prelude::*;

use crate::{
    state::{Allocation, AllocationCategory},
    AdminUpdated,
    AllocationCreated,
    ClaimQuote,
    DistributionError,
    LedgerResult,
    ManualContributionSent,
    TokensClaimed,
    CLIFF_DURATION_SECONDS,
    MAX_ADMINS,
    VESTING_DURATION_SECONDS,
};

/// Distribution account
/// Custodian of the full supply (through the vault it owns)
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct Distribution {
    /// Owner (fixed at initialization, manages admins)
    pub owner: Pubkey,

    /// Token mint being distributed
    pub mint: Pubkey,

    /// Vault token account holding the undistributed supply
    pub vault: Pubkey,

    /// Wallet the company allocation is booked against
    pub company_wallet: Pubkey,

    /// Distribution start (claims and contributions are blocked before)
    pub start_time: i64,

    /// Fixed total supply
    pub total_supply: u128,

    /// Company spending cap
    pub company_initial_allocation: u128,

    /// Company allocation plus every presale allocation (only increases)
    pub grand_total_allocated: u128,

    /// Admins allowed to allocate and contribute
    pub admins: Vec<Pubkey>,

    /// Bump seed for PDA
    pub bump: u8,

    /// Bump seed for the vault PDA
    pub vault_bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 32],
}

impl Distribution {
    pub const LEN: usize = 8 + // discriminator
        32 + // owner
        32 + // mint
        32 + // vault
        32 + // company_wallet
        8 +  // start_time
        16 + // total_supply
        16 + // company_initial_allocation
        16 + // grand_total_allocated
        4 + 32 * MAX_ADMINS + // admins
        1 +  // bump
        1 +  // vault_bump
        32;  // reserved

    /// Set the immutable configuration
    /// The company allocation counts towards the grand total from the start
    pub fn initialize(
        &mut self,
        owner: Pubkey,
        company_wallet: Pubkey,
        start_time: i64,
        total_supply: u128,
        company_initial_allocation: u128,
    ) -> LedgerResult<()> {
        if owner == Pubkey::default() || company_wallet == Pubkey::default() {
            return Err(DistributionError::InvalidConfig);
        }
        if start_time <= 0 || start_time.checked_add(VESTING_DURATION_SECONDS).is_none() {
            return Err(DistributionError::InvalidConfig);
        }
        if company_initial_allocation == 0 || company_initial_allocation > total_supply {
            return Err(DistributionError::InvalidConfig);
        }

        self.owner = owner;
        self.company_wallet = company_wallet;
        self.start_time = start_time;
        self.total_supply = total_supply;
        self.company_initial_allocation = company_initial_allocation;
        self.grand_total_allocated = company_initial_allocation;
        self.admins = Vec::new();

        Ok(())
    }

    /// Write the company record (no cliff, no ramp)
    pub fn seed_company_allocation(&self, company: &mut Allocation) {
        company.beneficiary = self.company_wallet;
        company.category = AllocationCategory::Company;
        company.cliff_end = self.start_time;
        company.vesting_end = self.start_time;
        company.total_allocated = self.company_initial_allocation;
        company.amount_claimed = 0;
    }

    // =========================================================================
    // ACCESS CONTROL
    // =========================================================================

    pub fn is_admin(&self, identity: &Pubkey) -> bool {
        self.admins.contains(identity)
    }

    /// Owner or admin
    pub fn is_operator(&self, caller: &Pubkey) -> bool {
        *caller == self.owner || self.is_admin(caller)
    }

    pub fn require_owner(&self, caller: &Pubkey) -> LedgerResult<()> {
        if *caller != self.owner {
            return Err(DistributionError::Unauthorized);
        }
        Ok(())
    }

    pub fn require_operator(&self, caller: &Pubkey) -> LedgerResult<()> {
        if !self.is_operator(caller) {
            return Err(DistributionError::Unauthorized);
        }
        Ok(())
    }

    /// Grant or revoke admin rights. Setting the current value again is a no-op.
    pub fn set_admin(
        &mut self,
        caller: &Pubkey,
        identity: Pubkey,
        enabled: bool,
    ) -> LedgerResult<AdminUpdated> {
        self.require_owner(caller)?;

        if enabled {
            if !self.is_admin(&identity) {
                if self.admins.len() >= MAX_ADMINS {
                    return Err(DistributionError::AdminListFull);
                }
                self.admins.push(identity);
            }
        } else {
            self.admins.retain(|admin| *admin != identity);
        }

        Ok(AdminUpdated { identity, enabled })
    }

    // =========================================================================
    // ALLOCATIONS
    // =========================================================================

    /// Identities that can never receive tokens out of custody: the null
    /// key, the company wallet and the custodian holding the supply
    pub fn is_excluded_recipient(&self, identity: &Pubkey, custodian: &Pubkey) -> bool {
        *identity == Pubkey::default() || *identity == self.company_wallet || identity == custodian
    }

    /// Book a presale allocation into `slot`
    pub fn register_allocation(
        &mut self,
        caller: &Pubkey,
        beneficiary: Pubkey,
        amount: u128,
        custodian: &Pubkey,
        slot: &mut Allocation,
    ) -> LedgerResult<AllocationCreated> {
        self.require_operator(caller)?;

        if amount == 0 {
            return Err(DistributionError::ZeroAmount);
        }
        if self.is_excluded_recipient(&beneficiary, custodian) {
            return Err(DistributionError::InvalidBeneficiary);
        }
        if slot.is_allocated() {
            return Err(DistributionError::AlreadyAllocated);
        }

        let grand_total = self
            .grand_total_allocated
            .checked_add(amount)
            .ok_or(DistributionError::SupplyExceeded)?;
        if grand_total > self.total_supply {
            return Err(DistributionError::SupplyExceeded);
        }

        let cliff_end = self
            .start_time
            .checked_add(CLIFF_DURATION_SECONDS)
            .ok_or(DistributionError::MathOverflow)?;
        let vesting_end = self
            .start_time
            .checked_add(VESTING_DURATION_SECONDS)
            .ok_or(DistributionError::MathOverflow)?;

        slot.beneficiary = beneficiary;
        slot.category = AllocationCategory::Presale;
        slot.cliff_end = cliff_end;
        slot.vesting_end = vesting_end;
        slot.total_allocated = amount;
        slot.amount_claimed = 0;
        self.grand_total_allocated = grand_total;

        Ok(AllocationCreated {
            beneficiary,
            amount,
            grand_total_allocated: grand_total,
        })
    }

    /// Mark the vested, unclaimed part of a presale allocation as claimed.
    /// The caller must deliver `amount_claimed` of the returned event.
    pub fn claim_vested(
        &self,
        now: i64,
        allocation: &mut Allocation,
    ) -> LedgerResult<TokensClaimed> {
        if now < self.start_time {
            return Err(DistributionError::NotStarted);
        }
        if !allocation.is_allocated() {
            return Err(DistributionError::NoAllocation);
        }
        if allocation.category != AllocationCategory::Presale {
            return Err(DistributionError::InvalidBeneficiary);
        }
        if now < allocation.cliff_end {
            return Err(DistributionError::CliffNotReached);
        }

        let vested = allocation
            .vested_amount(now)?
            .min(allocation.total_allocated);
        if vested <= allocation.amount_claimed {
            return Err(DistributionError::NothingToClaim);
        }

        let delta = vested - allocation.amount_claimed;
        allocation.amount_claimed = vested;

        Ok(TokensClaimed {
            beneficiary: allocation.beneficiary,
            amount_claimed: delta,
            total_claimed: vested,
        })
    }

    /// Read-only view of what a claim at `now` would release.
    /// Company records and clocks before the start quote zero.
    pub fn quote(&self, now: i64, allocation: &Allocation) -> LedgerResult<ClaimQuote> {
        let (vested_amount, claimable) = if now < self.start_time
            || allocation.category != AllocationCategory::Presale
        {
            (0, 0)
        } else {
            (allocation.vested_amount(now)?, allocation.claimable(now)?)
        };

        Ok(ClaimQuote {
            beneficiary: allocation.beneficiary,
            vested_amount,
            amount_claimed: allocation.amount_claimed,
            claimable,
            timestamp: now,
        })
    }

    // =========================================================================
    // COMPANY ALLOCATION
    // =========================================================================

    pub fn company_remaining_allocation(&self, company: &Allocation) -> u128 {
        self.company_initial_allocation
            .saturating_sub(company.amount_claimed)
    }

    /// Book a manual contribution against the company cap.
    /// The caller must deliver `amount` to `recipient`.
    pub fn record_contribution(
        &self,
        caller: &Pubkey,
        now: i64,
        recipient: Pubkey,
        amount: u128,
        custodian: &Pubkey,
        company: &mut Allocation,
    ) -> LedgerResult<ManualContributionSent> {
        self.require_operator(caller)?;

        if now < self.start_time {
            return Err(DistributionError::NotStarted);
        }
        if amount == 0 {
            return Err(DistributionError::ZeroAmount);
        }
        if self.is_excluded_recipient(&recipient, custodian) {
            return Err(DistributionError::InvalidBeneficiary);
        }
        if company.category != AllocationCategory::Company
            || company.beneficiary != self.company_wallet
        {
            return Err(DistributionError::InternalConsistencyFault);
        }

        let claimed = company
            .amount_claimed
            .checked_add(amount)
            .ok_or(DistributionError::CompanyAllocationExceeded)?;
        if claimed > self.company_initial_allocation {
            return Err(DistributionError::CompanyAllocationExceeded);
        }

        company.amount_claimed = claimed;

        Ok(ManualContributionSent {
            recipient,
            amount,
            company_remaining: self.company_initial_allocation - claimed,
        })
    }
}
