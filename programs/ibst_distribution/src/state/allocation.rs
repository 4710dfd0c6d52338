/**
 * Allocation State
 *
 * One record per beneficiary. Presale records vest linearly from the cliff
 * to the vesting end; the company record is a spending cap.
 *
 * Made by LabsX402 for Solana
 * https://x.com/LabsX402
 */

use anchor_lang::prelude::*;

use crate::{DistributionError, LedgerResult};

/// Allocation category
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AllocationCategory {
    /// Cliff + linear vesting
    Presale = 0,
    /// Manual contributions only, never vested
    Company = 1,
}

impl Default for AllocationCategory {
    fn default() -> Self {
        Self::Presale
    }
}

/// Allocation account
/// A zeroed record (`total_allocated == 0`) means "no allocation"
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// Wallet the allocation belongs to
    pub beneficiary: Pubkey,

    /// Presale or company
    pub category: AllocationCategory,

    /// Nothing is claimable before this timestamp
    pub cliff_end: i64,

    /// Everything is claimable from this timestamp on
    pub vesting_end: i64,

    /// Total amount promised (immutable once set)
    pub total_allocated: u128,

    /// Amount released so far (never decreases)
    pub amount_claimed: u128,

    /// Bump seed for PDA
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 16],
}

impl Allocation {
    pub const LEN: usize = 8 + // discriminator
        32 + // beneficiary
        1 +  // category
        8 +  // cliff_end
        8 +  // vesting_end
        16 + // total_allocated
        16 + // amount_claimed
        1 +  // bump
        16;  // reserved

    pub fn is_allocated(&self) -> bool {
        self.total_allocated > 0
    }

    /// Amount not yet claimed
    pub fn remaining(&self) -> u128 {
        self.total_allocated.saturating_sub(self.amount_claimed)
    }

    /// Amount vested at `now`
    pub fn vested_amount(&self, now: i64) -> LedgerResult<u128> {
        vested_amount(self.total_allocated, self.cliff_end, self.vesting_end, now)
    }

    /// Vested but not yet claimed at `now`
    pub fn claimable(&self, now: i64) -> LedgerResult<u128> {
        if now < self.cliff_end {
            return Ok(0);
        }
        Ok(self.vested_amount(now)?.saturating_sub(self.amount_claimed))
    }
}

/// Linear vesting from `cliff_end` (0%) to `vesting_end` (100%), floor-rounded.
///
/// The ramp starts at the cliff, not at the distribution start: 90 days past
/// a 180 day cliff on a 545 day schedule vests 90/365 of the total.
pub fn vested_amount(
    total: u128,
    cliff_end: i64,
    vesting_end: i64,
    now: i64,
) -> LedgerResult<u128> {
    if now >= vesting_end {
        return Ok(total);
    }
    if now <= cliff_end {
        return Ok(0);
    }

    let elapsed = now
        .checked_sub(cliff_end)
        .ok_or(DistributionError::MathOverflow)?;
    let span = vesting_end
        .checked_sub(cliff_end)
        .ok_or(DistributionError::MathOverflow)?;

    // cliff_end < now < vesting_end, so both are positive
    let vested = total
        .checked_mul(elapsed as u128)
        .ok_or(DistributionError::MathOverflow)?
        / span as u128;

    Ok(vested.min(total))
}
