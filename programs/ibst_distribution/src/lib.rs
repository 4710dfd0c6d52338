/**
 * IBST Distribution
 *
 * Fixed-supply token distribution: presale allocations with a cliff and
 * linear vesting, plus a company allocation spent through manual contributions.
 *
 * Made by LabsX402 for Solana
 * https://x.com/LabsX402
 *
 * License: BSL 1.1 (converts to MIT after Dec 2028)
 */

use anchor_lang::prelude::*;

pub mod state;
pub mod instructions;
pub mod token;

#[cfg(not(target_os = "solana"))]
pub mod ledger;

use state::*;
use instructions::*;

declare_id!("4DfjuMNTvYJhUTgjHyFXQcEW1jxy28VitTR77jm1jRMh");

// =============================================================================
// SEEDS
// =============================================================================

pub const DISTRIBUTION_SEED: &[u8] = b"distribution";
pub const VAULT_SEED: &[u8] = b"vault";
pub const ALLOCATION_SEED: &[u8] = b"allocation";

// =============================================================================
// CONSTANTS
// =============================================================================

pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Presale cliff: 180 days after start
pub const CLIFF_DURATION_SECONDS: i64 = 180 * SECONDS_PER_DAY;

/// Presale fully vested: 545 days after start
pub const VESTING_DURATION_SECONDS: i64 = 545 * SECONDS_PER_DAY;

/// Fixed total supply in whole tokens (14 billion)
pub const TOTAL_SUPPLY_TOKENS: u128 = 14_000_000_000;

/// Company allocation in whole tokens (13.5 billion)
pub const COMPANY_ALLOCATION_TOKENS: u128 = 13_500_000_000;

/// Maximum number of admins besides the owner
pub const MAX_ADMINS: usize = 16;

/// Result type of the ledger core (state transitions shared by program and host)
pub type LedgerResult<T> = core::result::Result<T, DistributionError>;

// =============================================================================
// PROGRAM
// =============================================================================

#[program]
pub mod ibst_distribution {
    use super::*;

    // =========================================================================
    // SETUP
    // =========================================================================

    /// Initialize the distribution
    /// Funds the vault with the full supply and seeds the company allocation
    pub fn initialize_distribution(
        ctx: Context<InitializeDistribution>,
        start_time: i64,
        company_wallet: Pubkey,
    ) -> Result<()> {
        instructions::initialize::init_handler(ctx, start_time, company_wallet)
    }

    /// Grant or revoke admin rights (owner only)
    pub fn set_admin(ctx: Context<SetAdmin>, identity: Pubkey, enabled: bool) -> Result<()> {
        instructions::admin::set_admin_handler(ctx, identity, enabled)
    }

    // =========================================================================
    // PRESALE ALLOCATIONS
    // =========================================================================

    /// Register a presale allocation (owner or admin, once per beneficiary)
    pub fn set_allocation(
        ctx: Context<SetAllocation>,
        beneficiary: Pubkey,
        amount: u128,
    ) -> Result<()> {
        instructions::set_allocation::set_allocation_handler(ctx, beneficiary, amount)
    }

    /// Release vested tokens to a beneficiary
    /// Permissionless - tokens always go to the beneficiary
    pub fn transfer_tokens(ctx: Context<TransferTokens>, beneficiary: Pubkey) -> Result<()> {
        instructions::claim::transfer_tokens_handler(ctx, beneficiary)
    }

    /// Emit the currently claimable amount for a beneficiary
    pub fn emit_claim_quote(ctx: Context<EmitClaimQuote>, beneficiary: Pubkey) -> Result<()> {
        instructions::claim::quote_handler(ctx, beneficiary)
    }

    // =========================================================================
    // COMPANY ALLOCATION
    // =========================================================================

    /// Send tokens from the company allocation (owner or admin)
    pub fn manual_contribution(
        ctx: Context<ManualContribution>,
        recipient: Pubkey,
        amount: u128,
    ) -> Result<()> {
        instructions::contribution::manual_contribution_handler(ctx, recipient, amount)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[error_code]
#[derive(PartialEq, Eq)]
pub enum DistributionError {
    #[msg("Caller is neither the owner nor an admin")]
    Unauthorized,

    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Identity cannot receive a presale allocation, claim or contribution")]
    InvalidBeneficiary,

    #[msg("Beneficiary already has an allocation")]
    AlreadyAllocated,

    #[msg("Allocation would exceed the total supply")]
    SupplyExceeded,

    #[msg("Distribution has not started")]
    NotStarted,

    #[msg("Beneficiary has no allocation")]
    NoAllocation,

    #[msg("Cliff period not yet reached")]
    CliffNotReached,

    #[msg("No vested tokens left to claim")]
    NothingToClaim,

    #[msg("Amount exceeds the remaining company allocation")]
    CompanyAllocationExceeded,

    #[msg("Token transfer failed after all checks passed")]
    InternalConsistencyFault,

    #[msg("Invalid distribution configuration")]
    InvalidConfig,

    #[msg("Admin list is full")]
    AdminListFull,

    #[msg("Token account does not match mint or owner")]
    InvalidTokenAccount,

    #[msg("Math overflow")]
    MathOverflow,
}

// =============================================================================
// EVENTS
// =============================================================================

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionInitialized {
    pub owner: Pubkey,
    pub mint: Pubkey,
    pub company_wallet: Pubkey,
    pub start_time: i64,
    pub total_supply: u128,
    pub company_initial_allocation: u128,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUpdated {
    pub identity: Pubkey,
    pub enabled: bool,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationCreated {
    pub beneficiary: Pubkey,
    pub amount: u128,
    pub grand_total_allocated: u128,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokensClaimed {
    pub beneficiary: Pubkey,
    /// Released by this claim
    pub amount_claimed: u128,
    /// Cumulative amount claimed by the beneficiary
    pub total_claimed: u128,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualContributionSent {
    pub recipient: Pubkey,
    pub amount: u128,
    pub company_remaining: u128,
}

#[event]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimQuote {
    pub beneficiary: Pubkey,
    pub vested_amount: u128,
    pub amount_claimed: u128,
    pub claimable: u128,
    pub timestamp: i64,
}
