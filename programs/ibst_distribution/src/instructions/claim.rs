/**
 * Claim Instructions
 *
 * Permissionless release of vested presale tokens. Tokens always go to the
 * beneficiary's own token account, whoever submits the transaction.
 *
 * Made by LabsX402 for Solana
 * https://x.com/LabsX402
 */

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{
    state::{Allocation, Distribution},
    token::{SplVault, TokenLedger},
    DistributionError,
    ALLOCATION_SEED,
    DISTRIBUTION_SEED,
    VAULT_SEED,
};

// =============================================================================
// TRANSFER TOKENS
// =============================================================================

#[derive(Accounts)]
#[instruction(beneficiary: Pubkey)]
pub struct TransferTokens<'info> {
    pub caller: Signer<'info>,

    #[account(
        seeds = [DISTRIBUTION_SEED, distribution.mint.as_ref()],
        bump = distribution.bump,
    )]
    pub distribution: Box<Account<'info, Distribution>>,

    #[account(
        mut,
        seeds = [ALLOCATION_SEED, distribution.key().as_ref(), beneficiary.as_ref()],
        bump = allocation.bump,
    )]
    pub allocation: Account<'info, Allocation>,

    #[account(
        mut,
        seeds = [VAULT_SEED, distribution.key().as_ref()],
        bump = distribution.vault_bump,
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = beneficiary_token_account.mint == distribution.mint @ DistributionError::InvalidTokenAccount,
        constraint = beneficiary_token_account.owner == beneficiary @ DistributionError::InvalidTokenAccount,
        constraint = beneficiary_token_account.key() != vault.key() @ DistributionError::InvalidBeneficiary,
    )]
    pub beneficiary_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn transfer_tokens_handler(ctx: Context<TransferTokens>, beneficiary: Pubkey) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    // Book the claim before moving tokens
    let event = ctx
        .accounts
        .distribution
        .claim_vested(now, &mut ctx.accounts.allocation)?;

    let mint = ctx.accounts.distribution.mint;
    let bump = [ctx.accounts.distribution.bump];
    let seeds: &[&[u8]] = &[DISTRIBUTION_SEED, mint.as_ref(), &bump];
    let signer_seeds: &[&[&[u8]]] = &[seeds];

    let mut vault = SplVault {
        token_program: ctx.accounts.token_program.to_account_info(),
        vault: &ctx.accounts.vault,
        destination: &ctx.accounts.beneficiary_token_account,
        authority: ctx.accounts.distribution.to_account_info(),
        signer_seeds,
    };
    vault.transfer(&beneficiary, event.amount_claimed)?;

    msg!(
        "Released {} to {} ({} of {} claimed)",
        event.amount_claimed,
        beneficiary,
        event.total_claimed,
        ctx.accounts.allocation.total_allocated
    );
    emit!(event);

    Ok(())
}

// =============================================================================
// CLAIM QUOTE
// =============================================================================

#[derive(Accounts)]
#[instruction(beneficiary: Pubkey)]
pub struct EmitClaimQuote<'info> {
    #[account(
        seeds = [DISTRIBUTION_SEED, distribution.mint.as_ref()],
        bump = distribution.bump,
    )]
    pub distribution: Box<Account<'info, Distribution>>,

    #[account(
        seeds = [ALLOCATION_SEED, distribution.key().as_ref(), beneficiary.as_ref()],
        bump = allocation.bump,
    )]
    pub allocation: Account<'info, Allocation>,
}

pub fn quote_handler(ctx: Context<EmitClaimQuote>, beneficiary: Pubkey) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let quote = ctx.accounts.distribution.quote(now, &ctx.accounts.allocation)?;

    msg!("Claimable for {}: {}", beneficiary, quote.claimable);
    emit!(quote);

    Ok(())
}
