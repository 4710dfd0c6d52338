/**
 * Manual Contribution Instruction
 *
 * Sends tokens out of the company allocation to a third party. The company
 * wallet, the vault and its authority are rejected as recipients.
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

#[derive(Accounts)]
#[instruction(recipient: Pubkey)]
pub struct ManualContribution<'info> {
    pub authority: Signer<'info>,

    #[account(
        seeds = [DISTRIBUTION_SEED, distribution.mint.as_ref()],
        bump = distribution.bump,
    )]
    pub distribution: Box<Account<'info, Distribution>>,

    #[account(
        mut,
        seeds = [ALLOCATION_SEED, distribution.key().as_ref(), distribution.company_wallet.as_ref()],
        bump = company_allocation.bump,
    )]
    pub company_allocation: Account<'info, Allocation>,

    #[account(
        mut,
        seeds = [VAULT_SEED, distribution.key().as_ref()],
        bump = distribution.vault_bump,
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = recipient_token_account.mint == distribution.mint @ DistributionError::InvalidTokenAccount,
        constraint = recipient_token_account.owner == recipient @ DistributionError::InvalidTokenAccount,
        constraint = recipient_token_account.key() != vault.key() @ DistributionError::InvalidBeneficiary,
    )]
    pub recipient_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn manual_contribution_handler(
    ctx: Context<ManualContribution>,
    recipient: Pubkey,
    amount: u128,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let caller = ctx.accounts.authority.key();
    let custodian = ctx.accounts.distribution.key();

    let event = ctx.accounts.distribution.record_contribution(
        &caller,
        now,
        recipient,
        amount,
        &custodian,
        &mut ctx.accounts.company_allocation,
    )?;

    let mint = ctx.accounts.distribution.mint;
    let bump = [ctx.accounts.distribution.bump];
    let seeds: &[&[u8]] = &[DISTRIBUTION_SEED, mint.as_ref(), &bump];
    let signer_seeds: &[&[&[u8]]] = &[seeds];

    let mut vault = SplVault {
        token_program: ctx.accounts.token_program.to_account_info(),
        vault: &ctx.accounts.vault,
        destination: &ctx.accounts.recipient_token_account,
        authority: ctx.accounts.distribution.to_account_info(),
        signer_seeds,
    };
    vault.transfer(&recipient, amount)?;

    msg!(
        "Contributed {} to {} (company remaining {})",
        amount,
        recipient,
        event.company_remaining
    );
    emit!(event);

    Ok(())
}
