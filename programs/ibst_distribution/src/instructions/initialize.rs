/**
 * Initialize Distribution Instruction
 *
 * Made by LabsX402 for Solana
 * https://x.com/LabsX402
 */

use anchor_lang::prelude::*;
use anchor_spl::token::{transfer, Mint, Token, TokenAccount, Transfer};

use crate::{
    state::{Allocation, Distribution},
    DistributionError,
    DistributionInitialized,
    ALLOCATION_SEED,
    COMPANY_ALLOCATION_TOKENS,
    DISTRIBUTION_SEED,
    TOTAL_SUPPLY_TOKENS,
    VAULT_SEED,
};

#[derive(Accounts)]
#[instruction(start_time: i64, company_wallet: Pubkey)]
pub struct InitializeDistribution<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    pub mint: Account<'info, Mint>,

    #[account(
        init,
        payer = owner,
        space = Distribution::LEN,
        seeds = [DISTRIBUTION_SEED, mint.key().as_ref()],
        bump,
    )]
    pub distribution: Box<Account<'info, Distribution>>,

    #[account(
        init,
        payer = owner,
        token::mint = mint,
        token::authority = distribution,
        seeds = [VAULT_SEED, distribution.key().as_ref()],
        bump,
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = owner,
        space = Allocation::LEN,
        seeds = [ALLOCATION_SEED, distribution.key().as_ref(), company_wallet.as_ref()],
        bump,
    )]
    pub company_allocation: Account<'info, Allocation>,

    /// Deployer's token account holding the full supply
    #[account(
        mut,
        constraint = funding_account.mint == mint.key() @ DistributionError::InvalidTokenAccount,
        constraint = funding_account.owner == owner.key() @ DistributionError::InvalidTokenAccount,
    )]
    pub funding_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn init_handler(
    ctx: Context<InitializeDistribution>,
    start_time: i64,
    company_wallet: Pubkey,
) -> Result<()> {
    // Token counts are whole tokens, scale to base units
    let scale = 10u128
        .checked_pow(ctx.accounts.mint.decimals as u32)
        .ok_or(DistributionError::InvalidConfig)?;
    let total_supply = TOTAL_SUPPLY_TOKENS
        .checked_mul(scale)
        .ok_or(DistributionError::InvalidConfig)?;
    let company_initial_allocation = COMPANY_ALLOCATION_TOKENS
        .checked_mul(scale)
        .ok_or(DistributionError::InvalidConfig)?;

    // SPL amounts are u64
    let funding_amount =
        u64::try_from(total_supply).map_err(|_| DistributionError::InvalidConfig)?;
    require!(
        ctx.accounts.funding_account.amount >= funding_amount,
        DistributionError::InvalidConfig
    );

    let owner = ctx.accounts.owner.key();
    let distribution = &mut ctx.accounts.distribution;
    distribution.initialize(
        owner,
        company_wallet,
        start_time,
        total_supply,
        company_initial_allocation,
    )?;
    distribution.mint = ctx.accounts.mint.key();
    distribution.vault = ctx.accounts.vault.key();
    distribution.bump = ctx.bumps.distribution;
    distribution.vault_bump = ctx.bumps.vault;

    let company = &mut ctx.accounts.company_allocation;
    distribution.seed_company_allocation(company);
    company.bump = ctx.bumps.company_allocation;

    // Move the full supply into custody
    transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.funding_account.to_account_info(),
                to: ctx.accounts.vault.to_account_info(),
                authority: ctx.accounts.owner.to_account_info(),
            },
        ),
        funding_amount,
    )?;

    emit!(DistributionInitialized {
        owner,
        mint: distribution.mint,
        company_wallet,
        start_time,
        total_supply,
        company_initial_allocation,
    });

    msg!(
        "Distribution initialized: supply {} company {} start {}",
        total_supply,
        company_initial_allocation,
        start_time
    );

    Ok(())
}
