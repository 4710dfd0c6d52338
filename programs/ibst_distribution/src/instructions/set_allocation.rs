/**
 * Set Allocation Instruction
 *
 * Registers a presale allocation. The allocation PDA is created on first
 * use; an existing record is rejected by the state transition.
 *
 * Made by LabsX402 for Solana
 * https://x.com/LabsX402
 */

use anchor_lang::prelude::*;

use crate::{
    state::{Allocation, Distribution},
    ALLOCATION_SEED,
    DISTRIBUTION_SEED,
};

#[derive(Accounts)]
#[instruction(beneficiary: Pubkey)]
pub struct SetAllocation<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [DISTRIBUTION_SEED, distribution.mint.as_ref()],
        bump = distribution.bump,
    )]
    pub distribution: Box<Account<'info, Distribution>>,

    #[account(
        init_if_needed,
        payer = authority,
        space = Allocation::LEN,
        seeds = [ALLOCATION_SEED, distribution.key().as_ref(), beneficiary.as_ref()],
        bump,
    )]
    pub allocation: Account<'info, Allocation>,

    pub system_program: Program<'info, System>,
}

pub fn set_allocation_handler(
    ctx: Context<SetAllocation>,
    beneficiary: Pubkey,
    amount: u128,
) -> Result<()> {
    let caller = ctx.accounts.authority.key();
    // The distribution PDA owns the vault
    let custodian = ctx.accounts.distribution.key();
    let distribution = &mut ctx.accounts.distribution;
    let allocation = &mut ctx.accounts.allocation;

    let event =
        distribution.register_allocation(&caller, beneficiary, amount, &custodian, allocation)?;
    allocation.bump = ctx.bumps.allocation;

    msg!(
        "Allocated {} to {} (grand total {})",
        amount,
        beneficiary,
        event.grand_total_allocated
    );
    emit!(event);

    Ok(())
}
