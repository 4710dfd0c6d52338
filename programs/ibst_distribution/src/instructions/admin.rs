/**
 * Admin Management Instruction
 *
 * Made by LabsX402 for Solana
 * https://x.com/LabsX402
 */

use anchor_lang::prelude::*;

use crate::{state::Distribution, DISTRIBUTION_SEED};

#[derive(Accounts)]
pub struct SetAdmin<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [DISTRIBUTION_SEED, distribution.mint.as_ref()],
        bump = distribution.bump,
    )]
    pub distribution: Box<Account<'info, Distribution>>,
}

pub fn set_admin_handler(ctx: Context<SetAdmin>, identity: Pubkey, enabled: bool) -> Result<()> {
    let caller = ctx.accounts.authority.key();
    let event = ctx
        .accounts
        .distribution
        .set_admin(&caller, identity, enabled)?;

    msg!("Admin {} enabled: {}", identity, enabled);
    emit!(event);

    Ok(())
}
