/**
 * Token Ledger
 *
 * Transfer seam between the distribution state machine and whatever holds
 * the tokens: the SPL vault on-chain, an in-memory ledger on the host.
 *
 * Made by LabsX402 for Solana
 * https://x.com/LabsX402
 */

use anchor_lang::prelude::*;
use anchor_spl::token::{transfer, TokenAccount, Transfer};

use crate::{DistributionError, LedgerResult};

/// Moves tokens out of the distribution's custody
pub trait TokenLedger {
    /// Send `amount` from the custodian to `to`
    fn transfer(&mut self, to: &Pubkey, amount: u128) -> LedgerResult<()>;

    /// Balance held by `owner`
    fn balance_of(&self, owner: &Pubkey) -> u128;
}

/// Validate a vault transfer of `amount` to `to` and convert it to SPL units.
///
/// The destination must belong to `to`. Supply is conserved, so a validated
/// transfer that does not fit `u64` or exceeds the vault is a consistency fault.
pub fn vault_transfer_amount(
    destination_owner: &Pubkey,
    to: &Pubkey,
    vault_balance: u64,
    amount: u128,
) -> LedgerResult<u64> {
    if destination_owner != to {
        return Err(DistributionError::InvalidTokenAccount);
    }

    let amount = u64::try_from(amount).map_err(|_| {
        msg!("Transfer amount {} does not fit the SPL amount type", amount);
        DistributionError::InternalConsistencyFault
    })?;

    if vault_balance < amount {
        msg!("Vault holds {} but {} was requested", vault_balance, amount);
        return Err(DistributionError::InternalConsistencyFault);
    }

    Ok(amount)
}

/// SPL token vault owned by the distribution PDA
pub struct SplVault<'a, 'info> {
    pub token_program: AccountInfo<'info>,
    pub vault: &'a Account<'info, TokenAccount>,
    pub destination: &'a Account<'info, TokenAccount>,
    /// Vault authority (the distribution PDA)
    pub authority: AccountInfo<'info>,
    pub signer_seeds: &'a [&'a [&'a [u8]]],
}

impl<'a, 'info> TokenLedger for SplVault<'a, 'info> {
    fn transfer(&mut self, to: &Pubkey, amount: u128) -> LedgerResult<()> {
        if self.destination.key() == self.vault.key() {
            return Err(DistributionError::InvalidBeneficiary);
        }
        let amount = vault_transfer_amount(&self.destination.owner, to, self.vault.amount, amount)?;

        transfer(
            CpiContext::new_with_signer(
                self.token_program.clone(),
                Transfer {
                    from: self.vault.to_account_info(),
                    to: self.destination.to_account_info(),
                    authority: self.authority.clone(),
                },
                self.signer_seeds,
            ),
            amount,
        )
        .map_err(|err| {
            msg!("Vault transfer failed: {:?}", err);
            DistributionError::InternalConsistencyFault
        })
    }

    fn balance_of(&self, owner: &Pubkey) -> u128 {
        if self.destination.owner == *owner {
            self.destination.amount as u128
        } else if self.vault.owner == *owner {
            self.vault.amount as u128
        } else {
            0
        }
    }
}
