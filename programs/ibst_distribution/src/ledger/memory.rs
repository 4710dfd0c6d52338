/**
 * Memory Token Ledger
 *
 * Fixed-supply fungible token kept in memory: balances, allowances and
 * delegated transfers. The whole supply is minted to one holder at
 * construction, which acts as the distribution custodian.
 *
 * Made by LabsX402 for Solana
 * https://x.com/LabsX402
 */

use std::collections::BTreeMap;

use anchor_lang::prelude::{msg, Pubkey};

use crate::{token::TokenLedger, DistributionError, LedgerResult};

pub const TOKEN_NAME: &str = "Inbest Token";
pub const TOKEN_SYMBOL: &str = "IBST";
pub const DEFAULT_DECIMALS: u8 = 18;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("transfer to the null identity")]
    NullRecipient,

    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: u128, requested: u128 },

    #[error("insufficient allowance: available {available}, requested {requested}")]
    InsufficientAllowance { available: u128, requested: u128 },

    #[error("arithmetic overflow")]
    Overflow,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryTokenLedger {
    holder: Pubkey,
    total_supply: u128,
    decimals: u8,
    balances: BTreeMap<Pubkey, u128>,
    /// (owner, spender) -> remaining allowance
    allowances: BTreeMap<(Pubkey, Pubkey), u128>,
}

impl MemoryTokenLedger {
    pub fn new(holder: Pubkey, total_supply: u128, decimals: u8) -> Self {
        let mut balances = BTreeMap::new();
        balances.insert(holder, total_supply);
        Self {
            holder,
            total_supply,
            decimals,
            balances,
            allowances: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        TOKEN_NAME
    }

    pub fn symbol(&self) -> &'static str {
        TOKEN_SYMBOL
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Account the supply was minted to
    pub fn holder(&self) -> Pubkey {
        self.holder
    }

    pub fn balance_of(&self, owner: &Pubkey) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    /// Transfer signed by `from`
    pub fn transfer_from_holder(
        &mut self,
        from: Pubkey,
        to: Pubkey,
        amount: u128,
    ) -> std::result::Result<(), TokenError> {
        self.move_balance(from, to, amount)
    }

    pub fn approve(&mut self, owner: Pubkey, spender: Pubkey, amount: u128) {
        self.allowances.insert((owner, spender), amount);
    }

    pub fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u128 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn increase_allowance(
        &mut self,
        owner: Pubkey,
        spender: Pubkey,
        added: u128,
    ) -> std::result::Result<u128, TokenError> {
        let updated = self
            .allowance(&owner, &spender)
            .checked_add(added)
            .ok_or(TokenError::Overflow)?;
        self.allowances.insert((owner, spender), updated);
        Ok(updated)
    }

    /// Saturates at zero
    pub fn decrease_allowance(&mut self, owner: Pubkey, spender: Pubkey, subtracted: u128) -> u128 {
        let updated = self.allowance(&owner, &spender).saturating_sub(subtracted);
        self.allowances.insert((owner, spender), updated);
        updated
    }

    /// Delegated transfer spending `spender`'s allowance over `from`
    pub fn transfer_from(
        &mut self,
        spender: Pubkey,
        from: Pubkey,
        to: Pubkey,
        amount: u128,
    ) -> std::result::Result<(), TokenError> {
        let available = self.allowance(&from, &spender);
        if available < amount {
            return Err(TokenError::InsufficientAllowance {
                available,
                requested: amount,
            });
        }

        self.move_balance(from, to, amount)?;
        self.allowances.insert((from, spender), available - amount);
        Ok(())
    }

    fn move_balance(
        &mut self,
        from: Pubkey,
        to: Pubkey,
        amount: u128,
    ) -> std::result::Result<(), TokenError> {
        if to == Pubkey::default() {
            return Err(TokenError::NullRecipient);
        }

        let available = self.balance_of(&from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                available,
                requested: amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let credited = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.balances.insert(from, available - amount);
        self.balances.insert(to, credited);
        Ok(())
    }
}

impl TokenLedger for MemoryTokenLedger {
    fn transfer(&mut self, to: &Pubkey, amount: u128) -> LedgerResult<()> {
        let holder = self.holder;
        self.transfer_from_holder(holder, *to, amount).map_err(|err| {
            msg!("Custodian transfer of {} to {} failed: {}", amount, to, err);
            DistributionError::InternalConsistencyFault
        })
    }

    fn balance_of(&self, owner: &Pubkey) -> u128 {
        MemoryTokenLedger::balance_of(self, owner)
    }
}
