/**
 * Host Distribution Ledger
 *
 * Off-chain host for the distribution state machine: one owned aggregate
 * over an allocation table and a token ledger, with an event journal and a
 * mutex-serialized shared handle for concurrent callers.
 *
 * Made by LabsX402 for Solana
 * https://x.com/LabsX402
 */

pub mod batch;
pub mod memory;

pub use batch::*;
pub use memory::*;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anchor_lang::prelude::*;

use crate::{
    state::{Allocation, Distribution},
    token::TokenLedger,
    AdminUpdated,
    AllocationCreated,
    DistributionError,
    LedgerResult,
    ManualContributionSent,
    TokensClaimed,
    COMPANY_ALLOCATION_TOKENS,
    TOTAL_SUPPLY_TOKENS,
};

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionConfig {
    pub owner: Pubkey,
    pub start_time: i64,
    pub company_wallet: Pubkey,
    /// Token account holding the undistributed supply
    pub custodian: Pubkey,
    pub total_supply: u128,
    pub company_initial_allocation: u128,
}

impl DistributionConfig {
    /// Default token counts scaled to base units
    pub fn with_decimals(
        owner: Pubkey,
        start_time: i64,
        company_wallet: Pubkey,
        custodian: Pubkey,
        decimals: u8,
    ) -> LedgerResult<Self> {
        let scale = 10u128
            .checked_pow(decimals as u32)
            .ok_or(DistributionError::InvalidConfig)?;

        let config = Self {
            owner,
            start_time,
            company_wallet,
            custodian,
            total_supply: TOTAL_SUPPLY_TOKENS
                .checked_mul(scale)
                .ok_or(DistributionError::InvalidConfig)?,
            company_initial_allocation: COMPANY_ALLOCATION_TOKENS
                .checked_mul(scale)
                .ok_or(DistributionError::InvalidConfig)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.custodian == Pubkey::default() {
            return Err(DistributionError::InvalidConfig);
        }
        Distribution::default().initialize(
            self.owner,
            self.company_wallet,
            self.start_time,
            self.total_supply,
            self.company_initial_allocation,
        )
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// Journal entry, in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    AdminUpdated(AdminUpdated),
    AllocationCreated(AllocationCreated),
    TokensClaimed(TokensClaimed),
    ManualContribution(ManualContributionSent),
}

// =============================================================================
// LEDGER
// =============================================================================

/// Host distribution ledger.
///
/// Every successful operation appends to the event journal. The journal is
/// kept until the caller takes it with `drain_events`, so long-running hosts
/// must drain it periodically.
pub struct DistributionLedger<T> {
    state: Distribution,
    custodian: Pubkey,
    allocations: BTreeMap<Pubkey, Allocation>,
    token: T,
    events: Vec<LedgerEvent>,
}

impl<T: TokenLedger> DistributionLedger<T> {
    /// The custodian must already hold the full supply
    pub fn new(config: DistributionConfig, token: T) -> LedgerResult<Self> {
        config.validate()?;

        let funded = token.balance_of(&config.custodian);
        if funded < config.total_supply {
            msg!(
                "Custodian holds {} of the {} supply",
                funded,
                config.total_supply
            );
            return Err(DistributionError::InvalidConfig);
        }

        let mut state = Distribution::default();
        state.initialize(
            config.owner,
            config.company_wallet,
            config.start_time,
            config.total_supply,
            config.company_initial_allocation,
        )?;

        let mut company = Allocation::default();
        state.seed_company_allocation(&mut company);

        let mut allocations = BTreeMap::new();
        allocations.insert(config.company_wallet, company);

        msg!(
            "Distribution ledger ready: supply {} company {} start {}",
            config.total_supply,
            config.company_initial_allocation,
            config.start_time
        );

        Ok(Self {
            state,
            custodian: config.custodian,
            allocations,
            token,
            events: Vec::new(),
        })
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    pub fn set_admin(&mut self, caller: &Pubkey, identity: Pubkey, enabled: bool) -> LedgerResult<()> {
        let event = self.state.set_admin(caller, identity, enabled)?;
        msg!("Admin {} enabled: {}", identity, enabled);
        self.events.push(LedgerEvent::AdminUpdated(event));
        Ok(())
    }

    pub fn set_allocation(
        &mut self,
        caller: &Pubkey,
        beneficiary: Pubkey,
        amount: u128,
    ) -> LedgerResult<()> {
        let mut slot = self.allocation(&beneficiary);
        let event = self
            .state
            .register_allocation(caller, beneficiary, amount, &self.custodian, &mut slot)?;
        self.allocations.insert(beneficiary, slot);

        msg!(
            "Allocated {} to {} (grand total {})",
            amount,
            beneficiary,
            event.grand_total_allocated
        );
        self.events.push(LedgerEvent::AllocationCreated(event));
        Ok(())
    }

    /// Release everything vested for `beneficiary`; returns the amount sent
    pub fn transfer_tokens(&mut self, now: i64, beneficiary: &Pubkey) -> LedgerResult<u128> {
        let snapshot = self.allocations.get(beneficiary).cloned();
        let mut record = snapshot.clone().unwrap_or_default();
        let event = self.state.claim_vested(now, &mut record)?;

        self.allocations.insert(*beneficiary, record);
        self.settle(*beneficiary, snapshot, beneficiary, event.amount_claimed)?;

        msg!(
            "Released {} to {} ({} claimed)",
            event.amount_claimed,
            beneficiary,
            event.total_claimed
        );
        let released = event.amount_claimed;
        self.events.push(LedgerEvent::TokensClaimed(event));
        Ok(released)
    }

    pub fn manual_contribution(
        &mut self,
        caller: &Pubkey,
        now: i64,
        recipient: Pubkey,
        amount: u128,
    ) -> LedgerResult<()> {
        let company_wallet = self.state.company_wallet;
        let snapshot = self.allocations.get(&company_wallet).cloned();
        let mut company = snapshot.clone().unwrap_or_default();
        let event = self
            .state
            .record_contribution(caller, now, recipient, amount, &self.custodian, &mut company)?;

        self.allocations.insert(company_wallet, company);
        self.settle(company_wallet, snapshot, &recipient, amount)?;

        msg!(
            "Contributed {} to {} (company remaining {})",
            amount,
            recipient,
            event.company_remaining
        );
        self.events.push(LedgerEvent::ManualContribution(event));
        Ok(())
    }

    /// Deliver tokens for an already booked record, restoring it on failure
    fn settle(
        &mut self,
        key: Pubkey,
        snapshot: Option<Allocation>,
        to: &Pubkey,
        amount: u128,
    ) -> LedgerResult<()> {
        if let Err(err) = self.token.transfer(to, amount) {
            msg!("Transfer of {} to {} failed ({:?}), rolling back", amount, to, err);
            match snapshot {
                Some(previous) => self.allocations.insert(key, previous),
                None => self.allocations.remove(&key),
            };
            return Err(DistributionError::InternalConsistencyFault);
        }
        Ok(())
    }

    // =========================================================================
    // VIEWS
    // =========================================================================

    pub fn owner(&self) -> Pubkey {
        self.state.owner
    }

    pub fn start_time(&self) -> i64 {
        self.state.start_time
    }

    pub fn company_wallet(&self) -> Pubkey {
        self.state.company_wallet
    }

    pub fn custodian(&self) -> Pubkey {
        self.custodian
    }

    pub fn is_admin(&self, identity: &Pubkey) -> bool {
        self.state.is_admin(identity)
    }

    pub fn total_supply(&self) -> u128 {
        self.state.total_supply
    }

    pub fn grand_total_allocated(&self) -> u128 {
        self.state.grand_total_allocated
    }

    pub fn company_remaining_allocation(&self) -> u128 {
        self.allocations
            .get(&self.state.company_wallet)
            .map(|company| self.state.company_remaining_allocation(company))
            .unwrap_or(0)
    }

    /// Full record, or the zeroed record if none exists
    pub fn allocation(&self, identity: &Pubkey) -> Allocation {
        self.allocations.get(identity).cloned().unwrap_or_default()
    }

    /// Every record, company included, ordered by identity
    pub fn allocations(&self) -> impl Iterator<Item = (&Pubkey, &Allocation)> + '_ {
        self.allocations.iter()
    }

    pub fn claimable(&self, now: i64, identity: &Pubkey) -> LedgerResult<u128> {
        Ok(self.state.quote(now, &self.allocation(identity))?.claimable)
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    /// Events journaled since the last drain
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Take the journal, leaving it empty
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }
}

// =============================================================================
// SHARED HANDLE
// =============================================================================

/// Cloneable handle serializing every caller through one lock
pub struct SharedLedger<T> {
    inner: Arc<Mutex<DistributionLedger<T>>>,
}

impl<T> Clone for SharedLedger<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: TokenLedger> SharedLedger<T> {
    pub fn new(ledger: DistributionLedger<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Run `f` with exclusive access.
    ///
    /// A caller that panicked while holding the lock may have left a booked
    /// record without its transfer, so a poisoned ledger is reported as a
    /// consistency fault and never handed out again.
    pub fn transact<R>(
        &self,
        f: impl FnOnce(&mut DistributionLedger<T>) -> LedgerResult<R>,
    ) -> LedgerResult<R> {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(_) => {
                msg!("Ledger lock poisoned by a panicking caller");
                return Err(DistributionError::InternalConsistencyFault);
            }
        };
        f(&mut guard)
    }
}
