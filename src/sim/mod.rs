//! In-memory simulation host.
//!
//! [`SimHost`] stands in for every collaborator the engine talks to: a
//! fungible token ledger, a settlement service with delegated authority,
//! rule-priced counterparties and a settable clock. It backs the binary's
//! demo and the integration tests.
//!
//! ## Ledger
//!
//! Balances are keyed `(token, owner)`, allowances `(token, owner, spender)`.
//! An allowance of `u128::MAX` is never decremented. Insufficient balance or
//! allowance returns `Ok(false)` rather than an error.
//!
//! ## Settlement
//!
//! `swap` validates expiry, nonce reuse, authority and asset kinds, then
//! moves both legs through the settlement's own allowances. Validation
//! happens before any balance changes, so a rejected swap leaves no trace.

mod counterparty;

pub use counterparty::{Rule, RuleCounterparty};

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::engine::{Clock, CounterpartyApi, SettlementApi, TokenApi};
use crate::error::CallError;
use crate::types::{Address, Locator, Order, TRANSFER_KIND};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimHost {
    now: u64,

    /// Identity of the settlement service (spender for its transfers)
    settlement: Address,

    balances: HashMap<(Address, Address), u128>,
    allowances: HashMap<(Address, Address, Address), u128>,

    /// (grantor, delegate) -> expiry
    authorizations: HashMap<(Address, Address), u64>,

    /// (signer wallet, nonce)
    used_nonces: HashSet<(Address, [u8; 32])>,

    counterparties: HashMap<Locator, RuleCounterparty>,

    /// Orders settled so far, oldest first
    settled: Vec<Order>,
}

impl SimHost {
    pub fn new(settlement: Address) -> Self {
        Self {
            settlement,
            ..Default::default()
        }
    }

    #[inline]
    pub fn settlement(&self) -> Address {
        self.settlement
    }

    // ========================================================================
    // Clock
    // ========================================================================

    pub fn set_now(&mut self, now: u64) {
        self.now = now;
    }

    pub fn advance(&mut self, seconds: u64) {
        self.now = self.now.saturating_add(seconds);
    }

    // ========================================================================
    // Ledger setup and inspection
    // ========================================================================

    pub fn mint(&mut self, token: Address, owner: Address, amount: u128) {
        let balance = self.balances.entry((token, owner)).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> u128 {
        self.balances.get(&(token, owner)).copied().unwrap_or(0)
    }

    /// Set an allowance directly, outside any caller checks
    pub fn set_allowance(&mut self, token: Address, owner: Address, spender: Address, amount: u128) {
        self.allowances.insert((token, owner, spender), amount);
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> u128 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or(0)
    }

    // ========================================================================
    // Counterparties
    // ========================================================================

    /// Register a counterparty at `locator`.
    ///
    /// A trade wallet distinct from the counterparty's own identity is
    /// granted standing authority to it so the counterparty may swap from it.
    pub fn add_counterparty(&mut self, locator: Locator, counterparty: RuleCounterparty) {
        if counterparty.trade_wallet() != counterparty.address() {
            self.authorizations
                .insert((counterparty.trade_wallet(), counterparty.address()), u64::MAX);
        }
        self.counterparties.insert(locator, counterparty);
    }

    pub fn counterparty(&self, locator: Locator) -> Option<&RuleCounterparty> {
        self.counterparties.get(&locator)
    }

    pub fn counterparty_mut(&mut self, locator: Locator) -> Option<&mut RuleCounterparty> {
        self.counterparties.get_mut(&locator)
    }

    // ========================================================================
    // Settlement inspection
    // ========================================================================

    /// `delegate` may act for `grantor` right now
    pub fn is_authorized(&self, grantor: Address, delegate: Address) -> bool {
        grantor == delegate
            || self
                .authorizations
                .get(&(grantor, delegate))
                .is_some_and(|expiry| self.now < *expiry)
    }

    pub fn is_nonce_used(&self, signer: Address, nonce: &[u8; 32]) -> bool {
        self.used_nonces.contains(&(signer, *nonce))
    }

    pub fn settled(&self) -> &[Order] {
        &self.settled
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn lookup(&self, locator: Locator) -> Result<&RuleCounterparty, CallError> {
        self.counterparties
            .get(&locator)
            .ok_or(CallError::UnknownCounterparty(locator))
    }

    fn can_pull(&self, token: Address, spender: Address, from: Address, amount: u128) -> bool {
        self.balance_of(token, from) >= amount && self.allowance(token, from, spender) >= amount
    }

    fn move_balance(&mut self, token: Address, from: Address, to: Address, amount: u128) -> bool {
        let available = self.balance_of(token, from);
        if available < amount {
            return false;
        }
        self.balances.insert((token, from), available - amount);
        let to_balance = self.balances.entry((token, to)).or_insert(0);
        *to_balance = to_balance.saturating_add(amount);
        true
    }
}

impl Clock for SimHost {
    fn now(&self) -> u64 {
        self.now
    }
}

impl TokenApi for SimHost {
    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<bool, CallError> {
        if !self.can_pull(token, spender, from, amount) {
            return Ok(false);
        }
        let allowance = self.allowance(token, from, spender);
        if allowance != u128::MAX {
            self.allowances.insert((token, from, spender), allowance - amount);
        }
        Ok(self.move_balance(token, from, to, amount))
    }

    fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> Result<bool, CallError> {
        self.allowances.insert((token, owner, spender), amount);
        Ok(true)
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<bool, CallError> {
        Ok(self.move_balance(token, from, to, amount))
    }
}

impl SettlementApi for SimHost {
    fn authorize(&mut self, grantor: Address, delegate: Address, expiry: u64) -> Result<(), CallError> {
        if expiry <= self.now {
            return Err(CallError::reverted("INVALID_AUTH_EXPIRY"));
        }
        self.authorizations.insert((grantor, delegate), expiry);
        Ok(())
    }

    fn revoke(&mut self, grantor: Address, delegate: Address) -> Result<(), CallError> {
        self.authorizations.remove(&(grantor, delegate));
        Ok(())
    }

    fn swap(&mut self, caller: Address, order: &Order) -> Result<(), CallError> {
        let signer = order.signer.wallet();
        let sender = order.sender.wallet();

        if order.expiry <= self.now {
            return Err(CallError::reverted("ORDER_EXPIRED"));
        }
        if self.is_nonce_used(signer, &order.nonce) {
            return Err(CallError::reverted("ORDER_TAKEN_OR_CANCELLED"));
        }
        if caller != sender && !self.is_authorized(sender, caller) {
            return Err(CallError::reverted("SENDER_UNAUTHORIZED"));
        }
        if order.signature.is_empty() && !self.is_authorized(signer, caller) {
            return Err(CallError::reverted("SIGNER_UNAUTHORIZED"));
        }
        if order.signer.kind != TRANSFER_KIND || order.sender.kind != TRANSFER_KIND {
            return Err(CallError::reverted("KIND_UNSUPPORTED"));
        }

        let settlement = self.settlement;
        let (sender_token, sender_amount) = (order.sender.token(), order.sender.amount);
        let (signer_token, signer_amount) = (order.signer.token(), order.signer.amount);
        if !self.can_pull(sender_token, settlement, sender, sender_amount)
            || !self.can_pull(signer_token, settlement, signer, signer_amount)
        {
            return Err(CallError::reverted("TRANSFER_FAILED"));
        }

        self.used_nonces.insert((signer, order.nonce));
        self.transfer_from(sender_token, settlement, sender, signer, sender_amount)?;
        self.transfer_from(signer_token, settlement, signer, sender, signer_amount)?;
        self.settled.push(order.clone());

        debug!(%signer, %sender, nonce = %order.nonce_hex(), "swap settled");
        Ok(())
    }
}

impl CounterpartyApi for SimHost {
    fn signer_side_quote(
        &self,
        locator: Locator,
        sender_amount: u128,
        sender_token: Address,
        signer_token: Address,
    ) -> Result<u128, CallError> {
        self.lookup(locator)?
            .signer_side_quote(sender_amount, sender_token, signer_token)
    }

    fn sender_side_quote(
        &self,
        locator: Locator,
        signer_amount: u128,
        signer_token: Address,
        sender_token: Address,
    ) -> Result<u128, CallError> {
        self.lookup(locator)?
            .sender_side_quote(signer_amount, signer_token, sender_token)
    }

    fn trade_wallet(&self, locator: Locator) -> Result<Address, CallError> {
        let counterparty = self.lookup(locator)?;
        counterparty.ensure_live()?;
        Ok(counterparty.trade_wallet())
    }

    fn provide_order(&mut self, _caller: Address, locator: Locator, order: &Order) -> Result<(), CallError> {
        let counterparty = self.lookup(locator)?;
        let key = counterparty.validate_order(order)?;
        let identity = counterparty.address();

        self.swap(identity, order)?;

        if let Some(counterparty) = self.counterparties.get_mut(&locator) {
            counterparty.consume(key, order.sender.amount);
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
