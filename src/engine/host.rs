//! Collaborator interfaces consumed by the matching engine.
//!
//! The engine never moves tokens or settles orders itself. It drives four
//! narrow interfaces, each a trait so a real chain binding, a simulation or
//! a test double can stand behind it:
//!
//! - [`Clock`]: current timestamp
//! - [`TokenApi`]: fungible transfer/approval
//! - [`SettlementApi`]: delegated authority and order settlement
//! - [`CounterpartyApi`]: quoting parties reached through locators
//!
//! Every call names its caller explicitly. Token calls return `Ok(false)`
//! for non-reverting failures; the engine checks every result.

use crate::error::CallError;
use crate::types::{Address, Locator, Order};

pub trait Clock {
    fn now(&self) -> u64;
}

/// Fungible token operations, addressed by token identity.
pub trait TokenApi {
    /// `spender` moves `amount` of `token` from `from` to `to` using its allowance
    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<bool, CallError>;

    /// `owner` sets `spender`'s allowance on `token` to `amount`
    fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> Result<bool, CallError>;

    /// `from` sends `amount` of `token` to `to`
    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<bool, CallError>;
}

/// Atomic two-party settlement.
pub trait SettlementApi {
    /// `grantor` lets `delegate` act for it until `expiry`
    fn authorize(&mut self, grantor: Address, delegate: Address, expiry: u64) -> Result<(), CallError>;

    /// Withdraw a grant immediately
    fn revoke(&mut self, grantor: Address, delegate: Address) -> Result<(), CallError>;

    /// Settle `order` on behalf of `caller`, validating authority, order
    /// fields and both transfers
    fn swap(&mut self, caller: Address, order: &Order) -> Result<(), CallError>;
}

/// Quoting counterparties, reached through their locators.
pub trait CounterpartyApi {
    /// Signer-side amount required to send `sender_amount`; 0 = cannot quote
    fn signer_side_quote(
        &self,
        locator: Locator,
        sender_amount: u128,
        sender_token: Address,
        signer_token: Address,
    ) -> Result<u128, CallError>;

    /// Sender-side amount paid for receiving `signer_amount`; 0 = cannot quote
    fn sender_side_quote(
        &self,
        locator: Locator,
        signer_amount: u128,
        signer_token: Address,
        sender_token: Address,
    ) -> Result<u128, CallError>;

    /// Wallet the counterparty settles from
    fn trade_wallet(&self, locator: Locator) -> Result<Address, CallError>;

    /// Hand an order to the counterparty, which executes it itself
    fn provide_order(&mut self, caller: Address, locator: Locator, order: &Order) -> Result<(), CallError>;
}

/// Everything the fill choreography touches.
pub trait Host: Clock + TokenApi + SettlementApi + CounterpartyApi {}

impl<T> Host for T where T: Clock + TokenApi + SettlementApi + CounterpartyApi {}
