//! Market notifications.
//!
//! Events are immutable records appended to a market's log on every
//! successful mutation. Off-chain indexers replay them to mirror the list.

use crate::types::{Address, Locator};

/// A staker's intent was set (inserted or repositioned)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentSet {
    pub staker: Address,
    pub stake_amount: u128,
    pub expiry: u64,
    pub locator: Locator,
    pub signer_token: Address,
    pub sender_token: Address,
}

/// A staker's intent was removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentUnset {
    pub staker: Address,
    pub signer_token: Address,
    pub sender_token: Address,
}

/// Enum wrapper for all market events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketEvent {
    IntentSet(IntentSet),
    IntentUnset(IntentUnset),
}

impl MarketEvent {
    pub fn staker(&self) -> Address {
        match self {
            MarketEvent::IntentSet(e) => e.staker,
            MarketEvent::IntentUnset(e) => e.staker,
        }
    }
}
