//! Core data types for the intent market
//!
//! Intents and orders implement SSZ serialization for deterministic encoding.
//! All token amounts are integer base units (`u128`).
//!
//! ## Types
//!
//! - [`Address`]: 20-byte participant/token identity
//! - [`Locator`]: 32-byte pointer to a quoting counterparty
//! - [`Intent`]: A staked quote slot in a market
//! - [`Order`]: An unsigned swap order handed to a counterparty
//! - [`MarketEvent`]: Notifications emitted by market mutations

mod address;
mod intent;
mod order;
mod event;
pub mod amount;

// Re-export all types at module level
pub use address::{Address, Locator, ADDRESS_LEN, LOCATOR_LEN};
pub use intent::Intent;
pub use order::{derive_nonce, Order, Party, Signature, TRANSFER_KIND};
pub use event::{IntentSet, IntentUnset, MarketEvent};
