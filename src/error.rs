//! Error taxonomy.
//!
//! - [`RegistryError`]: rejected market/indexer mutations
//! - [`CallError`]: a collaborator call (token, settlement, counterparty) failed
//! - [`MatchError`]: quote selection or fill choreography aborted
//! - [`ParseError`]: malformed hex identities
//!
//! Every failure is fatal to the call that produced it. Nothing is retried.

use std::fmt;

use thiserror::Error;

use crate::types::{Address, Locator};

/// Registry and indexer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unauthorized: {caller} is not the controller")]
    Unauthorized { caller: Address },

    #[error("No intent found for staker {staker}")]
    NotFound { staker: Address },

    #[error("Staker identity {0} is reserved")]
    ReservedStaker(Address),

    #[error("Market already exists for {signer_token}/{sender_token}")]
    MarketExists {
        signer_token: Address,
        sender_token: Address,
    },

    #[error("No market for {signer_token}/{sender_token}")]
    MarketNotFound {
        signer_token: Address,
        sender_token: Address,
    },

    #[error("Token {token} is blacklisted")]
    TokenBlacklisted { token: Address },

    #[error("Intent encoding failed: {0}")]
    Encoding(String),
}

/// Failure reported by an external collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("Call reverted: {0}")]
    Reverted(String),

    #[error("No counterparty reachable at locator {0}")]
    UnknownCounterparty(Locator),
}

impl CallError {
    pub fn reverted(reason: impl Into<String>) -> Self {
        CallError::Reverted(reason.into())
    }
}

/// Token operation whose boolean result came back false
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOp {
    TransferFrom,
    Approve,
    Transfer,
}

impl fmt::Display for TokenOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenOp::TransferFrom => "transferFrom",
            TokenOp::Approve => "approve",
            TokenOp::Transfer => "transfer",
        };
        f.write_str(name)
    }
}

/// Selection and fill errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("No counterparty could quote the request")]
    NoMatchFound,

    #[error("Quote from candidate {locator} failed: {source}")]
    CandidateFailure { locator: Locator, source: CallError },

    #[error("Token {op} of {amount} on {token} returned false")]
    TransferRejected {
        op: TokenOp,
        token: Address,
        amount: u128,
    },

    #[error("Collaborator call failed: {0}")]
    Call(#[from] CallError),

    #[error("Order encoding failed: {0}")]
    Encoding(String),
}

/// Malformed hex identity
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::NotFound {
            staker: Address::from_low_u64(1),
        };
        assert!(err.to_string().contains("0x0000000000000000000000000000000000000001"));
    }

    #[test]
    fn test_match_error_from_call() {
        let err: MatchError = CallError::reverted("ORDER_EXPIRED").into();
        assert!(matches!(err, MatchError::Call(CallError::Reverted(_))));
        assert!(err.to_string().contains("ORDER_EXPIRED"));
    }

    #[test]
    fn test_transfer_rejected_display() {
        let err = MatchError::TransferRejected {
            op: TokenOp::TransferFrom,
            token: Address::from_low_u64(9),
            amount: 500,
        };
        assert!(err.to_string().starts_with("Token transferFrom of 500"));
    }
}
