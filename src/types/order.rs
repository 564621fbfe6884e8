//! Swap orders submitted to the settlement collaborator.
//!
//! ## SSZ Serialization
//!
//! `Order`, `Party` and `Signature` derive `SimpleSerialize` so every order
//! has a deterministic encoding and digest. Identities are stored as raw
//! byte arrays and exposed through typed accessors.
//!
//! ## Unsigned Orders
//!
//! An order whose signature is empty (`v == 0`) carries no proof from the
//! signer. The settlement collaborator accepts it only from a caller the
//! signer has granted delegated authority to.

use ssz_rs::prelude::*;
use sha2::{Digest, Sha256};

use crate::error::MatchError;
use crate::types::Address;

/// Asset-kind selector for fungible tokens (ERC-20 interface id).
pub const TRANSFER_KIND: [u8; 4] = [0x36, 0x37, 0x2b, 0x07];

// ============================================================================
// Party
// ============================================================================

/// One side of an order.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Party {
    /// Asset-transfer method selector
    pub kind: [u8; 4],

    /// Wallet sending this side's tokens (raw bytes)
    pub wallet_raw: [u8; 20],

    /// Token sent by this side (raw bytes)
    pub token_raw: [u8; 20],

    /// Amount of `token` sent
    pub amount: u128,

    /// Token id for non-fungible kinds; zero for fungible transfers
    pub id: u128,
}

impl Party {
    /// Create a fungible-transfer party
    pub fn fungible(wallet: Address, token: Address, amount: u128) -> Self {
        Self {
            kind: TRANSFER_KIND,
            wallet_raw: wallet.0,
            token_raw: token.0,
            amount,
            id: 0,
        }
    }

    #[inline]
    pub fn wallet(&self) -> Address {
        Address(self.wallet_raw)
    }

    #[inline]
    pub fn token(&self) -> Address {
        Address(self.token_raw)
    }

    /// An all-zero party (used for the unused affiliate slot)
    pub fn is_empty(&self) -> bool {
        *self == Party::default()
    }
}

// ============================================================================
// Signature
// ============================================================================

/// Signature block. Left zeroed for orders executed under delegated authority.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Signature {
    pub signatory_raw: [u8; 20],
    pub validator_raw: [u8; 20],
    pub version: u8,
    pub v: u8,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl Signature {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.v == 0
    }
}

// ============================================================================
// Order
// ============================================================================

/// A one-time swap between a signer and a sender.
///
/// ## Example
///
/// ```
/// use intent_market::types::{Address, Order, TRANSFER_KIND};
///
/// let frontend = Address::from_low_u64(1);
/// let wallet = Address::from_low_u64(2);
/// let (weth, dai) = (Address::from_low_u64(10), Address::from_low_u64(11));
///
/// let order = Order::unsigned(1_000, 1_001, frontend, weth, 5, wallet, dai, 100);
///
/// assert_eq!(order.signer.kind, TRANSFER_KIND);
/// assert!(order.signature.is_empty());
/// assert!(order.affiliate.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    /// Unique per signer; derived from time, parties and tokens
    pub nonce: [u8; 32],

    /// Timestamp after which settlement rejects the order
    pub expiry: u64,

    pub signer: Party,
    pub sender: Party,

    /// Unused third party, always zeroed
    pub affiliate: Party,

    pub signature: Signature,
}

impl Order {
    /// Build an unsigned fungible-for-fungible order.
    ///
    /// # Arguments
    ///
    /// * `now` - Current timestamp, folded into the nonce
    /// * `expiry` - Order expiry timestamp
    /// * `signer_wallet` / `signer_token` / `signer_amount` - The signer leg
    /// * `sender_wallet` / `sender_token` / `sender_amount` - The sender leg
    #[allow(clippy::too_many_arguments)]
    pub fn unsigned(
        now: u64,
        expiry: u64,
        signer_wallet: Address,
        signer_token: Address,
        signer_amount: u128,
        sender_wallet: Address,
        sender_token: Address,
        sender_amount: u128,
    ) -> Self {
        Self {
            nonce: derive_nonce(now, signer_wallet, signer_token, sender_wallet, sender_token),
            expiry,
            signer: Party::fungible(signer_wallet, signer_token, signer_amount),
            sender: Party::fungible(sender_wallet, sender_token, sender_amount),
            affiliate: Party::default(),
            signature: Signature::default(),
        }
    }

    /// Deterministic SSZ encoding
    pub fn encode(&self) -> Result<Vec<u8>, MatchError> {
        ssz_rs::serialize(self).map_err(|e| MatchError::Encoding(format!("{:?}", e)))
    }

    /// SHA-256 of the SSZ encoding
    pub fn digest(&self) -> Result<[u8; 32], MatchError> {
        let bytes = self.encode()?;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&Sha256::digest(&bytes));
        Ok(hash)
    }

    pub fn nonce_hex(&self) -> String {
        hex::encode(self.nonce)
    }
}

/// Nonce = SHA-256(now ‖ signer wallet ‖ signer token ‖ sender wallet ‖ sender token).
///
/// `now` is hashed as 8 big-endian bytes. Identical inputs give identical
/// nonces, so one signer can settle at most one order per wallet/token
/// combination per timestamp.
pub fn derive_nonce(
    now: u64,
    signer_wallet: Address,
    signer_token: Address,
    sender_wallet: Address,
    sender_token: Address,
) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(now.to_be_bytes());
    hasher.update(signer_wallet.0);
    hasher.update(signer_token.0);
    hasher.update(sender_wallet.0);
    hasher.update(sender_token.0);

    let mut nonce = [0u8; 32];
    nonce.copy_from_slice(&hasher.finalize());
    nonce
}

// ============================================================================
// Unit Tests
// ============================================================================
