//! Staked quote intents.
//!
//! ## SSZ Serialization
//!
//! `Intent` derives `SimpleSerialize` so a market's contents can be hashed
//! into a deterministic state root. Identities are stored as raw byte
//! arrays for SSZ compatibility and exposed through typed accessors.
//!
//! ## Layout
//!
//! Fixed-size container: 20 (staker) + 16 (stake) + 8 (expiry) + 32 (locator)
//! = 76 bytes.

use ssz_rs::prelude::*;

use crate::types::{Address, Locator};

/// One staked quote slot in a market.
///
/// ## Example
///
/// ```
/// use intent_market::types::{Address, Intent, Locator};
///
/// let staker = Address::from_low_u64(1);
/// let intent = Intent::new(staker, 2_000, 1_700_000_000, Locator::from_address(staker));
///
/// assert_eq!(intent.staker(), staker);
/// assert!(!intent.is_expired(1_700_000_000));
/// assert!(intent.is_expired(1_700_000_001));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Intent {
    /// Staker identity as raw bytes
    pub staker_raw: [u8; 20],

    /// Stake backing the quote; primary ordering key (descending)
    pub stake_amount: u128,

    /// Timestamp after which the intent is stale
    pub expiry: u64,

    /// Locator as raw bytes
    pub locator_raw: [u8; 32],
}

impl Intent {
    pub fn new(staker: Address, stake_amount: u128, expiry: u64, locator: Locator) -> Self {
        Self {
            staker_raw: staker.0,
            stake_amount,
            expiry,
            locator_raw: locator.0,
        }
    }

    #[inline]
    pub fn staker(&self) -> Address {
        Address(self.staker_raw)
    }

    #[inline]
    pub fn locator(&self) -> Locator {
        Locator(self.locator_raw)
    }

    /// Expiry is advisory: the registry never purges stale intents,
    /// consumers decide what to do with them.
    #[inline]
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expiry
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_accessors() {
        let staker = Address::from_low_u64(0xb0b);
        let locator = Locator::from_address(Address::from_low_u64(0xde1e9a7e));
        let intent = Intent::new(staker, 500, 100, locator);

        assert_eq!(intent.staker(), staker);
        assert_eq!(intent.locator(), locator);
        assert_eq!(intent.stake_amount, 500);
        assert_eq!(intent.expiry, 100);
    }

    #[test]
    fn test_intent_expiry_boundary() {
        let intent = Intent::new(Address::from_low_u64(1), 1, 100, Locator::ZERO);

        assert!(!intent.is_expired(99));
        assert!(!intent.is_expired(100));
        assert!(intent.is_expired(101));
    }

    #[test]
    fn test_intent_ssz_size() {
        let intent = Intent::new(Address::from_low_u64(1), 1, 1, Locator::ZERO);
        let bytes = ssz_rs::serialize(&intent).expect("Failed to serialize");

        assert_eq!(bytes.len(), 76, "Intent should serialize to 76 bytes");
    }

    #[test]
    fn test_intent_deterministic_serialization() {
        let intent = Intent::new(Address::from_low_u64(3), 1_500, 86_400, Locator::ZERO);

        let bytes1 = ssz_rs::serialize(&intent).expect("Failed to serialize");
        let bytes2 = ssz_rs::serialize(&intent).expect("Failed to serialize");

        assert_eq!(bytes1, bytes2, "SSZ serialization must be deterministic");
    }
}
