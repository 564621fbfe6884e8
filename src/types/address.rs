//! Participant identities and counterparty locators.
//!
//! ## Address
//!
//! A 20-byte identity used for stakers, wallets, tokens and contracts.
//! Two identities are reserved:
//!
//! - [`Address::ZERO`]: the null identity
//! - [`Address::HEAD`]: the list sentinel, never assigned to a staker
//!
//! ## Locator
//!
//! A 32-byte opaque value telling consumers how to reach a quoting party.
//! When the party is a contract, its address sits left-aligned in the first
//! 20 bytes and the remainder is zero.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Length of an [`Address`] in bytes
pub const ADDRESS_LEN: usize = 20;

/// Length of a [`Locator`] in bytes
pub const LOCATOR_LEN: usize = 32;

// ============================================================================
// Address
// ============================================================================

/// 20-byte identity of a participant, wallet, token or contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The null identity
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Reserved identity of the list sentinel
    pub const HEAD: Address = Address([0xff; ADDRESS_LEN]);

    /// Build an address whose low 8 bytes hold `value` (big-endian).
    ///
    /// Handy for tests and demos where readable identities matter more
    /// than realistic ones.
    ///
    /// ```
    /// use intent_market::types::Address;
    ///
    /// let alice = Address::from_low_u64(0xa11ce);
    /// assert_eq!(alice.to_string(), "0x00000000000000000000000000000000000a11ce");
    /// ```
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 8..].copy_from_slice(&value.to_be_bytes());
        Address(bytes)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Address(decode_fixed::<ADDRESS_LEN>(s)?))
    }
}

impl TryFrom<String> for Address {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }
}

// ============================================================================
// Locator
// ============================================================================

/// 32-byte opaque pointer to a quoting counterparty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Locator(pub [u8; LOCATOR_LEN]);

impl Locator {
    /// The "no match" locator
    pub const ZERO: Locator = Locator([0u8; LOCATOR_LEN]);

    /// Embed a contract address, left-aligned.
    pub fn from_address(address: Address) -> Self {
        let mut bytes = [0u8; LOCATOR_LEN];
        bytes[..ADDRESS_LEN].copy_from_slice(&address.0);
        Locator(bytes)
    }

    /// Read the leading 20 bytes as a contract address.
    ///
    /// ```
    /// use intent_market::types::{Address, Locator};
    ///
    /// let delegate = Address::from_low_u64(7);
    /// assert_eq!(Locator::from_address(delegate).as_address(), delegate);
    /// ```
    pub fn as_address(&self) -> Address {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&self.0[..ADDRESS_LEN]);
        Address(bytes)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; LOCATOR_LEN] {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Locator {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Locator(decode_fixed::<LOCATOR_LEN>(s)?))
    }
}

impl From<Address> for Locator {
    fn from(address: Address) -> Self {
        Locator::from_address(address)
    }
}

/// Decode a `0x`-prefixed (or bare) hex string into exactly `N` bytes.
fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], ParseError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
    if bytes.len() != N {
        return Err(ParseError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

// ============================================================================
// Unit Tests
// ============================================================================
