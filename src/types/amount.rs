//! Token amount and price utilities.
//!
//! ## Overview
//!
//! On-ledger amounts are integer base units (`u128`). Prices and
//! human-readable amounts use `rust_decimal::Decimal` so no floating point
//! ever touches a quote.
//!
//! ## Rounding
//!
//! A counterparty quoting how much it *requires* rounds up; one quoting how
//! much it *pays* rounds down. Either way the counterparty never loses a
//! base unit to rounding.
//!
//! ## Examples
//!
//! ```
//! use intent_market::types::amount::{to_units, from_units};
//!
//! let amount = to_units("1.5", 6).unwrap();
//! assert_eq!(amount, 1_500_000);
//! assert_eq!(from_units(amount, 6), "1.5");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Rounding direction for quote arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round toward zero (amount paid out)
    Down,
    /// Round away from zero (amount required)
    Up,
}

impl Rounding {
    fn strategy(self) -> RoundingStrategy {
        match self {
            Rounding::Down => RoundingStrategy::ToZero,
            Rounding::Up => RoundingStrategy::AwayFromZero,
        }
    }
}

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a decimal string to integer base units
///
/// # Arguments
///
/// * `s` - Decimal string (e.g., "1.25")
/// * `decimals` - Token decimals
///
/// # Returns
///
/// * `Some(u128)` - The base-unit amount
/// * `None` - If parsing fails, the value is negative, has more precision
///   than the token allows, or is out of range
///
/// # Example
///
/// ```
/// use intent_market::types::amount::to_units;
///
/// assert_eq!(to_units("2000", 0), Some(2000));
/// assert_eq!(to_units("0.000001", 6), Some(1));
/// assert_eq!(to_units("0.0000001", 6), None);
/// ```
pub fn to_units(s: &str, decimals: u32) -> Option<u128> {
    let value = Decimal::from_str(s).ok()?;
    if value.is_sign_negative() {
        return None;
    }
    let scaled = value.checked_mul(unit(decimals)?)?;
    if !scaled.fract().is_zero() {
        return None;
    }
    scaled.to_u128()
}

/// Convert base units to a trimmed decimal string
///
/// Amounts beyond `Decimal` range fall back to the raw integer.
pub fn from_units(value: u128, decimals: u32) -> String {
    match (Decimal::from_u128(value), unit(decimals)) {
        (Some(v), Some(u)) => match v.checked_div(u) {
            Some(d) => d.normalize().to_string(),
            None => value.to_string(),
        },
        _ => value.to_string(),
    }
}

fn unit(decimals: u32) -> Option<Decimal> {
    Decimal::from_u128(10u128.checked_pow(decimals)?)
}

// ============================================================================
// Price Arithmetic
// ============================================================================

/// `amount * rate`, rounded to a whole base unit.
///
/// Returns `None` on overflow or if `amount` exceeds `Decimal` range.
///
/// # Example
///
/// ```
/// use intent_market::types::amount::{apply_rate, Rounding};
/// use rust_decimal::Decimal;
///
/// let rate = Decimal::new(15, 1); // 1.5
/// assert_eq!(apply_rate(3, rate, Rounding::Up), Some(5));
/// assert_eq!(apply_rate(3, rate, Rounding::Down), Some(4));
/// ```
pub fn apply_rate(amount: u128, rate: Decimal, rounding: Rounding) -> Option<u128> {
    if rate.is_sign_negative() {
        return None;
    }
    let product = Decimal::from_u128(amount)?.checked_mul(rate)?;
    product.round_dp_with_strategy(0, rounding.strategy()).to_u128()
}

/// `amount / rate`, rounded to a whole base unit.
///
/// Returns `None` if `rate` is zero or negative, or on overflow.
pub fn divide_by_rate(amount: u128, rate: Decimal, rounding: Rounding) -> Option<u128> {
    if rate.is_zero() || rate.is_sign_negative() {
        return None;
    }
    let quotient = Decimal::from_u128(amount)?.checked_div(rate)?;
    quotient.round_dp_with_strategy(0, rounding.strategy()).to_u128()
}

// ============================================================================
// Unit Tests
// ============================================================================
