//! Integer-minor-unit money (§4.1, §8.3).
//!
//! Monetary values are carried internally as integer cents and are
//! converted to/from a two-fractional-digit decimal string only at the
//! wire boundary (the envelope codec). Doing the conversion in one
//! place means the codec, the validator, and the submission engine
//! cannot drift into three slightly different roundings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount in minor units (cents). Always non-negative in this
/// domain — contribution bases and sonderzahlung amounts are never
/// negative (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u64);

/// Errors parsing a wire-format decimal amount.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MoneyError {
    /// The string did not match `-?\d+(\.\d{1,2})?`.
    #[error("invalid amount format: {0}")]
    InvalidFormat(String),
    /// The parsed amount was negative.
    #[error("negative amount: {0}")]
    Negative(String),
    /// The value overflowed minor-unit representation.
    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

impl Money {
    /// Zero.
    pub const ZERO: Money = Money(0);

    /// Construct directly from a count of minor units (cents).
    pub const fn from_minor_units(cents: u64) -> Self {
        Self(cents)
    }

    /// The raw minor-unit count.
    pub fn minor_units(&self) -> u64 {
        self.0
    }

    /// Parse a wire-format decimal string (`"3500.00"`, `"1800"`) into
    /// minor units. Accepts zero, one, or two fractional digits;
    /// anything else is a format error, not a silent truncation.
    pub fn from_decimal_str(s: &str) -> Result<Self, MoneyError> {
        let s = s.trim();
        if s.starts_with('-') {
            return Err(MoneyError::Negative(s.to_string()));
        }
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(MoneyError::InvalidFormat(s.to_string()));
        }
        if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(MoneyError::InvalidFormat(s.to_string()));
        }
        let whole: u64 = whole
            .parse()
            .map_err(|_| MoneyError::OutOfRange(s.to_string()))?;
        let cents: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| MoneyError::InvalidFormat(s.to_string()))? * 10,
            2 => frac.parse().map_err(|_| MoneyError::InvalidFormat(s.to_string()))?,
            _ => unreachable!(),
        };
        let total = whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(|| MoneyError::OutOfRange(s.to_string()))?;
        Ok(Self(total))
    }

    /// Format as a two-fractional-digit decimal string, as required at
    /// every wire boundary (§4.1, §6).
    pub fn to_decimal_string(&self) -> String {
        format!("{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn formats_with_two_fractional_digits() {
        assert_eq!(Money::from_minor_units(530000).to_decimal_string(), "5300.00");
        assert_eq!(Money::from_minor_units(5).to_decimal_string(), "0.05");
    }

    #[test]
    fn parses_whole_and_fractional() {
        assert_eq!(Money::from_decimal_str("3500.00").unwrap().minor_units(), 350000);
        assert_eq!(Money::from_decimal_str("1800").unwrap().minor_units(), 180000);
        assert_eq!(Money::from_decimal_str("0.5").unwrap().minor_units(), 50);
    }

    #[test]
    fn rejects_negative_and_malformed() {
        assert!(Money::from_decimal_str("-1.00").is_err());
        assert!(Money::from_decimal_str("1.000").is_err());
        assert!(Money::from_decimal_str("abc").is_err());
    }

    proptest! {
        /// Amount boundary fidelity (§8.3): integer minor units round-trip
        /// through the wire decimal format for all values in [0, 10^12].
        #[test]
        fn roundtrips_for_all_values_in_range(cents in 0u64..=1_000_000_000_000u64) {
            let money = Money::from_minor_units(cents);
            let formatted = money.to_decimal_string();
            let parsed = Money::from_decimal_str(&formatted).unwrap();
            prop_assert_eq!(parsed.minor_units(), cents);
        }
    }
}
