//! Non-negative product prices using decimal arithmetic.
//!
//! Prices travel over the wire as plain JSON numbers, but clients are allowed
//! to send numeric strings as well (`"9.50"`). Both forms are coerced into a
//! [`Decimal`] on the way in, so nothing downstream ever handles floats.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors that can occur when building a [`Price`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price must not be negative")]
    Negative,

    /// The input could not be read as a decimal number.
    #[error("price must be a number, got {0:?}")]
    NotANumber(String),

    /// The input was a float that has no decimal form (NaN, infinity, or out of range).
    #[error("price is out of range")]
    OutOfRange,
}

/// A product price.
///
/// ## Constraints
///
/// - Never negative
/// - Finite decimal; no currency (the catalog is single-currency)
///
/// ## Examples
///
/// ```
/// use catalog_core::Price;
///
/// let price = Price::parse("9.50").unwrap();
/// assert_eq!(price.to_string(), "9.50");
///
/// assert!(Price::parse("-1").is_err());
/// assert!(Price::parse("cheap").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Parse a price from its textual form.
    ///
    /// Accepts plain decimals (`"12.5"`) and scientific notation (`"1.25e1"`).
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotANumber`] for non-numeric input and
    /// [`PriceError::Negative`] for amounts below zero.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        let amount = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| PriceError::NotANumber(s.to_owned()))?;
        Self::new(amount)
    }

    /// Create a price from a float, as found in JSON bodies.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::OutOfRange`] for NaN, infinities or values a
    /// decimal cannot hold, and [`PriceError::Negative`] for negative values.
    pub fn from_f64(value: f64) -> Result<Self, PriceError> {
        let amount = Decimal::from_f64(value).ok_or(PriceError::OutOfRange)?;
        Self::new(amount.normalize())
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount as a float, for JSON output.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative number or numeric string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Price::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Price::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Price::from_f64(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Price::parse(v).map_err(E::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_scientific() {
        assert_eq!(Price::parse("12.5").unwrap().amount(), Decimal::new(125, 1));
        assert_eq!(Price::parse(" 1.25e1 ").unwrap().amount(), Decimal::new(125, 1));
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
    }

    #[test]
    fn test_rejects_negative() {
        assert_eq!(Price::parse("-0.01"), Err(PriceError::Negative));
        assert_eq!(Price::from_f64(-3.0), Err(PriceError::Negative));
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!(matches!(Price::parse("ten"), Err(PriceError::NotANumber(_))));
        assert!(matches!(Price::parse(""), Err(PriceError::NotANumber(_))));
        assert_eq!(Price::from_f64(f64::NAN), Err(PriceError::OutOfRange));
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let from_number: Price = serde_json::from_str("9.5").unwrap();
        let from_string: Price = serde_json::from_str("\"9.5\"").unwrap();
        let from_int: Price = serde_json::from_str("20").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_int.amount(), Decimal::from(20));
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        assert!(serde_json::from_str::<Price>("-1").is_err());
        assert!(serde_json::from_str::<Price>("\"abc\"").is_err());
        assert!(serde_json::from_str::<Price>("true").is_err());
    }

    #[test]
    fn test_null_is_absent_when_optional() {
        let price: Option<Price> = serde_json::from_str("null").unwrap();
        assert!(price.is_none());
    }

    #[test]
    fn test_serializes_as_json_number() {
        let price = Price::parse("9.50").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "9.5");
    }
}
