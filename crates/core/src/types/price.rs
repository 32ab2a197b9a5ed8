//! Catalog prices as fixed-point decimals.
//!
//! Prices are stored in a `NUMERIC(6, 2)` column, so a valid price has at most
//! two fractional digits and at most four integral digits.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount has more than two fractional digits.
    #[error("price must have at most {max} decimal places")]
    TooPrecise {
        /// Maximum allowed decimal places.
        max: u32,
    },
    /// The amount does not fit in the column.
    #[error("price must be below {max}")]
    TooLarge {
        /// Exclusive upper bound.
        max: Decimal,
    },
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A non-negative price with at most six digits, two of them fractional.
///
/// ```
/// use rust_decimal::Decimal;
/// use shelf_core::Price;
///
/// let price: Price = "19.99".parse().unwrap();
/// assert_eq!(price.amount(), Decimal::new(1999, 2));
/// assert_eq!(price.to_string(), "19.99");
///
/// assert!("10000.00".parse::<Price>().is_err());
/// assert!("1.999".parse::<Price>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Maximum number of fractional digits.
    pub const DECIMAL_PLACES: u32 = 2;

    /// Total number of digits allowed by the column.
    pub const MAX_DIGITS: u32 = 6;

    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Validate a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] if the amount is negative, has more than two
    /// decimal places, or has more than four integral digits.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        let normalized = amount.normalize();
        if normalized.scale() > Self::DECIMAL_PLACES {
            return Err(PriceError::TooPrecise {
                max: Self::DECIMAL_PLACES,
            });
        }

        let max = Self::upper_bound();
        if normalized >= max {
            return Err(PriceError::TooLarge { max });
        }

        let mut amount = normalized;
        amount.rescale(Self::DECIMAL_PLACES);
        Ok(Self(amount))
    }

    /// Build a price from a number of cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] if the resulting amount is out of range.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, Self::DECIMAL_PLACES))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    // 10^(MAX_DIGITS - DECIMAL_PLACES)
    fn upper_bound() -> Decimal {
        Decimal::from(10_i64.pow(Self::MAX_DIGITS - Self::DECIMAL_PLACES))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|e| PriceError::Invalid(e.to_string()))?;
        Self::new(amount)
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

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!("0".parse::<Price>().is_ok());
        assert!("9999.99".parse::<Price>().is_ok());
        assert_eq!(
            "10000".parse::<Price>(),
            Err(PriceError::TooLarge {
                max: Decimal::from(10_000)
            })
        );
        assert_eq!("-0.01".parse::<Price>(), Err(PriceError::Negative));
        assert_eq!(
            "0.001".parse::<Price>(),
            Err(PriceError::TooPrecise { max: 2 })
        );
        assert!(matches!(
            "ten dollars".parse::<Price>(),
            Err(PriceError::Invalid(_))
        ));
    }

    #[test]
    fn test_trailing_zeros_are_accepted() {
        let price = "12.5000".parse::<Price>().unwrap();
        assert_eq!(price.to_string(), "12.50");
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(Price::from_cents(1999).unwrap().to_string(), "19.99");
        assert!(Price::from_cents(1_000_000).is_err());
    }

    #[test]
    fn test_serde_uses_string_form() {
        let price = Price::from_cents(450).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"4.50\"");

        let parsed: Price = serde_json::from_str("\"4.5\"").unwrap();
        assert_eq!(parsed, price);
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Price>("\"-1.00\"").is_err());
        assert!(serde_json::from_str::<Price>("\"0.125\"").is_err());
        assert!(serde_json::from_str::<Price>("\"10000\"").is_err());
    }
}
