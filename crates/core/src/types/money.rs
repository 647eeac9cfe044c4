//! Monetary amounts using decimal arithmetic.
//!
//! The marketplace trades in a single store currency, so [`Money`] carries no
//! currency code. Amounts are non-negative with at most two decimal places and
//! serialize as strings (`"129.99"`) to avoid float rounding in clients.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing [`Money`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is negative.
    #[error("amount cannot be negative")]
    Negative,
    /// The amount has more than two decimal places.
    #[error("amount must have at most 2 decimal places")]
    TooPrecise,
}

/// A non-negative amount in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a validated amount.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] for negative amounts and
    /// [`MoneyError::TooPrecise`] when there are more than two decimals.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        let normalized = amount.normalize();
        if normalized.scale() > 2 {
            return Err(MoneyError::TooPrecise);
        }
        let mut value = normalized;
        value.rescale(2);
        Ok(Self(value))
    }

    /// Create an amount from a whole number of cents.
    ///
    /// Negative inputs clamp to zero.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents.max(0), 2))
    }

    /// Const constructor for fixed amounts such as shipping rates.
    #[must_use]
    pub const fn from_cents_const(cents: u32) -> Self {
        Self(Decimal::from_parts(cents, 0, 0, false, 2))
    }

    /// The underlying decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Subtract, returning `None` if the result would be negative.
    #[must_use]
    pub fn checked_sub(&self, other: Self) -> Option<Self> {
        let result = self.0 - other.0;
        (!result.is_sign_negative() || result.is_zero()).then_some(Self(result))
    }

    /// Apply a signed adjustment (such as a variant price modifier), flooring at zero.
    #[must_use]
    pub fn adjusted_by(&self, delta: Decimal) -> Self {
        let result = self.0 + delta;
        if result.is_sign_negative() {
            Self::ZERO
        } else {
            let mut value = result.round_dp(2);
            value.rescale(2);
            Self(value)
        }
    }

    /// Whole currency units, rounded down (used for XP awards).
    #[must_use]
    pub fn whole_units(&self) -> i64 {
        self.0.trunc().to_i64().unwrap_or(i64::MAX)
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // CHECK constraints keep stored amounts non-negative
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
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
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_new_rejects_negative_and_precise() {
        assert_eq!(Money::new(dec("-0.01")), Err(MoneyError::Negative));
        assert_eq!(Money::new(dec("1.999")), Err(MoneyError::TooPrecise));
        assert!(Money::new(dec("1.990")).is_ok());
    }

    #[test]
    fn test_display_always_two_places() {
        assert_eq!(Money::new(dec("5")).unwrap().to_string(), "5.00");
        assert_eq!(Money::from_cents(12_950).to_string(), "129.50");
    }

    #[test]
    fn test_arithmetic() {
        let price = Money::from_cents(2_499);
        assert_eq!(price.times(3), Money::from_cents(7_497));
        assert_eq!(
            [price, price].into_iter().sum::<Money>(),
            Money::from_cents(4_998)
        );
        assert_eq!(price.checked_sub(Money::from_cents(2_500)), None);
        assert_eq!(
            price.checked_sub(Money::from_cents(499)),
            Some(Money::from_cents(2_000))
        );
    }

    #[test]
    fn test_adjusted_by_floors_at_zero() {
        let base = Money::from_cents(1_000);
        assert_eq!(base.adjusted_by(dec("15.50")), Money::from_cents(2_550));
        assert_eq!(base.adjusted_by(dec("-20")), Money::ZERO);
    }

    #[test]
    fn test_whole_units_truncates() {
        assert_eq!(Money::from_cents(19_999).whole_units(), 199);
    }

    #[test]
    fn test_serde_uses_strings() {
        let json = serde_json::to_string(&Money::from_cents(1_050)).unwrap();
        assert_eq!(json, "\"10.50\"");
        let parsed: Money = serde_json::from_str("\"10.5\"").unwrap();
        assert_eq!(parsed, Money::from_cents(1_050));
        assert!(serde_json::from_str::<Money>("\"-1\"").is_err());
    }
}
