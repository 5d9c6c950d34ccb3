use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MoneyParseError {
    #[error("Invalid amount '{0}'")]
    Invalid(String),
}

/// Signed fixed-point amount with two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Whole cents, truncated toward zero. `None` if the value does not fit an `i64`.
    pub fn to_cents(self) -> Option<i64> {
        self.0.checked_mul(Decimal::from(100))?.trunc().to_i64()
    }

    /// Truncates (never rounds) anything past the second decimal place.
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp_with_strategy(2, RoundingStrategy::ToZero))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    /// Accepts an optional leading `+`/`-` followed by a plain decimal number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        Decimal::from_str(unsigned)
            .map(Money::from_decimal)
            .map_err(|_| MoneyParseError::Invalid(s.to_string()))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-${:.2}", self.0.abs())
        } else {
            write!(f, "${:.2}", self.0)
        }
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_roundtrip() {
        assert_eq!(Money::from_cents(-1234).to_cents(), Some(-1234));
        assert_eq!(Money::from_cents(0).to_cents(), Some(0));
    }

    #[test]
    fn parse_signed_amounts() {
        assert_eq!("-12.34".parse::<Money>().unwrap().to_cents(), Some(-1234));
        assert_eq!("+5.00".parse::<Money>().unwrap().to_cents(), Some(500));
        assert_eq!("7.5".parse::<Money>().unwrap().to_cents(), Some(750));
    }

    #[test]
    fn parse_truncates_extra_precision() {
        assert_eq!("1.239".parse::<Money>().unwrap().to_cents(), Some(123));
        assert_eq!("-1.239".parse::<Money>().unwrap().to_cents(), Some(-123));
    }

    #[test]
    fn huge_amounts_have_no_cents() {
        let huge: Money = "-9999999999999999999999999999.00".parse().unwrap();
        assert_eq!(huge.to_cents(), None);
        assert_eq!("99999999999999999999.00".parse::<Money>().unwrap().to_cents(), None);
        let max: Money = "92233720368547758.07".parse().unwrap();
        assert_eq!(max.to_cents(), Some(i64::MAX));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("hello".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn display_keeps_sign_outside_currency_symbol() {
        assert_eq!(Money::from_cents(-999).to_string(), "-$9.99");
        assert_eq!(Money::from_cents(550).to_string(), "$5.50");
    }

    #[test]
    fn arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!((a - b).to_cents(), Some(750));
        assert_eq!((a + b).to_cents(), Some(1250));
        assert_eq!((-a).to_cents(), Some(-1000));
        assert!((b - a).is_negative());
        assert!(Money::zero().is_zero());
    }
}
