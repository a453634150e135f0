//! Two-decimal fixed-point amounts.
//!
//! Flight hours and tolerance amounts are carried as whole hundredths so
//! interval arithmetic stays exact. On the wire the value is a plain number.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SCALE: i64 = 100;

/// Signed decimal amount with exactly two fractional digits.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "f64", into = "f64")]
pub struct Decimal2(i64);

impl Decimal2 {
    pub const ZERO: Self = Self(0);

    /// Builds an amount from a raw hundredths count (`710980` is `7109.80`).
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Builds an amount from a whole number; `None` when it does not fit.
    pub const fn checked_from_whole(value: i64) -> Option<Self> {
        match value.checked_mul(SCALE) {
            Some(hundredths) => Some(Self(hundredths)),
            None => None,
        }
    }

    /// Raw hundredths count.
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Integer part, truncated toward zero.
    pub const fn whole(self) -> i64 {
        self.0 / SCALE
    }

    /// Fractional part in hundredths, carrying the sign of the amount.
    pub const fn fraction_hundredths(self) -> i64 {
        self.0 % SCALE
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn is_whole(self) -> bool {
        self.0 % SCALE == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }
}

impl TryFrom<f64> for Decimal2 {
    type Error = Decimal2Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(Decimal2Error::NotFinite);
        }
        let scaled = (value * SCALE as f64).round();
        if scaled >= i64::MAX as f64 || scaled <= i64::MIN as f64 {
            return Err(Decimal2Error::OutOfRange(value));
        }
        Ok(Self(scaled as i64))
    }
}

impl From<Decimal2> for f64 {
    fn from(value: Decimal2) -> Self {
        value.to_f64()
    }
}

impl Display for Decimal2 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let scale = SCALE.unsigned_abs();
        write!(f, "{sign}{}.{:02}", magnitude / scale, magnitude % scale)
    }
}

/// Conversion errors for `Decimal2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decimal2Error {
    NotFinite,
    OutOfRange(f64),
}

impl Display for Decimal2Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFinite => write!(f, "decimal amount must be a finite number"),
            Self::OutOfRange(value) => write!(f, "decimal amount out of range: {value}"),
        }
    }
}

impl Error for Decimal2Error {}

#[cfg(test)]
mod tests {
    use super::{Decimal2, Decimal2Error};

    #[test]
    fn float_conversion_rounds_to_hundredths() {
        assert_eq!(
            Decimal2::try_from(10.98).expect("finite"),
            Decimal2::from_hundredths(1098)
        );
        assert_eq!(
            Decimal2::try_from(7109.8).expect("finite"),
            Decimal2::from_hundredths(710_980)
        );
        assert_eq!(
            Decimal2::try_from(0.125).expect("finite"),
            Decimal2::from_hundredths(13)
        );
    }

    #[test]
    fn float_conversion_rejects_non_finite() {
        assert_eq!(Decimal2::try_from(f64::NAN), Err(Decimal2Error::NotFinite));
        assert_eq!(
            Decimal2::try_from(f64::INFINITY),
            Err(Decimal2Error::NotFinite)
        );
    }

    #[test]
    fn parts_split_whole_and_fraction() {
        let amount = Decimal2::from_hundredths(1225);
        assert_eq!(amount.whole(), 12);
        assert_eq!(amount.fraction_hundredths(), 25);
        assert!(!amount.is_whole());
        assert!(Decimal2::from_hundredths(1_200).is_whole());
    }

    #[test]
    fn whole_construction_rejects_overflow() {
        assert_eq!(
            Decimal2::checked_from_whole(7000),
            Some(Decimal2::from_hundredths(700_000))
        );
        assert_eq!(Decimal2::checked_from_whole(i64::MAX / 10), None);
        assert_eq!(Decimal2::checked_from_whole(i64::MIN), None);
    }

    #[test]
    fn display_keeps_two_digits_and_sign() {
        assert_eq!(Decimal2::from_hundredths(710_980).to_string(), "7109.80");
        assert_eq!(Decimal2::from_hundredths(-5).to_string(), "-0.05");
        assert_eq!(Decimal2::ZERO.to_string(), "0.00");
    }
}
