use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::ParseFloatError;
use std::ops::Add;
use std::str::FromStr;

/// Monetary amount held as an integral number of cents
///
/// On the wire, amounts travel as JSON numbers with two-decimal semantics. Internally
/// they are fixed-point so they can be compared, hashed and grouped exactly, which the
/// voting engine relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Amount(i64);

impl Amount {
    /// Creates a new instance from a number of cents
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates a new instance from a fractional major-unit value, rounding to the nearest cent
    pub fn from_float(value: f64) -> Self {
        Self((value * 100.0).round() as i64)
    }

    /// Number of cents
    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Fractional major-unit value used on the wire
    pub fn as_float(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();
        write!(f, "{}{}.{:02}", sign, cents / 100, cents % 100)
    }
}

impl FromStr for Amount {
    type Err = ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_float(s.parse()?))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_float())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Amount::from_float)
    }
}
