//! Fixed-point recipe price: at most five digits, two of them after the point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MAX_WHOLE_DIGITS: usize = 3;
const MAX_FRACTION_DIGITS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("A valid number is required.")]
    Invalid,

    #[error("Ensure this value is greater than or equal to 0.")]
    Negative,

    #[error("Ensure that there are no more than 2 decimal places.")]
    TooManyDecimals,

    #[error("Ensure that there are no more than 3 digits before the decimal point.")]
    TooManyDigits,
}

/// A non-negative amount stored as whole cents.
///
/// Serializes as a string with exactly two decimals (`"12.00"`) and accepts
/// either a JSON number or a numeric string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(i64);

impl Price {
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PriceError::Invalid);
        }

        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if whole.is_empty() && fraction.is_empty() {
            return Err(PriceError::Invalid);
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(PriceError::Invalid);
        }

        let whole = whole.trim_start_matches('0');

        if fraction.len() > MAX_FRACTION_DIGITS {
            return Err(PriceError::TooManyDecimals);
        }
        if whole.len() > MAX_WHOLE_DIGITS {
            return Err(PriceError::TooManyDigits);
        }

        let cents = parse_digits(whole)? * 100 + parse_fraction(fraction)?;
        if negative && cents != 0 {
            return Err(PriceError::Negative);
        }

        Ok(Self(cents))
    }
}

fn parse_digits(digits: &str) -> Result<i64, PriceError> {
    if digits.is_empty() {
        return Ok(0);
    }
    digits.parse::<i64>().map_err(|_| PriceError::TooManyDigits)
}

fn parse_fraction(fraction: &str) -> Result<i64, PriceError> {
    let mut padded: String = fraction.chars().take(MAX_FRACTION_DIGITS).collect();
    while padded.len() < MAX_FRACTION_DIGITS {
        padded.push('0');
    }
    padded.parse::<i64>().map_err(|_| PriceError::Invalid)
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        let text = match raw {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => s,
            _ => return Err(serde::de::Error::custom(PriceError::Invalid)),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}
