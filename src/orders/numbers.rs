//! Order numbers

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const PREFIX: &str = "FC";
const MILLIS_DIGITS: usize = 8;
const SEQUENCE_DIGITS: usize = 6;
const MILLIS_MODULUS: i64 = 100_000_000;
const SEQUENCE_MODULUS: u64 = 1_000_000;

/// Error parsing an order number.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid order number: {0}")]
pub struct OrderNumberError(String);

/// Human-facing order number, `FC` followed by the last eight digits of the
/// epoch milliseconds and a six-digit sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Build the number for the `sequence`-th order placed at `now`.
    ///
    /// Sequences wrap at one million; uniqueness is left to the store.
    pub fn generate(now: Timestamp, sequence: u64) -> Self {
        let millis = now.as_millisecond().rem_euclid(MILLIS_MODULUS);
        let sequence = sequence % SEQUENCE_MODULUS;

        Self(format!(
            "{PREFIX}{millis:0m$}{sequence:0s$}",
            m = MILLIS_DIGITS,
            s = SEQUENCE_DIGITS
        ))
    }

    /// The number as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| OrderNumberError(s.to_string()))?;

        if digits.len() != MILLIS_DIGITS + SEQUENCE_DIGITS
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(OrderNumberError(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderNumber> for String {
    fn from(value: OrderNumber) -> Self {
        value.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
