//! Prices

use std::{fmt, ops::Deref};

use serde::{Deserialize, Serialize};

/// Represents an amount in the currency's minor unit (pence/cents/paise).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price {
    value: u64,
}

impl Price {
    /// Zero minor units.
    pub const ZERO: Price = Price { value: 0 };

    /// Creates a new Price
    pub const fn new(value: u64) -> Self {
        Price { value }
    }

    /// Add two prices, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Price) -> Option<Price> {
        self.value.checked_add(other.value).map(Price::new)
    }

    /// Multiply by a quantity, returning `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, quantity: u32) -> Option<Price> {
        self.value.checked_mul(u64::from(quantity)).map(Price::new)
    }

    /// Subtract, flooring at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Price) -> Price {
        Price::new(self.value.saturating_sub(other.value))
    }

    /// Whether this price is zero.
    pub fn is_zero(self) -> bool {
        self.value == 0
    }
}

impl Deref for Price {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl From<u64> for Price {
    fn from(value: u64) -> Self {
        Price::new(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
