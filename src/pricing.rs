//! Pricing
//!
//! The single calculator every cart and order mutation goes through.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    discounts::{DiscountError, percent_of},
    items::LineItem,
    prices::Price,
    products::Restaurant,
};

/// Default tax rate, in percent.
pub const DEFAULT_TAX_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Default delivery fee in minor units, used when a restaurant has none configured.
pub const DEFAULT_DELIVERY_FEE: Price = Price::new(5000);

/// Errors that can occur while computing totals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// An amount did not fit in the minor-unit range.
    #[error("amount overflowed while computing totals")]
    Overflow,

    /// Percentage maths failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Pricing constants applied to every cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Tax rate, in percent
    pub tax_percent: Decimal,

    /// Delivery fee for restaurants without one configured
    pub default_delivery_fee: Price,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_percent: DEFAULT_TAX_PERCENT,
            default_delivery_fee: DEFAULT_DELIVERY_FEE,
        }
    }
}

impl PricingPolicy {
    /// Delivery fee charged for orders from `restaurant`.
    pub fn delivery_fee_for(&self, restaurant: &Restaurant) -> Price {
        restaurant.delivery_fee.unwrap_or(self.default_delivery_fee)
    }
}

/// Derived monetary summary of a cart or order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line totals
    pub subtotal: Price,

    /// Tax on the subtotal
    pub tax: Price,

    /// Delivery fee, zero for an empty cart
    pub delivery_fee: Price,

    /// Applied discount, never more than the gross amount
    pub discount: Price,

    /// Amount payable
    pub total: Price,
}

impl Totals {
    /// `subtotal + tax + delivery_fee`, before any discount.
    pub fn gross(&self) -> Option<Price> {
        self.subtotal
            .checked_add(self.tax)?
            .checked_add(self.delivery_fee)
    }
}

/// Sum of every line total.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if any line or the sum overflows.
pub fn subtotal(items: &[LineItem]) -> Result<Price, PricingError> {
    items.iter().try_fold(Price::ZERO, |acc, item| {
        item.line_total()
            .and_then(|line| acc.checked_add(line))
            .ok_or(PricingError::Overflow)
    })
}

/// Compute cart totals.
///
/// The discount is clamped to the gross amount so the total never goes
/// negative. An empty item list yields all-zero totals.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: an intermediate amount overflowed.
/// - [`PricingError::Discount`]: the tax percentage could not be applied.
pub fn compute_totals(
    items: &[LineItem],
    delivery_fee_base: Price,
    tax_percent: Decimal,
    discount: Price,
) -> Result<Totals, PricingError> {
    if items.is_empty() {
        return Ok(Totals::default());
    }

    let subtotal = subtotal(items)?;
    let tax = percent_of(tax_percent, subtotal)?;

    let mut totals = Totals {
        subtotal,
        tax,
        delivery_fee: delivery_fee_base,
        discount: Price::ZERO,
        total: Price::ZERO,
    };

    let gross = totals.gross().ok_or(PricingError::Overflow)?;

    totals.discount = discount.min(gross);
    totals.total = gross.saturating_sub(totals.discount);

    Ok(totals)
}
