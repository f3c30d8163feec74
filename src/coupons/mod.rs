//! Coupons
//!
//! Coupon definitions and the validator that decides whether a coupon
//! applies to a cart and how much it takes off.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ids::RestaurantId, prices::Price, products::Category};

pub(crate) mod validation;

pub use validation::{CouponContext, CouponOutcome, Rejection, validate_and_price};

/// A normalised coupon code: trimmed and upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    /// Normalise a raw code as typed by a customer.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    /// The normalised code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code is blank after trimming.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for CouponCode {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for CouponCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<CouponCode> for String {
    fn from(value: CouponCode) -> Self {
        value.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a coupon computes its discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountKind {
    /// A percentage of the subtotal, in percent.
    Percentage {
        /// Percent off, `10` means ten percent
        percent: Decimal,
    },

    /// A fixed amount off.
    Fixed {
        /// Amount off in minor units
        amount: Price,
    },
}

/// Which carts a coupon may be applied to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "applies_to", rename_all = "snake_case")]
pub enum CouponScope {
    /// Any cart.
    #[default]
    All,

    /// Carts from one of the listed restaurants.
    Restaurants {
        /// Eligible restaurants
        restaurants: Vec<RestaurantId>,
    },

    /// Carts containing at least one item from one of the listed categories.
    Categories {
        /// Eligible categories
        categories: Vec<Category>,
    },
}

impl CouponScope {
    /// Whether a cart from `restaurant` holding `categories` is in scope.
    pub fn covers(&self, restaurant: Option<RestaurantId>, categories: &[Category]) -> bool {
        match self {
            CouponScope::All => true,
            CouponScope::Restaurants { restaurants } => {
                restaurant.is_some_and(|restaurant| restaurants.contains(&restaurant))
            }
            CouponScope::Categories {
                categories: eligible,
            } => categories.iter().any(|category| eligible.contains(category)),
        }
    }
}

/// A discount code with eligibility rules and a usage cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Unique, normalised code
    pub code: CouponCode,

    /// Shown on the offers page
    #[serde(default)]
    pub description: String,

    /// Discount computation
    pub discount: DiscountKind,

    /// Upper bound on the discount
    #[serde(default)]
    pub max_discount: Option<Price>,

    /// Minimum subtotal required
    #[serde(default)]
    pub min_order_value: Price,

    /// Eligible carts
    #[serde(default)]
    pub scope: CouponScope,

    /// Total redemptions allowed, unlimited when `None`
    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// Redemptions so far
    #[serde(default)]
    pub usage_count: u32,

    /// Redemptions allowed per customer, unlimited when `None`
    #[serde(default = "default_per_user_limit")]
    pub per_user_limit: Option<u32>,

    /// Not valid before this instant
    #[serde(default)]
    pub starts_at: Option<Timestamp>,

    /// Not valid after this instant
    #[serde(default)]
    pub expires_at: Option<Timestamp>,

    /// Inactive coupons behave as if they did not exist
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

#[expect(
    clippy::unnecessary_wraps,
    reason = "serde default functions must return the field type"
)]
fn default_per_user_limit() -> Option<u32> {
    Some(1)
}

fn default_is_active() -> bool {
    true
}

impl Coupon {
    /// An active, unrestricted coupon with the given code and discount.
    pub fn new(code: impl Into<CouponCode>, discount: DiscountKind) -> Self {
        Self {
            code: code.into(),
            description: String::new(),
            discount,
            max_discount: None,
            min_order_value: Price::ZERO,
            scope: CouponScope::All,
            usage_limit: None,
            usage_count: 0,
            per_user_limit: default_per_user_limit(),
            starts_at: None,
            expires_at: None,
            is_active: true,
        }
    }

    /// Whether the coupon has been redeemed as often as its limit allows.
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .is_some_and(|limit| self.usage_count >= limit)
    }

    /// Whether the coupon can currently be offered: active, inside its
    /// validity window and not exhausted.
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.is_active
            && !self.is_exhausted()
            && self.starts_at.is_none_or(|starts_at| now >= starts_at)
            && self.expires_at.is_none_or(|expires_at| now <= expires_at)
    }
}
