//! Coupon Fixtures

use jiff::Timestamp;
use serde::Deserialize;

use crate::{
    coupons::{Coupon, CouponCode, CouponScope, DiscountKind},
    fixtures::{FixtureError, parse_percent},
    ids::RestaurantId,
    prices::Price,
    products::Category,
};

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Coupons in file order
    #[serde(default)]
    pub coupons: Vec<CouponFixture>,
}

/// Discount Fixture
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountFixture {
    /// Percent off the subtotal (e.g., "10%" or "10")
    Percentage {
        /// Percent off
        percent: String,
    },

    /// Fixed amount off (e.g., "5.00 USD")
    Fixed {
        /// Amount off
        amount: String,
    },
}

/// Scope Fixture
#[derive(Debug, Default, Deserialize)]
#[serde(tag = "applies_to", rename_all = "snake_case")]
pub enum ScopeFixture {
    /// Any cart
    #[default]
    All,

    /// Listed restaurant fixture keys
    Restaurants {
        /// Restaurant keys
        restaurants: Vec<String>,
    },

    /// Listed categories
    Categories {
        /// Categories
        categories: Vec<Category>,
    },
}

/// Coupon Fixture
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Code, normalised on load
    pub code: String,

    /// Offer text
    #[serde(default)]
    pub description: String,

    /// Discount computation
    pub discount: DiscountFixture,

    /// Discount cap (e.g., "15.00 USD")
    #[serde(default)]
    pub max_discount: Option<String>,

    /// Minimum subtotal (e.g., "20.00 USD")
    #[serde(default)]
    pub min_order_value: Option<String>,

    /// Eligible carts
    #[serde(default)]
    pub scope: ScopeFixture,

    /// Total redemptions allowed
    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// Redemptions per customer; explicit `null` means unlimited
    #[serde(default = "default_per_user_limit")]
    pub per_user_limit: Option<u32>,

    /// Valid from
    #[serde(default)]
    pub starts_at: Option<Timestamp>,

    /// Valid until
    #[serde(default)]
    pub expires_at: Option<Timestamp>,

    /// Whether the coupon can be used
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

impl CouponFixture {
    pub(crate) fn into_coupon(
        self,
        restaurant: &mut impl FnMut(&str) -> Result<RestaurantId, FixtureError>,
        price: &mut impl FnMut(&str) -> Result<Price, FixtureError>,
    ) -> Result<Coupon, FixtureError> {
        let discount = match self.discount {
            DiscountFixture::Percentage { percent } => DiscountKind::Percentage {
                percent: parse_percent(&percent)?,
            },
            DiscountFixture::Fixed { amount } => DiscountKind::Fixed {
                amount: price(&amount)?,
            },
        };

        let scope = match self.scope {
            ScopeFixture::All => CouponScope::All,
            ScopeFixture::Restaurants { restaurants } => CouponScope::Restaurants {
                restaurants: restaurants
                    .iter()
                    .map(|key| restaurant(key))
                    .collect::<Result<_, _>>()?,
            },
            ScopeFixture::Categories { categories } => CouponScope::Categories { categories },
        };

        let mut coupon = Coupon::new(CouponCode::new(&self.code), discount);

        coupon.description = self.description;
        coupon.max_discount = self.max_discount.as_deref().map(&mut *price).transpose()?;
        coupon.min_order_value = self
            .min_order_value
            .as_deref()
            .map(&mut *price)
            .transpose()?
            .unwrap_or_default();
        coupon.scope = scope;
        coupon.usage_limit = self.usage_limit;
        coupon.per_user_limit = self.per_user_limit;
        coupon.starts_at = self.starts_at;
        coupon.expires_at = self.expires_at;
        coupon.is_active = self.is_active;

        Ok(coupon)
    }
}
