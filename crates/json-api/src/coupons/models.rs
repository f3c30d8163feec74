//! Coupon Responses

use std::string::ToString;

use platter::{
    coupons::{Coupon, CouponScope, DiscountKind},
    ids::RestaurantId,
};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coupon Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CouponResponse {
    pub code: String,
    pub description: String,

    /// `percentage` or `fixed`
    pub discount_type: String,

    /// Percent off, for percentage coupons
    pub percent: Option<String>,

    /// Amount off in minor units, for fixed coupons
    pub amount: Option<u64>,
    pub max_discount: Option<u64>,
    pub min_order_value: u64,

    /// `all`, `restaurants` or `categories`
    pub applies_to: String,
    pub restaurants: Vec<Uuid>,
    pub categories: Vec<String>,
    pub usage_limit: Option<u32>,
    pub usage_count: u32,
    pub per_user_limit: Option<u32>,
    pub starts_at: Option<String>,
    pub expires_at: Option<String>,
    pub is_active: bool,
}

impl From<&Coupon> for CouponResponse {
    fn from(coupon: &Coupon) -> Self {
        let (discount_type, percent, amount) = match coupon.discount {
            DiscountKind::Percentage { percent } => ("percentage", Some(percent.to_string()), None),
            DiscountKind::Fixed { amount } => ("fixed", None, Some(*amount)),
        };

        let (applies_to, restaurants, categories) = match &coupon.scope {
            CouponScope::All => ("all", Vec::new(), Vec::new()),
            CouponScope::Restaurants { restaurants } => (
                "restaurants",
                restaurants.iter().copied().map(RestaurantId::into_uuid).collect(),
                Vec::new(),
            ),
            CouponScope::Categories { categories } => (
                "categories",
                Vec::new(),
                categories
                    .iter()
                    .map(|category| category.as_str().to_string())
                    .collect(),
            ),
        };

        Self {
            code: coupon.code.to_string(),
            description: coupon.description.clone(),
            discount_type: discount_type.to_string(),
            percent,
            amount,
            max_discount: coupon.max_discount.map(|max| *max),
            min_order_value: *coupon.min_order_value,
            applies_to: applies_to.to_string(),
            restaurants,
            categories,
            usage_limit: coupon.usage_limit,
            usage_count: coupon.usage_count,
            per_user_limit: coupon.per_user_limit,
            starts_at: coupon.starts_at.as_ref().map(ToString::to_string),
            expires_at: coupon.expires_at.as_ref().map(ToString::to_string),
            is_active: coupon.is_active,
        }
    }
}

impl From<Coupon> for CouponResponse {
    fn from(coupon: Coupon) -> Self {
        Self::from(&coupon)
    }
}
