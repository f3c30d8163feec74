//! Coupon validation

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    coupons::{Coupon, DiscountKind},
    discounts::{DiscountError, percent_of},
    ids::RestaurantId,
    prices::Price,
    products::Category,
};

/// Why a coupon was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rejection {
    /// No such coupon, or it has been deactivated.
    InvalidCode,

    /// Past the expiry date.
    Expired,

    /// Before the start date.
    NotYetActive,

    /// Subtotal below the minimum order value.
    BelowMinimum,

    /// The coupon has been redeemed as often as allowed.
    UsageLimitReached,

    /// The cart's restaurant or items are outside the coupon's scope.
    NotApplicable,

    /// This customer has already used the coupon as often as allowed.
    PerUserLimitReached,
}

impl Rejection {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            Rejection::InvalidCode => "INVALID_CODE",
            Rejection::Expired => "EXPIRED",
            Rejection::NotYetActive => "NOT_YET_ACTIVE",
            Rejection::BelowMinimum => "BELOW_MINIMUM",
            Rejection::UsageLimitReached => "USAGE_LIMIT_REACHED",
            Rejection::NotApplicable => "NOT_APPLICABLE",
            Rejection::PerUserLimitReached => "PER_USER_LIMIT_REACHED",
        }
    }

    /// Human-readable explanation shown to customers.
    pub fn message(self) -> &'static str {
        match self {
            Rejection::InvalidCode => "Invalid coupon",
            Rejection::Expired => "Coupon expired",
            Rejection::NotYetActive => "Coupon is not active yet",
            Rejection::BelowMinimum => "Order total is below the coupon minimum",
            Rejection::UsageLimitReached => "Coupon usage limit reached",
            Rejection::NotApplicable => "Coupon does not apply to this cart",
            Rejection::PerUserLimitReached => "You have already used this coupon",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// What the validator needs to know about the cart and customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponContext {
    /// Cart subtotal
    pub subtotal: Price,

    /// `subtotal + tax + delivery fee`, the ceiling for any discount
    pub gross: Price,

    /// Restaurant the cart belongs to
    pub restaurant: Option<RestaurantId>,

    /// Distinct categories present in the cart
    pub categories: SmallVec<[Category; 4]>,

    /// Times this customer has already redeemed the coupon
    pub prior_redemptions: u32,
}

/// Result of validating a coupon against a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponOutcome {
    /// The coupon applies and takes `discount` off.
    Accepted {
        /// Discount after caps and clamping
        discount: Price,
    },

    /// The coupon does not apply.
    Rejected(Rejection),
}

/// Validate `coupon` against `context` at `now` and compute its discount.
///
/// Checks run in a fixed order and the first failure wins: active, expiry,
/// start date, minimum order value, global usage, scope, per-customer usage.
///
/// # Errors
///
/// Returns a [`DiscountError`] if a percentage discount cannot be computed.
pub fn validate_and_price(
    coupon: Option<&Coupon>,
    context: &CouponContext,
    now: Timestamp,
) -> Result<CouponOutcome, DiscountError> {
    let Some(coupon) = coupon.filter(|coupon| coupon.is_active) else {
        return Ok(CouponOutcome::Rejected(Rejection::InvalidCode));
    };

    if let Some(rejection) = first_rejection(coupon, context, now) {
        return Ok(CouponOutcome::Rejected(rejection));
    }

    Ok(CouponOutcome::Accepted {
        discount: discount_for(coupon, context.subtotal, context.gross)?,
    })
}

fn first_rejection(coupon: &Coupon, context: &CouponContext, now: Timestamp) -> Option<Rejection> {
    if coupon.expires_at.is_some_and(|expires_at| now > expires_at) {
        return Some(Rejection::Expired);
    }

    if coupon.starts_at.is_some_and(|starts_at| now < starts_at) {
        return Some(Rejection::NotYetActive);
    }

    if context.subtotal < coupon.min_order_value {
        return Some(Rejection::BelowMinimum);
    }

    if coupon.is_exhausted() {
        return Some(Rejection::UsageLimitReached);
    }

    if !coupon.scope.covers(context.restaurant, &context.categories) {
        return Some(Rejection::NotApplicable);
    }

    if coupon
        .per_user_limit
        .is_some_and(|limit| context.prior_redemptions >= limit)
    {
        return Some(Rejection::PerUserLimitReached);
    }

    None
}

/// Discount `coupon` gives on `subtotal`, capped by `max_discount` and
/// clamped to `gross`.
///
/// # Errors
///
/// Returns a [`DiscountError`] if a percentage discount cannot be computed.
pub(crate) fn discount_for(
    coupon: &Coupon,
    subtotal: Price,
    gross: Price,
) -> Result<Price, DiscountError> {
    let raw = match coupon.discount {
        DiscountKind::Percentage { percent } => percent_of(percent, subtotal)?,
        DiscountKind::Fixed { amount } => amount,
    };

    let capped = coupon
        .max_discount
        .map_or(raw, |max_discount| raw.min(max_discount));

    Ok(capped.min(gross))
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use rust_decimal::Decimal;
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::coupons::CouponScope;

    use super::*;

    fn context(subtotal: u64) -> CouponContext {
        CouponContext {
            subtotal: Price::new(subtotal),
            gross: Price::new(subtotal + subtotal / 20 + 50),
            restaurant: Some(RestaurantId::new()),
            categories: smallvec![Category::Mains],
            prior_redemptions: 0,
        }
    }

    fn percent(value: i64) -> DiscountKind {
        DiscountKind::Percentage {
            percent: Decimal::from(value),
        }
    }

    #[test]
    fn missing_coupon_is_invalid() -> TestResult {
        let outcome = validate_and_price(None, &context(200), Timestamp::now())?;

        assert_eq!(outcome, CouponOutcome::Rejected(Rejection::InvalidCode));

        Ok(())
    }

    #[test]
    fn inactive_coupon_is_invalid() -> TestResult {
        let mut coupon = Coupon::new("SAVE10", percent(10));
        coupon.is_active = false;

        let outcome = validate_and_price(Some(&coupon), &context(200), Timestamp::now())?;

        assert_eq!(outcome, CouponOutcome::Rejected(Rejection::InvalidCode));

        Ok(())
    }

    #[test]
    fn percentage_discount_is_capped() -> TestResult {
        let mut coupon = Coupon::new("SAVE10", percent(10));
        coupon.max_discount = Some(Price::new(15));

        let outcome = validate_and_price(Some(&coupon), &context(200), Timestamp::now())?;

        assert_eq!(
            outcome,
            CouponOutcome::Accepted {
                discount: Price::new(15),
            },
        );

        Ok(())
    }

    #[test]
    fn fixed_discount_is_clamped_to_gross() -> TestResult {
        let coupon = Coupon::new(
            "FLAT",
            DiscountKind::Fixed {
                amount: Price::new(10_000),
            },
        );
        let ctx = context(200);

        let outcome = validate_and_price(Some(&coupon), &ctx, Timestamp::now())?;

        assert_eq!(outcome, CouponOutcome::Accepted { discount: ctx.gross });

        Ok(())
    }

    #[test]
    fn expiry_is_checked_before_minimum() -> TestResult {
        let now = Timestamp::now();
        let mut coupon = Coupon::new("OLD", percent(10));
        coupon.expires_at = Some(now - SignedDuration::from_hours(1));
        coupon.min_order_value = Price::new(1_000);

        let outcome = validate_and_price(Some(&coupon), &context(200), now)?;

        assert_eq!(outcome, CouponOutcome::Rejected(Rejection::Expired));

        Ok(())
    }

    #[test]
    fn expiring_exactly_now_is_still_valid() -> TestResult {
        let now = Timestamp::now();
        let mut coupon = Coupon::new("EDGE", percent(10));
        coupon.expires_at = Some(now);

        let outcome = validate_and_price(Some(&coupon), &context(200), now)?;

        assert!(matches!(outcome, CouponOutcome::Accepted { .. }), "got {outcome:?}");

        Ok(())
    }

    #[test]
    fn future_coupon_is_not_yet_active() -> TestResult {
        let now = Timestamp::now();
        let mut coupon = Coupon::new("SOON", percent(10));
        coupon.starts_at = Some(now + SignedDuration::from_hours(1));

        let outcome = validate_and_price(Some(&coupon), &context(200), now)?;

        assert_eq!(outcome, CouponOutcome::Rejected(Rejection::NotYetActive));

        Ok(())
    }

    #[test]
    fn below_minimum_is_rejected() -> TestResult {
        let mut coupon = Coupon::new("BIG", percent(10));
        coupon.min_order_value = Price::new(500);

        let outcome = validate_and_price(Some(&coupon), &context(200), Timestamp::now())?;

        assert_eq!(outcome, CouponOutcome::Rejected(Rejection::BelowMinimum));

        Ok(())
    }

    #[test]
    fn usage_limit_is_checked_before_scope() -> TestResult {
        let mut coupon = Coupon::new("GONE", percent(10));
        coupon.usage_limit = Some(5);
        coupon.usage_count = 5;
        coupon.scope = CouponScope::Categories {
            categories: vec![Category::Groceries],
        };

        let outcome = validate_and_price(Some(&coupon), &context(200), Timestamp::now())?;

        assert_eq!(outcome, CouponOutcome::Rejected(Rejection::UsageLimitReached));

        Ok(())
    }

    #[test]
    fn out_of_scope_is_not_applicable() -> TestResult {
        let mut coupon = Coupon::new("GROCERY", percent(10));
        coupon.scope = CouponScope::Categories {
            categories: vec![Category::Groceries],
        };

        let outcome = validate_and_price(Some(&coupon), &context(200), Timestamp::now())?;

        assert_eq!(outcome, CouponOutcome::Rejected(Rejection::NotApplicable));

        Ok(())
    }

    #[test]
    fn per_user_limit_counts_prior_redemptions() -> TestResult {
        let coupon = Coupon::new("ONCE", percent(10));
        let mut ctx = context(200);
        ctx.prior_redemptions = 1;

        let outcome = validate_and_price(Some(&coupon), &ctx, Timestamp::now())?;

        assert_eq!(outcome, CouponOutcome::Rejected(Rejection::PerUserLimitReached));

        Ok(())
    }

    #[test]
    fn rejection_codes_serialise_screaming_snake_case() {
        assert_eq!(Rejection::UsageLimitReached.code(), "USAGE_LIMIT_REACHED");
        assert_eq!(
            Rejection::Expired.to_string(),
            "EXPIRED: Coupon expired"
        );
    }
}
