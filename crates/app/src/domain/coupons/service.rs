//! Coupons service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use platter::coupons::{Coupon, DiscountKind};
use rust_decimal::Decimal;
use tracing::info;

use crate::{domain::coupons::errors::CouponsServiceError, stores::CouponStore};

#[derive(Clone)]
pub struct DefaultCouponsService {
    coupons: Arc<dyn CouponStore>,
}

impl DefaultCouponsService {
    #[must_use]
    pub fn new(coupons: Arc<dyn CouponStore>) -> Self {
        Self { coupons }
    }
}

fn validate(coupon: &Coupon) -> Result<(), CouponsServiceError> {
    if coupon.code.is_empty() {
        return Err(CouponsServiceError::Invalid("code must not be blank".to_string()));
    }

    if let DiscountKind::Percentage { percent } = coupon.discount
        && !(Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&percent)
    {
        return Err(CouponsServiceError::Invalid(format!(
            "percentage must be between 0 and 100, got {percent}"
        )));
    }

    if let (Some(starts_at), Some(expires_at)) = (coupon.starts_at, coupon.expires_at)
        && expires_at < starts_at
    {
        return Err(CouponsServiceError::Invalid(
            "coupon expires before it starts".to_string(),
        ));
    }

    Ok(())
}

#[async_trait]
impl CouponsService for DefaultCouponsService {
    async fn list_active(&self, now: Timestamp) -> Result<Vec<Coupon>, CouponsServiceError> {
        let mut coupons = self.coupons.list_coupons().await?;

        coupons.retain(|coupon| coupon.is_live(now));

        Ok(coupons)
    }

    async fn create_coupon(&self, coupon: Coupon) -> Result<Coupon, CouponsServiceError> {
        validate(&coupon)?;

        let mut coupon = coupon;

        coupon.usage_count = 0;

        let created = self.coupons.insert_coupon(coupon).await?;

        info!(code = %created.code, "created coupon");

        Ok(created)
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Coupons that can be offered at `now`, ordered by code.
    async fn list_active(&self, now: Timestamp) -> Result<Vec<Coupon>, CouponsServiceError>;

    /// Create a coupon with no redemptions.
    async fn create_coupon(&self, coupon: Coupon) -> Result<Coupon, CouponsServiceError>;
}
