//! Coupons Repository

use platter::{
    coupons::{Coupon, CouponCode},
    ids::{CustomerId, OrderId},
};
use sqlx::{Postgres, Transaction, query_as, query_scalar, types::Json};
use uuid::Uuid;

use crate::stores::{
    Redemption, StoreError,
    postgres::records::{CouponRow, to_i32},
};

const FIND_COUPON_SQL: &str = include_str!("../sql/find_coupon.sql");
const INSERT_COUPON_SQL: &str = include_str!("../sql/insert_coupon.sql");
const LIST_COUPONS_SQL: &str = include_str!("../sql/list_coupons.sql");
const COUNT_REDEMPTIONS_SQL: &str = include_str!("../sql/count_redemptions.sql");
const INSERT_REDEMPTION_SQL: &str = include_str!("../sql/insert_redemption.sql");
const INCREMENT_COUPON_USAGE_SQL: &str = include_str!("../sql/increment_coupon_usage.sql");
const LOCK_COUPON_SQL: &str = include_str!("../sql/lock_coupon.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &CouponCode,
    ) -> Result<Option<Coupon>, StoreError> {
        let row = query_as::<Postgres, CouponRow>(FIND_COUPON_SQL)
            .bind(code.as_str())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(row.map(|CouponRow(coupon)| coupon))
    }

    pub(crate) async fn insert_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: &Coupon,
    ) -> Result<Coupon, StoreError> {
        let usage_limit = coupon
            .usage_limit
            .map(|limit| to_i32(limit, "usage limit"))
            .transpose()?;

        let CouponRow(coupon) = query_as::<Postgres, CouponRow>(INSERT_COUPON_SQL)
            .bind(coupon.code.as_str())
            .bind(Json(coupon))
            .bind(usage_limit)
            .bind(to_i32(coupon.usage_count, "usage count")?)
            .fetch_one(&mut **tx)
            .await?;

        Ok(coupon)
    }

    pub(crate) async fn list_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<Coupon>, StoreError> {
        let rows = query_as::<Postgres, CouponRow>(LIST_COUPONS_SQL)
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|CouponRow(coupon)| coupon).collect())
    }

    pub(crate) async fn redemptions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &CouponCode,
        customer: CustomerId,
    ) -> Result<u32, StoreError> {
        let count: i64 = query_scalar(COUNT_REDEMPTIONS_SQL)
            .bind(code.as_str())
            .bind(customer.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        u32::try_from(count)
            .map_err(|_overflow| StoreError::OutOfRange(format!("{count} redemptions")))
    }

    /// Lock the coupon, record the redemption row, then bump the usage
    /// count under both the global and the per-customer limit. The row
    /// inserted here counts towards the customer's total. The caller rolls
    /// back on anything but [`Redemption::Counted`].
    pub(crate) async fn redeem(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &CouponCode,
        customer: CustomerId,
        order: OrderId,
    ) -> Result<Redemption, StoreError> {
        let locked: Option<String> = query_scalar(LOCK_COUPON_SQL)
            .bind(code.as_str())
            .fetch_optional(&mut **tx)
            .await?;

        if locked.is_none() {
            return Err(StoreError::NotFound);
        }

        let inserted: Option<Uuid> = query_scalar(INSERT_REDEMPTION_SQL)
            .bind(code.as_str())
            .bind(customer.into_uuid())
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        if inserted.is_none() {
            return Ok(Redemption::AlreadyCounted);
        }

        let usage_count: Option<i32> = query_scalar(INCREMENT_COUPON_USAGE_SQL)
            .bind(code.as_str())
            .bind(customer.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(match usage_count {
            Some(_) => Redemption::Counted,
            None => Redemption::LimitReached,
        })
    }
}
