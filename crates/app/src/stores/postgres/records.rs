//! Stored rows

use jiff_sqlx::Timestamp as SqlxTimestamp;
use platter::{cart::Cart, coupons::Coupon, orders::Order};
use sqlx::{FromRow, Row, postgres::PgRow, types::Json};

use crate::stores::StoreError;

/// A cart document with the version and save time of its row.
#[derive(Debug)]
pub(super) struct CartRow(pub(super) Cart);

/// An order document with the version and save time of its row.
#[derive(Debug)]
pub(super) struct OrderRow(pub(super) Order);

/// A coupon document with the live usage count of its row.
#[derive(Debug)]
pub(super) struct CouponRow(pub(super) Coupon);

impl<'r> FromRow<'r, PgRow> for CartRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(cart) = row.try_get::<Json<Cart>, _>("document")?;

        Ok(Self(cart.committed(
            try_get_u64(row, "version")?,
            row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        )))
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(order) = row.try_get::<Json<Order>, _>("document")?;

        Ok(Self(order.committed(
            try_get_u64(row, "version")?,
            row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        )))
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(mut coupon) = row.try_get::<Json<Coupon>, _>("document")?;
        let usage_count: i32 = row.try_get("usage_count")?;

        coupon.usage_count = u32::try_from(usage_count).map_err(|e| sqlx::Error::ColumnDecode {
            index: "usage_count".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self(coupon))
    }
}

pub(super) fn try_get_u64(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let value: i64 = row.try_get(col)?;

    u64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

pub(super) fn to_i64(value: u64, what: &str) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_overflow| StoreError::OutOfRange(format!("{what} {value}")))
}

pub(super) fn to_i32(value: u32, what: &str) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_overflow| StoreError::OutOfRange(format!("{what} {value}")))
}
