//! Carts Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use platter::{cart::Cart, ids::CustomerId};
use sqlx::{Postgres, Transaction, query_as, query_scalar, types::Json};

use crate::stores::{
    StoreError,
    postgres::records::{CartRow, to_i64},
};

const LOAD_CART_SQL: &str = include_str!("../sql/load_cart.sql");
const INSERT_CART_SQL: &str = include_str!("../sql/insert_cart.sql");
const UPDATE_CART_SQL: &str = include_str!("../sql/update_cart.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn load_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: CustomerId,
    ) -> Result<Option<Cart>, StoreError> {
        let row = query_as::<Postgres, CartRow>(LOAD_CART_SQL)
            .bind(owner.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(row.map(|CartRow(cart)| cart))
    }

    /// Insert or compare-and-swap the cart row, returning the stored version.
    pub(crate) async fn save_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: &Cart,
        expected_version: u64,
        now: Timestamp,
    ) -> Result<u64, StoreError> {
        let version: Option<i64> = if expected_version == 0 {
            query_scalar(INSERT_CART_SQL)
                .bind(cart.owner().into_uuid())
                .bind(Json(cart))
                .bind(SqlxTimestamp::from(now))
                .fetch_optional(&mut **tx)
                .await?
        } else {
            query_scalar(UPDATE_CART_SQL)
                .bind(cart.owner().into_uuid())
                .bind(Json(cart))
                .bind(to_i64(expected_version, "cart version")?)
                .bind(SqlxTimestamp::from(now))
                .fetch_optional(&mut **tx)
                .await?
        };

        let version = version.ok_or(StoreError::Conflict)?;

        u64::try_from(version)
            .map_err(|_negative| StoreError::OutOfRange(format!("cart version {version}")))
    }
}
