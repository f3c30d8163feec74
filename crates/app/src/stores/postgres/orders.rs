//! Orders Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use platter::{
    ids::{CustomerId, OrderId},
    orders::{Order, OrderNumber},
};
use sqlx::{Postgres, Transaction, query, query_as, query_scalar, types::Json};

use crate::stores::{
    StoreError,
    postgres::records::{OrderRow, to_i64},
};

const INSERT_ORDER_SQL: &str = include_str!("../sql/insert_order.sql");
const LOAD_ORDER_SQL: &str = include_str!("../sql/load_order.sql");
const FIND_ORDER_BY_NUMBER_SQL: &str = include_str!("../sql/find_order_by_number.sql");
const LIST_ORDERS_SQL: &str = include_str!("../sql/list_orders.sql");
const UPDATE_ORDER_SQL: &str = include_str!("../sql/update_order.sql");
const ORDER_EXISTS_SQL: &str = include_str!("../sql/order_exists.sql");
const COUNT_STATUS_HISTORY_SQL: &str = include_str!("../sql/count_status_history.sql");
const INSERT_STATUS_HISTORY_SQL: &str = include_str!("../sql/insert_status_history.sql");
const NEXT_ORDER_SEQUENCE_SQL: &str = include_str!("../sql/next_order_sequence.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
    ) -> Result<(), StoreError> {
        query(INSERT_ORDER_SQL)
            .bind(order.id().into_uuid())
            .bind(order.number().as_str())
            .bind(order.customer().into_uuid())
            .bind(order.restaurant().into_uuid())
            .bind(order.status().as_str())
            .bind(order.payment_status().as_str())
            .bind(to_i64(*order.totals().total, "order total")?)
            .bind(Json(order))
            .bind(SqlxTimestamp::from(order.created_at()))
            .execute(&mut **tx)
            .await?;

        self.append_history(tx, order).await
    }

    pub(crate) async fn load_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: OrderId,
    ) -> Result<Order, StoreError> {
        let OrderRow(order) = query_as::<Postgres, OrderRow>(LOAD_ORDER_SQL)
            .bind(id.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        Ok(order)
    }

    pub(crate) async fn find_by_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        number: &OrderNumber,
    ) -> Result<Order, StoreError> {
        let OrderRow(order) = query_as::<Postgres, OrderRow>(FIND_ORDER_BY_NUMBER_SQL)
            .bind(number.as_str())
            .fetch_one(&mut **tx)
            .await?;

        Ok(order)
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerId,
    ) -> Result<Vec<Order>, StoreError> {
        let rows = query_as::<Postgres, OrderRow>(LIST_ORDERS_SQL)
            .bind(customer.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|OrderRow(order)| order).collect())
    }

    /// Compare-and-swap the order row, returning the stored version.
    pub(crate) async fn save_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
        expected_version: u64,
        now: Timestamp,
    ) -> Result<u64, StoreError> {
        let version: Option<i64> = query_scalar(UPDATE_ORDER_SQL)
            .bind(order.id().into_uuid())
            .bind(to_i64(expected_version, "order version")?)
            .bind(order.status().as_str())
            .bind(order.payment_status().as_str())
            .bind(Json(order))
            .bind(SqlxTimestamp::from(now))
            .fetch_optional(&mut **tx)
            .await?;

        let Some(version) = version else {
            let present: bool = query_scalar(ORDER_EXISTS_SQL)
                .bind(order.id().into_uuid())
                .fetch_one(&mut **tx)
                .await?;

            return Err(if present {
                StoreError::Conflict
            } else {
                StoreError::NotFound
            });
        };

        self.append_history(tx, order).await?;

        u64::try_from(version)
            .map_err(|_negative| StoreError::OutOfRange(format!("order version {version}")))
    }

    pub(crate) async fn next_order_sequence(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<u64, StoreError> {
        let value: i64 = query_scalar(NEXT_ORDER_SEQUENCE_SQL)
            .fetch_one(&mut **tx)
            .await?;

        u64::try_from(value)
            .map_err(|_negative| StoreError::OutOfRange(format!("order sequence {value}")))
    }

    /// Insert the history entries past those already stored. A shorter
    /// history than the stored one is a conflict.
    async fn append_history(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
    ) -> Result<(), StoreError> {
        let stored: i64 = query_scalar(COUNT_STATUS_HISTORY_SQL)
            .bind(order.id().into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        let stored = usize::try_from(stored)
            .map_err(|_negative| StoreError::OutOfRange(format!("history length {stored}")))?;

        let Some(fresh) = order.history().get(stored..) else {
            return Err(StoreError::Conflict);
        };

        for (offset, entry) in fresh.iter().enumerate() {
            let position = i32::try_from(stored + offset)
                .map_err(|_overflow| StoreError::OutOfRange(format!("history position {offset}")))?;

            query(INSERT_STATUS_HISTORY_SQL)
                .bind(order.id().into_uuid())
                .bind(position)
                .bind(entry.status.as_str())
                .bind(entry.note.as_deref())
                .bind(SqlxTimestamp::from(entry.timestamp))
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }
}
