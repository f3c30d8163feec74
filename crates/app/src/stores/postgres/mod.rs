//! Postgres-backed stores
//!
//! Carts, orders and coupons are stored as JSONB documents next to the
//! columns needed to index and constrain them. Status history is also
//! appended to an insert-only table.

use async_trait::async_trait;
use jiff::Timestamp;
use platter::{
    cart::Cart,
    coupons::{Coupon, CouponCode},
    ids::{CustomerId, OrderId},
    orders::{Order, OrderNumber},
};

use crate::{
    database::Db,
    stores::{CartStore, CouponStore, OrderStore, Redemption, StoreError},
};

mod carts;
mod coupons;
mod orders;
mod records;

use carts::PgCartsRepository;
use coupons::PgCouponsRepository;
use orders::PgOrdersRepository;

#[derive(Debug, Clone)]
pub struct PgStore {
    db: Db,
    carts: PgCartsRepository,
    orders: PgOrdersRepository,
    coupons: PgCouponsRepository,
}

impl PgStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts: PgCartsRepository::new(),
            orders: PgOrdersRepository::new(),
            coupons: PgCouponsRepository::new(),
        }
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn load_cart(&self, owner: CustomerId) -> Result<Option<Cart>, StoreError> {
        let mut tx = self.db.begin().await?;

        let cart = self.carts.load_cart(&mut tx, owner).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn save_cart(&self, cart: Cart, expected_version: u64) -> Result<Cart, StoreError> {
        let mut tx = self.db.begin().await?;
        let now = Timestamp::now();

        let version = self
            .carts
            .save_cart(&mut tx, &cart, expected_version, now)
            .await?;

        tx.commit().await?;

        Ok(cart.committed(version, now))
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_order(&self, order: Order) -> Result<Order, StoreError> {
        let mut tx = self.db.begin().await?;

        self.orders.insert_order(&mut tx, &order).await?;

        tx.commit().await?;

        let created_at = order.created_at();

        Ok(order.committed(1, created_at))
    }

    async fn load_order(&self, id: OrderId) -> Result<Order, StoreError> {
        let mut tx = self.db.begin().await?;

        let order = self.orders.load_order(&mut tx, id).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn find_by_number(&self, number: &OrderNumber) -> Result<Order, StoreError> {
        let mut tx = self.db.begin().await?;

        let order = self.orders.find_by_number(&mut tx, number).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn list_orders(&self, customer: CustomerId) -> Result<Vec<Order>, StoreError> {
        let mut tx = self.db.begin().await?;

        let orders = self.orders.list_orders(&mut tx, customer).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn save_order(&self, order: Order, expected_version: u64) -> Result<Order, StoreError> {
        let mut tx = self.db.begin().await?;
        let now = Timestamp::now();

        let version = self
            .orders
            .save_order(&mut tx, &order, expected_version, now)
            .await?;

        tx.commit().await?;

        Ok(order.committed(version, now))
    }

    async fn next_order_sequence(&self) -> Result<u64, StoreError> {
        let mut tx = self.db.begin().await?;

        let sequence = self.orders.next_order_sequence(&mut tx).await?;

        tx.commit().await?;

        Ok(sequence)
    }
}

#[async_trait]
impl CouponStore for PgStore {
    async fn find_coupon(&self, code: &CouponCode) -> Result<Option<Coupon>, StoreError> {
        let mut tx = self.db.begin().await?;

        let coupon = self.coupons.find_coupon(&mut tx, code).await?;

        tx.commit().await?;

        Ok(coupon)
    }

    async fn insert_coupon(&self, coupon: Coupon) -> Result<Coupon, StoreError> {
        let mut tx = self.db.begin().await?;

        let coupon = self.coupons.insert_coupon(&mut tx, &coupon).await?;

        tx.commit().await?;

        Ok(coupon)
    }

    async fn list_coupons(&self) -> Result<Vec<Coupon>, StoreError> {
        let mut tx = self.db.begin().await?;

        let coupons = self.coupons.list_coupons(&mut tx).await?;

        tx.commit().await?;

        Ok(coupons)
    }

    async fn redemptions(
        &self,
        code: &CouponCode,
        customer: CustomerId,
    ) -> Result<u32, StoreError> {
        let mut tx = self.db.begin().await?;

        let count = self.coupons.redemptions(&mut tx, code, customer).await?;

        tx.commit().await?;

        Ok(count)
    }

    async fn redeem(
        &self,
        code: &CouponCode,
        customer: CustomerId,
        order: OrderId,
    ) -> Result<Redemption, StoreError> {
        let mut tx = self.db.begin().await?;

        let redemption = self.coupons.redeem(&mut tx, code, customer, order).await?;

        if redemption == Redemption::Counted {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }

        Ok(redemption)
    }
}

#[cfg(test)]
mod tests {
    use platter::{coupons::DiscountKind, prices::Price};
    use testresult::TestResult;

    use super::*;
    use crate::test::db::TestDb;

    async fn store() -> (TestDb, PgStore) {
        let db = TestDb::new().await;
        let store = PgStore::new(Db::new(db.pool.clone()));

        (db, store)
    }

    fn flat(code: &str, limit: Option<u32>) -> Coupon {
        let mut coupon = Coupon::new(
            code,
            DiscountKind::Fixed {
                amount: Price::new(250),
            },
        );
        coupon.usage_limit = limit;
        coupon
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn cart_round_trips_with_version_checks() -> TestResult {
        let (_db, store) = store().await;
        let owner = CustomerId::new();

        assert_eq!(store.load_cart(owner).await?, None);

        let first = store.save_cart(Cart::new(owner, Timestamp::now()), 0).await?;

        assert_eq!(first.version(), 1);
        assert!(matches!(
            store.save_cart(first.clone(), 0).await,
            Err(StoreError::Conflict)
        ));

        let second = store.save_cart(first.clone(), 1).await?;

        assert_eq!(second.version(), 2);
        assert!(matches!(store.save_cart(first, 1).await, Err(StoreError::Conflict)));
        assert_eq!(store.load_cart(owner).await?.map(|cart| cart.version()), Some(2));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn order_sequence_is_monotonic() -> TestResult {
        let (_db, store) = store().await;

        let first = store.next_order_sequence().await?;
        let second = store.next_order_sequence().await?;

        assert!(second > first);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn redemption_is_counted_once_and_within_limit() -> TestResult {
        let (_db, store) = store().await;
        let code = CouponCode::new("ONCE");

        store.insert_coupon(flat("ONCE", Some(1))).await?;

        let customer = CustomerId::new();
        let order = OrderId::new();

        assert_eq!(store.redeem(&code, customer, order).await?, Redemption::Counted);
        assert_eq!(
            store.redeem(&code, customer, order).await?,
            Redemption::AlreadyCounted
        );
        assert_eq!(
            store.redeem(&code, CustomerId::new(), OrderId::new()).await?,
            Redemption::LimitReached
        );
        assert_eq!(store.redemptions(&code, customer).await?, 1);
        assert_eq!(
            store.find_coupon(&code).await?.map(|coupon| coupon.usage_count),
            Some(1)
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn redemption_respects_per_customer_limit() -> TestResult {
        let (_db, store) = store().await;
        let code = CouponCode::new("WELCOME");

        store.insert_coupon(flat("WELCOME", None)).await?;

        let customer = CustomerId::new();

        assert_eq!(store.redeem(&code, customer, OrderId::new()).await?, Redemption::Counted);
        assert_eq!(
            store.redeem(&code, customer, OrderId::new()).await?,
            Redemption::LimitReached
        );
        assert_eq!(
            store.redeem(&code, CustomerId::new(), OrderId::new()).await?,
            Redemption::Counted
        );
        assert_eq!(store.redemptions(&code, customer).await?, 1);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn duplicate_coupon_is_rejected() -> TestResult {
        let (_db, store) = store().await;

        store.insert_coupon(flat("DUP", None)).await?;

        assert!(matches!(
            store.insert_coupon(flat("dup", None)).await,
            Err(StoreError::Duplicate)
        ));
        assert_eq!(store.list_coupons().await?.len(), 1);

        Ok(())
    }
}
