//! In-memory stores

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use jiff::Timestamp;
use platter::{
    cart::Cart,
    coupons::{Coupon, CouponCode},
    ids::{CustomerId, OrderId},
    orders::{Order, OrderNumber},
};
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use crate::stores::{CartStore, CouponStore, OrderStore, Redemption, StoreError};

#[derive(Debug, Default)]
struct Tables {
    carts: FxHashMap<CustomerId, Cart>,
    orders: FxHashMap<OrderId, Order>,
    coupons: FxHashMap<CouponCode, Coupon>,
    redemptions: Vec<RedemptionRow>,
}

#[derive(Debug)]
struct RedemptionRow {
    code: CouponCode,
    customer: CustomerId,
    order: OrderId,
}

/// Carts, orders and coupons held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    sequence: AtomicU64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with `coupons`. Later duplicates replace earlier ones.
    #[must_use]
    pub fn with_coupons(coupons: impl IntoIterator<Item = Coupon>) -> Self {
        let coupons = coupons
            .into_iter()
            .map(|coupon| (coupon.code.clone(), coupon))
            .collect();

        Self {
            tables: RwLock::new(Tables {
                coupons,
                ..Tables::default()
            }),
            sequence: AtomicU64::new(0),
        }
    }
}

fn next_version(expected_version: u64) -> Result<u64, StoreError> {
    expected_version
        .checked_add(1)
        .ok_or_else(|| StoreError::OutOfRange(format!("version {expected_version}")))
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn load_cart(&self, owner: CustomerId) -> Result<Option<Cart>, StoreError> {
        Ok(self.tables.read().await.carts.get(&owner).cloned())
    }

    async fn save_cart(&self, cart: Cart, expected_version: u64) -> Result<Cart, StoreError> {
        let mut tables = self.tables.write().await;
        let current = tables.carts.get(&cart.owner()).map_or(0, Cart::version);

        if current != expected_version {
            return Err(StoreError::Conflict);
        }

        let saved = cart.committed(next_version(expected_version)?, Timestamp::now());

        tables.carts.insert(saved.owner(), saved.clone());

        Ok(saved)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: Order) -> Result<Order, StoreError> {
        let mut tables = self.tables.write().await;

        let exists = tables.orders.contains_key(&order.id())
            || tables
                .orders
                .values()
                .any(|stored| stored.number() == order.number());

        if exists {
            return Err(StoreError::Duplicate);
        }

        let created_at = order.created_at();
        let saved = order.committed(1, created_at);

        tables.orders.insert(saved.id(), saved.clone());

        Ok(saved)
    }

    async fn load_order(&self, id: OrderId) -> Result<Order, StoreError> {
        self.tables
            .read()
            .await
            .orders
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_number(&self, number: &OrderNumber) -> Result<Order, StoreError> {
        self.tables
            .read()
            .await
            .orders
            .values()
            .find(|order| order.number() == number)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_orders(&self, customer: CustomerId) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .tables
            .read()
            .await
            .orders
            .values()
            .filter(|order| order.customer() == customer)
            .cloned()
            .collect();

        orders.sort_by_key(|order| std::cmp::Reverse((order.created_at(), order.id())));

        Ok(orders)
    }

    async fn save_order(&self, order: Order, expected_version: u64) -> Result<Order, StoreError> {
        let mut tables = self.tables.write().await;
        let stored = tables.orders.get(&order.id()).ok_or(StoreError::NotFound)?;

        if stored.version() != expected_version || !order.history().starts_with(stored.history()) {
            return Err(StoreError::Conflict);
        }

        let saved = order.committed(next_version(expected_version)?, Timestamp::now());

        tables.orders.insert(saved.id(), saved.clone());

        Ok(saved)
    }

    async fn next_order_sequence(&self) -> Result<u64, StoreError> {
        Ok(self.sequence.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[async_trait]
impl CouponStore for MemoryStore {
    async fn find_coupon(&self, code: &CouponCode) -> Result<Option<Coupon>, StoreError> {
        Ok(self.tables.read().await.coupons.get(code).cloned())
    }

    async fn insert_coupon(&self, coupon: Coupon) -> Result<Coupon, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.coupons.contains_key(&coupon.code) {
            return Err(StoreError::Duplicate);
        }

        tables.coupons.insert(coupon.code.clone(), coupon.clone());

        Ok(coupon)
    }

    async fn list_coupons(&self) -> Result<Vec<Coupon>, StoreError> {
        let mut coupons: Vec<Coupon> = self.tables.read().await.coupons.values().cloned().collect();

        coupons.sort_by(|a, b| a.code.cmp(&b.code));

        Ok(coupons)
    }

    async fn redemptions(
        &self,
        code: &CouponCode,
        customer: CustomerId,
    ) -> Result<u32, StoreError> {
        let count = self
            .tables
            .read()
            .await
            .redemptions
            .iter()
            .filter(|row| row.code == *code && row.customer == customer)
            .count();

        u32::try_from(count)
            .map_err(|_overflow| StoreError::OutOfRange(format!("{count} redemptions")))
    }

    async fn redeem(
        &self,
        code: &CouponCode,
        customer: CustomerId,
        order: OrderId,
    ) -> Result<Redemption, StoreError> {
        let mut tables = self.tables.write().await;

        if tables
            .redemptions
            .iter()
            .any(|row| row.order == order && row.code == *code)
        {
            return Ok(Redemption::AlreadyCounted);
        }

        let customer_redemptions = tables
            .redemptions
            .iter()
            .filter(|row| row.code == *code && row.customer == customer)
            .count();

        let coupon = tables.coupons.get_mut(code).ok_or(StoreError::NotFound)?;

        let over_customer_limit = coupon.per_user_limit.is_some_and(|limit| {
            usize::try_from(limit).is_ok_and(|limit| customer_redemptions >= limit)
        });

        if coupon.is_exhausted() || over_customer_limit {
            return Ok(Redemption::LimitReached);
        }

        coupon.usage_count = coupon.usage_count.saturating_add(1);

        tables.redemptions.push(RedemptionRow {
            code: code.clone(),
            customer,
            order,
        });

        Ok(Redemption::Counted)
    }
}

#[cfg(test)]
mod tests {
    use platter::{coupons::DiscountKind, prices::Price};
    use testresult::TestResult;

    use super::*;

    fn flat(code: &str) -> Coupon {
        Coupon::new(
            code,
            DiscountKind::Fixed {
                amount: Price::new(100),
            },
        )
    }

    #[tokio::test]
    async fn first_save_requires_version_zero() -> TestResult {
        let store = MemoryStore::new();
        let cart = Cart::new(CustomerId::new(), Timestamp::now());

        let saved = store.save_cart(cart.clone(), 0).await?;

        assert_eq!(saved.version(), 1);
        assert!(matches!(store.save_cart(cart, 0).await, Err(StoreError::Conflict)));

        Ok(())
    }

    #[tokio::test]
    async fn stale_cart_save_conflicts() -> TestResult {
        let store = MemoryStore::new();
        let owner = CustomerId::new();

        let first = store.save_cart(Cart::new(owner, Timestamp::now()), 0).await?;
        let second = store.save_cart(first.clone(), 1).await?;

        assert_eq!(second.version(), 2);
        assert!(matches!(store.save_cart(first, 1).await, Err(StoreError::Conflict)));
        assert_eq!(store.load_cart(owner).await?.map(|cart| cart.version()), Some(2));

        Ok(())
    }

    #[tokio::test]
    async fn order_sequence_increases() -> TestResult {
        let store = MemoryStore::new();

        assert_eq!(store.next_order_sequence().await?, 1);
        assert_eq!(store.next_order_sequence().await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn redemption_is_counted_once_per_order() -> TestResult {
        let store = MemoryStore::with_coupons([flat("ONCE")]);
        let code = CouponCode::new("once");
        let customer = CustomerId::new();
        let order = OrderId::new();

        assert_eq!(store.redeem(&code, customer, order).await?, Redemption::Counted);
        assert_eq!(store.redeem(&code, customer, order).await?, Redemption::AlreadyCounted);
        assert_eq!(store.redemptions(&code, customer).await?, 1);
        assert_eq!(
            store.find_coupon(&code).await?.map(|coupon| coupon.usage_count),
            Some(1)
        );

        Ok(())
    }

    #[tokio::test]
    async fn redemption_respects_usage_limit() -> TestResult {
        let mut coupon = flat("LIMITED");
        coupon.usage_limit = Some(1);

        let store = MemoryStore::with_coupons([coupon]);
        let code = CouponCode::new("LIMITED");

        assert_eq!(
            store.redeem(&code, CustomerId::new(), OrderId::new()).await?,
            Redemption::Counted
        );
        assert_eq!(
            store.redeem(&code, CustomerId::new(), OrderId::new()).await?,
            Redemption::LimitReached
        );

        Ok(())
    }

    #[tokio::test]
    async fn redemption_respects_per_customer_limit() -> TestResult {
        let store = MemoryStore::with_coupons([flat("WELCOME")]);
        let code = CouponCode::new("WELCOME");
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
    async fn duplicate_coupon_is_rejected() -> TestResult {
        let store = MemoryStore::with_coupons([flat("DUP")]);

        assert!(matches!(store.insert_coupon(flat("dup")).await, Err(StoreError::Duplicate)));
        assert_eq!(store.list_coupons().await?.len(), 1);

        Ok(())
    }
}
