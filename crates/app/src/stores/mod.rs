//! Aggregate stores
//!
//! Carts and orders are saved with compare-and-swap on their `version`: a
//! save names the version it was loaded at and fails with
//! [`StoreError::Conflict`] when someone else got there first.

use async_trait::async_trait;
use mockall::automock;
use platter::{
    cart::Cart,
    coupons::{Coupon, CouponCode},
    ids::{CustomerId, OrderId},
    orders::{Order, OrderNumber},
};

mod errors;
mod memory;
mod postgres;

pub use errors::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Result of counting a coupon redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    /// The usage count was incremented.
    Counted,

    /// This order's redemption had already been counted.
    AlreadyCounted,

    /// The coupon hit its usage limit before this order was counted.
    LimitReached,
}

#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Load the cart of `owner`, if one has ever been saved.
    async fn load_cart(&self, owner: CustomerId) -> Result<Option<Cart>, StoreError>;

    /// Save `cart` if the stored version is still `expected_version`.
    /// Version zero means the cart has never been saved.
    ///
    /// Returns the cart stamped with its new version.
    async fn save_cart(&self, cart: Cart, expected_version: u64) -> Result<Cart, StoreError>;
}

#[automock]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a freshly placed order.
    async fn insert_order(&self, order: Order) -> Result<Order, StoreError>;

    /// Load an order by id.
    async fn load_order(&self, id: OrderId) -> Result<Order, StoreError>;

    /// Load an order by its human-facing number.
    async fn find_by_number(&self, number: &OrderNumber) -> Result<Order, StoreError>;

    /// Orders of `customer`, newest first.
    async fn list_orders(&self, customer: CustomerId) -> Result<Vec<Order>, StoreError>;

    /// Save `order` if the stored version is still `expected_version`,
    /// appending any status history entries not stored yet.
    async fn save_order(&self, order: Order, expected_version: u64) -> Result<Order, StoreError>;

    /// Next value of the order number sequence.
    async fn next_order_sequence(&self) -> Result<u64, StoreError>;
}

#[automock]
#[async_trait]
pub trait CouponStore: Send + Sync {
    /// Look up a coupon by normalised code.
    async fn find_coupon(&self, code: &CouponCode) -> Result<Option<Coupon>, StoreError>;

    /// Insert a new coupon.
    async fn insert_coupon(&self, coupon: Coupon) -> Result<Coupon, StoreError>;

    /// Every coupon, ordered by code.
    async fn list_coupons(&self) -> Result<Vec<Coupon>, StoreError>;

    /// How many times `customer` has redeemed `code`.
    async fn redemptions(&self, code: &CouponCode, customer: CustomerId)
    -> Result<u32, StoreError>;

    /// Count one redemption of `code` by `customer` for `order`, at most
    /// once per order and never beyond the usage limit.
    async fn redeem(
        &self,
        code: &CouponCode,
        customer: CustomerId,
        order: OrderId,
    ) -> Result<Redemption, StoreError>;
}
