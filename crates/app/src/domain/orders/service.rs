//! Orders service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use platter::{
    cart::CartError,
    coupons::{CouponCode, CouponOutcome},
    ids::{CustomerId, OrderId, RiderId},
    orders::{Order, OrderError, OrderNumber, OrderStatus, PlaceOrder},
    prices::Price,
};
use tracing::{debug, info, warn};

use crate::{
    auth::Principal,
    catalog::{self, Catalog},
    domain::{
        orders::errors::OrdersServiceError,
        versioned::{load_cart, update_order},
    },
    settings::ServiceSettings,
    stores::{CartStore, CouponStore, OrderStore, Redemption, StoreError},
};

#[derive(Clone)]
pub struct DefaultOrdersService {
    carts: Arc<dyn CartStore>,
    orders: Arc<dyn OrderStore>,
    coupons: Arc<dyn CouponStore>,
    catalog: Arc<dyn Catalog>,
    settings: ServiceSettings,
}

impl DefaultOrdersService {
    #[must_use]
    pub fn new(
        carts: Arc<dyn CartStore>,
        orders: Arc<dyn OrderStore>,
        coupons: Arc<dyn CouponStore>,
        catalog: Arc<dyn Catalog>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            carts,
            orders,
            coupons,
            catalog,
            settings,
        }
    }

    /// Count the order's coupon redemption once it is due, then flag the
    /// order so it is never counted again.
    async fn settle_coupon(&self, order: Order) -> Result<Order, OrdersServiceError> {
        if !order.needs_coupon_redemption() {
            return Ok(order);
        }

        let Some(code) = order.discount_code().cloned() else {
            return Ok(order);
        };

        match self.coupons.redeem(&code, order.customer(), order.id()).await? {
            Redemption::Counted => info!(%code, order_id = %order.id(), "coupon redeemed"),
            Redemption::AlreadyCounted => {
                debug!(%code, order_id = %order.id(), "coupon redemption already counted");
            }
            Redemption::LimitReached => {
                warn!(%code, order_id = %order.id(), "coupon usage limit reached after checkout");
            }
        }

        let (order, ()) = update_order(&*self.orders, order.id(), "orders.redeem_coupon", |order| {
            order.mark_coupon_redeemed();

            Ok::<_, OrdersServiceError>(())
        })
        .await?;

        Ok(order)
    }

    /// Uses of `code` by `customer`: settled redemptions plus live orders
    /// carrying the code whose redemption is still due.
    async fn coupon_uses(
        &self,
        code: &CouponCode,
        customer: CustomerId,
    ) -> Result<u32, OrdersServiceError> {
        let settled = self.coupons.redemptions(code, customer).await?;

        let pending = self
            .orders
            .list_orders(customer)
            .await?
            .iter()
            .filter(|order| {
                order.discount_code() == Some(code)
                    && !order.coupon_redeemed()
                    && order.status() != OrderStatus::Cancelled
            })
            .count();

        Ok(settled.saturating_add(u32::try_from(pending).unwrap_or(u32::MAX)))
    }

    /// Run `change` against the order after checking `principal` may act on it.
    async fn change_order<T, F>(
        &self,
        id: OrderId,
        operation: &'static str,
        allowed: impl Fn(&Order) -> bool + Send + Sync,
        mut change: F,
    ) -> Result<Order, OrdersServiceError>
    where
        F: FnMut(&mut Order) -> Result<T, OrderError> + Send,
        T: Send,
    {
        let (order, _) = update_order(&*self.orders, id, operation, |order| {
            if !allowed(order) {
                return Err(OrdersServiceError::Forbidden);
            }

            Ok(change(order)?)
        })
        .await?;

        Ok(order)
    }
}

/// Staff may move any order; customers may only cancel their own order
/// before the restaurant confirms it.
fn may_transition(principal: &Principal, order: &Order, next: OrderStatus) -> bool {
    if principal.role.is_staff() {
        return true;
    }

    order.customer() == principal.customer
        && next == OrderStatus::Cancelled
        && order.status() == OrderStatus::Placed
}

#[async_trait]
impl OrdersService for DefaultOrdersService {
    #[tracing::instrument(
        name = "orders.service.place_order",
        skip_all,
        fields(customer = %principal.customer, payment_method = request.payment_method.as_str())
    )]
    async fn place_order(
        &self,
        principal: Principal,
        request: PlaceOrder,
    ) -> Result<Order, OrdersServiceError> {
        let customer = principal.customer;
        let policy = self.settings.policy;
        let mut cart = load_cart(&*self.carts, customer).await?;

        if cart.is_empty() {
            return Err(OrderError::EmptyCart.into());
        }

        let restaurant = cart.restaurant().ok_or(OrderError::MissingRestaurant)?;

        let restaurant = catalog::within(
            self.settings.catalog_timeout,
            self.catalog.get_restaurant(restaurant),
        )
        .await?;

        if !restaurant.is_open {
            return Err(CartError::RestaurantClosed(restaurant.id).into());
        }

        let now = Timestamp::now();

        if let Some(code) = cart.discount_code().cloned() {
            let coupon = self.coupons.find_coupon(&code).await?;
            let prior_redemptions = self.coupon_uses(&code, customer).await?;

            if let CouponOutcome::Rejected(rejection) =
                cart.apply_coupon(coupon.as_ref(), prior_redemptions, now, &policy)?
            {
                info!(%code, reason = rejection.code(), "coupon rejected at checkout");

                return Err(OrdersServiceError::CouponRejected(rejection));
            }
        }

        let sequence = self.orders.next_order_sequence().await?;
        let estimated_delivery = now
            .checked_add(self.settings.estimated_delivery)
            .unwrap_or(now);

        let order = Order::place(
            &cart,
            OrderNumber::generate(now, sequence),
            request,
            estimated_delivery,
            now,
        )?;

        let order = self.orders.insert_order(order).await?;

        let version = cart.version();
        cart.clear();

        match self.carts.save_cart(cart, version).await {
            Ok(_) => {}
            Err(StoreError::Conflict) => {
                warn!(
                    order_id = %order.id(),
                    "cart changed during checkout, keeping the newer cart"
                );
            }
            Err(error) => {
                warn!(
                    order_id = %order.id(),
                    error = %error,
                    "placed order but failed to clear cart"
                );
            }
        }

        info!(
            order_id = %order.id(),
            order_number = %order.number(),
            total = %order.totals().total,
            "placed order"
        );

        Ok(order)
    }

    async fn list_orders(&self, principal: Principal) -> Result<Vec<Order>, OrdersServiceError> {
        Ok(self.orders.list_orders(principal.customer).await?)
    }

    async fn get_order(
        &self,
        principal: Principal,
        id: OrderId,
    ) -> Result<Order, OrdersServiceError> {
        let order = self.orders.load_order(id).await?;

        if !principal.can_see(order.customer()) {
            return Err(OrdersServiceError::Forbidden);
        }

        Ok(order)
    }

    #[tracing::instrument(
        name = "orders.service.update_status",
        skip_all,
        fields(order_id = %id, status = %status, role = principal.role.as_str())
    )]
    async fn update_status(
        &self,
        principal: Principal,
        id: OrderId,
        status: OrderStatus,
        note: Option<String>,
    ) -> Result<Order, OrdersServiceError> {
        let now = Timestamp::now();

        let order = self
            .change_order(
                id,
                "orders.update_status",
                |order| may_transition(&principal, order, status),
                |order| order.transition(status, note.clone(), now),
            )
            .await?;

        info!("order status changed");

        self.settle_coupon(order).await
    }

    async fn assign_rider(
        &self,
        principal: Principal,
        id: OrderId,
        rider: RiderId,
    ) -> Result<Order, OrdersServiceError> {
        let order = self
            .change_order(
                id,
                "orders.assign_rider",
                |_| principal.is_admin(),
                |order| order.assign_rider(rider),
            )
            .await?;

        info!(order_id = %id, rider = %rider, "assigned rider");

        Ok(order)
    }

    async fn request_refund(
        &self,
        principal: Principal,
        id: OrderId,
        amount: Option<Price>,
        reason: String,
    ) -> Result<Order, OrdersServiceError> {
        let order = self
            .change_order(
                id,
                "orders.request_refund",
                |order| order.customer() == principal.customer || principal.is_admin(),
                |order| order.request_refund(amount, reason.clone()),
            )
            .await?;

        info!(order_id = %id, amount = %order.refund_amount(), "refund requested");

        Ok(order)
    }

    async fn complete_refund(
        &self,
        principal: Principal,
        id: OrderId,
    ) -> Result<Order, OrdersServiceError> {
        let order = self
            .change_order(
                id,
                "orders.complete_refund",
                |_| principal.is_admin(),
                Order::complete_refund,
            )
            .await?;

        info!(order_id = %id, amount = %order.refund_amount(), "refund completed");

        Ok(order)
    }

    async fn rate(
        &self,
        principal: Principal,
        id: OrderId,
        score: u8,
        review: Option<String>,
    ) -> Result<Order, OrdersServiceError> {
        let now = Timestamp::now();

        self.change_order(
            id,
            "orders.rate",
            |order| order.customer() == principal.customer,
            |order| order.rate(score, review.clone(), now),
        )
        .await
    }

    #[tracing::instrument(
        name = "orders.service.on_payment_confirmed",
        skip_all,
        fields(order_id = %id)
    )]
    async fn on_payment_confirmed(
        &self,
        id: OrderId,
        reference: String,
    ) -> Result<Order, OrdersServiceError> {
        let (order, changed) = update_order(&*self.orders, id, "orders.payment_confirmed", |order| {
            Ok::<_, OrdersServiceError>(order.payment_confirmed(reference.clone())?)
        })
        .await?;

        if changed {
            info!("payment confirmed");
        } else {
            debug!("duplicate payment confirmation ignored");
        }

        self.settle_coupon(order).await
    }

    #[tracing::instrument(
        name = "orders.service.on_payment_failed",
        skip_all,
        fields(order_id = %id)
    )]
    async fn on_payment_failed(
        &self,
        id: OrderId,
        reason: String,
    ) -> Result<Order, OrdersServiceError> {
        let (order, changed) = update_order(&*self.orders, id, "orders.payment_failed", |order| {
            Ok::<_, OrdersServiceError>(order.payment_failed(reason.clone()))
        })
        .await?;

        if changed {
            warn!(reason = %reason, "payment failed");
        } else {
            debug!("late payment failure ignored");
        }

        Ok(order)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Place an order from the caller's cart and clear the cart.
    ///
    /// An applied coupon is validated again in full before the order is created.
    async fn place_order(
        &self,
        principal: Principal,
        request: PlaceOrder,
    ) -> Result<Order, OrdersServiceError>;

    /// The caller's orders, newest first.
    async fn list_orders(&self, principal: Principal) -> Result<Vec<Order>, OrdersServiceError>;

    /// One order, visible to its customer and to staff.
    async fn get_order(&self, principal: Principal, id: OrderId)
    -> Result<Order, OrdersServiceError>;

    /// Move an order along its lifecycle.
    async fn update_status(
        &self,
        principal: Principal,
        id: OrderId,
        status: OrderStatus,
        note: Option<String>,
    ) -> Result<Order, OrdersServiceError>;

    async fn assign_rider(
        &self,
        principal: Principal,
        id: OrderId,
        rider: RiderId,
    ) -> Result<Order, OrdersServiceError>;

    /// Request a refund of `amount`, or of the whole total.
    async fn request_refund(
        &self,
        principal: Principal,
        id: OrderId,
        amount: Option<Price>,
        reason: String,
    ) -> Result<Order, OrdersServiceError>;

    async fn complete_refund(
        &self,
        principal: Principal,
        id: OrderId,
    ) -> Result<Order, OrdersServiceError>;

    async fn rate(
        &self,
        principal: Principal,
        id: OrderId,
        score: u8,
        review: Option<String>,
    ) -> Result<Order, OrdersServiceError>;

    /// Payment gateway reported success. Safe to call repeatedly.
    async fn on_payment_confirmed(
        &self,
        id: OrderId,
        reference: String,
    ) -> Result<Order, OrdersServiceError>;

    /// Payment gateway reported failure. Ignored once the payment settled.
    async fn on_payment_failed(
        &self,
        id: OrderId,
        reason: String,
    ) -> Result<Order, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use platter::{
        cart::{Cart, NewLineItem},
        coupons::{Coupon, CouponCode, DiscountKind, Rejection},
        ids::CustomerId,
        orders::{DeliveryAddress, PaymentMethod, PaymentStatus, RefundStatus},
        products::Restaurant,
    };
    use testresult::TestResult;

    use super::*;
    use crate::{
        auth::Role,
        catalog::FixtureCatalog,
        domain::carts::CartsService,
        stores::{MemoryStore, MockCartStore},
        test::TestContext,
    };

    fn checkout(payment_method: PaymentMethod) -> PlaceOrder {
        PlaceOrder {
            address: DeliveryAddress {
                street: "221B Baker Street".to_string(),
                city: "London".to_string(),
                ..DeliveryAddress::default()
            },
            payment_method,
            special_instructions: None,
        }
    }

    fn customer() -> Principal {
        Principal::new(CustomerId::new(), Role::Customer)
    }

    fn staff(role: Role) -> Principal {
        Principal::new(CustomerId::new(), role)
    }

    async fn fill_cart(ctx: &TestContext, who: Principal, code: Option<&str>) -> TestResult {
        let tikka = ctx.fixture.product("paneer-tikka")?;

        ctx.carts
            .add_item(
                who.customer,
                tikka.id,
                NewLineItem {
                    quantity: 2,
                    ..NewLineItem::default()
                },
            )
            .await?;

        if let Some(code) = code {
            ctx.carts.apply_coupon(who.customer, code.to_string()).await?;
        }

        Ok(())
    }

    async fn usage_count(ctx: &TestContext, code: &str) -> Result<Option<u32>, StoreError> {
        Ok(ctx
            .store
            .find_coupon(&CouponCode::new(code))
            .await?
            .map(|coupon| coupon.usage_count))
    }

    #[tokio::test]
    async fn placing_copies_the_cart_and_clears_it() -> TestResult {
        let ctx = TestContext::new()?;
        let alice = customer();

        fill_cart(&ctx, alice, Some("TANDOOR20")).await?;

        let cart = ctx.carts.get_cart(alice.customer).await?;
        let order = ctx.orders.place_order(alice, checkout(PaymentMethod::Upi)).await?;

        assert_eq!(order.totals(), cart.totals());
        assert_eq!(order.items(), cart.items());
        assert_eq!(order.discount_code().map(CouponCode::as_str), Some("TANDOOR20"));
        assert_eq!(order.status(), OrderStatus::Placed);
        assert_eq!(order.version(), 1);
        assert!(order.number().as_str().starts_with("FC"));
        assert!(ctx.carts.get_cart(alice.customer).await?.is_empty());

        // usage is only counted once payment is confirmed
        assert_eq!(usage_count(&ctx, "TANDOOR20").await?, Some(0));

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_stores_nothing() -> TestResult {
        let ctx = TestContext::new()?;
        let alice = customer();

        let result = ctx.orders.place_order(alice, checkout(PaymentMethod::Card)).await;

        assert!(matches!(
            result,
            Err(OrdersServiceError::Order(OrderError::EmptyCart))
        ));
        assert!(ctx.orders.list_orders(alice).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn checkout_revalidates_the_coupon() -> TestResult {
        let ctx = TestContext::new()?;
        let alice = customer();

        let mut single_use = Coupon::new(
            "LASTONE",
            DiscountKind::Fixed {
                amount: Price::new(100),
            },
        );
        single_use.usage_limit = Some(1);
        single_use.per_user_limit = None;

        ctx.store.insert_coupon(single_use).await?;

        fill_cart(&ctx, alice, Some("LASTONE")).await?;

        ctx.store
            .redeem(&CouponCode::new("LASTONE"), CustomerId::new(), OrderId::new())
            .await?;

        let result = ctx.orders.place_order(alice, checkout(PaymentMethod::Card)).await;

        assert!(matches!(
            result,
            Err(OrdersServiceError::CouponRejected(Rejection::UsageLimitReached))
        ));
        assert!(!ctx.carts.get_cart(alice.customer).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn closed_restaurant_refuses_checkout() -> TestResult {
        let ctx = TestContext::new()?;
        let alice = customer();
        let tikka = ctx.fixture.product("paneer-tikka")?;
        let open = ctx.fixture.restaurant("tandoor-house")?;

        let mut cart = Cart::new(alice.customer, Timestamp::now());

        cart.add_item(
            tikka,
            open,
            NewLineItem {
                quantity: 1,
                ..NewLineItem::default()
            },
            &ServiceSettings::default().policy,
        )?;

        ctx.store.save_cart(cart, 0).await?;

        let closed = Restaurant {
            is_open: false,
            ..open.clone()
        };

        let service = DefaultOrdersService::new(
            ctx.store.clone(),
            ctx.store.clone(),
            ctx.store.clone(),
            Arc::new(FixtureCatalog::new([closed], [tikka.clone()])),
            ServiceSettings::default(),
        );

        let result = service.place_order(alice, checkout(PaymentMethod::Cash)).await;

        assert!(matches!(
            result,
            Err(OrdersServiceError::Cart(CartError::RestaurantClosed(_)))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn cart_is_cleared_against_the_checkout_version() -> TestResult {
        let ctx = TestContext::new()?;
        let alice = customer();
        let tikka = ctx.fixture.product("paneer-tikka")?;
        let open = ctx.fixture.restaurant("tandoor-house")?;

        let mut cart = Cart::new(alice.customer, Timestamp::now());

        cart.add_item(
            tikka,
            open,
            NewLineItem {
                quantity: 1,
                ..NewLineItem::default()
            },
            &ServiceSettings::default().policy,
        )?;

        let cart = ctx.store.save_cart(cart, 0).await?;

        let mut carts = MockCartStore::new();

        carts
            .expect_load_cart()
            .return_once(move |_| Ok(Some(cart)));

        // another request added an item after checkout loaded the cart
        carts
            .expect_save_cart()
            .withf(|cart, expected_version| cart.is_empty() && *expected_version == 1)
            .times(1)
            .return_once(|_, _| Err(StoreError::Conflict));

        let service = DefaultOrdersService::new(
            Arc::new(carts),
            ctx.store.clone(),
            ctx.store.clone(),
            Arc::new(FixtureCatalog::from_fixture(&ctx.fixture)),
            ServiceSettings::default(),
        );

        let order = service.place_order(alice, checkout(PaymentMethod::Cash)).await?;

        assert_eq!(order.items().len(), 1);
        assert_eq!(ctx.orders.list_orders(alice).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn per_customer_limit_counts_unpaid_orders() -> TestResult {
        let ctx = TestContext::new()?;
        let alice = customer();

        fill_cart(&ctx, alice, Some("TANDOOR20")).await?;

        let first = ctx.orders.place_order(alice, checkout(PaymentMethod::Card)).await?;

        fill_cart(&ctx, alice, Some("TANDOOR20")).await?;

        let second = ctx.orders.place_order(alice, checkout(PaymentMethod::Card)).await;

        assert!(matches!(
            second,
            Err(OrdersServiceError::CouponRejected(Rejection::PerUserLimitReached))
        ));

        ctx.orders
            .on_payment_confirmed(first.id(), "pay_first".to_string())
            .await?;

        assert_eq!(
            ctx.store
                .redemptions(&CouponCode::new("TANDOOR20"), alice.customer)
                .await?,
            1
        );
        assert_eq!(usage_count(&ctx, "TANDOOR20").await?, Some(1));

        Ok(())
    }

    #[tokio::test]
    async fn cancelled_orders_release_the_coupon() -> TestResult {
        let ctx = TestContext::new()?;
        let alice = customer();

        fill_cart(&ctx, alice, Some("TANDOOR20")).await?;

        let first = ctx.orders.place_order(alice, checkout(PaymentMethod::Card)).await?;

        ctx.orders
            .update_status(alice, first.id(), OrderStatus::Cancelled, None)
            .await?;

        fill_cart(&ctx, alice, Some("TANDOOR20")).await?;

        let second = ctx.orders.place_order(alice, checkout(PaymentMethod::Card)).await?;

        assert_eq!(second.discount_code().map(CouponCode::as_str), Some("TANDOOR20"));

        Ok(())
    }

    #[tokio::test]
    async fn payment_confirmation_redeems_the_coupon_once() -> TestResult {
        let ctx = TestContext::new()?;
        let alice = customer();

        fill_cart(&ctx, alice, Some("TANDOOR20")).await?;

        let order = ctx.orders.place_order(alice, checkout(PaymentMethod::Card)).await?;

        let paid = ctx
            .orders
            .on_payment_confirmed(order.id(), "pay_123".to_string())
            .await?;

        assert_eq!(paid.payment_status(), PaymentStatus::Completed);
        assert_eq!(paid.payment_reference(), Some("pay_123"));
        assert!(paid.coupon_redeemed());

        let again = ctx
            .orders
            .on_payment_confirmed(order.id(), "pay_123".to_string())
            .await?;

        assert_eq!(again.version(), paid.version());
        assert_eq!(usage_count(&ctx, "TANDOOR20").await?, Some(1));

        Ok(())
    }

    #[tokio::test]
    async fn late_failure_after_confirmation_is_ignored() -> TestResult {
        let ctx = TestContext::new()?;
        let alice = customer();

        fill_cart(&ctx, alice, None).await?;

        let order = ctx.orders.place_order(alice, checkout(PaymentMethod::Wallet)).await?;

        let failed = ctx
            .orders
            .on_payment_failed(order.id(), "card declined".to_string())
            .await?;

        assert_eq!(failed.payment_status(), PaymentStatus::Failed);
        assert_eq!(failed.payment_failure_reason(), Some("card declined"));

        ctx.orders
            .on_payment_confirmed(order.id(), "retry_ok".to_string())
            .await?;

        let late = ctx
            .orders
            .on_payment_failed(order.id(), "timeout".to_string())
            .await?;

        assert_eq!(late.payment_status(), PaymentStatus::Completed);

        Ok(())
    }

    #[tokio::test]
    async fn cash_coupon_is_redeemed_when_the_restaurant_confirms() -> TestResult {
        let ctx = TestContext::new()?;
        let alice = customer();
        let kitchen = staff(Role::Restaurant);

        fill_cart(&ctx, alice, Some("TANDOOR20")).await?;

        let order = ctx.orders.place_order(alice, checkout(PaymentMethod::Cash)).await?;

        let confirmed = ctx
            .orders
            .update_status(kitchen, order.id(), OrderStatus::Confirmed, None)
            .await?;

        assert!(confirmed.coupon_redeemed());
        assert_eq!(usage_count(&ctx, "TANDOOR20").await?, Some(1));
        assert_eq!(confirmed.payment_status(), PaymentStatus::Pending);

        let delivered = ctx
            .orders
            .update_status(
                kitchen,
                order.id(),
                OrderStatus::Delivered,
                Some("left at door".to_string()),
            )
            .await?;

        assert_eq!(delivered.payment_status(), PaymentStatus::Completed);
        assert_eq!(delivered.history().len(), 3);
        assert_eq!(usage_count(&ctx, "TANDOOR20").await?, Some(1));

        Ok(())
    }

    #[tokio::test]
    async fn customers_may_only_cancel_their_own_placed_orders() -> TestResult {
        let ctx = TestContext::new()?;
        let alice = customer();
        let mallory = customer();

        fill_cart(&ctx, alice, None).await?;

        let order = ctx.orders.place_order(alice, checkout(PaymentMethod::Upi)).await?;

        assert!(matches!(
            ctx.orders
                .update_status(alice, order.id(), OrderStatus::Confirmed, None)
                .await,
            Err(OrdersServiceError::Forbidden)
        ));
        assert!(matches!(
            ctx.orders
                .update_status(mallory, order.id(), OrderStatus::Cancelled, None)
                .await,
            Err(OrdersServiceError::Forbidden)
        ));
        assert!(matches!(
            ctx.orders.get_order(mallory, order.id()).await,
            Err(OrdersServiceError::Forbidden)
        ));

        let cancelled = ctx
            .orders
            .update_status(
                alice,
                order.id(),
                OrderStatus::Cancelled,
                Some("changed my mind".to_string()),
            )
            .await?;

        assert_eq!(cancelled.status(), OrderStatus::Cancelled);

        assert!(matches!(
            ctx.orders
                .update_status(staff(Role::Admin), order.id(), OrderStatus::Confirmed, None)
                .await,
            Err(OrdersServiceError::Order(OrderError::IllegalTransition { .. }))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn rating_requires_delivery_and_ownership() -> TestResult {
        let ctx = TestContext::new()?;
        let alice = customer();
        let rider = staff(Role::Rider);

        fill_cart(&ctx, alice, None).await?;

        let order = ctx.orders.place_order(alice, checkout(PaymentMethod::Card)).await?;

        assert!(matches!(
            ctx.orders.rate(alice, order.id(), 5, None).await,
            Err(OrdersServiceError::Order(OrderError::NotDelivered))
        ));

        ctx.orders
            .update_status(rider, order.id(), OrderStatus::Delivered, None)
            .await?;

        assert!(matches!(
            ctx.orders.rate(rider, order.id(), 5, None).await,
            Err(OrdersServiceError::Forbidden)
        ));

        let rated = ctx
            .orders
            .rate(alice, order.id(), 4, Some("Still warm".to_string()))
            .await?;

        assert_eq!(rated.rating().map(|rating| rating.score), Some(4));

        Ok(())
    }

    #[tokio::test]
    async fn refunds_are_requested_by_owners_and_completed_by_admins() -> TestResult {
        let ctx = TestContext::new()?;
        let alice = customer();
        let admin = staff(Role::Admin);

        fill_cart(&ctx, alice, None).await?;

        let order = ctx.orders.place_order(alice, checkout(PaymentMethod::Card)).await?;

        let requested = ctx
            .orders
            .request_refund(alice, order.id(), Some(Price::new(500)), "cold food".to_string())
            .await?;

        assert_eq!(requested.refund_status(), RefundStatus::Pending);
        assert_eq!(requested.refund_amount(), Price::new(500));
        assert_eq!(requested.status(), OrderStatus::Placed);

        assert!(matches!(
            ctx.orders.complete_refund(alice, order.id()).await,
            Err(OrdersServiceError::Forbidden)
        ));

        let completed = ctx.orders.complete_refund(admin, order.id()).await?;

        assert_eq!(completed.refund_status(), RefundStatus::Completed);
        assert_eq!(completed.payment_status(), PaymentStatus::Refunded);

        Ok(())
    }

    #[tokio::test]
    async fn only_admins_assign_riders() -> TestResult {
        let ctx = TestContext::new()?;
        let alice = customer();

        fill_cart(&ctx, alice, None).await?;

        let order = ctx.orders.place_order(alice, checkout(PaymentMethod::Card)).await?;
        let rider = RiderId::new();

        assert!(matches!(
            ctx.orders.assign_rider(staff(Role::Rider), order.id(), rider).await,
            Err(OrdersServiceError::Forbidden)
        ));

        let assigned = ctx.orders.assign_rider(staff(Role::Admin), order.id(), rider).await?;

        assert_eq!(assigned.rider(), Some(rider));

        Ok(())
    }

    #[tokio::test]
    async fn history_lists_newest_first() -> TestResult {
        let ctx = TestContext::new()?;
        let alice = customer();

        fill_cart(&ctx, alice, None).await?;
        let first = ctx.orders.place_order(alice, checkout(PaymentMethod::Card)).await?;

        fill_cart(&ctx, alice, None).await?;
        let second = ctx.orders.place_order(alice, checkout(PaymentMethod::Card)).await?;

        let ids: Vec<OrderId> = ctx
            .orders
            .list_orders(alice)
            .await?
            .iter()
            .map(Order::id)
            .collect();

        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&first.id()) && ids.contains(&second.id()));
        assert_ne!(first.number(), second.number());

        Ok(())
    }

    #[tokio::test]
    async fn missing_orders_are_not_found() -> TestResult {
        let store = Arc::new(MemoryStore::new());
        let service = DefaultOrdersService::new(
            store.clone(),
            store.clone(),
            store,
            Arc::new(FixtureCatalog::default()),
            ServiceSettings::default(),
        );

        let error = service
            .get_order(customer(), OrderId::new())
            .await
            .err()
            .ok_or("expected an error")?;

        assert_eq!(error.kind(), platter::errors::ErrorKind::NotFound);

        Ok(())
    }
}
