//! Orders
//!
//! The order aggregate and its lifecycle. Status changes follow
//! [`OrderStatus::can_transition_to`] and every accepted change is appended to
//! the status history, whose timestamps never go backwards.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::Cart,
    coupons::CouponCode,
    errors::ErrorKind,
    ids::{CustomerId, OrderId, RestaurantId, RiderId},
    items::LineItem,
    prices::Price,
    pricing::Totals,
};

mod numbers;
mod status;

pub use numbers::{OrderNumber, OrderNumberError};
pub use status::{OrderStatus, PaymentMethod, PaymentStatus, RefundStatus};

/// Errors raised by order operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// Orders cannot be placed from an empty cart.
    #[error("cannot place an order from an empty cart")]
    EmptyCart,

    /// The cart has no restaurant.
    #[error("cart has no restaurant")]
    MissingRestaurant,

    /// The requested status change is not allowed.
    #[error("cannot move order from {from} to {to}")]
    IllegalTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// The order is delivered or cancelled.
    #[error("order is already {0}")]
    Terminal(OrderStatus),

    /// A refund is already pending or completed.
    #[error("a refund has already been requested")]
    RefundAlreadyRequested,

    /// There is no pending refund to complete.
    #[error("no refund is pending")]
    RefundNotPending,

    /// Only delivered orders can be rated.
    #[error("only delivered orders can be rated")]
    NotDelivered,

    /// The order already has a rating.
    #[error("order has already been rated")]
    AlreadyRated,

    /// Input was malformed or out of range.
    #[error("invalid order input: {0}")]
    Validation(String),

    /// The payment callback contradicts the recorded payment state.
    #[error("payment is {0}, cannot confirm it")]
    PaymentStateConflict(PaymentStatus),
}

impl OrderError {
    /// Coarse classification of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::Validation(_) => ErrorKind::Validation,
            OrderError::EmptyCart
            | OrderError::MissingRestaurant
            | OrderError::IllegalTransition { .. }
            | OrderError::Terminal(_)
            | OrderError::RefundAlreadyRequested
            | OrderError::RefundNotPending
            | OrderError::NotDelivered
            | OrderError::AlreadyRated
            | OrderError::PaymentStateConflict(_) => ErrorKind::State,
        }
    }
}

/// Where an order is delivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    /// Street and house number
    pub street: String,

    /// City
    pub city: String,

    /// State or region
    #[serde(default)]
    pub state: String,

    /// Postal code
    #[serde(default)]
    pub zip_code: String,

    /// Country
    #[serde(default)]
    pub country: String,

    /// Latitude, if known
    #[serde(default)]
    pub latitude: Option<f64>,

    /// Longitude, if known
    #[serde(default)]
    pub longitude: Option<f64>,

    /// Label such as "Home"
    #[serde(default)]
    pub label: Option<String>,
}

impl DeliveryAddress {
    fn validate(&self) -> Result<(), OrderError> {
        if self.street.trim().is_empty() || self.city.trim().is_empty() {
            return Err(OrderError::Validation(
                "delivery address needs a street and a city".to_string(),
            ));
        }

        Ok(())
    }
}

/// Checkout details supplied by the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrder {
    /// Delivery address
    pub address: DeliveryAddress,

    /// Payment method
    pub payment_method: PaymentMethod,

    /// Free-text instructions for the restaurant or rider
    #[serde(default)]
    pub special_instructions: Option<String>,
}

/// One entry of the status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// Status entered
    pub status: OrderStatus,

    /// When it was entered
    pub timestamp: Timestamp,

    /// Optional note from whoever made the change
    #[serde(default)]
    pub note: Option<String>,
}

/// Customer feedback on a delivered order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    /// One to five
    pub score: u8,

    /// Optional text review
    #[serde(default)]
    pub review: Option<String>,

    /// When the rating was left
    pub timestamp: Timestamp,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    number: OrderNumber,
    customer: CustomerId,
    restaurant: RestaurantId,
    rider: Option<RiderId>,
    items: Vec<LineItem>,
    delivery_address: DeliveryAddress,
    totals: Totals,
    discount_code: Option<CouponCode>,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    payment_reference: Option<String>,
    payment_failure_reason: Option<String>,
    coupon_redeemed: bool,
    status: OrderStatus,
    history: Vec<StatusEntry>,
    estimated_delivery: Timestamp,
    delivered_at: Option<Timestamp>,
    special_instructions: Option<String>,
    rating: Option<Rating>,
    refund_amount: Price,
    refund_reason: Option<String>,
    refund_status: RefundStatus,
    version: u64,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Order {
    /// Create an order from a non-empty cart.
    ///
    /// Items, totals and the discount code are copied by value; the history
    /// starts with a single `placed` entry.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyCart`]: the cart has no items.
    /// - [`OrderError::Validation`]: the address lacks a street or city.
    pub fn place(
        cart: &Cart,
        number: OrderNumber,
        request: PlaceOrder,
        estimated_delivery: Timestamp,
        now: Timestamp,
    ) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let restaurant = cart.restaurant().ok_or(OrderError::MissingRestaurant)?;

        request.address.validate()?;

        Ok(Self {
            id: OrderId::new(),
            number,
            customer: cart.owner(),
            restaurant,
            rider: None,
            items: cart.items().to_vec(),
            delivery_address: request.address,
            totals: *cart.totals(),
            discount_code: cart.discount_code().cloned(),
            payment_method: request.payment_method,
            payment_status: PaymentStatus::Pending,
            payment_reference: None,
            payment_failure_reason: None,
            coupon_redeemed: false,
            status: OrderStatus::Placed,
            history: vec![StatusEntry {
                status: OrderStatus::Placed,
                timestamp: now,
                note: None,
            }],
            estimated_delivery,
            delivered_at: None,
            special_instructions: request.special_instructions,
            rating: None,
            refund_amount: Price::ZERO,
            refund_reason: None,
            refund_status: RefundStatus::None,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Order id
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Human-facing order number
    pub fn number(&self) -> &OrderNumber {
        &self.number
    }

    /// Ordering customer
    pub fn customer(&self) -> CustomerId {
        self.customer
    }

    /// Restaurant preparing the order
    pub fn restaurant(&self) -> RestaurantId {
        self.restaurant
    }

    /// Assigned rider
    pub fn rider(&self) -> Option<RiderId> {
        self.rider
    }

    /// Ordered lines
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Delivery address
    pub fn delivery_address(&self) -> &DeliveryAddress {
        &self.delivery_address
    }

    /// Totals copied from the cart
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Applied coupon code
    pub fn discount_code(&self) -> Option<&CouponCode> {
        self.discount_code.as_ref()
    }

    /// Payment method
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Payment status
    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// Gateway reference of the confirmed payment
    pub fn payment_reference(&self) -> Option<&str> {
        self.payment_reference.as_deref()
    }

    /// Reason reported with the last failed payment
    pub fn payment_failure_reason(&self) -> Option<&str> {
        self.payment_failure_reason.as_deref()
    }

    /// Whether the coupon usage has been counted for this order
    pub fn coupon_redeemed(&self) -> bool {
        self.coupon_redeemed
    }

    /// Current status
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Status history, oldest first
    pub fn history(&self) -> &[StatusEntry] {
        &self.history
    }

    /// Estimated delivery time
    pub fn estimated_delivery(&self) -> Timestamp {
        self.estimated_delivery
    }

    /// Actual delivery time
    pub fn delivered_at(&self) -> Option<Timestamp> {
        self.delivered_at
    }

    /// Special instructions
    pub fn special_instructions(&self) -> Option<&str> {
        self.special_instructions.as_deref()
    }

    /// Customer rating
    pub fn rating(&self) -> Option<&Rating> {
        self.rating.as_ref()
    }

    /// Requested or paid refund amount
    pub fn refund_amount(&self) -> Price {
        self.refund_amount
    }

    /// Reason given for the refund
    pub fn refund_reason(&self) -> Option<&str> {
        self.refund_reason.as_deref()
    }

    /// Refund progress
    pub fn refund_status(&self) -> RefundStatus {
        self.refund_status
    }

    /// Compare-and-swap token
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Creation time
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last committed change
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Stamp the order as stored at `version`. Used by stores on a successful save.
    #[must_use]
    pub fn committed(mut self, version: u64, at: Timestamp) -> Self {
        self.version = version;
        self.updated_at = at;
        self
    }

    /// Move the order to `next`, recording the change in the history.
    ///
    /// Reaching `delivered` stamps the delivery time and settles cash payments.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::IllegalTransition`] for backward, same-state and
    /// out-of-terminal moves.
    pub fn transition(
        &mut self,
        next: OrderStatus,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }

        let timestamp = self.next_history_timestamp(now);

        self.status = next;
        self.history.push(StatusEntry {
            status: next,
            timestamp,
            note,
        });

        if next == OrderStatus::Delivered {
            self.delivered_at = Some(timestamp);

            if self.payment_method == PaymentMethod::Cash {
                self.payment_status = PaymentStatus::Completed;
            }
        }

        Ok(())
    }

    fn next_history_timestamp(&self, now: Timestamp) -> Timestamp {
        self.history
            .last()
            .map_or(now, |last| now.max(last.timestamp))
    }

    /// Assign a rider. Reassigning replaces the previous rider.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Terminal`] when the order is delivered or cancelled.
    pub fn assign_rider(&mut self, rider: RiderId) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::Terminal(self.status));
        }

        self.rider = Some(rider);

        Ok(())
    }

    /// Request a refund of `amount`, or of the full total when `None`.
    ///
    /// The order status is left alone. Returns the amount requested.
    ///
    /// # Errors
    ///
    /// - [`OrderError::RefundAlreadyRequested`]: a refund is pending or completed.
    /// - [`OrderError::Validation`]: the amount exceeds the order total.
    pub fn request_refund(
        &mut self,
        amount: Option<Price>,
        reason: String,
    ) -> Result<Price, OrderError> {
        if self.refund_status != RefundStatus::None {
            return Err(OrderError::RefundAlreadyRequested);
        }

        let amount = amount.unwrap_or(self.totals.total);

        if amount > self.totals.total {
            return Err(OrderError::Validation(format!(
                "refund of {amount} exceeds order total {}",
                self.totals.total
            )));
        }

        self.refund_status = RefundStatus::Pending;
        self.refund_amount = amount;
        self.refund_reason = Some(reason);

        Ok(amount)
    }

    /// Mark the pending refund as paid out.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::RefundNotPending`] when no refund is pending.
    pub fn complete_refund(&mut self) -> Result<(), OrderError> {
        if self.refund_status != RefundStatus::Pending {
            return Err(OrderError::RefundNotPending);
        }

        self.refund_status = RefundStatus::Completed;
        self.payment_status = PaymentStatus::Refunded;

        Ok(())
    }

    /// Rate a delivered order.
    ///
    /// # Errors
    ///
    /// - [`OrderError::Validation`]: score outside one to five.
    /// - [`OrderError::NotDelivered`], [`OrderError::AlreadyRated`].
    pub fn rate(
        &mut self,
        score: u8,
        review: Option<String>,
        now: Timestamp,
    ) -> Result<(), OrderError> {
        if !(1..=5).contains(&score) {
            return Err(OrderError::Validation(format!(
                "rating must be between 1 and 5, got {score}"
            )));
        }

        if self.status != OrderStatus::Delivered {
            return Err(OrderError::NotDelivered);
        }

        if self.rating.is_some() {
            return Err(OrderError::AlreadyRated);
        }

        self.rating = Some(Rating {
            score,
            review,
            timestamp: now,
        });

        Ok(())
    }

    /// Record a successful payment. Repeated confirmations are ignored.
    ///
    /// Returns `true` when the payment status changed.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::PaymentStateConflict`] for refunded orders.
    pub fn payment_confirmed(&mut self, reference: String) -> Result<bool, OrderError> {
        match self.payment_status {
            PaymentStatus::Completed => Ok(false),
            PaymentStatus::Refunded => Err(OrderError::PaymentStateConflict(self.payment_status)),
            PaymentStatus::Pending | PaymentStatus::Failed => {
                self.payment_status = PaymentStatus::Completed;
                self.payment_reference = Some(reference);
                self.payment_failure_reason = None;

                Ok(true)
            }
        }
    }

    /// Record a failed payment. Late failures for settled payments are ignored.
    ///
    /// Returns `true` when the payment status changed.
    pub fn payment_failed(&mut self, reason: String) -> bool {
        match self.payment_status {
            PaymentStatus::Completed | PaymentStatus::Refunded => false,
            PaymentStatus::Pending | PaymentStatus::Failed => {
                self.payment_status = PaymentStatus::Failed;
                self.payment_failure_reason = Some(reason);

                true
            }
        }
    }

    /// Whether the coupon's usage count is due to be incremented for this
    /// order: paid non-cash orders, or cash orders the restaurant confirmed.
    pub fn needs_coupon_redemption(&self) -> bool {
        if self.discount_code.is_none() || self.coupon_redeemed {
            return false;
        }

        match self.payment_method {
            PaymentMethod::Cash => self.history.iter().any(|entry| {
                !matches!(entry.status, OrderStatus::Placed | OrderStatus::Cancelled)
            }),
            PaymentMethod::Card | PaymentMethod::Upi | PaymentMethod::Wallet => matches!(
                self.payment_status,
                PaymentStatus::Completed | PaymentStatus::Refunded
            ),
        }
    }

    /// Record that the coupon usage has been counted.
    pub fn mark_coupon_redeemed(&mut self) {
        self.coupon_redeemed = true;
    }
}
