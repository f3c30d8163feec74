//! Order, payment and refund statuses

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fulfilment status of an order.
///
/// The forward chain is `placed → confirmed → preparing → ready → picked_up →
/// delivered`; `cancelled` can be reached from any non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created from a cart
    Placed,

    /// Accepted by the restaurant
    Confirmed,

    /// Being cooked
    Preparing,

    /// Waiting for a rider
    Ready,

    /// On the way
    PickedUp,

    /// Handed to the customer
    Delivered,

    /// Abandoned
    Cancelled,
}

impl OrderStatus {
    /// Every status, forward chain first.
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Placed,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::PickedUp,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Whether no further transition is allowed.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }

        match (self.chain_position(), next.chain_position()) {
            (Some(from), Some(to)) => to > from,
            (Some(_), None) => next == OrderStatus::Cancelled,
            (None, _) => false,
        }
    }

    fn chain_position(self) -> Option<u8> {
        match self {
            OrderStatus::Placed => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Preparing => Some(2),
            OrderStatus::Ready => Some(3),
            OrderStatus::PickedUp => Some(4),
            OrderStatus::Delivered => Some(5),
            OrderStatus::Cancelled => None,
        }
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a wire name.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card via the gateway
    Card,

    /// UPI via the gateway
    Upi,

    /// Wallet via the gateway
    Wallet,

    /// Cash on delivery
    Cash,
}

impl PaymentMethod {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Wallet => "wallet",
            PaymentMethod::Cash => "cash",
        }
    }
}

/// Payment progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting the gateway, or delivery for cash
    Pending,

    /// Money received
    Completed,

    /// Gateway reported a failure
    Failed,

    /// Money returned
    Refunded,
}

impl PaymentStatus {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Refund progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    /// No refund requested
    #[default]
    None,

    /// Requested, not yet paid out
    Pending,

    /// Paid out
    Completed,
}

impl RefundStatus {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            RefundStatus::None => "none",
            RefundStatus::Pending => "pending",
            RefundStatus::Completed => "completed",
        }
    }
}
