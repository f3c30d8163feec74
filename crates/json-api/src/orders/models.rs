//! Order Responses

use std::string::ToString;

use platter::{
    ids::RiderId,
    orders::{DeliveryAddress, Order, PaymentMethod, Rating, StatusEntry},
};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::carts::models::{LineItemResponse, TotalsResponse};

/// Delivery address, as sent by clients and echoed back on orders.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddressBody {
    pub street: String,
    pub city: String,

    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub zip_code: String,

    #[serde(default)]
    pub country: String,

    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,

    /// Label such as "Home" or "Work"
    #[serde(default)]
    pub label: Option<String>,
}

impl From<AddressBody> for DeliveryAddress {
    fn from(body: AddressBody) -> Self {
        Self {
            street: body.street,
            city: body.city,
            state: body.state,
            zip_code: body.zip_code,
            country: body.country,
            latitude: body.latitude,
            longitude: body.longitude,
            label: body.label,
        }
    }
}

impl From<&DeliveryAddress> for AddressBody {
    fn from(address: &DeliveryAddress) -> Self {
        Self {
            street: address.street.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip_code: address.zip_code.clone(),
            country: address.country.clone(),
            latitude: address.latitude,
            longitude: address.longitude,
            label: address.label.clone(),
        }
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PaymentMethodBody {
    Card,
    Upi,
    Wallet,
    Cash,
}

impl From<PaymentMethodBody> for PaymentMethod {
    fn from(body: PaymentMethodBody) -> Self {
        match body {
            PaymentMethodBody::Card => PaymentMethod::Card,
            PaymentMethodBody::Upi => PaymentMethod::Upi,
            PaymentMethodBody::Wallet => PaymentMethod::Wallet,
            PaymentMethodBody::Cash => PaymentMethod::Cash,
        }
    }
}

/// One status change.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StatusEntryResponse {
    pub status: String,
    pub timestamp: String,
    pub note: Option<String>,
}

impl From<&StatusEntry> for StatusEntryResponse {
    fn from(entry: &StatusEntry) -> Self {
        Self {
            status: entry.status.as_str().to_string(),
            timestamp: entry.timestamp.to_string(),
            note: entry.note.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RatingResponse {
    pub score: u8,
    pub review: Option<String>,
    pub timestamp: String,
}

impl From<&Rating> for RatingResponse {
    fn from(rating: &Rating) -> Self {
        Self {
            score: rating.score,
            review: rating.review.clone(),
            timestamp: rating.timestamp.to_string(),
        }
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    pub id: Uuid,

    /// Human-readable order number, `ORD-<millis>-<sequence>`
    pub number: String,
    pub customer: Uuid,
    pub restaurant: Uuid,
    pub rider: Option<Uuid>,
    pub items: Vec<LineItemResponse>,
    pub delivery_address: AddressBody,
    pub totals: TotalsResponse,
    pub discount_code: Option<String>,
    pub payment_method: String,
    pub payment_status: String,
    pub payment_reference: Option<String>,
    pub payment_failure_reason: Option<String>,
    pub status: String,

    /// Every status the order has been in, oldest first
    pub history: Vec<StatusEntryResponse>,
    pub estimated_delivery: String,
    pub delivered_at: Option<String>,
    pub special_instructions: Option<String>,
    pub rating: Option<RatingResponse>,

    /// Refunded amount in minor units
    pub refund_amount: u64,
    pub refund_reason: Option<String>,
    pub refund_status: String,
    pub version: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().into_uuid(),
            number: order.number().to_string(),
            customer: order.customer().into_uuid(),
            restaurant: order.restaurant().into_uuid(),
            rider: order.rider().map(RiderId::into_uuid),
            items: order.items().iter().map(Into::into).collect(),
            delivery_address: order.delivery_address().into(),
            totals: order.totals().into(),
            discount_code: order.discount_code().map(ToString::to_string),
            payment_method: order.payment_method().as_str().to_string(),
            payment_status: order.payment_status().as_str().to_string(),
            payment_reference: order.payment_reference().map(ToString::to_string),
            payment_failure_reason: order.payment_failure_reason().map(ToString::to_string),
            status: order.status().as_str().to_string(),
            history: order.history().iter().map(Into::into).collect(),
            estimated_delivery: order.estimated_delivery().to_string(),
            delivered_at: order.delivered_at().as_ref().map(ToString::to_string),
            special_instructions: order.special_instructions().map(ToString::to_string),
            rating: order.rating().map(Into::into),
            refund_amount: *order.refund_amount(),
            refund_reason: order.refund_reason().map(ToString::to_string),
            refund_status: order.refund_status().as_str().to_string(),
            version: order.version(),
            created_at: order.created_at().to_string(),
            updated_at: order.updated_at().to_string(),
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self::from(&order)
    }
}
