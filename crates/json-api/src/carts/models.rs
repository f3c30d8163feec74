//! Cart Responses

use platter::{cart::Cart, ids::RestaurantId, items::LineItem, pricing::Totals};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An add-on chosen for a line.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddOnResponse {
    pub name: String,

    /// Price per unit in minor units
    pub price: u64,
}

/// One product line of a cart or order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LineItemResponse {
    pub product: Uuid,
    pub name: String,
    pub category: String,

    /// Unit price in minor units, fixed when the line was added
    pub unit_price: u64,
    pub quantity: u32,
    pub add_ons: Vec<AddOnResponse>,
    pub notes: Option<String>,

    /// Unit price with add-ons, times quantity
    pub line_total: Option<u64>,
}

impl From<&LineItem> for LineItemResponse {
    fn from(line: &LineItem) -> Self {
        Self {
            product: line.product.into_uuid(),
            name: line.name.clone(),
            category: line.category.as_str().to_string(),
            unit_price: *line.unit_price,
            quantity: line.quantity,
            add_ons: line
                .add_ons
                .iter()
                .map(|add_on| AddOnResponse {
                    name: add_on.name.clone(),
                    price: *add_on.price,
                })
                .collect(),
            notes: line.notes.clone(),
            line_total: line.line_total().map(|total| *total),
        }
    }
}

/// Price breakdown, all in minor units.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TotalsResponse {
    pub subtotal: u64,
    pub tax: u64,
    pub delivery_fee: u64,
    pub discount: u64,
    pub total: u64,
}

impl From<&Totals> for TotalsResponse {
    fn from(totals: &Totals) -> Self {
        Self {
            subtotal: *totals.subtotal,
            tax: *totals.tax,
            delivery_fee: *totals.delivery_fee,
            discount: *totals.discount,
            total: *totals.total,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    pub owner: Uuid,

    /// Restaurant every line comes from, unset while the cart is empty
    pub restaurant: Option<Uuid>,
    pub items: Vec<LineItemResponse>,
    pub discount_code: Option<String>,
    pub totals: TotalsResponse,
    pub version: u64,
    pub updated_at: String,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        Self {
            owner: cart.owner().into_uuid(),
            restaurant: cart.restaurant().map(RestaurantId::into_uuid),
            items: cart.items().iter().map(Into::into).collect(),
            discount_code: cart.discount_code().map(ToString::to_string),
            totals: cart.totals().into(),
            version: cart.version(),
            updated_at: cart.updated_at().to_string(),
        }
    }
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self::from(&cart)
    }
}
