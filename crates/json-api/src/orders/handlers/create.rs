//! Place Order Handler

use platter::orders::PlaceOrder;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    extensions::*,
    observability::record_order_placed,
    orders::{
        errors::into_status_error,
        models::{AddressBody, OrderResponse, PaymentMethodBody},
    },
};

/// Place Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PlaceOrderRequest {
    pub address: AddressBody,
    pub payment_method: PaymentMethodBody,

    /// Instructions for the restaurant or rider
    #[serde(default)]
    pub special_instructions: Option<String>,
}

impl From<PlaceOrderRequest> for PlaceOrder {
    fn from(request: PlaceOrderRequest) -> Self {
        PlaceOrder {
            address: request.address.into(),
            payment_method: request.payment_method.into(),
            special_instructions: request.special_instructions,
        }
    }
}

/// Place Order Handler
///
/// Turns the caller's cart into an order and empties the cart. An applied
/// coupon is validated again first.
#[endpoint(
    tags("orders"),
    summary = "Place Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Incomplete delivery address"),
        (status_code = StatusCode::CONFLICT, description = "Cart empty or restaurant closed"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Coupon no longer valid"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<PlaceOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state()?;
    let principal = depot.principal_or_401()?;

    let order = state
        .app
        .orders
        .place_order(principal, json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    record_order_placed();

    info!(order_number = %order.number(), total = *order.totals().total, "order placed");

    res.add_header(LOCATION, format!("/orders/{}", order.id()), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(order.into()))
}
