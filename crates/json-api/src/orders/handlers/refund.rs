//! Request Refund Handler

use platter::{ids::OrderId, prices::Price};
use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RefundRequest {
    /// Amount in minor units. Omit to refund the whole total.
    #[serde(default)]
    pub amount: Option<u64>,

    pub reason: String,
}

/// Request Refund Handler
#[endpoint(
    tags("orders"),
    summary = "Request Refund",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Refund pending"),
        (status_code = StatusCode::BAD_REQUEST, description = "Amount exceeds the order total"),
        (status_code = StatusCode::FORBIDDEN, description = "Order belongs to another customer"),
        (status_code = StatusCode::CONFLICT, description = "Refund already requested"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<RefundRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();

    let order = state
        .app
        .orders
        .request_refund(
            principal,
            OrderId::from_uuid(order.into_inner()),
            request.amount.map(Price::new),
            request.reason,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
