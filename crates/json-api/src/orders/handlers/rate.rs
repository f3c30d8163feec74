//! Rate Order Handler

use platter::ids::OrderId;
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
pub(crate) struct RateOrderRequest {
    /// One to five
    pub score: u8,

    #[serde(default)]
    pub review: Option<String>,
}

/// Rate Order Handler
///
/// Delivered orders can be rated once, by the customer who placed them.
#[endpoint(
    tags("orders"),
    summary = "Rate Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Rating saved"),
        (status_code = StatusCode::BAD_REQUEST, description = "Score out of range"),
        (status_code = StatusCode::FORBIDDEN, description = "Order belongs to another customer"),
        (status_code = StatusCode::CONFLICT, description = "Not delivered or already rated"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<RateOrderRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();

    let order = state
        .app
        .orders
        .rate(
            principal,
            OrderId::from_uuid(order.into_inner()),
            request.score,
            request.review,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
