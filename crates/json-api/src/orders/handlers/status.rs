//! Update Order Status Handler

use platter::{ids::OrderId, orders::OrderStatus};
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

/// Update Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateStatusRequest {
    /// Target status, e.g. `confirmed`, `picked_up`, `cancelled`
    pub status: String,

    #[serde(default)]
    pub note: Option<String>,
}

/// Update Order Status Handler
///
/// Staff may move an order along its lifecycle; customers may only cancel
/// their own placed orders.
#[endpoint(
    tags("orders"),
    summary = "Update Order Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Status updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller may not make this change"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Illegal transition"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();

    let status = OrderStatus::parse(&request.status).ok_or_else(|| {
        StatusError::bad_request().brief(format!("Unknown order status: {}", request.status))
    })?;

    let order = state
        .app
        .orders
        .update_status(principal, OrderId::from_uuid(order.into_inner()), status, request.note)
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
