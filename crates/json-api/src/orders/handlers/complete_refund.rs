//! Complete Refund Handler

use platter::ids::OrderId;
use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
};

/// Complete Refund Handler
///
/// Marks a pending refund as paid out.
#[endpoint(
    tags("orders"),
    summary = "Complete Refund",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Refund completed"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin token required"),
        (status_code = StatusCode::CONFLICT, description = "No refund pending"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state()?;
    let principal = depot.principal_or_401()?;

    let order = state
        .app
        .orders
        .complete_refund(principal, OrderId::from_uuid(order.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
