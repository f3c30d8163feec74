//! Payment Failed Handler

use platter::ids::OrderId;
use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentFailedRequest {
    /// Failure reason reported by the gateway
    pub reason: String,
}

/// Payment Failed Handler
///
/// Ignored once the payment has completed or been refunded.
#[endpoint(
    tags("payments"),
    summary = "Payment Failed",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Failure recorded"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin token required"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<PaymentFailedRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state()?;
    depot.admin_or_403()?;

    let order = state
        .app
        .orders
        .on_payment_failed(OrderId::from_uuid(order.into_inner()), json.into_inner().reason)
        .await
        .map_err(into_status_error)?;

    warn!(
        order_number = %order.number(),
        payment_status = order.payment_status().as_str(),
        "payment failure reported"
    );

    Ok(Json(order.into()))
}
