//! Payment Confirmed Handler

use platter::ids::OrderId;
use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentConfirmedRequest {
    /// Gateway transaction reference
    pub reference: String,
}

/// Payment Confirmed Handler
///
/// Redelivered callbacks are accepted and leave the order unchanged.
#[endpoint(
    tags("payments"),
    summary = "Payment Confirmed",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Payment recorded"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin token required"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Payment already refunded"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<PaymentConfirmedRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state()?;
    depot.admin_or_403()?;

    let order = state
        .app
        .orders
        .on_payment_confirmed(
            OrderId::from_uuid(order.into_inner()),
            json.into_inner().reference,
        )
        .await
        .map_err(into_status_error)?;

    info!(order_number = %order.number(), "payment confirmed");

    Ok(Json(order.into()))
}
