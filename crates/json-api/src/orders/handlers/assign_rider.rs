//! Assign Rider Handler

use platter::ids::{OrderId, RiderId};
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
pub(crate) struct AssignRiderRequest {
    pub rider: Uuid,
}

/// Assign Rider Handler
#[endpoint(
    tags("orders"),
    summary = "Assign Rider",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Rider assigned"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin token required"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order already finished"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<AssignRiderRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state()?;
    let principal = depot.principal_or_401()?;

    let order = state
        .app
        .orders
        .assign_rider(
            principal,
            OrderId::from_uuid(order.into_inner()),
            RiderId::from_uuid(json.into_inner().rider),
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
