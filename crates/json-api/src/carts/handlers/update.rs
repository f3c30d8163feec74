//! Update Quantity Handler

use platter::ids::ProductId;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
};

/// Update Quantity Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateQuantityRequest {
    pub product: Uuid,

    /// New quantity. Zero or less removes the product.
    pub quantity: i64,
}

/// Update Quantity Handler
#[endpoint(
    tags("cart"),
    summary = "Update Quantity",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Quantity updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not in cart"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<UpdateQuantityRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.state()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();

    let cart = state
        .app
        .carts
        .update_quantity(
            principal.customer,
            ProductId::from_uuid(request.product),
            request.quantity,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
