//! Remove Item Handler

use platter::ids::ProductId;
use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
};

/// Remove Item Handler
///
/// Drops every line of the product, whatever its add-ons.
#[endpoint(
    tags("cart"),
    summary = "Remove Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Item removed"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not in cart"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.state()?;
    let principal = depot.principal_or_401()?;

    let cart = state
        .app
        .carts
        .remove_item(principal.customer, ProductId::from_uuid(product.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
