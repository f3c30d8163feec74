//! Get Cart Handler

use salvo::prelude::*;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
};

/// Get Cart Handler
///
/// Callers who have never saved a cart get an empty one.
#[endpoint(
    tags("cart"),
    summary = "Get Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Current cart"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.state()?;
    let principal = depot.principal_or_401()?;

    let cart = state
        .app
        .carts
        .get_cart(principal.customer)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
