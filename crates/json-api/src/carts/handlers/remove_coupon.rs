//! Remove Coupon Handler

use salvo::prelude::*;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
};

/// Remove Coupon Handler
#[endpoint(
    tags("cart"),
    summary = "Remove Coupon",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Coupon removed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.state()?;
    let principal = depot.principal_or_401()?;

    let cart = state
        .app
        .carts
        .remove_coupon(principal.customer)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
