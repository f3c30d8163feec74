//! Order Receipt Handler

use platter::{ids::OrderId, receipt::Receipt};
use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, orders::errors::into_status_error};

/// Order Receipt Handler
///
/// Renders the order as a plain-text table in the configured currency.
#[endpoint(
    tags("orders"),
    summary = "Order Receipt",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Plain-text receipt"),
        (status_code = StatusCode::FORBIDDEN, description = "Order belongs to another customer"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.state()?;
    let principal = depot.principal_or_401()?;

    let order = state
        .app
        .orders
        .get_order(principal, OrderId::from_uuid(order.into_inner()))
        .await
        .map_err(into_status_error)?;

    let receipt = Receipt::for_order(&order, state.currency)
        .or_500("failed to build receipt")?
        .render()
        .or_500("failed to render receipt")?;

    res.render(Text::Plain(receipt));

    Ok(())
}
