//! List Orders Handler

use salvo::prelude::*;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
};

/// List Orders Handler
///
/// The caller's own orders, newest first.
#[endpoint(
    tags("orders"),
    summary = "List Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order history"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<OrderResponse>>, StatusError> {
    let state = depot.state()?;
    let principal = depot.principal_or_401()?;

    let orders = state
        .app
        .orders
        .list_orders(principal)
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use platter_app::domain::orders::MockOrdersService;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{MockApp, TEST_CUSTOMER, customer, order, service_as};

    use super::*;

    #[tokio::test]
    async fn test_list_orders_returns_history() -> TestResult {
        let placed = vec![order()?, order()?];
        let mut orders = MockOrdersService::new();

        orders
            .expect_list_orders()
            .once()
            .withf(|principal| principal.customer == TEST_CUSTOMER)
            .return_once(move |_| Ok(placed));

        let service = service_as(
            customer(),
            MockApp {
                orders,
                ..MockApp::default()
            },
            Router::with_path("orders").get(handler),
        );

        let mut res = TestClient::get("http://example.com/orders").send(&service).await;

        let body: Vec<OrderResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.len(), 2);
        assert!(body.iter().all(|order| order.customer == TEST_CUSTOMER.into_uuid()));

        Ok(())
    }
}
