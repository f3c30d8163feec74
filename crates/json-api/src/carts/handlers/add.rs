//! Add Item Handler

use platter::{
    cart::{AddItemOutcome, NewLineItem},
    ids::ProductId,
};
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

/// Add Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddItemRequest {
    /// Catalog product to add
    pub product: Uuid,

    /// Units to add, at least one
    pub quantity: i64,

    /// Names of add-ons offered by the product
    #[serde(default)]
    pub add_ons: Vec<String>,

    /// Preparation notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Add Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddItemResponse {
    /// `added`, `merged` or `restaurant_switched`
    pub outcome: String,

    /// Quantity of the line after merging
    pub quantity: Option<u32>,

    /// Lines dropped because they came from another restaurant
    pub cleared: Option<usize>,

    pub cart: CartResponse,
}

impl AddItemResponse {
    fn new(outcome: AddItemOutcome, cart: CartResponse) -> Self {
        let (name, quantity, cleared) = match outcome {
            AddItemOutcome::Added => ("added", None, None),
            AddItemOutcome::Merged { quantity } => ("merged", Some(quantity), None),
            AddItemOutcome::RestaurantSwitched { cleared } => {
                ("restaurant_switched", None, Some(cleared))
            }
        };

        Self {
            outcome: name.to_string(),
            quantity,
            cleared,
            cart,
        }
    }
}

/// Add Item Handler
///
/// Adding a product from another restaurant empties the cart first.
#[endpoint(
    tags("cart"),
    summary = "Add Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Item added"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid quantity or add-on"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::CONFLICT, description = "Product unavailable or restaurant closed"),
        (status_code = StatusCode::GATEWAY_TIMEOUT, description = "Catalog timed out"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<AddItemRequest>,
    depot: &mut Depot,
) -> Result<Json<AddItemResponse>, StatusError> {
    let state = depot.state()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();

    let (cart, outcome) = state
        .app
        .carts
        .add_item(
            principal.customer,
            ProductId::from_uuid(request.product),
            NewLineItem {
                quantity: request.quantity,
                add_ons: request.add_ons,
                notes: request.notes,
            },
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(AddItemResponse::new(outcome, cart.into())))
}

#[cfg(test)]
mod tests {
    use platter::cart::CartError;
    use platter_app::{
        catalog::CatalogError,
        domain::carts::{CartsServiceError, MockCartsService},
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{MockApp, TEST_CUSTOMER, cart, customer, product, service_as};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        service_as(
            customer(),
            MockApp {
                carts,
                ..MockApp::default()
            },
            Router::with_path("cart/add").post(handler),
        )
    }

    #[tokio::test]
    async fn test_add_item_passes_request_through() -> TestResult {
        let product = product().id;
        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .withf(move |owner, id, request| {
                *owner == TEST_CUSTOMER
                    && *id == product
                    && *request
                        == NewLineItem {
                            quantity: 2,
                            add_ons: vec!["Mint chutney".to_string()],
                            notes: Some("extra spicy".to_string()),
                        }
            })
            .return_once(|_, _, _| Ok((cart(), AddItemOutcome::Added)));

        let mut res = TestClient::post("http://example.com/cart/add")
            .json(&json!({
                "product": product.into_uuid(),
                "quantity": 2,
                "add_ons": ["Mint chutney"],
                "notes": "extra spicy",
            }))
            .send(&make_service(carts))
            .await;

        let body: AddItemResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.outcome, "added");
        assert_eq!(body.cart.items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_reports_restaurant_switch() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .return_once(|_, _, _| Ok((cart(), AddItemOutcome::RestaurantSwitched { cleared: 3 })));

        let mut res = TestClient::post("http://example.com/cart/add")
            .json(&json!({ "product": Uuid::now_v7(), "quantity": 1 }))
            .send(&make_service(carts))
            .await;

        let body: AddItemResponse = res.take_json().await?;

        assert_eq!(body.outcome, "restaurant_switched");
        assert_eq!(body.cleared, Some(3));
        assert_eq!(body.quantity, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_invalid_quantity_returns_400() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_add_item().once().return_once(|_, _, _| {
            Err(CartsServiceError::Cart(CartError::Validation(
                "quantity must be at least 1".to_string(),
            )))
        });

        let res = TestClient::post("http://example.com/cart/add")
            .json(&json!({ "product": Uuid::now_v7(), "quantity": 0 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_unavailable_product_returns_409() -> TestResult {
        let id = product().id;
        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .return_once(move |_, _, _| {
                Err(CartsServiceError::Cart(CartError::ProductUnavailable(id)))
            });

        let res = TestClient::post("http://example.com/cart/add")
            .json(&json!({ "product": id.into_uuid(), "quantity": 1 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_catalog_timeout_returns_504() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .return_once(|_, _, _| Err(CartsServiceError::Catalog(CatalogError::Timeout)));

        let res = TestClient::post("http://example.com/cart/add")
            .json(&json!({ "product": Uuid::now_v7(), "quantity": 1 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::GATEWAY_TIMEOUT));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_malformed_body_returns_400() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_add_item().never();

        let res = TestClient::post("http://example.com/cart/add")
            .json(&json!({ "product": "not-a-uuid", "quantity": 1 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
