//! Apply Coupon Handler

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
};

/// Apply Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyCouponRequest {
    /// Coupon code, matched case-insensitively
    pub code: String,
}

/// Apply Coupon Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyCouponResponse {
    /// Discount the coupon gives on the current cart, in minor units
    pub discount: u64,

    pub cart: CartResponse,
}

/// Apply Coupon Handler
///
/// A rejected coupon answers 422 with the reason code in `detail` and leaves
/// the cart untouched.
#[endpoint(
    tags("cart"),
    summary = "Apply Coupon",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Coupon applied"),
        (status_code = StatusCode::CONFLICT, description = "Cart is empty"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Coupon rejected"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ApplyCouponRequest>,
    depot: &mut Depot,
) -> Result<Json<ApplyCouponResponse>, StatusError> {
    let state = depot.state()?;
    let principal = depot.principal_or_401()?;

    let (cart, discount) = state
        .app
        .carts
        .apply_coupon(principal.customer, json.into_inner().code)
        .await
        .map_err(into_status_error)?;

    Ok(Json(ApplyCouponResponse {
        discount: *discount,
        cart: cart.into(),
    }))
}

#[cfg(test)]
mod tests {
    use platter::{cart::CartError, coupons::Rejection, prices::Price};
    use platter_app::domain::carts::{CartsServiceError, MockCartsService};
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{MockApp, TEST_CUSTOMER, cart, customer, service_as};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        service_as(
            customer(),
            MockApp {
                carts,
                ..MockApp::default()
            },
            Router::with_path("cart/coupon").post(handler),
        )
    }

    #[tokio::test]
    async fn test_apply_coupon_returns_discount() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_apply_coupon()
            .once()
            .withf(|owner, code| *owner == TEST_CUSTOMER && code == "welcome50")
            .return_once(|_, _| Ok((cart(), Price::new(190))));

        let mut res = TestClient::post("http://example.com/cart/coupon")
            .json(&json!({ "code": "welcome50" }))
            .send(&make_service(carts))
            .await;

        let body: ApplyCouponResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.discount, 190);

        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_coupon_returns_422_with_reason() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_apply_coupon()
            .once()
            .return_once(|_, _| Err(CartsServiceError::CouponRejected(Rejection::Expired)));

        let mut res = TestClient::post("http://example.com/cart/coupon")
            .add_header("accept", "application/json", true)
            .json(&json!({ "code": "OLD10" }))
            .send(&make_service(carts))
            .await;

        let body: serde_json::Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(
            body["error"]["brief"],
            json!(format!("EXPIRED: {}", Rejection::Expired.message()))
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_coupon_on_empty_cart_returns_409() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_apply_coupon()
            .once()
            .return_once(|_, _| Err(CartsServiceError::Cart(CartError::EmptyCart)));

        let res = TestClient::post("http://example.com/cart/coupon")
            .json(&json!({ "code": "SAVE10" }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
