//! List Coupons Handler

use jiff::Timestamp;
use salvo::prelude::*;

use crate::{
    coupons::{errors::into_status_error, models::CouponResponse},
    extensions::*,
};

/// List Coupons Handler
///
/// Coupons that are active, started, unexpired and not used up.
#[endpoint(
    tags("coupons"),
    summary = "List Coupons",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Current offers"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<CouponResponse>>, StatusError> {
    let state = depot.state()?;
    depot.principal_or_401()?;

    let coupons = state
        .app
        .coupons
        .list_active(Timestamp::now())
        .await
        .map_err(into_status_error)?;

    Ok(Json(coupons.iter().map(CouponResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use platter::{
        coupons::{Coupon, CouponScope, DiscountKind},
        prices::Price,
        products::Category,
    };
    use platter_app::domain::coupons::MockCouponsService;
    use rust_decimal::Decimal;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{MockApp, customer, service_as};

    use super::*;

    #[tokio::test]
    async fn test_list_coupons_describes_discounts() -> TestResult {
        let mut percent = Coupon::new(
            "WELCOME50",
            DiscountKind::Percentage {
                percent: Decimal::from(50),
            },
        );
        percent.max_discount = Some(Price::new(10_000));

        let mut fixed = Coupon::new("SWEET20", DiscountKind::Fixed { amount: Price::new(2000) });
        fixed.scope = CouponScope::Categories {
            categories: vec![Category::Desserts],
        };

        let mut coupons = MockCouponsService::new();

        coupons
            .expect_list_active()
            .once()
            .return_once(move |_| Ok(vec![fixed, percent]));

        let service = service_as(
            customer(),
            MockApp {
                coupons,
                ..MockApp::default()
            },
            Router::with_path("coupons").get(handler),
        );

        let mut res = TestClient::get("http://example.com/coupons").send(&service).await;

        let body: Vec<CouponResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.len(), 2);
        assert_eq!(body[0].code, "SWEET20");
        assert_eq!(body[0].discount_type, "fixed");
        assert_eq!(body[0].amount, Some(2000));
        assert_eq!(body[0].applies_to, "categories");
        assert_eq!(body[0].categories, vec![Category::Desserts.as_str().to_string()]);
        assert_eq!(body[1].percent.as_deref(), Some("50"));
        assert_eq!(body[1].max_discount, Some(10_000));

        Ok(())
    }
}
