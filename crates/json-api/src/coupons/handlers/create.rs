//! Create Coupon Handler

use jiff::Timestamp;
use platter::{
    coupons::{Coupon, CouponScope, DiscountKind},
    fixtures::parse_percent,
    ids::RestaurantId,
    prices::Price,
    products::Category,
};
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    coupons::{errors::into_status_error, models::CouponResponse},
    extensions::*,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum DiscountType {
    Percentage,
    Fixed,
}

/// Create Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateCouponRequest {
    pub code: String,

    #[serde(default)]
    pub description: String,

    pub discount_type: DiscountType,

    /// Percent off such as `"15"` or `"12.5%"`, for percentage coupons
    #[serde(default)]
    pub percent: Option<String>,

    /// Amount off in minor units, for fixed coupons
    #[serde(default)]
    pub amount: Option<u64>,

    #[serde(default)]
    pub max_discount: Option<u64>,

    #[serde(default)]
    pub min_order_value: u64,

    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// Defaults to one redemption per customer
    #[serde(default = "one")]
    pub per_user_limit: Option<u32>,

    /// RFC 3339 instant
    #[serde(default)]
    pub starts_at: Option<String>,

    /// RFC 3339 instant
    #[serde(default)]
    pub expires_at: Option<String>,

    /// Restricts the coupon to these restaurants
    #[serde(default)]
    pub restaurants: Vec<Uuid>,

    /// Restricts the coupon to carts holding one of these categories
    #[serde(default)]
    pub categories: Vec<String>,
}

#[expect(
    clippy::unnecessary_wraps,
    reason = "serde default functions must return the field type"
)]
fn one() -> Option<u32> {
    Some(1)
}

fn timestamp(value: Option<&str>, field: &str) -> Result<Option<Timestamp>, StatusError> {
    value
        .map(str::parse::<Timestamp>)
        .transpose()
        .or_400(&format!("Invalid {field}"))
}

impl CreateCouponRequest {
    fn into_coupon(self) -> Result<Coupon, StatusError> {
        let discount = match self.discount_type {
            DiscountType::Percentage => {
                let percent = self.percent.as_deref().ok_or_else(|| {
                    StatusError::bad_request().brief("Percentage coupons need a percent")
                })?;

                DiscountKind::Percentage {
                    percent: parse_percent(percent).or_400("Invalid percent")?,
                }
            }
            DiscountType::Fixed => DiscountKind::Fixed {
                amount: self.amount.map(Price::new).ok_or_else(|| {
                    StatusError::bad_request().brief("Fixed coupons need an amount")
                })?,
            },
        };

        let scope = if !self.restaurants.is_empty() {
            CouponScope::Restaurants {
                restaurants: self.restaurants.into_iter().map(RestaurantId::from_uuid).collect(),
            }
        } else if !self.categories.is_empty() {
            CouponScope::Categories {
                categories: self
                    .categories
                    .iter()
                    .map(|name| {
                        Category::parse(name).ok_or_else(|| {
                            StatusError::bad_request().brief(format!("Unknown category: {name}"))
                        })
                    })
                    .collect::<Result<_, _>>()?,
            }
        } else {
            CouponScope::All
        };

        let mut coupon = Coupon::new(self.code, discount);

        coupon.description = self.description;
        coupon.max_discount = self.max_discount.map(Price::new);
        coupon.min_order_value = Price::new(self.min_order_value);
        coupon.scope = scope;
        coupon.usage_limit = self.usage_limit;
        coupon.per_user_limit = self.per_user_limit;
        coupon.starts_at = timestamp(self.starts_at.as_deref(), "starts_at")?;
        coupon.expires_at = timestamp(self.expires_at.as_deref(), "expires_at")?;

        Ok(coupon)
    }
}

/// Create Coupon Handler
#[endpoint(
    tags("coupons"),
    summary = "Create Coupon",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Coupon created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid coupon"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin token required"),
        (status_code = StatusCode::CONFLICT, description = "Code already exists"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCouponRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CouponResponse>, StatusError> {
    let state = depot.state()?;
    depot.admin_or_403()?;

    let coupon = json.into_inner().into_coupon()?;

    let created = state
        .app
        .coupons
        .create_coupon(coupon)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/coupons/{}", created.code), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(created.into()))
}
