//! Order Errors

use platter_app::domain::orders::OrdersServiceError;
use salvo::http::StatusError;

use crate::errors::{catalog_status, domain_status, rejection_status, store_status};

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::Order(error) => domain_status(error.kind(), error.to_string()),
        OrdersServiceError::Cart(error) => domain_status(error.kind(), error.to_string()),
        OrdersServiceError::CouponRejected(rejection) => rejection_status(rejection),
        OrdersServiceError::Forbidden => {
            StatusError::forbidden().brief("Not allowed to act on this order")
        }
        OrdersServiceError::Catalog(error) => catalog_status(error),
        OrdersServiceError::Store(error) => store_status(error),
    }
}
