//! Cart Errors

use platter_app::domain::carts::CartsServiceError;
use salvo::http::StatusError;

use crate::errors::{catalog_status, domain_status, rejection_status, store_status};

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::Cart(error) => domain_status(error.kind(), error.to_string()),
        CartsServiceError::CouponRejected(rejection) => rejection_status(rejection),
        CartsServiceError::Catalog(error) => catalog_status(error),
        CartsServiceError::Store(error) => store_status(error),
    }
}
