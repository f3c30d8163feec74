//! Coupon Errors

use platter_app::domain::coupons::CouponsServiceError;
use salvo::http::StatusError;

use crate::errors::store_status;

pub(crate) fn into_status_error(error: CouponsServiceError) -> StatusError {
    match error {
        CouponsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Coupon code already exists")
        }
        CouponsServiceError::Invalid(message) => StatusError::bad_request().brief(message),
        CouponsServiceError::Store(error) => store_status(error),
    }
}
