//! Error mappings shared by every resource.

use platter::{coupons::Rejection, errors::ErrorKind};
use platter_app::{catalog::CatalogError, stores::StoreError};
use salvo::http::StatusError;
use tracing::error;

use crate::observability::record_coupon_rejection;

/// Map a domain rule violation onto its status, keeping the message.
pub(crate) fn domain_status(kind: ErrorKind, message: String) -> StatusError {
    match kind {
        ErrorKind::Validation => StatusError::bad_request().brief(message),
        ErrorKind::NotFound => StatusError::not_found().brief(message),
        ErrorKind::State => StatusError::conflict().brief(message),
        ErrorKind::ExternalService => {
            error!("unexpected external failure: {message}");

            StatusError::bad_gateway()
        }
    }
}

/// A refused coupon is a 422 whose brief reads `CODE: message`.
pub(crate) fn rejection_status(rejection: Rejection) -> StatusError {
    record_coupon_rejection(rejection.code());

    StatusError::unprocessable_entity()
        .brief(format!("{}: {}", rejection.code(), rejection.message()))
}

pub(crate) fn catalog_status(error: CatalogError) -> StatusError {
    match error {
        CatalogError::NotFound => StatusError::not_found().brief("Product or restaurant not found"),
        CatalogError::Timeout => {
            error!("catalog lookup timed out");

            StatusError::gateway_timeout()
        }
        CatalogError::Unavailable(source) => {
            error!("catalog unavailable: {source}");

            StatusError::bad_gateway()
        }
    }
}

pub(crate) fn store_status(error: StoreError) -> StatusError {
    match error {
        StoreError::NotFound => StatusError::not_found(),
        StoreError::Conflict => {
            StatusError::conflict().brief("Modified concurrently, please retry")
        }
        StoreError::Duplicate => StatusError::conflict().brief("Already exists"),
        error @ (StoreError::Sql(_)
        | StoreError::Serialization(_)
        | StoreError::OutOfRange(_)) => {
            error!("storage failure: {error}");

            StatusError::internal_server_error()
        }
    }
}
