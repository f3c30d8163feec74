//! Orders service errors.

use platter::{cart::CartError, coupons::Rejection, errors::ErrorKind, orders::OrderError};
use thiserror::Error;

use crate::{catalog::CatalogError, stores::StoreError};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("coupon rejected at checkout: {0}")]
    CouponRejected(Rejection),

    #[error("not allowed to act on this order")]
    Forbidden,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrdersServiceError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Order(error) => error.kind(),
            Self::Cart(error) => error.kind(),
            Self::CouponRejected(_) => ErrorKind::Validation,
            Self::Forbidden => ErrorKind::State,
            Self::Catalog(error) => error.kind(),
            Self::Store(error) => error.kind(),
        }
    }
}
