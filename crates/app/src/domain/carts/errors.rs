//! Carts service errors.

use platter::{cart::CartError, coupons::Rejection, errors::ErrorKind};
use thiserror::Error;

use crate::{catalog::CatalogError, stores::StoreError};

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("coupon rejected: {0}")]
    CouponRejected(Rejection),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CartsServiceError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Cart(error) => error.kind(),
            Self::CouponRejected(_) => ErrorKind::Validation,
            Self::Catalog(error) => error.kind(),
            Self::Store(error) => error.kind(),
        }
    }
}
