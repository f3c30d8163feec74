//! Coupons service errors.

use platter::errors::ErrorKind;
use thiserror::Error;

use crate::stores::StoreError;

#[derive(Debug, Error)]
pub enum CouponsServiceError {
    #[error("coupon already exists")]
    AlreadyExists,

    #[error("invalid coupon: {0}")]
    Invalid(String),

    #[error(transparent)]
    Store(StoreError),
}

impl CouponsServiceError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyExists => ErrorKind::State,
            Self::Invalid(_) => ErrorKind::Validation,
            Self::Store(error) => error.kind(),
        }
    }
}

impl From<StoreError> for CouponsServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Duplicate => Self::AlreadyExists,
            error => Self::Store(error),
        }
    }
}
