//! Store errors.

use platter::errors::ErrorKind as DomainErrorKind;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record was modified concurrently")]
    Conflict,

    #[error("record already exists")]
    Duplicate,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("stored document could not be (de)serialised")]
    Serialization(#[from] serde_json::Error),

    #[error("stored value out of range: {0}")]
    OutOfRange(String),
}

impl StoreError {
    #[must_use]
    pub fn kind(&self) -> DomainErrorKind {
        match self {
            Self::NotFound => DomainErrorKind::NotFound,
            Self::Conflict | Self::Duplicate => DomainErrorKind::State,
            Self::Sql(_) | Self::Serialization(_) | Self::OutOfRange(_) => {
                DomainErrorKind::ExternalService
            }
        }
    }
}

impl From<Error> for StoreError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::Duplicate,
            Some(ErrorKind::ForeignKeyViolation) => Self::NotFound,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
