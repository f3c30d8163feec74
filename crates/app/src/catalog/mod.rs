//! Catalog
//!
//! Read-only access to restaurants and their menus. Carts copy what they
//! need from here at add time, so later menu changes never re-price a cart.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use platter::{
    errors::ErrorKind,
    ids::{ProductId, RestaurantId},
    products::{Product, Restaurant},
};
use sqlx::Error;
use thiserror::Error;

mod fixture;
mod postgres;

pub use fixture::FixtureCatalog;
pub use postgres::PgCatalog;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog entry not found")]
    NotFound,

    #[error("catalog lookup timed out")]
    Timeout,

    #[error("catalog unavailable")]
    Unavailable(#[source] Error),
}

impl CatalogError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::Timeout | Self::Unavailable(_) => ErrorKind::ExternalService,
        }
    }
}

impl From<Error> for CatalogError {
    fn from(error: Error) -> Self {
        match error {
            Error::RowNotFound => Self::NotFound,
            error => Self::Unavailable(error),
        }
    }
}

#[automock]
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Look up a product with its add-ons.
    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError>;

    /// Look up a restaurant.
    async fn get_restaurant(&self, id: RestaurantId) -> Result<Restaurant, CatalogError>;
}

/// Run a catalog lookup, giving up with [`CatalogError::Timeout`] after `limit`.
///
/// # Errors
///
/// Returns the lookup's own error, or [`CatalogError::Timeout`].
pub async fn within<T>(
    limit: Duration,
    lookup: impl Future<Output = Result<T, CatalogError>>,
) -> Result<T, CatalogError> {
    tokio::time::timeout(limit, lookup)
        .await
        .map_err(|_elapsed| CatalogError::Timeout)?
}
