//! App Context

use std::sync::Arc;

use platter::fixtures::Fixture;
use thiserror::Error;
use tracing::info;

use crate::{
    auth::AuthService,
    catalog::{FixtureCatalog, PgCatalog},
    database::{self, Db},
    domain::{
        carts::{CartsService, DefaultCartsService},
        coupons::{CouponsService, DefaultCouponsService},
        orders::{DefaultOrdersService, OrdersService},
    },
    settings::ServiceSettings,
    stores::{MemoryStore, PgStore},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub coupons: Arc<dyn CouponsService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Build an application context that keeps carts, orders and coupons in
    /// process memory, with the catalog and coupons taken from `fixture`.
    #[must_use]
    pub fn in_memory(
        fixture: &Fixture,
        auth: Arc<dyn AuthService>,
        settings: ServiceSettings,
    ) -> Self {
        let store = Arc::new(MemoryStore::with_coupons(fixture.coupons().iter().cloned()));
        let catalog = Arc::new(FixtureCatalog::from_fixture(fixture));

        info!(
            restaurants = fixture.restaurants().count(),
            products = fixture.products().count(),
            coupons = fixture.coupons().len(),
            "using in-memory stores"
        );

        Self {
            carts: Arc::new(DefaultCartsService::new(
                store.clone(),
                store.clone(),
                catalog.clone(),
                settings,
            )),
            orders: Arc::new(DefaultOrdersService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                catalog,
                settings,
            )),
            coupons: Arc::new(DefaultCouponsService::new(store)),
            auth,
        }
    }

    /// Build application context from a database URL, applying pending
    /// migrations first.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or
    /// migrating fails.
    pub async fn from_database_url(
        url: &str,
        auth: Arc<dyn AuthService>,
        settings: ServiceSettings,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool);

        db.migrate().await.map_err(AppInitError::Migrate)?;

        let store = Arc::new(PgStore::new(db.clone()));
        let catalog = Arc::new(PgCatalog::new(db));

        Ok(Self {
            carts: Arc::new(DefaultCartsService::new(
                store.clone(),
                store.clone(),
                catalog.clone(),
                settings,
            )),
            orders: Arc::new(DefaultOrdersService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                catalog,
                settings,
            )),
            coupons: Arc::new(DefaultCouponsService::new(store)),
            auth,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use jiff::Timestamp;
    use platter::ids::CustomerId;
    use testresult::TestResult;

    use super::*;
    use crate::auth::StaticAuthService;

    #[tokio::test]
    async fn in_memory_context_serves_fixture_coupons() -> TestResult {
        let mut fixture = Fixture::with_base_path(
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures"),
        );

        fixture.load_catalog("default")?.load_coupons("default")?;

        let ctx = AppContext::in_memory(
            &fixture,
            Arc::new(StaticAuthService::default()),
            ServiceSettings::default(),
        );

        let cart = ctx.carts.get_cart(CustomerId::new()).await?;

        assert!(cart.is_empty());
        assert!(!ctx.coupons.list_active(Timestamp::now()).await?.is_empty());

        Ok(())
    }
}
