//! Test context for service-level tests.

use std::{path::PathBuf, sync::Arc};

use platter::fixtures::{Fixture, FixtureError};

use crate::{
    catalog::FixtureCatalog,
    domain::{
        carts::DefaultCartsService, coupons::DefaultCouponsService, orders::DefaultOrdersService,
    },
    settings::ServiceSettings,
    stores::MemoryStore,
};

/// Services wired to one in-memory store seeded from the `default` fixture set.
pub struct TestContext {
    pub fixture: Fixture,
    pub store: Arc<MemoryStore>,
    pub carts: DefaultCartsService,
    pub orders: DefaultOrdersService,
    pub coupons: DefaultCouponsService,
}

impl TestContext {
    pub fn new() -> Result<Self, FixtureError> {
        let mut fixture = Fixture::with_base_path(
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures"),
        );

        fixture.load_catalog("default")?.load_coupons("default")?;

        let store = Arc::new(MemoryStore::with_coupons(fixture.coupons().iter().cloned()));
        let catalog = Arc::new(FixtureCatalog::from_fixture(&fixture));
        let settings = ServiceSettings::default();

        Ok(Self {
            carts: DefaultCartsService::new(
                store.clone(),
                store.clone(),
                catalog.clone(),
                settings,
            ),
            orders: DefaultOrdersService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                catalog,
                settings,
            ),
            coupons: DefaultCouponsService::new(store.clone()),
            fixture,
            store,
        })
    }
}
