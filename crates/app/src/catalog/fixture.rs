//! In-memory catalog

use async_trait::async_trait;
use platter::{
    fixtures::Fixture,
    ids::{ProductId, RestaurantId},
    products::{Product, Restaurant},
};
use rustc_hash::FxHashMap;

use crate::catalog::{Catalog, CatalogError};

/// Restaurants and products held in memory, usually loaded from a fixture set.
#[derive(Debug, Clone, Default)]
pub struct FixtureCatalog {
    restaurants: FxHashMap<RestaurantId, Restaurant>,
    products: FxHashMap<ProductId, Product>,
}

impl FixtureCatalog {
    #[must_use]
    pub fn new(
        restaurants: impl IntoIterator<Item = Restaurant>,
        products: impl IntoIterator<Item = Product>,
    ) -> Self {
        Self {
            restaurants: restaurants
                .into_iter()
                .map(|restaurant| (restaurant.id, restaurant))
                .collect(),
            products: products
                .into_iter()
                .map(|product| (product.id, product))
                .collect(),
        }
    }

    #[must_use]
    pub fn from_fixture(fixture: &Fixture) -> Self {
        Self::new(
            fixture.restaurants().cloned(),
            fixture.products().cloned(),
        )
    }
}

#[async_trait]
impl Catalog for FixtureCatalog {
    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products.get(&id).cloned().ok_or(CatalogError::NotFound)
    }

    async fn get_restaurant(&self, id: RestaurantId) -> Result<Restaurant, CatalogError> {
        self.restaurants
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound)
    }
}
