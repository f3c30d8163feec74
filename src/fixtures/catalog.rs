//! Catalog Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    ids::{ProductId, RestaurantId},
    items::AddOn,
    prices::Price,
    products::{Category, Product, Restaurant},
};

/// Wrapper for restaurants and products in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Map of restaurant key -> restaurant fixture
    #[serde(default)]
    pub restaurants: FxHashMap<String, RestaurantFixture>,

    /// Map of product key -> product fixture
    #[serde(default)]
    pub products: FxHashMap<String, ProductFixture>,
}

/// Restaurant Fixture
#[derive(Debug, Deserialize)]
pub struct RestaurantFixture {
    /// Stable id
    pub id: RestaurantId,

    /// Display name
    pub name: String,

    /// Delivery fee (e.g., "2.50 USD"); omitted means the pricing default
    #[serde(default)]
    pub delivery_fee: Option<String>,

    /// Whether the restaurant accepts orders
    #[serde(default = "default_true")]
    pub is_open: bool,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Stable id
    pub id: ProductId,

    /// Restaurant fixture key
    pub restaurant: String,

    /// Product name
    pub name: String,

    /// Menu category
    pub category: Category,

    /// Product price (e.g., "8.50 USD")
    pub price: String,

    /// Add-ons on offer
    #[serde(default)]
    pub add_ons: Vec<AddOnFixture>,

    /// Whether the product can be ordered
    #[serde(default = "default_true")]
    pub available: bool,
}

/// Add-on Fixture
#[derive(Debug, Deserialize)]
pub struct AddOnFixture {
    /// Add-on name
    pub name: String,

    /// Add-on price (e.g., "0.50 USD")
    pub price: String,
}

fn default_true() -> bool {
    true
}

impl RestaurantFixture {
    pub(crate) fn into_restaurant(
        self,
        price: &mut impl FnMut(&str) -> Result<Price, FixtureError>,
    ) -> Result<Restaurant, FixtureError> {
        let delivery_fee = self.delivery_fee.as_deref().map(&mut *price).transpose()?;

        Ok(Restaurant {
            id: self.id,
            name: self.name,
            delivery_fee,
            is_open: self.is_open,
        })
    }
}

impl ProductFixture {
    pub(crate) fn into_product(
        self,
        restaurant: RestaurantId,
        price: &mut impl FnMut(&str) -> Result<Price, FixtureError>,
    ) -> Result<Product, FixtureError> {
        let add_ons = self
            .add_ons
            .into_iter()
            .map(|add_on| Ok(AddOn::new(add_on.name, price(&add_on.price)?)))
            .collect::<Result<Vec<_>, FixtureError>>()?;

        Ok(Product {
            id: self.id,
            restaurant,
            name: self.name,
            category: self.category,
            price: price(&self.price)?,
            add_ons,
            available: self.available,
        })
    }
}
