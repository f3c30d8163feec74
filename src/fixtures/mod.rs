//! Fixtures

use std::{fs, path::PathBuf};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    coupons::Coupon,
    fixtures::{catalog::CatalogFixture, coupons::CouponsFixture},
    prices::Price,
    products::{Product, Restaurant},
    receipt,
};

pub mod catalog;
pub mod coupons;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No prices loaded yet
    #[error("No prices loaded yet; currency unknown")]
    NoCurrency,

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Restaurant not found
    #[error("Restaurant not found: {0}")]
    RestaurantNotFound(String),

    /// Two coupons share a code
    #[error("Duplicate coupon code: {0}")]
    DuplicateCoupon(String),
}

/// A named set of restaurants, products and coupons loaded from YAML.
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    restaurants: FxHashMap<String, Restaurant>,
    products: FxHashMap<String, Product>,
    coupons: Vec<Coupon>,

    /// Currency shared by every price in the set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            restaurants: FxHashMap::default(),
            products: FxHashMap::default(),
            coupons: Vec::new(),
            currency: None,
        }
    }

    /// Load restaurants and products from `<set>/catalog.yml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a product
    /// references an unknown restaurant, or if currencies differ.
    pub fn load_catalog(&mut self, set: &str) -> Result<&mut Self, FixtureError> {
        let contents = fs::read_to_string(self.base_path.join(set).join("catalog.yml"))?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        for (key, restaurant_fixture) in fixture.restaurants {
            let restaurant = restaurant_fixture.into_restaurant(&mut |raw: &str| self.price(raw))?;

            self.restaurants.insert(key, restaurant);
        }

        for (key, product_fixture) in fixture.products {
            let restaurant = self
                .restaurants
                .get(&product_fixture.restaurant)
                .map(|restaurant| restaurant.id)
                .ok_or_else(|| {
                    FixtureError::RestaurantNotFound(product_fixture.restaurant.clone())
                })?;

            let product =
                product_fixture.into_product(restaurant, &mut |raw: &str| self.price(raw))?;

            self.products.insert(key, product);
        }

        Ok(self)
    }

    /// Load coupons from `<set>/coupons.yml`.
    ///
    /// Restaurant-scoped coupons refer to restaurants by fixture key, so the
    /// catalog must be loaded first.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a coupon
    /// references an unknown restaurant, or if two coupons share a code.
    pub fn load_coupons(&mut self, set: &str) -> Result<&mut Self, FixtureError> {
        let contents = fs::read_to_string(self.base_path.join(set).join("coupons.yml"))?;
        let fixture: CouponsFixture = serde_norway::from_str(&contents)?;

        for coupon_fixture in fixture.coupons {
            let restaurants = &self.restaurants;
            let mut resolve = |key: &str| {
                restaurants
                    .get(key)
                    .map(|restaurant| restaurant.id)
                    .ok_or_else(|| FixtureError::RestaurantNotFound(key.to_string()))
            };

            let mut currency = self.currency;
            let coupon = coupon_fixture.into_coupon(&mut resolve, &mut |raw: &str| {
                checked_price(&mut currency, raw)
            })?;
            self.currency = currency;

            if self.coupons.iter().any(|existing| existing.code == coupon.code) {
                return Err(FixtureError::DuplicateCoupon(coupon.code.to_string()));
            }

            self.coupons.push(coupon);
        }

        Ok(self)
    }

    /// Load a complete fixture set (catalog and coupons with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(set: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_catalog(set)?.load_coupons(set)?;

        Ok(fixture)
    }

    /// Get a product by its fixture key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product, FixtureError> {
        self.products
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a restaurant by its fixture key
    ///
    /// # Errors
    ///
    /// Returns an error if the restaurant is not found.
    pub fn restaurant(&self, key: &str) -> Result<&Restaurant, FixtureError> {
        self.restaurants
            .get(key)
            .ok_or_else(|| FixtureError::RestaurantNotFound(key.to_string()))
    }

    /// All loaded products
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// All loaded restaurants
    pub fn restaurants(&self) -> impl Iterator<Item = &Restaurant> {
        self.restaurants.values()
    }

    /// All loaded coupons, in file order
    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no prices have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    fn price(&mut self, raw: &str) -> Result<Price, FixtureError> {
        checked_price(&mut self.currency, raw)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a price and check it against the currency seen so far.
fn checked_price(
    currency: &mut Option<&'static Currency>,
    raw: &str,
) -> Result<Price, FixtureError> {
    let (price, parsed) = parse_price(raw)?;

    match *currency {
        Some(existing) if existing != parsed => Err(FixtureError::CurrencyMismatch(
            existing.iso_alpha_code.to_string(),
            parsed.iso_alpha_code.to_string(),
        )),
        Some(_) => Ok(price),
        None => {
            *currency = Some(parsed);

            Ok(price)
        }
    }
}

/// Parse price string (e.g., "2.99 USD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is negative or not a number, or if the currency code is
/// not recognized.
pub fn parse_price(s: &str) -> Result<(Price, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency =
        receipt::currency(code).map_err(|_err| FixtureError::UnknownCurrency((*code).to_string()))?;

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::from(10_u64.pow(currency.exponent)))
        .and_then(|value| value.round_dp(0).to_u64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((Price::new(minor_units), currency))
}

/// Parse percentage string (e.g., "15%" or "15") into percent.
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or is negative.
pub fn parse_percent(s: &str) -> Result<Decimal, FixtureError> {
    let trimmed = s.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

    let percent = digits
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

    if percent.is_sign_negative() {
        return Err(FixtureError::InvalidPercentage(s.to_string()));
    }

    Ok(percent)
}
