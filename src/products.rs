//! Products

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    ids::{ProductId, RestaurantId},
    items::AddOn,
    prices::Price,
};

/// Menu category of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Starters
    Appetizers,

    /// Main courses
    Mains,

    /// Desserts
    Desserts,

    /// Drinks
    Beverages,

    /// Grocery items
    Groceries,

    /// Anything else
    Other,
}

impl Category {
    /// Wire name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Appetizers => "appetizers",
            Category::Mains => "mains",
            Category::Desserts => "desserts",
            Category::Beverages => "beverages",
            Category::Groceries => "groceries",
            Category::Other => "other",
        }
    }

    /// Parse a wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "appetizers" => Some(Category::Appetizers),
            "mains" => Some(Category::Mains),
            "desserts" => Some(Category::Desserts),
            "beverages" => Some(Category::Beverages),
            "groceries" => Some(Category::Groceries),
            "other" => Some(Category::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A menu item as the catalog describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Restaurant selling the product
    pub restaurant: RestaurantId,

    /// Product name
    pub name: String,

    /// Menu category
    pub category: Category,

    /// Catalog unit price
    pub price: Price,

    /// Add-ons a customer may pick
    #[serde(default)]
    pub add_ons: Vec<AddOn>,

    /// Whether the product can currently be ordered
    pub available: bool,
}

impl Product {
    /// Look up one of this product's add-ons by name.
    pub fn add_on(&self, name: &str) -> Option<&AddOn> {
        self.add_ons.iter().find(|add_on| add_on.name == name)
    }
}

/// A restaurant as the catalog describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Restaurant id
    pub id: RestaurantId,

    /// Display name
    pub name: String,

    /// Configured delivery fee. `None` falls back to the pricing default,
    /// `Some(Price::ZERO)` is free delivery.
    pub delivery_fee: Option<Price>,

    /// Whether the restaurant accepts orders
    pub is_open: bool,
}
