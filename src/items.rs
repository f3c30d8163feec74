//! Items

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{ids::ProductId, prices::Price, products::Category};

/// An optional extra attached to a line, priced by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOn {
    /// Add-on name, unique within a product
    pub name: String,

    /// Price per unit of the line
    pub price: Price,
}

impl AddOn {
    /// Creates a new add-on
    pub fn new(name: impl Into<String>, price: Price) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Add-ons chosen for a single line. Most lines carry none or a couple.
pub type AddOns = SmallVec<[AddOn; 2]>;

/// One product entry in a cart or order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product the line refers to
    pub product: ProductId,

    /// Product name at the time it was added
    pub name: String,

    /// Product category at the time it was added
    pub category: Category,

    /// Unit price fixed at add time
    pub unit_price: Price,

    /// Number of units, always at least one
    pub quantity: u32,

    /// Chosen add-ons
    #[serde(default)]
    pub add_ons: AddOns,

    /// Free-text preparation notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl LineItem {
    /// Unit price plus the price of every add-on.
    ///
    /// Returns `None` on overflow.
    pub fn effective_unit_price(&self) -> Option<Price> {
        self.add_ons
            .iter()
            .try_fold(self.unit_price, |acc, add_on| acc.checked_add(add_on.price))
    }

    /// Effective unit price multiplied by quantity.
    ///
    /// Returns `None` on overflow.
    pub fn line_total(&self) -> Option<Price> {
        self.effective_unit_price()?.checked_mul(self.quantity)
    }

    /// Whether this line has the same product and set of add-on names.
    pub fn matches_signature(&self, product: ProductId, add_on_names: &[&str]) -> bool {
        self.product == product && self.signature_names() == sorted_names(add_on_names)
    }

    fn signature_names(&self) -> Vec<&str> {
        let names: Vec<&str> = self.add_ons.iter().map(|a| a.name.as_str()).collect();

        sorted_names(&names)
    }
}

fn sorted_names<'a>(names: &[&'a str]) -> Vec<&'a str> {
    let mut names = names.to_vec();

    names.sort_unstable();

    names
}
