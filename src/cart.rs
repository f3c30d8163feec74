//! Cart
//!
//! The cart aggregate. Every mutation works on a copy, re-prices it and only
//! replaces `self` when the whole operation succeeded, so a failed call leaves
//! the cart exactly as it was.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    coupons::{
        Coupon, CouponCode, CouponContext, CouponOutcome, validate_and_price,
        validation::discount_for,
    },
    discounts::DiscountError,
    errors::ErrorKind,
    ids::{CustomerId, ProductId, RestaurantId},
    items::{AddOns, LineItem},
    prices::Price,
    pricing::{PricingError, PricingPolicy, Totals, compute_totals},
    products::{Category, Product, Restaurant},
};

/// Errors raised by cart operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Input was malformed or out of range.
    #[error("invalid cart input: {0}")]
    Validation(String),

    /// The product exists but cannot be ordered right now.
    #[error("product {0} is unavailable")]
    ProductUnavailable(ProductId),

    /// The restaurant is not accepting orders.
    #[error("restaurant {0} is closed")]
    RestaurantClosed(RestaurantId),

    /// The product is not sold by the given restaurant.
    #[error("product {product} does not belong to restaurant {restaurant}")]
    RestaurantMismatch {
        /// Product requested
        product: ProductId,
        /// Restaurant it was requested from
        restaurant: RestaurantId,
    },

    /// No line in the cart refers to the product.
    #[error("product {0} is not in the cart")]
    ItemNotFound(ProductId),

    /// The operation needs at least one item.
    #[error("cart is empty")]
    EmptyCart,

    /// Totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl From<DiscountError> for CartError {
    fn from(error: DiscountError) -> Self {
        Self::Pricing(PricingError::Discount(error))
    }
}

impl CartError {
    /// Coarse classification of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CartError::Validation(_)
            | CartError::RestaurantMismatch { .. }
            | CartError::Pricing(_) => ErrorKind::Validation,
            CartError::ItemNotFound(_) => ErrorKind::NotFound,
            CartError::ProductUnavailable(_)
            | CartError::RestaurantClosed(_)
            | CartError::EmptyCart => ErrorKind::State,
        }
    }
}

/// Request to add a product to the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    /// Units to add, must be at least one
    pub quantity: i64,

    /// Names of the catalog add-ons to attach
    #[serde(default)]
    pub add_ons: Vec<String>,

    /// Preparation notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// What `add_item` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AddItemOutcome {
    /// A new line was appended.
    Added,

    /// An existing line with the same signature was incremented.
    Merged {
        /// Quantity of the merged line afterwards
        quantity: u32,
    },

    /// The cart held items from another restaurant; they were discarded
    /// (with any coupon) before the new line was appended.
    RestaurantSwitched {
        /// Number of lines discarded
        cleared: usize,
    },
}

/// A customer's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    owner: CustomerId,
    restaurant: Option<RestaurantId>,
    delivery_fee_base: Price,
    items: Vec<LineItem>,
    coupon: Option<Coupon>,
    totals: Totals,
    version: u64,
    updated_at: Timestamp,
}

impl Cart {
    /// An empty, never-saved cart for `owner`.
    pub fn new(owner: CustomerId, now: Timestamp) -> Self {
        Self {
            owner,
            restaurant: None,
            delivery_fee_base: Price::ZERO,
            items: Vec::new(),
            coupon: None,
            totals: Totals::default(),
            version: 0,
            updated_at: now,
        }
    }

    /// Cart owner
    pub fn owner(&self) -> CustomerId {
        self.owner
    }

    /// Restaurant every item comes from, `None` while empty
    pub fn restaurant(&self) -> Option<RestaurantId> {
        self.restaurant
    }

    /// Delivery fee charged while the cart has items
    pub fn delivery_fee_base(&self) -> Price {
        self.delivery_fee_base
    }

    /// Lines in display order
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Applied coupon snapshot
    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    /// Code of the applied coupon
    pub fn discount_code(&self) -> Option<&CouponCode> {
        self.coupon.as_ref().map(|coupon| &coupon.code)
    }

    /// Current totals
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Compare-and-swap token, zero for a cart never saved
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Last committed change
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct categories present, in first-seen order.
    pub fn categories(&self) -> SmallVec<[Category; 4]> {
        let mut categories = SmallVec::new();

        for item in &self.items {
            if !categories.contains(&item.category) {
                categories.push(item.category);
            }
        }

        categories
    }

    /// Stamp the cart as stored at `version`. Used by stores on a successful save.
    #[must_use]
    pub fn committed(mut self, version: u64, at: Timestamp) -> Self {
        self.version = version;
        self.updated_at = at;
        self
    }

    /// Validator input describing this cart for a customer with
    /// `prior_redemptions` uses of the coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Pricing`] if the gross amount overflows.
    pub fn coupon_context(&self, prior_redemptions: u32) -> Result<CouponContext, CartError> {
        Ok(CouponContext {
            subtotal: self.totals.subtotal,
            gross: self.totals.gross().ok_or(PricingError::Overflow)?,
            restaurant: self.restaurant,
            categories: self.categories(),
            prior_redemptions,
        })
    }

    /// Add `request.quantity` units of `product` from `restaurant`.
    ///
    /// Add-on names are resolved against the product's catalog add-ons. A
    /// product from a different restaurant than the cart's current one
    /// replaces the cart's contents.
    ///
    /// # Errors
    ///
    /// - [`CartError::Validation`]: quantity below one or an unknown add-on.
    /// - [`CartError::RestaurantMismatch`]: `product` is not sold by `restaurant`.
    /// - [`CartError::ProductUnavailable`], [`CartError::RestaurantClosed`].
    /// - [`CartError::Pricing`]: totals overflowed.
    pub fn add_item(
        &mut self,
        product: &Product,
        restaurant: &Restaurant,
        request: NewLineItem,
        policy: &PricingPolicy,
    ) -> Result<AddItemOutcome, CartError> {
        let quantity = positive_quantity(request.quantity)?;

        if product.restaurant != restaurant.id {
            return Err(CartError::RestaurantMismatch {
                product: product.id,
                restaurant: restaurant.id,
            });
        }

        if !product.available {
            return Err(CartError::ProductUnavailable(product.id));
        }

        if !restaurant.is_open {
            return Err(CartError::RestaurantClosed(restaurant.id));
        }

        let add_ons = resolve_add_ons(product, &request.add_ons)?;
        let names: Vec<&str> = add_ons.iter().map(|a| a.name.as_str()).collect();

        let mut next = self.clone();
        let mut outcome = AddItemOutcome::Added;

        if next.restaurant.is_some_and(|current| current != restaurant.id) && !next.is_empty() {
            outcome = AddItemOutcome::RestaurantSwitched {
                cleared: next.items.len(),
            };

            next.items.clear();
            next.coupon = None;
        }

        next.restaurant = Some(restaurant.id);
        next.delivery_fee_base = policy.delivery_fee_for(restaurant);

        if let Some(line) = next
            .items
            .iter_mut()
            .find(|line| line.matches_signature(product.id, &names))
        {
            line.quantity = line
                .quantity
                .checked_add(quantity)
                .ok_or(PricingError::Overflow)?;

            if request.notes.is_some() {
                line.notes = request.notes;
            }

            outcome = AddItemOutcome::Merged {
                quantity: line.quantity,
            };
        } else {
            next.items.push(LineItem {
                product: product.id,
                name: product.name.clone(),
                category: product.category,
                unit_price: product.price,
                quantity,
                add_ons,
                notes: request.notes,
            });
        }

        next.reprice(policy)?;
        *self = next;

        Ok(outcome)
    }

    /// Set the quantity of the first line of `product`; zero or less removes
    /// every line of it.
    ///
    /// # Errors
    ///
    /// - [`CartError::ItemNotFound`]: no line refers to `product`.
    /// - [`CartError::Validation`]: the quantity is out of range.
    /// - [`CartError::Pricing`]: totals overflowed.
    pub fn update_quantity(
        &mut self,
        product: ProductId,
        quantity: i64,
        policy: &PricingPolicy,
    ) -> Result<(), CartError> {
        if !self.items.iter().any(|line| line.product == product) {
            return Err(CartError::ItemNotFound(product));
        }

        let mut next = self.clone();

        if quantity <= 0 {
            next.items.retain(|line| line.product != product);
        } else {
            let quantity = positive_quantity(quantity)?;

            if let Some(line) = next.items.iter_mut().find(|line| line.product == product) {
                line.quantity = quantity;
            }
        }

        next.reprice(policy)?;
        *self = next;

        Ok(())
    }

    /// Remove every line of `product`. Removing an absent product does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Pricing`] if totals overflow.
    pub fn remove_item(
        &mut self,
        product: ProductId,
        policy: &PricingPolicy,
    ) -> Result<(), CartError> {
        if !self.items.iter().any(|line| line.product == product) {
            return Ok(());
        }

        let mut next = self.clone();

        next.items.retain(|line| line.product != product);
        next.reprice(policy)?;
        *self = next;

        Ok(())
    }

    /// Empty the cart, dropping the coupon and forgetting the restaurant.
    pub fn clear(&mut self) {
        self.items.clear();
        self.coupon = None;
        self.restaurant = None;
        self.totals = Totals::default();
    }

    /// Validate `coupon` against this cart and apply it when accepted.
    ///
    /// A rejection is returned as [`CouponOutcome::Rejected`] and leaves the
    /// cart untouched. An accepted coupon replaces any coupon already applied.
    ///
    /// # Errors
    ///
    /// - [`CartError::EmptyCart`]: the cart has no items.
    /// - [`CartError::Pricing`]: totals overflowed.
    pub fn apply_coupon(
        &mut self,
        coupon: Option<&Coupon>,
        prior_redemptions: u32,
        now: Timestamp,
        policy: &PricingPolicy,
    ) -> Result<CouponOutcome, CartError> {
        if self.is_empty() {
            return Err(CartError::EmptyCart);
        }

        let context = self.coupon_context(prior_redemptions)?;

        match validate_and_price(coupon, &context, now)? {
            CouponOutcome::Rejected(rejection) => Ok(CouponOutcome::Rejected(rejection)),
            CouponOutcome::Accepted { .. } => {
                let mut next = self.clone();

                next.coupon = coupon.cloned();
                next.reprice(policy)?;

                let discount = next.totals.discount;

                *self = next;

                Ok(CouponOutcome::Accepted { discount })
            }
        }
    }

    /// Drop the applied coupon, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Pricing`] if totals overflow.
    pub fn remove_coupon(&mut self, policy: &PricingPolicy) -> Result<(), CartError> {
        let mut next = self.clone();

        next.coupon = None;
        next.reprice(policy)?;
        *self = next;

        Ok(())
    }

    /// Recompute totals from the items.
    ///
    /// An applied coupon's discount is recomputed from the new subtotal; the
    /// coupon is dropped when the cart no longer meets its minimum order value
    /// or scope.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Pricing`] if totals overflow.
    pub fn reprice(&mut self, policy: &PricingPolicy) -> Result<(), CartError> {
        if self.items.is_empty() {
            self.clear();

            return Ok(());
        }

        let undiscounted = compute_totals(
            &self.items,
            self.delivery_fee_base,
            policy.tax_percent,
            Price::ZERO,
        )?;

        let categories = self.categories();
        let still_eligible = self.coupon.as_ref().is_some_and(|coupon| {
            undiscounted.subtotal >= coupon.min_order_value
                && coupon.scope.covers(self.restaurant, &categories)
        });

        if !still_eligible {
            self.coupon = None;
        }

        let discount = match &self.coupon {
            Some(coupon) => discount_for(coupon, undiscounted.subtotal, undiscounted.total)?,
            None => Price::ZERO,
        };

        self.totals = compute_totals(
            &self.items,
            self.delivery_fee_base,
            policy.tax_percent,
            discount,
        )?;

        Ok(())
    }
}

fn positive_quantity(quantity: i64) -> Result<u32, CartError> {
    if quantity < 1 {
        return Err(CartError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }

    u32::try_from(quantity)
        .map_err(|_overflow| CartError::Validation(format!("quantity {quantity} is too large")))
}

fn resolve_add_ons(product: &Product, names: &[String]) -> Result<AddOns, CartError> {
    let mut add_ons = AddOns::new();

    for name in names {
        let Some(add_on) = product.add_on(name) else {
            return Err(CartError::Validation(format!(
                "unknown add-on \"{name}\" for {}",
                product.name
            )));
        };

        if add_ons.iter().any(|chosen| chosen.name == add_on.name) {
            return Err(CartError::Validation(format!("add-on \"{name}\" listed twice")));
        }

        add_ons.push(add_on.clone());
    }

    Ok(add_ons)
}
