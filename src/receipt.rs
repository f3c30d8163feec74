//! Receipt
//!
//! Plain-text rendering of an order or cart: a table of lines followed by a
//! totals summary, amounts formatted in the configured currency.

use std::io;

pub use rusty_money::iso::Currency;
use rusty_money::{Money, MoneyError, iso};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{cart::Cart, items::LineItem, orders::Order, prices::Price, pricing::Totals};

/// Errors that can occur when building a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The currency code is not supported.
    #[error("unsupported currency: {0}")]
    UnknownCurrency(String),

    /// An amount does not fit the money type.
    #[error("amount out of range: {0}")]
    AmountOutOfRange(u64),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Currency used when none is configured.
pub fn default_currency() -> &'static Currency {
    iso::USD
}

/// Resolve an ISO currency code.
///
/// # Errors
///
/// Returns [`ReceiptError::UnknownCurrency`] for codes outside the supported set.
pub fn currency(code: &str) -> Result<&'static Currency, ReceiptError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "USD" => Ok(iso::USD),
        "EUR" => Ok(iso::EUR),
        "GBP" => Ok(iso::GBP),
        "INR" => Ok(iso::INR),
        other => Err(ReceiptError::UnknownCurrency(other.to_string())),
    }
}

/// A single printed line.
#[derive(Debug, Clone)]
pub struct ReceiptLine<'a> {
    name: String,
    add_ons: String,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    line_total: Money<'a, Currency>,
}

/// Receipt for an order or cart.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    heading: Option<String>,
    discount_code: Option<String>,
    lines: Vec<ReceiptLine<'a>>,
    subtotal: Money<'a, Currency>,
    tax: Money<'a, Currency>,
    delivery_fee: Money<'a, Currency>,
    discount: Money<'a, Currency>,
    total: Money<'a, Currency>,
}

impl<'a> Receipt<'a> {
    /// Build a receipt for a placed order.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::AmountOutOfRange`] when an amount cannot be
    /// represented as money.
    pub fn for_order(order: &Order, currency: &'a Currency) -> Result<Self, ReceiptError> {
        Self::build(
            Some(format!("Order {}", order.number())),
            order.discount_code().map(ToString::to_string),
            order.items(),
            order.totals(),
            currency,
        )
    }

    /// Build a receipt for the current contents of a cart.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::AmountOutOfRange`] when an amount cannot be
    /// represented as money.
    pub fn for_cart(cart: &Cart, currency: &'a Currency) -> Result<Self, ReceiptError> {
        Self::build(
            None,
            cart.discount_code().map(ToString::to_string),
            cart.items(),
            cart.totals(),
            currency,
        )
    }

    fn build(
        heading: Option<String>,
        discount_code: Option<String>,
        items: &[LineItem],
        totals: &Totals,
        currency: &'a Currency,
    ) -> Result<Self, ReceiptError> {
        let lines = items
            .iter()
            .map(|item| {
                let unit = item
                    .effective_unit_price()
                    .ok_or(ReceiptError::AmountOutOfRange(*item.unit_price))?;
                let total = item
                    .line_total()
                    .ok_or(ReceiptError::AmountOutOfRange(*unit))?;

                Ok(ReceiptLine {
                    name: item.name.clone(),
                    add_ons: item
                        .add_ons
                        .iter()
                        .map(|add_on| add_on.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    quantity: item.quantity,
                    unit_price: money(unit, currency)?,
                    line_total: money(total, currency)?,
                })
            })
            .collect::<Result<Vec<_>, ReceiptError>>()?;

        Ok(Self {
            heading,
            discount_code,
            lines,
            subtotal: money(totals.subtotal, currency)?,
            tax: money(totals.tax, currency)?,
            delivery_fee: money(totals.delivery_fee, currency)?,
            discount: money(totals.discount, currency)?,
            total: money(totals.total, currency)?,
        })
    }

    /// Printed lines
    #[must_use]
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Total before tax, fees and discount
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Amount payable
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Amount saved through the coupon.
    #[must_use]
    pub fn savings(&self) -> Money<'a, Currency> {
        self.discount
    }

    /// Render the receipt to a string.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if writing fails.
    pub fn render(&self) -> Result<String, ReceiptError> {
        let mut out = Vec::new();

        self.write_to(&mut out)?;

        String::from_utf8(out).map_err(|_err| ReceiptError::IO)
    }

    /// Write the receipt table and summary.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        if let Some(heading) = &self.heading {
            writeln!(out, "{heading}").map_err(|_err| ReceiptError::IO)?;
        }

        let mut builder = Builder::default();

        builder.push_record(["Item", "Add-ons", "Qty", "Unit Price", "Total"]);

        for line in &self.lines {
            builder.push_record([
                line.name.clone(),
                line.add_ons.clone(),
                line.quantity.to_string(),
                line.unit_price.to_string(),
                line.line_total.to_string(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Columns::new(2..5), Alignment::right());
        table.modify(Rows::first(), Alignment::center());

        writeln!(out, "{table}").map_err(|_err| ReceiptError::IO)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let discount_label = match &self.discount_code {
            Some(code) => format!("Discount ({code}):"),
            None => "Discount:".to_string(),
        };

        let rows = [
            ("Subtotal:".to_string(), self.subtotal.to_string()),
            ("Tax:".to_string(), self.tax.to_string()),
            ("Delivery fee:".to_string(), self.delivery_fee.to_string()),
            (discount_label, format!("-{}", self.discount)),
            ("Total:".to_string(), self.total.to_string()),
        ];

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in rows {
            writeln!(out, " {label:<label_width$} {value:>value_width$}")
                .map_err(|_err| ReceiptError::IO)?;
        }

        Ok(())
    }
}

fn money(amount: Price, currency: &Currency) -> Result<Money<'_, Currency>, ReceiptError> {
    let minor = i64::try_from(*amount).map_err(|_err| ReceiptError::AmountOutOfRange(*amount))?;

    Ok(Money::from_minor(minor, currency))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::{
        cart::NewLineItem,
        coupons::{Coupon, DiscountKind},
        ids::{CustomerId, ProductId, RestaurantId},
        items::AddOn,
        pricing::PricingPolicy,
        products::{Category, Product, Restaurant},
    };

    use super::*;

    fn cart_with_coupon() -> Result<Cart, Box<dyn std::error::Error>> {
        let policy = PricingPolicy::default();
        let restaurant = Restaurant {
            id: RestaurantId::new(),
            name: "Tandoor House".to_string(),
            delivery_fee: Some(Price::new(250)),
            is_open: true,
        };
        let product = Product {
            id: ProductId::new(),
            restaurant: restaurant.id,
            name: "Paneer Tikka".to_string(),
            category: Category::Appetizers,
            price: Price::new(1_000),
            add_ons: vec![AddOn::new("Mint chutney", Price::new(50))],
            available: true,
        };

        let mut cart = Cart::new(CustomerId::new(), Timestamp::now());

        cart.add_item(
            &product,
            &restaurant,
            NewLineItem {
                quantity: 2,
                add_ons: vec!["Mint chutney".to_string()],
                notes: None,
            },
            &policy,
        )?;
        cart.apply_coupon(
            Some(&Coupon::new(
                "FLAT100",
                DiscountKind::Fixed {
                    amount: Price::new(100),
                },
            )),
            0,
            Timestamp::now(),
            &policy,
        )?;

        Ok(cart)
    }

    #[test]
    fn renders_lines_and_totals() -> TestResult {
        let cart = cart_with_coupon()?;
        let receipt = Receipt::for_cart(&cart, iso::USD)?;

        let output = receipt.render()?;

        assert!(output.contains("Paneer Tikka"), "missing item name:\n{output}");
        assert!(output.contains("Mint chutney"), "missing add-on:\n{output}");
        assert!(output.contains("Subtotal:"), "missing subtotal:\n{output}");
        assert!(output.contains("Discount (FLAT100):"), "missing coupon:\n{output}");
        assert!(output.contains("$21.00"), "missing line total:\n{output}");

        Ok(())
    }

    #[test]
    fn savings_equal_the_discount() -> TestResult {
        let cart = cart_with_coupon()?;
        let receipt = Receipt::for_cart(&cart, iso::USD)?;

        assert_eq!(receipt.savings(), Money::from_minor(100, iso::USD));
        assert_eq!(receipt.lines().len(), 1);

        Ok(())
    }

    #[test]
    fn amounts_beyond_i64_are_rejected() {
        let item = LineItem {
            product: ProductId::new(),
            name: "Gold".to_string(),
            category: Category::Other,
            unit_price: Price::new(u64::MAX),
            quantity: 1,
            add_ons: smallvec![],
            notes: None,
        };

        let result = Receipt::build(None, None, &[item], &Totals::default(), iso::USD);

        assert!(matches!(result, Err(ReceiptError::AmountOutOfRange(_))), "got {result:?}");
    }

    #[test]
    fn unknown_currency_is_an_error() {
        assert!(matches!(currency("XYZ"), Err(ReceiptError::UnknownCurrency(_))));
        assert!(currency("inr").is_ok());
    }
}
