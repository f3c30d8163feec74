//! Pricing Config

use std::time::Duration;

use clap::Args;
use jiff::SignedDuration;
use platter::{fixtures::parse_percent, prices::Price, pricing::PricingPolicy};
use platter_app::settings::ServiceSettings;
use thiserror::Error;

/// Tax, delivery and currency settings.
#[derive(Debug, Args)]
pub struct PricingConfig {
    /// Tax rate in percent of the subtotal
    #[arg(long, env = "TAX_PERCENT", default_value = "5")]
    pub tax_percent: String,

    /// Delivery fee in minor units for restaurants without their own
    #[arg(long, env = "DEFAULT_DELIVERY_FEE", default_value_t = 5_000_u64)]
    pub default_delivery_fee: u64,

    /// ISO currency code used to format receipts
    #[arg(long, env = "CURRENCY", default_value = "USD")]
    pub currency: String,

    /// Minutes from placement to the estimated delivery time
    #[arg(long, env = "ESTIMATED_DELIVERY_MINUTES", default_value_t = 40_i64)]
    pub estimated_delivery_minutes: i64,

    /// Upper bound on a single catalog lookup, in milliseconds
    #[arg(long, env = "CATALOG_TIMEOUT_MS", default_value_t = 2_000_u64)]
    pub catalog_timeout_ms: u64,
}

/// Invalid pricing configuration.
#[derive(Debug, Error)]
pub enum PricingConfigError {
    /// `TAX_PERCENT` is not a non-negative number.
    #[error("invalid tax percent: {0}")]
    TaxPercent(String),

    /// `ESTIMATED_DELIVERY_MINUTES` is negative.
    #[error("estimated delivery must not be negative, got {0} minutes")]
    EstimatedDelivery(i64),
}

impl PricingConfig {
    /// Service settings derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the tax rate does not parse or the delivery
    /// estimate is negative.
    pub fn service_settings(&self) -> Result<ServiceSettings, PricingConfigError> {
        let tax_percent = parse_percent(&self.tax_percent)
            .map_err(|_invalid| PricingConfigError::TaxPercent(self.tax_percent.clone()))?;

        if self.estimated_delivery_minutes < 0 {
            return Err(PricingConfigError::EstimatedDelivery(
                self.estimated_delivery_minutes,
            ));
        }

        Ok(ServiceSettings {
            policy: PricingPolicy {
                tax_percent,
                default_delivery_fee: Price::new(self.default_delivery_fee),
            },
            catalog_timeout: Duration::from_millis(self.catalog_timeout_ms),
            estimated_delivery: SignedDuration::from_mins(self.estimated_delivery_minutes),
        })
    }
}
