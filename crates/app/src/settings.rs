//! Service settings

use std::time::Duration;

use jiff::SignedDuration;
use platter::pricing::PricingPolicy;

/// Knobs shared by the cart and order services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Tax rate and fallback delivery fee
    pub policy: PricingPolicy,

    /// Upper bound on a single catalog lookup
    pub catalog_timeout: Duration,

    /// Added to the placement time to estimate delivery
    pub estimated_delivery: SignedDuration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            policy: PricingPolicy::default(),
            catalog_timeout: Duration::from_millis(2_000),
            estimated_delivery: SignedDuration::from_mins(40),
        }
    }
}
