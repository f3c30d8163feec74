//! Server configuration module

use clap::Parser;

use crate::config::{
    db::DatabaseConfig,
    fixtures::FixturesConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    pricing::PricingConfig,
    server::ServerRuntimeConfig,
};

pub(crate) mod db;
pub(crate) mod fixtures;
pub(crate) mod observability;
pub(crate) mod pricing;
pub(crate) mod server;

/// Platter JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "platter-json", about = "Platter JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Request tracing settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Tax, delivery and currency settings.
    #[command(flatten)]
    pub pricing: PricingConfig,

    /// Catalog, coupon and token fixture settings.
    #[command(flatten)]
    pub fixtures: FixturesConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_apply_without_arguments() -> TestResult {
        let config = ServerConfig::try_parse_from(["platter-json"])?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698");
        assert_eq!(config.pricing.currency, "USD");
        assert_eq!(config.fixtures.fixture_set, "default");

        Ok(())
    }

    #[test]
    fn flags_override_defaults() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "platter-json",
            "--port",
            "9000",
            "--tax-percent",
            "12.5",
            "--catalog-timeout-ms",
            "250",
        ])?;

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.pricing.tax_percent, "12.5");
        assert_eq!(config.pricing.catalog_timeout_ms, 250);

        Ok(())
    }
}
