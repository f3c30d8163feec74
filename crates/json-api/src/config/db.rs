//! Database Config

use clap::Args;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string. Carts, orders and coupons are kept in
    /// memory when unset.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}
