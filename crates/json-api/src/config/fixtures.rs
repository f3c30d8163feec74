//! Fixtures Config

use std::path::PathBuf;

use clap::Args;

/// Where the catalog, coupons and bearer tokens are loaded from.
#[derive(Debug, Args)]
pub struct FixturesConfig {
    /// Directory holding fixture sets
    #[arg(long, env = "FIXTURES_PATH", default_value = "./fixtures")]
    pub fixtures_path: PathBuf,

    /// Fixture set to load (a subdirectory of the fixtures path)
    #[arg(long, env = "FIXTURE_SET", default_value = "default")]
    pub fixture_set: String,

    /// Bearer token table, defaults to `tokens.yml` in the fixture set
    #[arg(long, env = "AUTH_TOKENS_FILE")]
    pub auth_tokens_file: Option<PathBuf>,
}

impl FixturesConfig {
    /// Path of the bearer token table.
    #[must_use]
    pub fn tokens_file(&self) -> PathBuf {
        self.auth_tokens_file.clone().unwrap_or_else(|| {
            self.fixtures_path
                .join(&self.fixture_set)
                .join("tokens.yml")
        })
    }
}
