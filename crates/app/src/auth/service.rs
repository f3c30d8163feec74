//! Auth service.

use std::{fs, path::Path};

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::debug;

use crate::auth::{AuthServiceError, Principal};

#[derive(Debug, Deserialize)]
struct TokenTable {
    #[serde(default)]
    tokens: FxHashMap<String, Principal>,
}

/// Bearer tokens resolved from a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthService {
    tokens: FxHashMap<String, Principal>,
}

impl StaticAuthService {
    #[must_use]
    pub fn from_tokens(tokens: impl IntoIterator<Item = (String, Principal)>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    /// Load the token table from a YAML file with a top-level `tokens` map.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AuthServiceError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let table: TokenTable = serde_norway::from_str(&contents)?;

        debug!(
            path = %path.as_ref().display(),
            tokens = table.tokens.len(),
            "loaded bearer token table"
        );

        Ok(Self {
            tokens: table.tokens,
        })
    }
}

#[async_trait]
impl AuthService for StaticAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError> {
        self.tokens
            .get(bearer_token)
            .copied()
            .ok_or(AuthServiceError::NotFound)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn authenticate_bearer(&self, bearer_token: &str)
    -> Result<Principal, AuthServiceError>;
}
