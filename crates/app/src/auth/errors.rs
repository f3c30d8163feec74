//! Auth service errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("token not found")]
    NotFound,

    #[error("failed to read token table")]
    Io(#[from] std::io::Error),

    #[error("failed to parse token table")]
    Yaml(#[from] serde_norway::Error),
}
