//! Error kinds

use std::fmt;

/// Coarse classification every domain and service error maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input was malformed or out of range.
    Validation,

    /// A referenced entity does not exist.
    NotFound,

    /// The operation is not allowed in the current state.
    State,

    /// A collaborator failed or timed out.
    ExternalService,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::State => "state",
            ErrorKind::ExternalService => "external_service",
        })
    }
}
