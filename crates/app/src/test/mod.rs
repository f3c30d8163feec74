//! Shared test infrastructure

pub mod context;
pub mod db;

pub use context::TestContext;
