//! Shared application services and persistence modules.

pub mod auth;
pub mod catalog;
pub mod context;
pub mod database;
pub mod domain;
pub mod settings;
pub mod stores;

#[cfg(test)]
mod test;
