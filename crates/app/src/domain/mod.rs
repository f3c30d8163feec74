//! Platter Domain Concerns

pub mod carts;
pub mod coupons;
pub mod orders;

pub(crate) mod versioned;
