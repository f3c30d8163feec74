//! Platter
//!
//! Platter is the order-taking core of a food-delivery platform: cart pricing, coupon validation,
//! the cart aggregate and the order lifecycle state machine.

pub mod cart;
pub mod coupons;
pub mod discounts;
pub mod errors;
pub mod fixtures;
pub mod ids;
pub mod items;
pub mod orders;
pub mod prelude;
pub mod prices;
pub mod pricing;
pub mod products;
pub mod receipt;
