//! Payment gateway callbacks

mod handlers;

pub(crate) use handlers::*;
