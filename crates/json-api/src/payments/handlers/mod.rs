//! Payment Handlers

pub(crate) mod confirmed;
pub(crate) mod failed;
