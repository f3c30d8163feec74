//! Order Handlers

pub(crate) mod assign_rider;
pub(crate) mod complete_refund;
pub(crate) mod create;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod rate;
pub(crate) mod receipt;
pub(crate) mod refund;
pub(crate) mod status;
