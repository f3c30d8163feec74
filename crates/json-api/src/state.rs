//! State

use std::sync::Arc;

use platter::receipt::Currency;
use platter_app::context::AppContext;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,

    /// Receipts are formatted in this currency.
    pub(crate) currency: &'static Currency,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, currency: &'static Currency) -> Self {
        Self { app, currency }
    }

    #[must_use]
    pub(crate) fn shared(app: AppContext, currency: &'static Currency) -> Arc<Self> {
        Arc::new(Self::new(app, currency))
    }
}
