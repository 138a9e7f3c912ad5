//! Shared request-handler state.

use std::sync::Arc;

use eurofx_rates::{RateStore, SharedRateStore};

/// State handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Rate store, read-only from the handlers' side.
    pub store: SharedRateStore,
}

impl AppState {
    /// Create handler state over a shared store.
    pub fn new(store: Arc<RateStore>) -> Self {
        Self { store }
    }
}
