//! Date-indexed rate store.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use eurofx_common::{Currency, ExchangeRate, RateDate};
use std::sync::Arc;
use tracing::debug;

/// Filtered rates for one date, shared immutably between readers.
pub type DateRates = Arc<[ExchangeRate]>;

/// Thread-safe store of rates by date.
///
/// The store only grows: a date, once populated, keeps its first rate list
/// for the life of the process.
pub struct RateStore {
    rates: DashMap<RateDate, DateRates>,
}

impl RateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            rates: DashMap::new(),
        }
    }

    /// Insert rates for a date unless the date is already present.
    ///
    /// Returns `true` when the rates were inserted.
    pub fn merge(&self, date: RateDate, rates: Vec<ExchangeRate>) -> bool {
        match self.rates.entry(date) {
            Entry::Occupied(entry) => {
                debug!(date = %entry.key(), "Date already stored, keeping first rates");
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(rates.into());
                true
            }
        }
    }

    /// All rates stored for a date.
    pub fn lookup(&self, date: &RateDate) -> Option<DateRates> {
        self.rates.get(date).map(|rates| Arc::clone(rates.value()))
    }

    /// The rate of one currency on a date.
    pub fn lookup_one(&self, date: &RateDate, currency: &Currency) -> Option<ExchangeRate> {
        self.rates
            .get(date)?
            .iter()
            .find(|ex| &ex.currency == currency)
            .cloned()
    }

    /// Most recent date in the store.
    pub fn latest_date(&self) -> Option<RateDate> {
        self.rates.iter().map(|entry| entry.key().clone()).max()
    }

    /// Number of stored dates.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Check if store is empty.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for RateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared rate store.
pub type SharedRateStore = Arc<RateStore>;
