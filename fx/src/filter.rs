//! Allow-set filtering of retained currencies.

use std::collections::BTreeSet;

use eurofx_common::{Currency, ExchangeRate};

/// Currencies retained by the service unless configured otherwise.
///
/// The base currency is absent since every rate is quoted against it.
pub const DEFAULT_CURRENCIES: [&str; 32] = [
    "USD", "JPY", "BGN", "CZK", "DKK", "GBP", "HUF", "LTL", "PLN", "RON", "SEK", "CHF", "NOK",
    "HRK", "RUB", "TRY", "AUD", "BRL", "CAD", "CNY", "HKD", "IDR", "ILS", "INR", "KRW", "MXN",
    "MYR", "NZD", "PHP", "SGD", "THB", "ZAR",
];

/// Fixed set of currencies kept in the rate store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowSet {
    currencies: BTreeSet<Currency>,
}

impl AllowSet {
    /// Build an allow-set. The base currency is never admitted.
    pub fn new(currencies: impl IntoIterator<Item = Currency>) -> Self {
        Self {
            currencies: currencies.into_iter().filter(|c| !c.is_base()).collect(),
        }
    }

    /// Check whether a currency is retained.
    pub fn contains(&self, currency: &Currency) -> bool {
        self.currencies.contains(currency)
    }

    /// Keep only allowed entries, preserving their order.
    pub fn filter(&self, exchanges: &[ExchangeRate]) -> Vec<ExchangeRate> {
        exchanges
            .iter()
            .filter(|ex| self.contains(&ex.currency))
            .cloned()
            .collect()
    }

    /// Number of retained currencies.
    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }
}

impl Default for AllowSet {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCIES.iter().map(|code| Currency::new(*code)))
    }
}
