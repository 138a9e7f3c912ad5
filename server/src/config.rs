//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use eurofx_common::Currency;
use eurofx_rates::filter::DEFAULT_CURRENCIES;
use eurofx_rates::provider::DEFAULT_FEED_URL;
use eurofx_rates::AllowSet;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Feed URL must start with http:// or https://, got {0:?}")]
    InvalidFeedUrl(String),

    #[error("Refresh interval cannot be 0")]
    ZeroRefreshInterval,

    #[error("Fetch timeout cannot be 0")]
    ZeroFetchTimeout,

    #[error("Currency list cannot be empty")]
    NoCurrencies,

    #[error("Currency list cannot contain the base currency")]
    BaseCurrencyListed,

    #[error("Invalid currency code in currency list: {0:?}")]
    InvalidCurrency(String),
}

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Location of the historical rate feed.
    pub feed_url: String,
    /// Time between refresh cycles.
    pub refresh_interval: Duration,
    /// Timeout for a single feed download.
    pub fetch_timeout: Duration,
    /// Listen address.
    pub listen_addr: SocketAddr,
    /// Currency codes to retain, as configured.
    pub currencies: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            refresh_interval: Duration::from_secs(60 * 60),
            fetch_timeout: Duration::from_secs(30),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            currencies: DEFAULT_CURRENCIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from any variable lookup.
    ///
    /// Values that fail to parse keep their defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = var("EUROFX_FEED_URL") {
            config.feed_url = url;
        }

        if let Some(secs) = var("EUROFX_REFRESH_INTERVAL_SECS") {
            if let Ok(secs) = secs.trim().parse() {
                config.refresh_interval = Duration::from_secs(secs);
            }
        }

        if let Some(secs) = var("EUROFX_FETCH_TIMEOUT_SECS") {
            if let Ok(secs) = secs.trim().parse() {
                config.fetch_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(addr) = var("EUROFX_LISTEN_ADDR") {
            if let Ok(addr) = addr.trim().parse() {
                config.listen_addr = addr;
            }
        }

        if let Some(list) = var("EUROFX_CURRENCIES") {
            config.currencies = list
                .split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string)
                .collect();
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.feed_url.starts_with("http://") || self.feed_url.starts_with("https://")) {
            return Err(ConfigError::InvalidFeedUrl(self.feed_url.clone()));
        }

        if self.refresh_interval.is_zero() {
            return Err(ConfigError::ZeroRefreshInterval);
        }

        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroFetchTimeout);
        }

        self.allow_set().map(|_| ())
    }

    /// Build the allow-set from the configured currency list.
    pub fn allow_set(&self) -> Result<AllowSet, ConfigError> {
        if self.currencies.is_empty() {
            return Err(ConfigError::NoCurrencies);
        }

        let currencies = self
            .currencies
            .iter()
            .map(|code| {
                let currency = Currency::parse(code)
                    .map_err(|_| ConfigError::InvalidCurrency(code.clone()))?;
                if currency.is_base() {
                    return Err(ConfigError::BaseCurrencyListed);
                }
                Ok(currency)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AllowSet::new(currencies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.allow_set().unwrap().len(), 32);
    }

    #[test]
    fn test_from_vars() {
        let config = config_from(&[
            ("EUROFX_FEED_URL", "http://localhost:9000/hist.xml"),
            ("EUROFX_REFRESH_INTERVAL_SECS", "120"),
            ("EUROFX_FETCH_TIMEOUT_SECS", "5"),
            ("EUROFX_LISTEN_ADDR", "127.0.0.1:3000"),
            ("EUROFX_CURRENCIES", "usd, JPY,,gbp "),
        ]);

        assert_eq!(config.feed_url, "http://localhost:9000/hist.xml");
        assert_eq!(config.refresh_interval, Duration::from_secs(120));
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.listen_addr, "127.0.0.1:3000".parse().unwrap());

        let allow = config.allow_set().unwrap();
        assert_eq!(allow.len(), 3);
        assert!(allow.contains(&Currency::gbp()));
    }

    #[test]
    fn test_unparsable_values_keep_defaults() {
        let config = config_from(&[
            ("EUROFX_REFRESH_INTERVAL_SECS", "hourly"),
            ("EUROFX_LISTEN_ADDR", "not an address"),
        ]);
        let defaults = ServerConfig::default();

        assert_eq!(config.refresh_interval, defaults.refresh_interval);
        assert_eq!(config.listen_addr, defaults.listen_addr);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = ServerConfig::default();
        config.refresh_interval = Duration::ZERO;
        assert_eq!(config.validate(), Err(ConfigError::ZeroRefreshInterval));

        let mut config = ServerConfig::default();
        config.fetch_timeout = Duration::ZERO;
        assert_eq!(config.validate(), Err(ConfigError::ZeroFetchTimeout));

        let mut config = ServerConfig::default();
        config.feed_url = "ftp://example.com/hist.xml".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidFeedUrl(_))));
    }

    #[test]
    fn test_invalid_currency_lists() {
        let config = config_from(&[("EUROFX_CURRENCIES", " , ")]);
        assert_eq!(config.validate(), Err(ConfigError::NoCurrencies));

        let config = config_from(&[("EUROFX_CURRENCIES", "USD,EUR")]);
        assert_eq!(config.validate(), Err(ConfigError::BaseCurrencyListed));

        let config = config_from(&[("EUROFX_CURRENCIES", "USD,DOLLAR")]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidCurrency("DOLLAR".to_string()))
        );
    }
}
