//! Currency and exchange-rate types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ParseError, ParseResult};

/// Code of the currency every rate is quoted against.
pub const BASE_CURRENCY: &str = "EUR";

/// ISO 4217 currency code.
///
/// Codes are always held upper-case, so `usd` and `USD` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code without validating it.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Parse a currency code, accepting exactly three ASCII letters in any case.
    pub fn parse(code: &str) -> ParseResult<Self> {
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(ParseError::InvalidCurrency(code.to_string()))
        }
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Whether this is the currency all rates are quoted against.
    pub fn is_base(&self) -> bool {
        self.0 == BASE_CURRENCY
    }

    /// The base currency.
    pub fn base() -> Self {
        Self::new(BASE_CURRENCY)
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }

    pub fn jpy() -> Self {
        Self::new("JPY")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Currency {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = ParseError;

    fn try_from(s: String) -> ParseResult<Self> {
        Self::parse(&s)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

/// Rate of one currency against the base currency on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Quoted currency.
    pub currency: Currency,
    /// Units of `currency` per one unit of the base currency.
    pub rate: Decimal,
}

impl ExchangeRate {
    /// Create a new exchange rate.
    pub fn new(currency: Currency, rate: Decimal) -> Self {
        Self { currency, rate }
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", BASE_CURRENCY, self.currency, self.rate)
    }
}
