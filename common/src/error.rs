//! Parse errors for eurofx value types.

use thiserror::Error;

/// Errors raised when validating currency codes and date keys.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Currency code is not three ASCII letters.
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),

    /// Date is not in `YYYY-MM-DD` form.
    #[error("Invalid date: {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Result type alias for parsing operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
