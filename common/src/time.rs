//! Calendar date keys for the rate store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ParseError, ParseResult};

/// A `YYYY-MM-DD` date key.
///
/// Only the shape is checked: four digits, dash, two digits, dash, two digits.
/// Whether the day exists on the calendar is left to the feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RateDate(String);

impl RateDate {
    /// Parse a date key.
    pub fn parse(s: &str) -> ParseResult<Self> {
        if Self::is_valid_shape(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ParseError::InvalidDate(s.to_string()))
        }
    }

    /// The date as written, e.g. `2024-01-15`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_valid_shape(s: &str) -> bool {
        let bytes = s.as_bytes();
        bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            })
    }
}

impl fmt::Display for RateDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RateDate {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RateDate {
    type Error = ParseError;

    fn try_from(s: String) -> ParseResult<Self> {
        Self::parse(&s)
    }
}

impl From<RateDate> for String {
    fn from(date: RateDate) -> Self {
        date.0
    }
}
