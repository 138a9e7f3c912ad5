//! Feed error types.

use thiserror::Error;

/// Errors that abort a refresh cycle.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Feed could not be reached.
    #[error("Feed transport error: {0}")]
    Transport(String),

    /// Feed answered with a non-success status.
    #[error("Feed returned HTTP {status}")]
    Remote { status: u16 },

    /// Feed payload is malformed.
    #[error("Feed decode error: {0}")]
    Decode(String),
}

impl FeedError {
    /// Whether the next scheduled cycle has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            FeedError::Transport(_) => true,
            FeedError::Remote { status } => *status >= 500 || *status == 429,
            FeedError::Decode(_) => false,
        }
    }

    /// Short error kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Transport(_) => "TRANSPORT",
            FeedError::Remote { .. } => "REMOTE",
            FeedError::Decode(_) => "DECODE",
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FeedError::Remote {
                status: status.as_u16(),
            },
            None => FeedError::Transport(err.to_string()),
        }
    }
}

/// Result type for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;
