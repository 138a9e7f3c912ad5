//! eurofx Common Types
//!
//! Shared types used across the eurofx workspace: currency codes, the
//! exchange-rate record served to clients, and the date key rates are
//! indexed by.

pub mod monetary;
pub mod error;
pub mod time;

pub use monetary::*;
pub use error::*;
pub use time::*;
