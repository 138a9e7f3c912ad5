//! eurofx Rate Engine
//!
//! Keeps an in-memory, date-indexed cache of EUR reference rates fed from a
//! historical XML feed.
//!
//! # Features
//!
//! - HTTP feed fetching behind the [`FeedSource`] trait
//! - Streaming XML decoding into envelope, date cubes and rates
//! - Allow-set filtering of retained currencies
//! - First-write-wins rate store safe for concurrent readers
//! - Periodic background refresh with a shutdown handle
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use eurofx_rates::{AllowSet, HttpFeedSource, RateStore, RefreshPipeline, RefreshScheduler};
//!
//! let store = Arc::new(RateStore::new());
//! let source = Arc::new(HttpFeedSource::new(url, Duration::from_secs(30))?);
//! let pipeline = RefreshPipeline::new(source, store.clone(), AllowSet::default());
//! let handle = Arc::new(RefreshScheduler::new(pipeline, Duration::from_secs(3600))).spawn();
//!
//! let rates = store.lookup(&"2024-01-15".parse()?);
//! ```

pub mod engine;
pub mod provider;
pub mod decoder;
pub mod filter;
pub mod store;
pub mod scheduler;
pub mod metrics;
pub mod error;

pub use engine::{RefreshPipeline, RefreshReport};
pub use provider::{FeedSource, HttpFeedSource};
#[cfg(any(test, feature = "test-utils"))]
pub use provider::StaticFeedSource;
pub use decoder::{decode, Cube, Envelope};
pub use filter::AllowSet;
pub use store::{DateRates, RateStore, SharedRateStore};
pub use scheduler::{RefreshScheduler, SchedulerHandle, SchedulerState};
pub use metrics::RefreshMetrics;
pub use error::{FeedError, FeedResult};
