//! Fetch, decode, filter and merge pipeline.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::decoder::decode;
use crate::error::FeedResult;
use crate::filter::AllowSet;
use crate::provider::FeedSource;
use crate::store::RateStore;

/// Outcome of one successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    /// Dates present in the feed.
    pub dates_seen: usize,
    /// Dates newly inserted into the store.
    pub dates_added: usize,
    /// When the merge finished.
    pub completed_at: DateTime<Utc>,
}

/// Pulls the feed into the rate store.
pub struct RefreshPipeline {
    source: Arc<dyn FeedSource>,
    store: Arc<RateStore>,
    allow_set: AllowSet,
}

impl RefreshPipeline {
    /// Create a new pipeline writing into `store`.
    pub fn new(source: Arc<dyn FeedSource>, store: Arc<RateStore>, allow_set: AllowSet) -> Self {
        Self {
            source,
            store,
            allow_set,
        }
    }

    /// The store this pipeline writes into.
    pub fn store(&self) -> &Arc<RateStore> {
        &self.store
    }

    /// Run fetch → decode → filter → merge once.
    ///
    /// The feed is fully decoded before anything is merged, so a fetch or
    /// decode failure leaves the store untouched.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn refresh(&self) -> FeedResult<RefreshReport> {
        let raw = self.source.fetch().await?;
        let envelope = decode(&raw)?;

        debug!(
            subject = %envelope.subject,
            sender = %envelope.sender,
            cubes = envelope.cubes.len(),
            "Decoded feed"
        );

        let dates_seen = envelope.cubes.len();
        let mut dates_added = 0;
        for cube in envelope.cubes {
            let rates = self.allow_set.filter(&cube.exchanges);
            if self.store.merge(cube.date, rates) {
                dates_added += 1;
            }
        }

        info!(
            dates_seen,
            dates_added,
            dates_stored = self.store.len(),
            latest_date = ?self.store.latest_date(),
            "Rate store refreshed"
        );

        Ok(RefreshReport {
            dates_seen,
            dates_added,
            completed_at: Utc::now(),
        })
    }
}
