//! Refresh counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Refresh pipeline metrics.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
    /// Cycles started.
    pub cycles_total: AtomicU64,
    /// Cycles that merged the whole feed.
    pub cycles_succeeded: AtomicU64,
    /// Cycles aborted by a feed error.
    pub cycles_failed: AtomicU64,
    /// Dates inserted into the store.
    pub dates_added: AtomicU64,
}

impl RefreshMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record cycle start.
    pub fn cycle_started(&self) {
        self.cycles_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record cycle success.
    pub fn cycle_succeeded(&self, dates_added: usize) {
        self.cycles_succeeded.fetch_add(1, Ordering::Relaxed);
        self.dates_added
            .fetch_add(dates_added as u64, Ordering::Relaxed);
    }

    /// Record cycle failure.
    pub fn cycle_failed(&self) {
        self.cycles_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles_total: self.cycles_total.load(Ordering::Relaxed),
            cycles_succeeded: self.cycles_succeeded.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            dates_added: self.dates_added.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cycles_total: u64,
    pub cycles_succeeded: u64,
    pub cycles_failed: u64,
    pub dates_added: u64,
}
