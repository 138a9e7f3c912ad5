//! Periodic background refresh.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::engine::{RefreshPipeline, RefreshReport};
use crate::error::FeedResult;
use crate::metrics::RefreshMetrics;

/// Scheduler operational state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the next tick.
    Idle,
    /// A refresh cycle is in flight.
    Refreshing,
}

/// Runs the refresh pipeline on a fixed interval.
pub struct RefreshScheduler {
    pipeline: RefreshPipeline,
    interval: Duration,
    state: RwLock<SchedulerState>,
    last_success: RwLock<Option<DateTime<Utc>>>,
    metrics: RefreshMetrics,
}

impl RefreshScheduler {
    /// Create a new scheduler.
    pub fn new(pipeline: RefreshPipeline, interval: Duration) -> Self {
        Self {
            pipeline,
            interval,
            state: RwLock::new(SchedulerState::Idle),
            last_success: RwLock::new(None),
            metrics: RefreshMetrics::new(),
        }
    }

    /// Run exactly one refresh cycle.
    ///
    /// Failures are logged and returned; the scheduler is back in
    /// [`SchedulerState::Idle`] either way.
    pub async fn run_cycle(&self) -> FeedResult<RefreshReport> {
        *self.state.write() = SchedulerState::Refreshing;
        self.metrics.cycle_started();

        let result = self.pipeline.refresh().await;

        match &result {
            Ok(report) => {
                self.metrics.cycle_succeeded(report.dates_added);
                *self.last_success.write() = Some(report.completed_at);
            }
            Err(e) => {
                self.metrics.cycle_failed();
                warn!(
                    error = %e,
                    kind = e.kind(),
                    retryable = e.is_retryable(),
                    next_attempt_in_secs = self.interval.as_secs(),
                    "Refresh cycle failed"
                );
            }
        }

        *self.state.write() = SchedulerState::Idle;
        result
    }

    /// Refresh immediately, then on every interval until shutdown.
    ///
    /// Shutdown is only observed between cycles; an in-flight cycle always
    /// runs to completion.
    pub async fn run(&self, mut shutdown_rx: mpsc::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown_rx.recv() => break,
            }
            let _ = self.run_cycle().await;
        }

        info!("Refresh scheduler stopped");
    }

    /// Start the refresh loop on a background task.
    pub fn spawn(self: Arc<Self>) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        info!(
            interval_secs = self.interval.as_secs(),
            "Refresh scheduler started"
        );
        let task = tokio::spawn(async move { self.run(shutdown_rx).await });

        SchedulerHandle { shutdown_tx, task }
    }

    /// Get the current scheduler state.
    pub fn state(&self) -> SchedulerState {
        *self.state.read()
    }

    /// When the last successful cycle finished.
    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        *self.last_success.read()
    }

    /// Refresh counters.
    pub fn metrics(&self) -> &RefreshMetrics {
        &self.metrics
    }
}

/// Handle to a spawned refresh loop.
///
/// Dropping the handle also stops the loop after the current cycle.
pub struct SchedulerHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            warn!(error = %e, "Refresh scheduler task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::filter::AllowSet;
    use crate::provider::StaticFeedSource;
    use crate::store::RateStore;
    use eurofx_common::Currency;
    use tokio_test::{assert_err, assert_ok};

    const FEED: &str = r#"<Envelope><Cube>
<Cube time="2024-01-15"><Cube currency="USD" rate="1.10"/></Cube>
<Cube time="2024-01-12"><Cube currency="USD" rate="1.09"/></Cube>
</Cube></Envelope>"#;

    fn scheduler(source: Arc<StaticFeedSource>, interval: Duration) -> Arc<RefreshScheduler> {
        let pipeline = RefreshPipeline::new(
            source,
            Arc::new(RateStore::new()),
            AllowSet::new([Currency::usd()]),
        );
        Arc::new(RefreshScheduler::new(pipeline, interval))
    }

    #[tokio::test]
    async fn test_run_cycle_success() {
        let source = Arc::new(StaticFeedSource::new(FEED));
        let scheduler = scheduler(source, Duration::from_secs(3600));
        assert!(scheduler.last_success().is_none());

        let report = assert_ok!(scheduler.run_cycle().await);

        assert_eq!(report.dates_added, 2);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.last_success(), Some(report.completed_at));

        let snapshot = scheduler.metrics().snapshot();
        assert_eq!(snapshot.cycles_succeeded, 1);
        assert_eq!(snapshot.dates_added, 2);
    }

    #[tokio::test]
    async fn test_run_cycle_failure_returns_to_idle() {
        let source = Arc::new(StaticFeedSource::unreachable());
        let scheduler = scheduler(source, Duration::from_secs(3600));

        let err = assert_err!(scheduler.run_cycle().await);

        assert!(matches!(err, FeedError::Transport(_)));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.last_success().is_none());
        assert_eq!(scheduler.metrics().snapshot().cycles_failed, 1);
        assert!(scheduler.pipeline.store().is_empty());
    }

    #[tokio::test]
    async fn test_failed_cycle_recovers_on_next_cycle() {
        let source = Arc::new(StaticFeedSource::failing_with_status(503));
        let scheduler = scheduler(source.clone(), Duration::from_secs(3600));

        assert_err!(scheduler.run_cycle().await);
        source.set_body(FEED);
        assert_ok!(scheduler.run_cycle().await);

        assert_eq!(scheduler.pipeline.store().len(), 2);
        let snapshot = scheduler.metrics().snapshot();
        assert_eq!(snapshot.cycles_total, 2);
        assert_eq!(snapshot.cycles_failed, 1);
        assert_eq!(snapshot.cycles_succeeded, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_refreshes_immediately_then_on_interval() {
        let source = Arc::new(StaticFeedSource::new(FEED));
        let scheduler = scheduler(source.clone(), Duration::from_secs(60));

        let handle = scheduler.clone().spawn();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.fetch_count(), 1);
        assert_eq!(scheduler.pipeline.store().len(), 2);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.fetch_count(), 2);

        handle.shutdown().await;
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_loop() {
        let source = Arc::new(StaticFeedSource::new(FEED));
        let scheduler = scheduler(source, Duration::from_secs(3600));

        let handle = scheduler.clone().spawn();
        let SchedulerHandle { shutdown_tx, task } = handle;
        drop(shutdown_tx);

        let joined = assert_ok!(tokio::time::timeout(Duration::from_secs(5), task).await);
        assert!(joined.is_ok());
    }
}
