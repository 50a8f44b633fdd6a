//! Pull-request poller.
//!
//! Fetches the author's open pulls on a fixed interval, runs the slot
//! allocator over each fresh snapshot and queues the resulting panel events.
//! A failed or timed out fetch skips the cycle without touching the
//! allocator, so the panel keeps its last rendered state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use notifier_core::{PullSource, SlotAllocator};
use notifier_domain::config::{GithubConfig, PanelConfig};
use notifier_domain::{Event, Slot};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::observability::log_metric;
use crate::observability::metrics::PollMetrics;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the pull poller.
#[derive(Debug, Clone)]
pub struct PullPollerConfig {
    pub poll_interval: Duration,
    pub fetch_timeout: Duration,
    /// Number of panel slots available to pulls.
    pub slot_count: Slot,
    pub join_timeout: Duration,
}

impl PullPollerConfig {
    pub fn new(github: &GithubConfig, panel: &PanelConfig) -> Self {
        Self {
            poll_interval: github.poll_interval(),
            fetch_timeout: github.fetch_timeout(),
            slot_count: panel.pull_slot_count,
            join_timeout: Duration::from_secs(5),
        }
    }
}

impl Default for PullPollerConfig {
    fn default() -> Self {
        Self::new(&GithubConfig::default(), &PanelConfig::default())
    }
}

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Events were queued; the allocator committed the new usage.
    Rendered { events: usize },
    /// The fetch failed or timed out; nothing changed.
    Skipped,
    /// The event queue is gone.
    QueueClosed,
}

/// Periodic pull poller with explicit lifecycle management.
pub struct PullPoller {
    source: Arc<dyn PullSource>,
    events: UnboundedSender<Event>,
    config: PullPollerConfig,
    metrics: Arc<PollMetrics>,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl PullPoller {
    pub fn new(
        source: Arc<dyn PullSource>,
        events: UnboundedSender<Event>,
        config: PullPollerConfig,
        metrics: Arc<PollMetrics>,
    ) -> Self {
        Self {
            source,
            events,
            config,
            metrics,
            cancellation: CancellationToken::new(),
            task_handle: None,
        }
    }

    /// Spawn the polling task; the first cycle runs immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::AlreadyRunning`] if the task is alive.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        let config = self.config.clone();
        let metrics = Arc::clone(&self.metrics);
        let cancel = self.cancellation.clone();

        self.task_handle = Some(tokio::spawn(async move {
            Self::poll_loop(source, events, config, metrics, cancel).await;
        }));

        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            slots = self.config.slot_count,
            "Pull poller started"
        );
        Ok(())
    }

    /// Cancel the task and wait for it to finish.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NotRunning`] when never started, [`SchedulerError::Timeout`]
    /// when the task does not finish within the join timeout.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let Some(handle) = self.task_handle.take() else {
            return Err(SchedulerError::NotRunning);
        };

        self.cancellation.cancel();

        let join_timeout = self.config.join_timeout;
        tokio::time::timeout(join_timeout, handle)
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })??;

        info!("Pull poller stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.task_handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    async fn poll_loop(
        source: Arc<dyn PullSource>,
        events: UnboundedSender<Event>,
        config: PullPollerConfig,
        metrics: Arc<PollMetrics>,
        cancel: CancellationToken,
    ) {
        let mut allocator = SlotAllocator::new(config.slot_count);

        loop {
            let outcome = tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    debug!("Pull poll loop cancelled");
                    break;
                }
                outcome = run_cycle(&*source, &mut allocator, &events, config.fetch_timeout, &metrics) => outcome,
            };

            if outcome == CycleOutcome::QueueClosed {
                info!("Event queue closed; pull poller exiting");
                break;
            }

            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("Pull poll loop cancelled");
                    break;
                }
                () = tokio::time::sleep(config.poll_interval) => {}
            }
        }
    }
}

impl Drop for PullPoller {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("PullPoller dropped while running; cancelling task");
            self.cancellation.cancel();
        }
    }
}

/// Fetch, allocate and queue one snapshot of pulls.
///
/// The allocator only commits when the fetch succeeded.
#[instrument(skip_all)]
pub async fn run_cycle(
    source: &dyn PullSource,
    allocator: &mut SlotAllocator,
    events: &UnboundedSender<Event>,
    fetch_timeout: Duration,
    metrics: &PollMetrics,
) -> CycleOutcome {
    let started = Instant::now();
    let result = tokio::time::timeout(fetch_timeout, source.fetch_open_pulls()).await;
    log_metric(metrics.record_fetch_time(started.elapsed()), "scheduler.pulls.fetch_duration");

    let pulls = match result {
        Ok(Ok(pulls)) => pulls,
        Ok(Err(err)) => {
            log_metric(metrics.record_error(), "scheduler.pulls.fetch_error");
            warn!(error = %err, recoverable = err.is_recoverable(), "Pull fetch failed; skipping cycle");
            return CycleOutcome::Skipped;
        }
        Err(_) => {
            log_metric(metrics.record_timeout(), "scheduler.pulls.fetch_timeout");
            warn!(timeout_secs = fetch_timeout.as_secs(), "Pull fetch timed out; skipping cycle");
            return CycleOutcome::Skipped;
        }
    };

    let allocation = allocator.allocate(&pulls);
    debug!(
        fetched = pulls.len(),
        used = allocation.used,
        dropped = allocation.dropped,
        "Pull slots allocated"
    );

    let count = allocation.events.len();
    for event in allocation.events {
        if events.send(event).is_err() {
            return CycleOutcome::QueueClosed;
        }
    }
    log_metric(metrics.record_events(count), "scheduler.pulls.emitted");

    CycleOutcome::Rendered { events: count }
}
