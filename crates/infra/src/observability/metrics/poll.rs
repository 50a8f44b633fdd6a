//! Poll metrics for the calendar and pull-request fetch loops
//!
//! ## Design
//! - **SeqCst ordering** for atomics used in derived metrics (average fetch time)
//! - **No locking needed** - simple atomic counters
//! - **Microsecond storage** - reporting helpers convert to ms

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use crate::observability::{MetricsError, MetricsResult};

/// Counters for one polling loop.
#[derive(Debug, Default)]
pub struct PollMetrics {
    /// Total time spent fetching in microseconds
    pub total_fetch_time_micros: AtomicU64,
    /// Number of completed fetches (successful or not)
    pub fetch_count: AtomicUsize,
    pub errors: AtomicUsize,
    pub timeouts: AtomicUsize,
    /// Events pushed onto the dispatcher queue
    pub events_emitted: AtomicUsize,
}

impl PollMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fetch_time(&self, duration: Duration) -> MetricsResult<()> {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        // SeqCst for consistency with the average calculation
        self.total_fetch_time_micros.fetch_add(micros, Ordering::SeqCst);
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    pub fn record_error(&self) -> MetricsResult<()> {
        self.errors.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn record_timeout(&self) -> MetricsResult<()> {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn record_events(&self, count: usize) -> MetricsResult<()> {
        self.events_emitted.fetch_add(count, Ordering::Relaxed);
        Ok(())
    }

    /// Average fetch time in milliseconds.
    ///
    /// # Errors
    /// [`MetricsError::EmptyData`] before the first fetch completes.
    pub fn avg_fetch_time_ms(&self) -> MetricsResult<f64> {
        let total_time = self.total_fetch_time_micros.load(Ordering::SeqCst);
        let count = self.fetch_count.load(Ordering::SeqCst);

        if count == 0 {
            return Err(MetricsError::EmptyData { metric: "average fetch time" });
        }

        #[allow(clippy::cast_precision_loss)]
        Ok((total_time as f64 / count as f64) / 1_000.0)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn timeout_count(&self) -> usize {
        self.timeouts.load(Ordering::Relaxed)
    }

    pub fn events_emitted(&self) -> usize {
        self.events_emitted.load(Ordering::Relaxed)
    }
}
