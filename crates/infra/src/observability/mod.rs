//! Observability infrastructure for metrics
//!
//! Counters are plain atomics shared through `Arc`. Every record method
//! returns `MetricsResult<()>`; callers log a failure and carry on, a metric
//! is never allowed to interrupt the work being measured.
//!
//! ```rust
//! use notifier_infra::observability::metrics::PollMetrics;
//!
//! let metrics = PollMetrics::new();
//! if let Err(e) = metrics.record_error() {
//!     tracing::warn!("Failed to record metric: {}", e);
//! }
//! ```

pub mod metrics;

/// Metrics error type
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Empty data set - cannot calculate aggregate metric
    #[error("Empty data: cannot calculate {metric}")]
    EmptyData {
        /// Metric name that failed (e.g. "average fetch time")
        metric: &'static str,
    },
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Logs a failed metric update without interrupting the caller.
pub fn log_metric(result: MetricsResult<()>, metric: &'static str) {
    if let Err(err) = result {
        tracing::warn!(metric = metric, error = ?err, "Failed to record metric");
    }
}
