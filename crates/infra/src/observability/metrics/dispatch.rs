//! Dispatcher metrics

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::observability::MetricsResult;

/// Counters for the dispatcher loop.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Events fully rendered
    pub rendered: AtomicUsize,
    /// Commands the panel rejected
    pub rejected: AtomicUsize,
    pub idle_ticks: AtomicUsize,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_rendered(&self) -> MetricsResult<()> {
        self.rendered.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn record_rejected(&self) -> MetricsResult<()> {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn record_idle_tick(&self) -> MetricsResult<()> {
        self.idle_ticks.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn rendered(&self) -> usize {
        self.rendered.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn idle_ticks(&self) -> usize {
        self.idle_ticks.load(Ordering::Relaxed)
    }
}
