//! Metric collections for pollers and the dispatcher

pub mod dispatch;
pub mod poll;

use std::sync::Arc;

pub use dispatch::DispatchMetrics;
pub use poll::PollMetrics;

/// All metrics of one host process.
#[derive(Debug, Default, Clone)]
pub struct NotifierMetrics {
    pub calendar: Arc<PollMetrics>,
    pub github: Arc<PollMetrics>,
    pub dispatch: Arc<DispatchMetrics>,
}

impl NotifierMetrics {
    pub fn new() -> Self {
        Self::default()
    }
}
