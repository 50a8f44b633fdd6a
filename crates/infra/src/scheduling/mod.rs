//! Background producers feeding the dispatcher queue
//!
//! - Reminder scheduler (calendar deadlines raced against snapshot polls)
//! - Pull poller (periodic pull-request fetch and slot allocation)
//!
//! Both follow the same runtime rules:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping on every fetch
//! - Structured tracing with `PollMetrics` integration

pub mod error;
pub mod pull_poller;
pub mod reminder_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use pull_poller::{run_cycle, CycleOutcome, PullPoller, PullPollerConfig};
pub use reminder_scheduler::{ReminderScheduler, ReminderSchedulerConfig};
