//! # Notifier Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The serial host link and its panel adapter
//! - Reminder scheduler and pull poller tasks
//! - The event dispatcher
//! - HTTP integrations (Google Calendar, GitHub)
//! - Configuration loading and metrics
//!
//! ## Architecture
//! - Implements traits defined in `notifier-core`
//! - Contains all "impure" code (serial I/O, HTTP, timers)

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod integrations;
pub mod link;
pub mod observability;
pub mod scheduling;

pub use dispatch::{DispatchError, Dispatcher};
pub use errors::InfraError;
pub use integrations::{FetchError, GitHubPullSource, GoogleCalendarSource};
pub use link::{HostLink, LinkError, SerialChannel, SerialPanel};
pub use scheduling::{PullPoller, ReminderScheduler, SchedulerError};
