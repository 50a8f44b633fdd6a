//! External service integrations
//!
//! HTTP collaborators implementing the core source ports:
//! - [`GoogleCalendarSource`] for [`notifier_core::CalendarSource`]
//! - [`GitHubPullSource`] for [`notifier_core::PullSource`]
//!
//! Each request is retried per [`RetryPolicy`] when its failure is transient.

pub mod error;
pub mod github;
pub mod google_calendar;
pub mod retry;

pub use error::{FetchError, FetchErrorCategory, FetchResult};
pub use github::GitHubPullSource;
pub use google_calendar::GoogleCalendarSource;
pub use retry::RetryPolicy;
