//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the notifier
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum NotifierError {
    /// Malformed wire command or key command.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The device answered `ERROR` to a command.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Transient failure reaching the calendar or pull-request source.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// No future reminder exists in the current calendar snapshot.
    #[error("No reminder is schedulable in the current snapshot")]
    SchedulingExhausted,

    #[error("Configuration error: {0}")]
    Config(String),

    /// Serial link failure (port gone, timeout, closed).
    #[error("Link error: {0}")]
    Link(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl NotifierError {
    /// Whether the error is recovered at the boundary where it occurs.
    ///
    /// Only link and internal failures may end the host process.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Link(_) | Self::Internal(_))
    }
}

/// Result type alias for notifier operations
pub type Result<T> = std::result::Result<T, NotifierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = NotifierError::Protocol("bad button".into());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"type":"Protocol","message":"bad button"}"#);
    }

    #[test]
    fn link_failures_are_not_recoverable() {
        assert!(!NotifierError::Link("port closed".into()).is_recoverable());
        assert!(NotifierError::Fetch("429".into()).is_recoverable());
        assert!(NotifierError::SchedulingExhausted.is_recoverable());
    }
}
