//! Dispatcher error types

use notifier_domain::NotifierError;
use thiserror::Error;

/// A command of a rendered event failed.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The serial link is gone; the dispatcher cannot continue.
    #[error("Panel link failed while rendering {event}: {source}")]
    Link {
        event: &'static str,
        #[source]
        source: NotifierError,
    },

    /// The device answered `ERROR` or did not answer in time.
    #[error("Panel rejected {command} for {event}: {source}")]
    Rejected {
        event: &'static str,
        command: &'static str,
        #[source]
        source: NotifierError,
    },

    /// The planned command is not representable in the link's protocol version.
    #[error("Cannot encode {command} for {event}: {source}")]
    Encode {
        event: &'static str,
        command: &'static str,
        #[source]
        source: NotifierError,
    },
}

impl DispatchError {
    /// Classify a failed panel round trip.
    pub fn from_send(event: &'static str, command: &'static str, source: NotifierError) -> Self {
        match source {
            NotifierError::Parse(_) => Self::Encode { event, command, source },
            err if err.is_recoverable() => Self::Rejected { event, command, source: err },
            err => Self::Link { event, source: err },
        }
    }

    /// Only a lost link ends the dispatcher.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Link { .. })
    }
}

impl From<DispatchError> for NotifierError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Link { source, .. }
            | DispatchError::Rejected { source, .. }
            | DispatchError::Encode { source, .. } => source,
        }
    }
}
