//! Host link error types

use std::time::Duration;

use notifier_core::EncodeError;
use notifier_domain::NotifierError;
use thiserror::Error;

use crate::errors::InfraError;

/// Errors raised by a serial round trip.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The device answered `ERROR`.
    #[error("Device rejected command: {message}")]
    Device { message: String },

    /// No echo and result arrived in time.
    #[error("No response within {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Command cannot be encoded: {0}")]
    Encode(#[from] EncodeError),

    #[error("Serial I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serial")]
    #[error("Failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
}

/// Convenience type alias for link operations
pub type LinkResult<T> = Result<T, LinkError>;

impl From<LinkError> for NotifierError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::Device { message } => NotifierError::Protocol(message),
            LinkError::Timeout { .. } => NotifierError::Protocol(err.to_string()),
            LinkError::Encode(source) => source.into(),
            LinkError::Io(source) => InfraError::from(source).into(),
            #[cfg(feature = "serial")]
            LinkError::Open { source, .. } => InfraError::from(source).into(),
        }
    }
}
