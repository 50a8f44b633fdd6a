//! Fetch error types shared by the HTTP collaborators
//!
//! Provides error classification with retry metadata. Every variant
//! converts into [`NotifierError::Fetch`] or [`NotifierError::Config`]; the
//! pollers log the failure and retry on their next interval.

use std::time::Duration;

use notifier_domain::NotifierError;
use reqwest::StatusCode;
use thiserror::Error;

use crate::errors::InfraError;

/// Categories of fetch errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorCategory {
    /// Bad or missing token - retrying will not help
    Authentication,
    /// 403/429 from the API - retry after the rate limit window
    RateLimit,
    /// 5xx responses - retryable
    Server,
    /// Other 4xx responses - non-retryable
    Client,
    /// Connection failures and timeouts - retryable
    Network,
    /// Unexpected payload shape
    Decode,
}

/// Collaborator fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Rate limited by {url} (HTTP {status})")]
    RateLimited { status: StatusCode, url: String },

    #[error("Authentication failed for {url}: {reason}")]
    Auth { url: String, reason: String },

    #[error("Unexpected HTTP {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// Classify a non-success response.
    pub fn from_status(status: StatusCode, url: impl Into<String>) -> Self {
        let url = url.into();
        match status {
            StatusCode::UNAUTHORIZED => Self::Auth { url, reason: "token rejected".into() },
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Self::RateLimited { status, url },
            _ => Self::Status { status, url },
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> FetchErrorCategory {
        match self {
            Self::Auth { .. } => FetchErrorCategory::Authentication,
            Self::RateLimited { .. } => FetchErrorCategory::RateLimit,
            Self::Status { status, .. } if status.is_server_error() => FetchErrorCategory::Server,
            Self::Status { .. } | Self::InvalidUrl(_) => FetchErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => FetchErrorCategory::Network,
            Self::Decode(_) => FetchErrorCategory::Decode,
        }
    }

    /// Check if this error should be retried
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            FetchErrorCategory::RateLimit | FetchErrorCategory::Server | FetchErrorCategory::Network
        )
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}

impl From<FetchError> for InfraError {
    fn from(err: FetchError) -> Self {
        let notifier_err = match err {
            FetchError::Auth { .. } | FetchError::InvalidUrl(_) => {
                NotifierError::Config(err.to_string())
            }
            FetchError::Network(source) => return InfraError::from(source),
            _ => NotifierError::Fetch(err.to_string()),
        };
        InfraError(notifier_err)
    }
}

impl From<FetchError> for NotifierError {
    fn from(err: FetchError) -> Self {
        InfraError::from(err).into()
    }
}

/// Convenience type alias for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;
