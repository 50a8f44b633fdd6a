//! Device replies

use std::fmt;

use notifier_domain::constants::{DEVICE_IDENTITY, REPLY_ERROR_PREFIX, REPLY_OK};

/// Result line written after a command's echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Identity,
    Ok,
    Error(String),
}

impl Reply {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str(DEVICE_IDENTITY),
            Self::Ok => f.write_str(REPLY_OK),
            Self::Error(message) => write!(f, "{REPLY_ERROR_PREFIX}: {message}"),
        }
    }
}
