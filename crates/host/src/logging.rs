//! Tracing subscriber setup and log helpers

use anyhow::{anyhow, Context};
use notifier_domain::{LogFormat, LoggingConfig, NotifierError};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
///
/// Output goes to stderr so stdout stays free for piping.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .with_context(|| format!("invalid log filter {:?}", config.filter))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let installed = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

/// Convert a `NotifierError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &NotifierError) -> &'static str {
    match error {
        NotifierError::Parse(_) => "parse",
        NotifierError::Protocol(_) => "protocol",
        NotifierError::Fetch(_) => "fetch",
        NotifierError::SchedulingExhausted => "scheduling_exhausted",
        NotifierError::Config(_) => "config",
        NotifierError::Link(_) => "link",
        NotifierError::Internal(_) => "internal",
    }
}
