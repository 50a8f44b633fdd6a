//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If `NOTIFIER_SERIAL_PORT` is set, the configuration comes from the
//!    environment (unset variables keep their defaults)
//! 2. Otherwise a config file is loaded, probing several paths
//! 3. JSON and TOML are supported, detected by extension
//! 4. Secrets are always read from the environment, never from files
//!
//! ## Environment Variables
//! - `NOTIFIER_SERIAL_PORT`: Serial device path
//! - `NOTIFIER_SERIAL_BAUD`: Baud rate
//! - `NOTIFIER_PROTOCOL`: Wire protocol revision (`v1`/`v2`)
//! - `NOTIFIER_CALENDAR_ENABLED`: Whether calendar reminders run (true/false)
//! - `NOTIFIER_CALENDAR_IDS`: Comma-separated calendar ids
//! - `NOTIFIER_CALENDAR_POLL_SECS`: Calendar poll interval in seconds
//! - `NOTIFIER_GITHUB_ENABLED`: Whether the pull poller runs (true/false)
//! - `NOTIFIER_GITHUB_AUTHOR`: Author whose pulls are shown
//! - `NOTIFIER_GITHUB_POLL_SECS`: Pull poll interval in seconds
//!
//! Secrets: `NOTIFIER_GOOGLE_ACCESS_TOKEN`, `NOTIFIER_GITHUB_TOKEN` (falls
//! back to `GH_TOKEN`).
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./notifier.{toml,json}` then `./config.{toml,json}`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use notifier_domain::{Config, NotifierError, ProtocolVersion, Result};

const SERIAL_PORT_VAR: &str = "NOTIFIER_SERIAL_PORT";

const CONFIG_FILE_NAMES: [&str; 4] = ["notifier.toml", "notifier.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `NotifierError::Config` if an environment value is malformed while
/// `NOTIFIER_SERIAL_PORT` is set, or if no config file can be loaded otherwise.
/// A malformed environment never falls back to a file.
pub fn load() -> Result<Config> {
    let config = if std::env::var_os(SERIAL_PORT_VAR).is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        config
    } else {
        tracing::debug!("{SERIAL_PORT_VAR} not set, loading configuration file");
        load_from_file(None)?
    };
    Ok(apply_secrets(config))
}

/// Load configuration from environment variables
///
/// `NOTIFIER_SERIAL_PORT` must be present; everything else is optional.
///
/// # Errors
/// Returns `NotifierError::Config` if the serial port is missing or a value
/// is malformed.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.serial.port = env_var(SERIAL_PORT_VAR)?;
    if let Some(baud) = env_parse::<u32>("NOTIFIER_SERIAL_BAUD", "baud rate")? {
        config.serial.baud_rate = baud;
    }
    if let Ok(value) = std::env::var("NOTIFIER_PROTOCOL") {
        config.serial.protocol = ProtocolVersion::from_str(&value).map_err(NotifierError::Config)?;
    }

    config.calendar.enabled = env_bool("NOTIFIER_CALENDAR_ENABLED", config.calendar.enabled)?;
    if let Ok(ids) = std::env::var("NOTIFIER_CALENDAR_IDS") {
        config.calendar.calendar_ids =
            ids.split(',').map(str::trim).filter(|id| !id.is_empty()).map(String::from).collect();
    }
    if let Some(secs) = env_parse::<u64>("NOTIFIER_CALENDAR_POLL_SECS", "calendar poll interval")? {
        config.calendar.poll_interval_seconds = secs;
    }

    config.github.enabled = env_bool("NOTIFIER_GITHUB_ENABLED", config.github.enabled)?;
    if let Ok(author) = std::env::var("NOTIFIER_GITHUB_AUTHOR") {
        config.github.author = author;
    }
    if let Some(secs) = env_parse::<u64>("NOTIFIER_GITHUB_POLL_SECS", "github poll interval")? {
        config.github.poll_interval_seconds = secs;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
///
/// # Errors
/// Returns `NotifierError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(NotifierError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            NotifierError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| NotifierError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path).map(strip_file_secrets)
}

/// Drop tokens written into a config file; secrets only come from the environment.
fn strip_file_secrets(mut config: Config) -> Config {
    let calendar_token = config.calendar.access_token.take();
    let github_token = config.github.token.take();
    if calendar_token.is_some() || github_token.is_some() {
        tracing::warn!("Ignoring API tokens found in config file; set them via environment");
    }
    config
}

/// Parse configuration from string content, format chosen by extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| NotifierError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| NotifierError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(NotifierError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Search multiple paths for configuration files
///
/// Searches the working directory, its parent and grandparent, then the
/// executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Fill API tokens from the environment.
fn apply_secrets(mut config: Config) -> Config {
    if let Ok(token) = std::env::var("NOTIFIER_GOOGLE_ACCESS_TOKEN") {
        config.calendar.access_token = Some(token);
    }
    if let Some(token) =
        std::env::var("NOTIFIER_GITHUB_TOKEN").or_else(|_| std::env::var("GH_TOKEN")).ok()
    {
        config.github.token = Some(token);
    }
    config
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| NotifierError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional environment variable.
fn env_parse<T: FromStr>(key: &str, what: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| NotifierError::Config(format!("Invalid {what}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
/// Anything else is a config error.
fn env_bool(key: &str, default: bool) -> Result<bool> {
    let Ok(value) = std::env::var(key) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(NotifierError::Config(format!("Invalid boolean for {key}: {value:?}"))),
    }
}
