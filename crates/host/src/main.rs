//! `notifier` - drives the button panel from calendar and GitHub state.

mod app;
mod logging;

use anyhow::Context;
use notifier_infra::config;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let config = config::load().context("loading configuration")?;
    logging::init(&config.logging)?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) => warn!(error = %err, "No .env file loaded"),
    }

    config.validate().context("validating configuration")?;
    info!(
        port = %config.serial.port,
        calendar = config.calendar.enabled,
        github = config.github.enabled,
        "Notifier starting"
    );

    app::run(config).await
}
