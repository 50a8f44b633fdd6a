//! Wiring of the host daemon

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use notifier_core::{PanelLink, SystemClock};
use notifier_domain::Config;
use notifier_infra::dispatch::Dispatcher;
use notifier_infra::integrations::{GitHubPullSource, GoogleCalendarSource};
use notifier_infra::link::{HostLink, SerialPanel, SerialPortChannel};
use notifier_infra::observability::metrics::NotifierMetrics;
use notifier_infra::scheduling::{
    PullPoller, PullPollerConfig, ReminderScheduler, ReminderSchedulerConfig,
};
use notifier_infra::DispatchError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::logging::error_label;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs until Ctrl-C or until the dispatcher stops on a lost link.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let serial = &config.serial;
    let channel = SerialPortChannel::open(&serial.port, serial.baud_rate, serial.read_timeout())
        .with_context(|| format!("opening serial port {}", serial.port))?;
    let link = HostLink::new(channel, serial.protocol).with_response_timeout(serial.response_timeout());
    let panel = Arc::new(SerialPanel::new(link));

    match panel.identify().await {
        Ok(identity) => info!(%identity, protocol = %serial.protocol, "Panel connected"),
        Err(err) if err.is_recoverable() => {
            warn!(error = %err, kind = error_label(&err), "Panel did not identify; continuing");
        }
        Err(err) => return Err(anyhow!(err).context("identifying panel")),
    }

    let metrics = NotifierMetrics::new();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let dispatcher = Dispatcher::from_config(panel, &config, Arc::clone(&metrics.dispatch));
    let mut dispatch_task: JoinHandle<Result<(), DispatchError>> = {
        let cancel = cancel.clone();
        tokio::spawn(async move { dispatcher.run(events_rx, cancel).await })
    };

    let mut reminders = if config.calendar.enabled {
        let source = GoogleCalendarSource::new(&config.calendar).context("building calendar source")?;
        let mut scheduler = ReminderScheduler::new(
            Arc::new(source),
            Arc::new(SystemClock),
            events_tx.clone(),
            ReminderSchedulerConfig::from(&config.calendar),
            Arc::clone(&metrics.calendar),
        );
        scheduler.start().await?;
        Some(scheduler)
    } else {
        info!("Calendar reminders disabled");
        None
    };

    let mut pulls = if config.github.enabled {
        let source = GitHubPullSource::new(&config.github).context("building GitHub source")?;
        let mut poller = PullPoller::new(
            Arc::new(source),
            events_tx.clone(),
            PullPollerConfig::new(&config.github, &config.panel),
            Arc::clone(&metrics.github),
        );
        poller.start().await?;
        Some(poller)
    } else {
        info!("Pull-request poller disabled");
        None
    };

    // Producers own the remaining senders.
    drop(events_tx);
    if reminders.is_none() && pulls.is_none() {
        warn!("No event producers enabled; nothing will be rendered");
    }

    let finished = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl-C")?;
            info!("Shutdown requested");
            None
        }
        joined = &mut dispatch_task => Some(joined),
    };

    if let Some(scheduler) = reminders.as_mut() {
        if let Err(err) = scheduler.stop().await {
            warn!(error = %err, "Reminder scheduler did not stop cleanly");
        }
    }
    if let Some(poller) = pulls.as_mut() {
        if let Err(err) = poller.stop().await {
            warn!(error = %err, "Pull poller did not stop cleanly");
        }
    }

    let joined = match finished {
        Some(joined) => joined,
        None => {
            cancel.cancel();
            tokio::time::timeout(SHUTDOWN_TIMEOUT, dispatch_task)
                .await
                .context("dispatcher did not stop in time")?
        }
    };

    info!(
        calendar_fetches = metrics.calendar.fetch_count(),
        pull_fetches = metrics.github.fetch_count(),
        calendar_avg_fetch_ms = metrics.calendar.avg_fetch_time_ms().ok(),
        pull_avg_fetch_ms = metrics.github.avg_fetch_time_ms().ok(),
        fetch_errors = metrics.calendar.error_count() + metrics.github.error_count(),
        fetch_timeouts = metrics.calendar.timeout_count() + metrics.github.timeout_count(),
        rendered = metrics.dispatch.rendered(),
        rejected = metrics.dispatch.rejected(),
        "Notifier stopped"
    );

    match joined.context("dispatcher task panicked")? {
        Ok(()) => Ok(()),
        Err(err) => {
            error!(error = %err, "Dispatcher stopped on a fatal error");
            Err(anyhow!(err))
        }
    }
}
