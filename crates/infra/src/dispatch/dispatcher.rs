//! Single-consumer event dispatcher.
//!
//! Pops one event at a time from the unbounded queue, plans its commands and
//! sends them over the panel link in order. Being the only consumer, it is
//! what keeps at most one command in flight on the serial link.

use std::sync::Arc;
use std::time::Duration;

use notifier_core::{plan, PanelLayout, PanelLink};
use notifier_domain::config::Config;
use notifier_domain::Event;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::error::DispatchError;
use crate::observability::log_metric;
use crate::observability::metrics::DispatchMetrics;

/// Renders queued panel events onto the device.
pub struct Dispatcher {
    panel: Arc<dyn PanelLink>,
    layout: PanelLayout,
    idle_timeout: Duration,
    metrics: Arc<DispatchMetrics>,
}

impl Dispatcher {
    pub fn new(
        panel: Arc<dyn PanelLink>,
        layout: PanelLayout,
        idle_timeout: Duration,
        metrics: Arc<DispatchMetrics>,
    ) -> Self {
        Self { panel, layout, idle_timeout, metrics }
    }

    pub fn from_config(panel: Arc<dyn PanelLink>, config: &Config, metrics: Arc<DispatchMetrics>) -> Self {
        Self::new(panel, PanelLayout::from(&config.panel), config.dispatcher.idle_timeout(), metrics)
    }

    /// Consume events until cancelled, until every producer is gone, or
    /// until the link fails.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Link`] when the serial link is lost. Rejected or
    /// unencodable commands are logged and skipped.
    #[instrument(skip_all)]
    pub async fn run(
        &self,
        mut events: UnboundedReceiver<Event>,
        cancel: CancellationToken,
    ) -> Result<(), DispatchError> {
        info!(idle_timeout_secs = self.idle_timeout.as_secs(), "Dispatcher started");

        loop {
            let received = tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    debug!("Dispatcher cancelled");
                    return Ok(());
                }
                received = tokio::time::timeout(self.idle_timeout, events.recv()) => received,
            };

            match received {
                Err(_) => self.idle_tick(),
                Ok(None) => {
                    info!("All producers closed; dispatcher exiting");
                    return Ok(());
                }
                Ok(Some(event)) => self.render(&event).await?,
            }
        }
    }

    /// Send every planned command of one event.
    ///
    /// # Errors
    ///
    /// Only fatal link failures are returned.
    pub async fn render(&self, event: &Event) -> Result<(), DispatchError> {
        let kind = event.kind();
        let commands = plan(event, &self.layout);
        debug!(event = kind, commands = commands.len(), "Rendering event");

        for command in commands {
            let name = command.name();
            if let Err(err) = self.panel.send(command).await {
                let err = DispatchError::from_send(kind, name, err);
                if err.is_fatal() {
                    error!(error = %err, "Panel link lost");
                    return Err(err);
                }
                log_metric(self.metrics.record_rejected(), "dispatch.rejected");
                warn!(error = %err, "Panel command failed; continuing");
            }
        }

        log_metric(self.metrics.record_rendered(), "dispatch.rendered");
        Ok(())
    }

    fn idle_tick(&self) {
        log_metric(self.metrics.record_idle_tick(), "dispatch.idle");
        info!(
            rendered = self.metrics.rendered(),
            rejected = self.metrics.rejected(),
            idle_ticks = self.metrics.idle_ticks(),
            "Dispatcher idle"
        );
    }
}
