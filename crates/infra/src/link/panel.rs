//! Async [`PanelLink`] adapter over a blocking [`HostLink`]

use std::sync::Arc;

use async_trait::async_trait;
use notifier_core::protocol::Command;
use notifier_core::PanelLink;
use notifier_domain::{NotifierError, ProtocolVersion, Result};
use parking_lot::Mutex;
use tracing::debug;

use super::channel::SerialChannel;
use super::host_link::HostLink;

/// Shares one [`HostLink`] between async callers.
///
/// The mutex keeps at most one round trip in flight; each round trip runs
/// on the blocking pool so serial reads never stall the runtime.
pub struct SerialPanel<C> {
    link: Arc<Mutex<HostLink<C>>>,
}

impl<C> Clone for SerialPanel<C> {
    fn clone(&self) -> Self {
        Self { link: Arc::clone(&self.link) }
    }
}

impl<C: SerialChannel + 'static> SerialPanel<C> {
    pub fn new(link: HostLink<C>) -> Self {
        Self { link: Arc::new(Mutex::new(link)) }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.link.lock().version()
    }
}

#[async_trait]
impl<C: SerialChannel + 'static> PanelLink for SerialPanel<C> {
    async fn send(&self, command: Command) -> Result<String> {
        let link = Arc::clone(&self.link);
        let name = command.name();

        let reply = tokio::task::spawn_blocking(move || link.lock().send_command(&command))
            .await
            .map_err(|err| NotifierError::Internal(format!("serial task failed: {err}")))?;

        debug!(command = name, ok = reply.is_ok(), "Panel round trip finished");
        reply.map_err(NotifierError::from)
    }
}
