//! Pull-request collaborator port interfaces

use async_trait::async_trait;
use notifier_domain::{Pull, Result};

/// Source of the author's pull requests with states already derived.
#[async_trait]
pub trait PullSource: Send + Sync {
    /// Fetch open pulls in a stable order (most recently updated first).
    async fn fetch_open_pulls(&self) -> Result<Vec<Pull>>;
}
