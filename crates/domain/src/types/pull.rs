//! Pull-request snapshot items

use serde::{Deserialize, Serialize};

/// Review/check state of a pull request, derived fresh on every poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullState {
    /// Waiting on review or checks.
    Pending,
    /// Checks failing or changes requested.
    Failed,
    /// Approved with green checks.
    Merge,
    /// Merged or closed.
    Done,
}

crate::impl_name_conversions!(PullState {
    Pending => "pending",
    Failed => "failed",
    Merge => "merge",
    Done => "done",
});

/// An open (or just finished) pull request. Replaced, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pull {
    /// Browser URL of the pull request.
    pub url: String,
    pub state: PullState,
}

impl Pull {
    pub fn new(url: impl Into<String>, state: PullState) -> Self {
        Self { url: url.into(), state }
    }

    pub fn is_done(&self) -> bool {
        self.state == PullState::Done
    }
}
