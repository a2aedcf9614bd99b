//! Execution status shared by statements and batches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution status.
///
/// `Ready -> Running -> {Success | Failed | Canceling -> Canceled}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Created, not started
    #[default]
    Ready,

    /// Dispatched and in flight
    Running,

    /// Completed successfully
    Success,

    /// Completed with an error
    Failed,

    /// Cancel requested, waiting for the operation to settle
    Canceling,

    /// Canceled after the operation settled
    Canceled,
}

impl ExecutionStatus {
    /// Check if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Success | ExecutionStatus::Failed | ExecutionStatus::Canceled
        )
    }

    /// Check if work is outstanding.
    pub fn is_active(&self) -> bool {
        matches!(self, ExecutionStatus::Running | ExecutionStatus::Canceling)
    }

    /// Check if moving to `next` is a legal transition.
    pub fn can_transition_to(&self, next: ExecutionStatus) -> bool {
        use ExecutionStatus::*;

        matches!(
            (self, next),
            (Ready, Running)
                | (Running, Success)
                | (Running, Failed)
                | (Running, Canceling)
                | (Canceling, Canceled)
        )
    }

    /// Lowercase name, as used in status reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Ready => "ready",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Success => "success",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Canceling => "canceling",
            ExecutionStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
