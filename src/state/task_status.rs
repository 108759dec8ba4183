/// Task status definitions for batch crawl lifecycle tracking
///
/// A task moves `Pending -> Running -> {Completed, Failed, Cancelled}`.
/// Failed and cancelled tasks may be re-entered through an explicit retry,
/// which resets their failed terms and starts a fresh run.
use std::fmt;

/// Represents the current lifecycle status of a batch task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Task has been created but no run has started yet
    Pending,

    /// A scheduler is actively working through the task's terms
    Running,

    /// Every term reached a terminal status and none are left pending
    Completed,

    /// The scheduling loop itself failed (individual term failures do not
    /// put a task here)
    Failed,

    /// A stop was requested and observed; unprocessed terms stay pending
    Cancelled,
}

impl TaskStatus {
    /// Returns true if this is a terminal status (the run has ended)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Returns true if a new run may be started from this status
    ///
    /// Running tasks are already owned by a scheduler and completed tasks
    /// have nothing left to do; everything else may start.
    pub fn is_startable(&self) -> bool {
        matches!(self, Self::Pending | Self::Failed | Self::Cancelled)
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns all possible task statuses
    pub fn all_statuses() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Running,
            Self::Completed,
            Self::Failed,
            Self::Cancelled,
        ]
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
