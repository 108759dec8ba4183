/// Term status definitions
///
/// A term moves `Pending -> Crawling -> {Completed, Failed}`. The only
/// backward transition is the explicit retry reset `Failed -> Pending`.
use std::fmt;

/// Represents the current status of a term within a batch task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermStatus {
    /// Term is queued and waiting to be crawled
    Pending,

    /// Term is currently being fetched from the content source
    Crawling,

    /// Term was fetched and its results persisted
    Completed,

    /// Term could not be crawled; the error message is preserved
    Failed,
}

impl TermStatus {
    /// Returns true if this is a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Crawling => "crawling",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "crawling" => Some(Self::Crawling),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for TermStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
