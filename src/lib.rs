//! Termweave: a multilingual term-corpus batch crawler
//!
//! This crate builds a multilingual text corpus by crawling an encyclopedic
//! content source term-by-term, expanding outward through discovered link
//! associations up to a configured depth, and persisting progress so batch
//! jobs can be paused, resumed, retried, or cancelled.

pub mod config;
pub mod crawler;
pub mod lang;
pub mod output;
pub mod source;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for termweave operations
#[derive(Debug, Error)]
pub enum TermweaveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Content source error: {0}")]
    Source(#[from] source::SourceError),

    #[error("Task {0} is already running")]
    TaskAlreadyRunning(i64),

    #[error("Task {0} is not running")]
    TaskNotRunning(i64),

    #[error("Task {task_id} cannot be started from status '{status}'")]
    TaskNotStartable {
        task_id: i64,
        status: state::TaskStatus,
    },

    #[error("Unsupported language code: {0}")]
    UnsupportedLanguage(String),

    #[error("No seed terms provided")]
    EmptySeedList,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for termweave operations
pub type Result<T> = std::result::Result<T, TermweaveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlService, TaskOptions};
pub use state::{TaskStatus, TermStatus};
pub use storage::{AssociationKind, LangResult, SqliteStore, TaskStore};
