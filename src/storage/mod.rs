//! Storage module for persisting tasks, terms, and associations
//!
//! This module handles all database operations for the batch crawler,
//! including:
//! - SQLite database initialization and schema management
//! - Task lifecycle and counter persistence
//! - Term status, per-language results, and depth tracking
//! - Association (link/category) persistence for graph building
//!
//! Per-language results are stored as one JSON column per term; the
//! serialization boundary lives entirely inside this module and the rest of
//! the crate works with proper mapping types.

mod schema;
mod sqlite;
mod traits;

pub use schema::initialize_schema;
pub use sqlite::SqliteStore;
pub use traits::{StorageError, StorageResult, TaskStore};

use crate::state::{TaskStatus, TermStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalizes a term for per-task uniqueness comparison
///
/// Comparison is case-insensitive on trimmed text; the original spelling is
/// stored alongside and used everywhere else.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Represents a batch task in the database
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub id: i64,
    pub status: TaskStatus,
    pub total_terms: u32,
    pub completed_terms: u32,
    pub failed_terms: u32,
    /// Pacing delay between term fetches; 0 means "use the caller's fallback"
    pub crawl_interval_ms: u64,
    pub max_depth: u32,
    pub fan_out_limit: u32,
    pub target_languages: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Per-language crawl result for a term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangResult {
    pub summary: String,
    pub url: String,
}

/// Represents a term in the database
#[derive(Debug, Clone)]
pub struct TermRecord {
    pub id: i64,
    pub task_id: i64,
    pub term: String,
    pub status: TermStatus,
    /// Language code -> result, populated once the term completes
    pub results: BTreeMap<String, LangResult>,
    pub error_message: Option<String>,
    /// Expansion distance from a seed; 0 for seeds
    pub depth_level: u32,
    /// The term whose expansion discovered this one; None for seeds
    pub source_term_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Kind of a directed association from a crawled term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationKind {
    /// Outbound article link
    Link,
    /// Category membership; weaker, often noisy semantic tag
    Category,
}

impl AssociationKind {
    /// Graph weight assigned to associations of this kind
    pub fn weight(&self) -> f64 {
        match self {
            Self::Link => 1.0,
            Self::Category => 0.5,
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Category => "category",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "link" => Some(Self::Link),
            "category" => Some(Self::Category),
            _ => None,
        }
    }
}

/// A newly extracted association, not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationSeed {
    pub target_term: String,
    pub kind: AssociationKind,
}

/// Represents a persisted association edge
#[derive(Debug, Clone)]
pub struct AssociationRecord {
    pub id: i64,
    pub term_id: i64,
    pub target_term: String,
    pub kind: AssociationKind,
    pub weight: f64,
    pub created_at: String,
}
