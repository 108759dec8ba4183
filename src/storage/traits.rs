//! Storage trait and error types
//!
//! This module defines the trait interface for the task store and its
//! associated error types.

use crate::state::{TaskStatus, TermStatus};
use crate::storage::{AssociationRecord, AssociationSeed, LangResult, TaskRecord, TermRecord};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Task not found: {0}")]
    TaskNotFound(i64),

    #[error("Term not found: {0}")]
    TermNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for the task store backend
///
/// This trait defines all database operations the batch crawler needs. The
/// design guarantees single-writer-per-task serial access, so no locking is
/// required beyond what the backend itself provides.
pub trait TaskStore {
    // ===== Task Management =====

    /// Creates a new batch task with its seed terms at depth 0
    ///
    /// Seeds are trimmed and deduplicated case-insensitively before
    /// insertion; the task's counters reflect the deduplicated count.
    ///
    /// # Arguments
    ///
    /// * `seeds` - Seed term texts
    /// * `crawl_interval_ms` - Pacing delay snapshot for this task
    /// * `max_depth` - Maximum expansion depth
    /// * `fan_out_limit` - Cap on new terms enqueued per crawled term
    /// * `target_languages` - Languages to fetch for every term
    ///
    /// # Returns
    ///
    /// The ID of the newly created task
    fn create_task(
        &mut self,
        seeds: &[String],
        crawl_interval_ms: u64,
        max_depth: u32,
        fan_out_limit: u32,
        target_languages: &[String],
    ) -> StorageResult<i64>;

    /// Gets a task by ID
    fn get_task(&self, task_id: i64) -> StorageResult<TaskRecord>;

    /// Gets all tasks, most recently created first
    fn list_tasks(&self) -> StorageResult<Vec<TaskRecord>>;

    /// Updates the status of a task
    fn update_task_status(&mut self, task_id: i64, status: TaskStatus) -> StorageResult<()>;

    /// Recomputes a task's counters from its terms' actual statuses
    ///
    /// Counters are always a recomputation, never an incremental drift:
    /// total is the term count, completed/failed count terms in those
    /// statuses.
    fn recompute_task_counters(&mut self, task_id: i64) -> StorageResult<()>;

    /// Deletes a task, cascading to its terms and their associations
    fn delete_task(&mut self, task_id: i64) -> StorageResult<()>;

    // ===== Term Management =====

    /// Inserts terms into a task at the given depth
    ///
    /// Terms already present in the task (case-insensitive, trimmed) are
    /// skipped, as are empty strings. Returns the number actually inserted.
    ///
    /// # Arguments
    ///
    /// * `task_id` - The owning task
    /// * `terms` - Term texts to insert
    /// * `depth` - Depth level for the new terms (0 for seeds)
    /// * `source_term_id` - The term whose expansion discovered these, if any
    fn add_terms(
        &mut self,
        task_id: i64,
        terms: &[String],
        depth: u32,
        source_term_id: Option<i64>,
    ) -> StorageResult<u32>;

    /// Gets a term by ID
    fn get_term(&self, term_id: i64) -> StorageResult<TermRecord>;

    /// Gets a task's terms in ascending ID order, optionally filtered by status
    fn list_terms(
        &self,
        task_id: i64,
        status: Option<TermStatus>,
    ) -> StorageResult<Vec<TermRecord>>;

    /// Gets a task's pending terms in ascending ID order
    fn pending_terms(&self, task_id: i64) -> StorageResult<Vec<TermRecord>>;

    /// Marks a term as currently being crawled
    fn mark_term_crawling(&mut self, term_id: i64) -> StorageResult<()>;

    /// Marks a term completed and persists its per-language results
    fn complete_term(
        &mut self,
        term_id: i64,
        results: &BTreeMap<String, LangResult>,
    ) -> StorageResult<()>;

    /// Marks a term failed with an error message
    fn fail_term(&mut self, term_id: i64, error_message: &str) -> StorageResult<()>;

    /// Resets every failed term in a task back to pending, clearing error
    /// messages. Returns the number of terms reset.
    fn reset_failed_terms(&mut self, task_id: i64) -> StorageResult<u32>;

    // ===== Association Management =====

    /// Persists the associations extracted from a successfully crawled term
    fn save_associations(
        &mut self,
        term_id: i64,
        associations: &[AssociationSeed],
    ) -> StorageResult<()>;

    /// Gets all associations recorded for a term
    fn associations_for_term(&self, term_id: i64) -> StorageResult<Vec<AssociationRecord>>;
}
