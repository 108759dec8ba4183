//! Task statistics
//!
//! This module provides functionality for extracting and displaying task
//! progress from the storage layer.

use crate::state::TermStatus;
use crate::storage::{SqliteStore, TaskStore};
use crate::{TaskStatus, TermweaveError};

/// Progress summary of one batch task
#[derive(Debug, Clone)]
pub struct TaskStats {
    pub task_id: i64,
    pub status: TaskStatus,
    pub total_terms: u32,
    pub completed_terms: u32,
    pub failed_terms: u32,
    pub pending_terms: u32,
    /// Share of terms in a terminal status, 0-100
    pub progress_percent: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Loads progress statistics for a task
///
/// Counters are recomputed from term statuses before reading, so the
/// numbers never reflect drift.
///
/// # Arguments
///
/// * `store` - The task store to query
/// * `task_id` - The task to summarize
pub fn load_task_stats(store: &mut SqliteStore, task_id: i64) -> Result<TaskStats, TermweaveError> {
    store.recompute_task_counters(task_id)?;
    let task = store.get_task(task_id)?;
    let pending = store.list_terms(task_id, Some(TermStatus::Pending))?.len() as u32;

    let progress_percent = if task.total_terms > 0 {
        let done = (task.completed_terms + task.failed_terms) as f64;
        (done / task.total_terms as f64 * 10_000.0).round() / 100.0
    } else {
        0.0
    };

    Ok(TaskStats {
        task_id: task.id,
        status: task.status,
        total_terms: task.total_terms,
        completed_terms: task.completed_terms,
        failed_terms: task.failed_terms,
        pending_terms: pending,
        progress_percent,
        created_at: task.created_at,
        updated_at: task.updated_at,
    })
}

/// Prints task statistics to stdout in a formatted manner
pub fn print_task_stats(stats: &TaskStats) {
    println!("=== Task {} ===\n", stats.task_id);
    println!("Status: {}", stats.status);
    println!("Progress: {:.2}%", stats.progress_percent);
    println!();
    println!("Terms:");
    println!("  Total: {}", stats.total_terms);
    println!("  Completed: {}", stats.completed_terms);
    println!("  Failed: {}", stats.failed_terms);
    println!("  Pending: {}", stats.pending_terms);
    println!();
    println!("Created: {}", stats.created_at);
    println!("Updated: {}", stats.updated_at);
}
