//! State module for tracking crawl progress
//!
//! This module provides the lifecycle state types for batch tasks and the
//! terms inside them.
//!
//! # Components
//!
//! - `TaskStatus`: Lifecycle of a batch task (pending, running, completed, failed, cancelled)
//! - `TermStatus`: Lifecycle of an individual term (pending, crawling, completed, failed)

mod task_status;
mod term_status;

// Re-export main types
pub use task_status::TaskStatus;
pub use term_status::TermStatus;
