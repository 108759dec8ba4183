//! Output module for exporting crawl results
//!
//! This module turns persisted task data into human-readable artifacts:
//! - Per-term markdown files with every fetched language
//! - Task progress statistics for the CLI

mod markdown;
mod stats;

pub use markdown::{export_task_markdown, render_term_markdown};
pub use stats::{load_task_stats, print_task_stats, TaskStats};
