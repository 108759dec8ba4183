//! Per-term markdown export
//!
//! Writes one markdown file per completed term, with a section per fetched
//! language in supported-table order.

use crate::lang;
use crate::storage::{SqliteStore, TaskStore, TermRecord};
use crate::state::TermStatus;
use crate::TermweaveError;
use std::fs;
use std::path::Path;

/// Exports every completed term of a task as markdown files
///
/// # Arguments
///
/// * `store` - The task store to read from
/// * `task_id` - The task to export
/// * `dir` - Target directory; created if missing
///
/// # Returns
///
/// The number of files written
pub fn export_task_markdown(
    store: &SqliteStore,
    task_id: i64,
    dir: &Path,
) -> Result<u32, TermweaveError> {
    let terms = store.list_terms(task_id, Some(TermStatus::Completed))?;

    fs::create_dir_all(dir)?;

    let mut written = 0u32;
    for term in &terms {
        let path = dir.join(format!("{}.md", sanitize_filename(&term.term)));
        fs::write(&path, render_term_markdown(term))?;
        written += 1;
    }

    tracing::info!(
        "Exported {} terms of task {} to {}",
        written,
        task_id,
        dir.display()
    );
    Ok(written)
}

/// Renders one term as markdown
///
/// Languages appear in supported-table order; codes outside the table (a
/// task created before a table change) follow in map order and fall back
/// to the uppercased code as the heading.
pub fn render_term_markdown(term: &TermRecord) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", term.term));

    let mut rendered = Vec::new();
    for (code, _) in lang::supported_languages() {
        if term.results.contains_key(*code) {
            rendered.push(code.to_string());
        }
    }
    for code in term.results.keys() {
        if !rendered.iter().any(|c| c == code) {
            rendered.push(code.clone());
        }
    }

    for code in &rendered {
        let result = &term.results[code];
        let heading = lang::display_name(code)
            .map(String::from)
            .unwrap_or_else(|| code.to_uppercase());
        md.push_str(&format!("## {}\n", heading));
        md.push_str(&format!("{}\n\n", result.summary));
        if !result.url.is_empty() {
            md.push_str(&format!("[Link]({})\n\n", result.url));
        }
    }

    md
}

/// Makes a term usable as a filename
fn sanitize_filename(term: &str) -> String {
    term.replace([' ', '/', '\\'], "_")
}
