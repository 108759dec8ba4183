//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the termweave
//! database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Batch crawl tasks
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    status TEXT NOT NULL,
    total_terms INTEGER NOT NULL DEFAULT 0,
    completed_terms INTEGER NOT NULL DEFAULT 0,
    failed_terms INTEGER NOT NULL DEFAULT 0,
    crawl_interval_ms INTEGER NOT NULL DEFAULT 3000,
    max_depth INTEGER NOT NULL DEFAULT 1,
    fan_out_limit INTEGER NOT NULL DEFAULT 10,
    target_languages TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Terms owned by tasks; uniqueness is per task on normalized text
CREATE TABLE IF NOT EXISTS terms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id INTEGER NOT NULL REFERENCES tasks(id),
    term TEXT NOT NULL,
    term_norm TEXT NOT NULL,
    status TEXT NOT NULL,
    results TEXT,
    error_message TEXT,
    depth_level INTEGER NOT NULL DEFAULT 0,
    source_term_id INTEGER REFERENCES terms(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(task_id, term_norm)
);

CREATE INDEX IF NOT EXISTS idx_terms_task ON terms(task_id);
CREATE INDEX IF NOT EXISTS idx_terms_status ON terms(task_id, status);

-- Directed associations from crawled terms to target term strings
CREATE TABLE IF NOT EXISTS associations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    term_id INTEGER NOT NULL REFERENCES terms(id),
    target_term TEXT NOT NULL,
    kind TEXT NOT NULL,
    weight REAL NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(term_id, target_term, kind)
);

CREATE INDEX IF NOT EXISTS idx_associations_term ON associations(term_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
