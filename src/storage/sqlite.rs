//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the TaskStore
//! trait.

use crate::state::{TaskStatus, TermStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, TaskStore};
use crate::storage::{
    normalize_term, AssociationKind, AssociationRecord, AssociationSeed, LangResult, TaskRecord,
    TermRecord,
};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;

/// SQLite task store backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing and ephemeral runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn row_to_task(row: &Row) -> rusqlite::Result<TaskRecord> {
        let languages: String = row.get(8)?;
        Ok(TaskRecord {
            id: row.get(0)?,
            status: TaskStatus::from_db_string(&row.get::<_, String>(1)?)
                .unwrap_or(TaskStatus::Failed),
            total_terms: row.get(2)?,
            completed_terms: row.get(3)?,
            failed_terms: row.get(4)?,
            crawl_interval_ms: row.get(5)?,
            max_depth: row.get(6)?,
            fan_out_limit: row.get(7)?,
            target_languages: languages
                .split(',')
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect(),
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn row_to_term(row: &Row) -> rusqlite::Result<TermRecord> {
        let results_json: Option<String> = row.get(4)?;
        let results: BTreeMap<String, LangResult> = match results_json {
            Some(json) => serde_json::from_str(&json).unwrap_or_default(),
            None => BTreeMap::new(),
        };
        Ok(TermRecord {
            id: row.get(0)?,
            task_id: row.get(1)?,
            term: row.get(2)?,
            status: TermStatus::from_db_string(&row.get::<_, String>(3)?)
                .unwrap_or(TermStatus::Failed),
            results,
            error_message: row.get(5)?,
            depth_level: row.get(6)?,
            source_term_id: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    /// Inserts terms inside an open transaction, skipping duplicates
    fn insert_terms(
        conn: &Connection,
        task_id: i64,
        terms: &[String],
        depth: u32,
        source_term_id: Option<i64>,
    ) -> StorageResult<u32> {
        let now = Utc::now().to_rfc3339();
        let mut inserted = 0u32;
        for term in terms {
            let trimmed = term.trim();
            if trimmed.is_empty() {
                continue;
            }
            let changed = conn.execute(
                "INSERT OR IGNORE INTO terms
                 (task_id, term, term_norm, status, depth_level, source_term_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    task_id,
                    trimmed,
                    normalize_term(trimmed),
                    TermStatus::Pending.to_db_string(),
                    depth,
                    source_term_id,
                    now
                ],
            )?;
            inserted += changed as u32;
        }
        Ok(inserted)
    }

    /// Recomputes counters inside an open transaction
    fn recompute_counters(conn: &Connection, task_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = conn.execute(
            "UPDATE tasks SET
                 total_terms = (SELECT COUNT(*) FROM terms WHERE task_id = ?1),
                 completed_terms = (SELECT COUNT(*) FROM terms
                                    WHERE task_id = ?1 AND status = 'completed'),
                 failed_terms = (SELECT COUNT(*) FROM terms
                                 WHERE task_id = ?1 AND status = 'failed'),
                 updated_at = ?2
             WHERE id = ?1",
            params![task_id, now],
        )?;
        if changed == 0 {
            return Err(StorageError::TaskNotFound(task_id));
        }
        Ok(())
    }
}

const TASK_COLUMNS: &str = "id, status, total_terms, completed_terms, failed_terms, \
                            crawl_interval_ms, max_depth, fan_out_limit, target_languages, \
                            created_at, updated_at";

const TERM_COLUMNS: &str = "id, task_id, term, status, results, error_message, depth_level, \
                            source_term_id, created_at, updated_at";

impl TaskStore for SqliteStore {
    // ===== Task Management =====

    fn create_task(
        &mut self,
        seeds: &[String],
        crawl_interval_ms: u64,
        max_depth: u32,
        fan_out_limit: u32,
        target_languages: &[String],
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO tasks
             (status, crawl_interval_ms, max_depth, fan_out_limit, target_languages, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                TaskStatus::Pending.to_db_string(),
                crawl_interval_ms,
                max_depth,
                fan_out_limit,
                target_languages.join(","),
                now
            ],
        )?;
        let task_id = tx.last_insert_rowid();

        Self::insert_terms(&tx, task_id, seeds, 0, None)?;
        Self::recompute_counters(&tx, task_id)?;

        tx.commit()?;
        Ok(task_id)
    }

    fn get_task(&self, task_id: i64) -> StorageResult<TaskRecord> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS))?;

        stmt.query_row(params![task_id], Self::row_to_task)
            .optional()?
            .ok_or(StorageError::TaskNotFound(task_id))
    }

    fn list_tasks(&self) -> StorageResult<Vec<TaskRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tasks ORDER BY id DESC",
            TASK_COLUMNS
        ))?;

        let tasks = stmt
            .query_map([], Self::row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    fn update_task_status(&mut self, task_id: i64, status: TaskStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE tasks SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, task_id],
        )?;
        if changed == 0 {
            return Err(StorageError::TaskNotFound(task_id));
        }
        Ok(())
    }

    fn recompute_task_counters(&mut self, task_id: i64) -> StorageResult<()> {
        Self::recompute_counters(&self.conn, task_id)
    }

    fn delete_task(&mut self, task_id: i64) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "DELETE FROM associations WHERE term_id IN
             (SELECT id FROM terms WHERE task_id = ?1)",
            params![task_id],
        )?;
        tx.execute("DELETE FROM terms WHERE task_id = ?1", params![task_id])?;
        let changed = tx.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;

        if changed == 0 {
            return Err(StorageError::TaskNotFound(task_id));
        }
        tx.commit()?;
        Ok(())
    }

    // ===== Term Management =====

    fn add_terms(
        &mut self,
        task_id: i64,
        terms: &[String],
        depth: u32,
        source_term_id: Option<i64>,
    ) -> StorageResult<u32> {
        let tx = self.conn.transaction()?;
        let inserted = Self::insert_terms(&tx, task_id, terms, depth, source_term_id)?;
        tx.commit()?;
        Ok(inserted)
    }

    fn get_term(&self, term_id: i64) -> StorageResult<TermRecord> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM terms WHERE id = ?1", TERM_COLUMNS))?;

        stmt.query_row(params![term_id], Self::row_to_term)
            .optional()?
            .ok_or(StorageError::TermNotFound(term_id))
    }

    fn list_terms(
        &self,
        task_id: i64,
        status: Option<TermStatus>,
    ) -> StorageResult<Vec<TermRecord>> {
        let terms = match status {
            Some(status) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM terms WHERE task_id = ?1 AND status = ?2 ORDER BY id",
                    TERM_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(
                        params![task_id, status.to_db_string()],
                        Self::row_to_term,
                    )?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM terms WHERE task_id = ?1 ORDER BY id",
                    TERM_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![task_id], Self::row_to_term)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };
        Ok(terms)
    }

    fn pending_terms(&self, task_id: i64) -> StorageResult<Vec<TermRecord>> {
        self.list_terms(task_id, Some(TermStatus::Pending))
    }

    fn mark_term_crawling(&mut self, term_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE terms SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![TermStatus::Crawling.to_db_string(), now, term_id],
        )?;
        if changed == 0 {
            return Err(StorageError::TermNotFound(term_id));
        }
        Ok(())
    }

    fn complete_term(
        &mut self,
        term_id: i64,
        results: &BTreeMap<String, LangResult>,
    ) -> StorageResult<()> {
        let json = serde_json::to_string(results)?;
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE terms SET status = ?1, results = ?2, error_message = NULL, updated_at = ?3
             WHERE id = ?4",
            params![TermStatus::Completed.to_db_string(), json, now, term_id],
        )?;
        if changed == 0 {
            return Err(StorageError::TermNotFound(term_id));
        }
        Ok(())
    }

    fn fail_term(&mut self, term_id: i64, error_message: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE terms SET status = ?1, error_message = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                TermStatus::Failed.to_db_string(),
                error_message,
                now,
                term_id
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::TermNotFound(term_id));
        }
        Ok(())
    }

    fn reset_failed_terms(&mut self, task_id: i64) -> StorageResult<u32> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE terms SET status = ?1, error_message = NULL, updated_at = ?2
             WHERE task_id = ?3 AND status = ?4",
            params![
                TermStatus::Pending.to_db_string(),
                now,
                task_id,
                TermStatus::Failed.to_db_string()
            ],
        )?;
        Ok(changed as u32)
    }

    // ===== Association Management =====

    fn save_associations(
        &mut self,
        term_id: i64,
        associations: &[AssociationSeed],
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        for assoc in associations {
            tx.execute(
                "INSERT OR IGNORE INTO associations (term_id, target_term, kind, weight, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    term_id,
                    assoc.target_term,
                    assoc.kind.to_db_string(),
                    assoc.kind.weight(),
                    now
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn associations_for_term(&self, term_id: i64) -> StorageResult<Vec<AssociationRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, term_id, target_term, kind, weight, created_at
             FROM associations WHERE term_id = ?1 ORDER BY id",
        )?;

        let associations = stmt
            .query_map(params![term_id], |row| {
                Ok(AssociationRecord {
                    id: row.get(0)?,
                    term_id: row.get(1)?,
                    target_term: row.get(2)?,
                    kind: AssociationKind::from_db_string(&row.get::<_, String>(3)?)
                        .unwrap_or(AssociationKind::Link),
                    weight: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(associations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn languages() -> Vec<String> {
        vec!["en".to_string(), "zh".to_string()]
    }

    fn create_task_with_seeds(store: &mut SqliteStore, seeds: &[&str]) -> i64 {
        let seeds: Vec<String> = seeds.iter().map(|s| s.to_string()).collect();
        store.create_task(&seeds, 0, 1, 10, &languages()).unwrap()
    }

    #[test]
    fn test_create_and_get_task() {
        let mut store = create_test_store();
        let task_id = create_task_with_seeds(&mut store, &["Dog", "Cat"]);

        let task = store.get_task(task_id).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.total_terms, 2);
        assert_eq!(task.completed_terms, 0);
        assert_eq!(task.failed_terms, 0);
        assert_eq!(task.max_depth, 1);
        assert_eq!(task.target_languages, vec!["en", "zh"]);
    }

    #[test]
    fn test_get_missing_task() {
        let store = create_test_store();
        assert!(matches!(
            store.get_task(99),
            Err(StorageError::TaskNotFound(99))
        ));
    }

    #[test]
    fn test_seed_dedup_is_case_insensitive() {
        let mut store = create_test_store();
        let task_id = create_task_with_seeds(&mut store, &["Dog", " dog ", "DOG", "Cat", ""]);

        let task = store.get_task(task_id).unwrap();
        assert_eq!(task.total_terms, 2);

        let terms = store.list_terms(task_id, None).unwrap();
        assert_eq!(terms.len(), 2);
        // The first spelling wins
        assert_eq!(terms[0].term, "Dog");
        assert_eq!(terms[1].term, "Cat");
    }

    #[test]
    fn test_same_term_allowed_across_tasks() {
        let mut store = create_test_store();
        let first = create_task_with_seeds(&mut store, &["Dog"]);
        let second = create_task_with_seeds(&mut store, &["dog"]);

        assert_eq!(store.get_task(first).unwrap().total_terms, 1);
        assert_eq!(store.get_task(second).unwrap().total_terms, 1);
    }

    #[test]
    fn test_add_terms_skips_existing() {
        let mut store = create_test_store();
        let task_id = create_task_with_seeds(&mut store, &["Dog"]);
        let seed_id = store.pending_terms(task_id).unwrap()[0].id;

        let new_terms = vec!["Cat".to_string(), "dog".to_string(), "Wolf".to_string()];
        let inserted = store
            .add_terms(task_id, &new_terms, 1, Some(seed_id))
            .unwrap();
        assert_eq!(inserted, 2);

        let terms = store.list_terms(task_id, None).unwrap();
        assert_eq!(terms.len(), 3);
        let wolf = terms.iter().find(|t| t.term == "Wolf").unwrap();
        assert_eq!(wolf.depth_level, 1);
        assert_eq!(wolf.source_term_id, Some(seed_id));
    }

    #[test]
    fn test_term_status_transitions() {
        let mut store = create_test_store();
        let task_id = create_task_with_seeds(&mut store, &["Dog"]);
        let term_id = store.pending_terms(task_id).unwrap()[0].id;

        store.mark_term_crawling(term_id).unwrap();
        assert_eq!(
            store.get_term(term_id).unwrap().status,
            TermStatus::Crawling
        );

        let mut results = BTreeMap::new();
        results.insert(
            "en".to_string(),
            LangResult {
                summary: "A domesticated canid.".to_string(),
                url: "https://en.wikipedia.org/wiki/Dog".to_string(),
            },
        );
        store.complete_term(term_id, &results).unwrap();

        let term = store.get_term(term_id).unwrap();
        assert_eq!(term.status, TermStatus::Completed);
        assert_eq!(term.results, results);
        assert!(term.error_message.is_none());
    }

    #[test]
    fn test_fail_term_preserves_message() {
        let mut store = create_test_store();
        let task_id = create_task_with_seeds(&mut store, &["Nonexistent"]);
        let term_id = store.pending_terms(task_id).unwrap()[0].id;

        store.fail_term(term_id, "term not found").unwrap();

        let term = store.get_term(term_id).unwrap();
        assert_eq!(term.status, TermStatus::Failed);
        assert_eq!(term.error_message.as_deref(), Some("term not found"));
    }

    #[test]
    fn test_recompute_counters() {
        let mut store = create_test_store();
        let task_id = create_task_with_seeds(&mut store, &["A", "B", "C"]);
        let terms = store.pending_terms(task_id).unwrap();

        store.complete_term(terms[0].id, &BTreeMap::new()).unwrap();
        store.fail_term(terms[1].id, "boom").unwrap();
        store.recompute_task_counters(task_id).unwrap();

        let task = store.get_task(task_id).unwrap();
        assert_eq!(task.total_terms, 3);
        assert_eq!(task.completed_terms, 1);
        assert_eq!(task.failed_terms, 1);
        assert!(task.completed_terms + task.failed_terms <= task.total_terms);
    }

    #[test]
    fn test_reset_failed_terms() {
        let mut store = create_test_store();
        let task_id = create_task_with_seeds(&mut store, &["A", "B", "C"]);
        let terms = store.pending_terms(task_id).unwrap();

        store.complete_term(terms[0].id, &BTreeMap::new()).unwrap();
        store.fail_term(terms[1].id, "boom").unwrap();
        store.fail_term(terms[2].id, "boom").unwrap();

        let reset = store.reset_failed_terms(task_id).unwrap();
        assert_eq!(reset, 2);

        // Completed terms are untouched, failed terms are pending again with
        // cleared error messages
        let terms = store.list_terms(task_id, None).unwrap();
        assert_eq!(terms[0].status, TermStatus::Completed);
        for term in &terms[1..] {
            assert_eq!(term.status, TermStatus::Pending);
            assert!(term.error_message.is_none());
        }

        // Nothing left to reset
        assert_eq!(store.reset_failed_terms(task_id).unwrap(), 0);
    }

    #[test]
    fn test_save_and_list_associations() {
        let mut store = create_test_store();
        let task_id = create_task_with_seeds(&mut store, &["Dog"]);
        let term_id = store.pending_terms(task_id).unwrap()[0].id;

        let seeds = vec![
            AssociationSeed {
                target_term: "Wolf".to_string(),
                kind: AssociationKind::Link,
            },
            AssociationSeed {
                target_term: "Domesticated animals".to_string(),
                kind: AssociationKind::Category,
            },
        ];
        store.save_associations(term_id, &seeds).unwrap();
        // Saving again is a no-op thanks to the uniqueness constraint
        store.save_associations(term_id, &seeds).unwrap();

        let associations = store.associations_for_term(term_id).unwrap();
        assert_eq!(associations.len(), 2);
        assert_eq!(associations[0].target_term, "Wolf");
        assert_eq!(associations[0].weight, 1.0);
        assert_eq!(associations[1].kind, AssociationKind::Category);
        assert_eq!(associations[1].weight, 0.5);
    }

    #[test]
    fn test_delete_task_cascades() {
        let mut store = create_test_store();
        let task_id = create_task_with_seeds(&mut store, &["Dog"]);
        let term_id = store.pending_terms(task_id).unwrap()[0].id;
        store
            .save_associations(
                term_id,
                &[AssociationSeed {
                    target_term: "Wolf".to_string(),
                    kind: AssociationKind::Link,
                }],
            )
            .unwrap();

        store.delete_task(task_id).unwrap();

        assert!(store.get_task(task_id).is_err());
        assert!(store.get_term(term_id).is_err());
        assert!(store.associations_for_term(term_id).unwrap().is_empty());
    }

    #[test]
    fn test_list_tasks_newest_first() {
        let mut store = create_test_store();
        let first = create_task_with_seeds(&mut store, &["A"]);
        let second = create_task_with_seeds(&mut store, &["B"]);

        let tasks = store.list_tasks().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, second);
        assert_eq!(tasks[1].id, first);
    }

    #[test]
    fn test_pending_terms_ordered_by_id() {
        let mut store = create_test_store();
        let task_id = create_task_with_seeds(&mut store, &["C", "A", "B"]);

        let pending = store.pending_terms(task_id).unwrap();
        let ids: Vec<i64> = pending.iter().map(|t| t.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        // Insertion order is preserved, not alphabetical order
        assert_eq!(pending[0].term, "C");
    }
}
