//! Batch scheduler - the state machine driving one task
//!
//! This module contains the execution loop that takes a task from
//! `running` to a terminal status:
//! - Re-queries pending terms every outer iteration to pick up terms
//!   discovered during the same run
//! - Crawls terms strictly sequentially in ascending ID order
//! - Applies the expansion policy after each successful crawl
//! - Recomputes the task's counters after every term
//! - Paces between consecutive fetches
//! - Observes cancellation cooperatively at the per-term boundary
//!
//! A single term's failure never aborts the batch; an error escaping the
//! loop itself marks the whole task failed.

use crate::crawler::expansion::select_expansion_terms;
use crate::crawler::pacing::Pacer;
use crate::crawler::registry::TaskRegistry;
use crate::crawler::term::{CrawlOutcome, TermCrawler};
use crate::state::TaskStatus;
use crate::storage::{normalize_term, SqliteStore, TaskStore, TermRecord};
use crate::TermweaveError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Drives one task from start to a terminal status
pub struct BatchCrawler {
    task_id: i64,
    store: Arc<Mutex<SqliteStore>>,
    term_crawler: TermCrawler,
    pacer: Arc<dyn Pacer>,
    registry: TaskRegistry,
    cancel: CancellationToken,
    /// Used only when the task record carries no interval of its own
    fallback_interval: Duration,
}

impl BatchCrawler {
    pub fn new(
        task_id: i64,
        store: Arc<Mutex<SqliteStore>>,
        term_crawler: TermCrawler,
        pacer: Arc<dyn Pacer>,
        registry: TaskRegistry,
        cancel: CancellationToken,
        fallback_interval: Duration,
    ) -> Self {
        Self {
            task_id,
            store,
            term_crawler,
            pacer,
            registry,
            cancel,
            fallback_interval,
        }
    }

    /// Runs the batch to completion, cancellation, or failure
    ///
    /// The task's scheduling handle is deregistered on every exit path.
    pub async fn run(self) {
        if let Err(e) = self.run_loop().await {
            tracing::error!("Task {} failed: {}", self.task_id, e);
            let mut store = self.store.lock().unwrap();
            if let Err(status_err) = store.update_task_status(self.task_id, TaskStatus::Failed) {
                tracing::error!(
                    "Could not mark task {} as failed: {}",
                    self.task_id,
                    status_err
                );
            }
        }

        self.registry.deregister(self.task_id).await;
    }

    /// The main scheduling loop
    async fn run_loop(&self) -> Result<(), TermweaveError> {
        {
            let mut store = self.store.lock().unwrap();
            store.update_task_status(self.task_id, TaskStatus::Running)?;
        }

        // The task record's configuration snapshot wins over anything
        // supplied at start time
        let task = {
            let store = self.store.lock().unwrap();
            store.get_task(self.task_id)?
        };
        let interval = if task.crawl_interval_ms > 0 {
            Duration::from_millis(task.crawl_interval_ms)
        } else {
            self.fallback_interval
        };
        let max_depth = task.max_depth;
        let fan_out_limit = task.fan_out_limit as usize;
        let languages = task.target_languages;

        tracing::info!(
            "Task {} running: interval {:?}, max depth {}, languages [{}]",
            self.task_id,
            interval,
            max_depth,
            languages.join(", ")
        );

        loop {
            // Re-queried each iteration to pick up terms discovered during
            // this same run
            let pending = {
                let store = self.store.lock().unwrap();
                store.pending_terms(self.task_id)?
            };
            if pending.is_empty() {
                break;
            }

            let mut processed = 0usize;

            for term in &pending {
                if self.cancel.is_cancelled() {
                    let mut store = self.store.lock().unwrap();
                    store.update_task_status(self.task_id, TaskStatus::Cancelled)?;
                    tracing::info!(
                        "Task {} cancelled; unprocessed terms stay pending",
                        self.task_id
                    );
                    return Ok(());
                }

                match self.term_crawler.crawl(term, &languages).await {
                    Ok(outcome) => {
                        tracing::info!(
                            "Crawled '{}' (depth {}, {} languages)",
                            term.term,
                            term.depth_level,
                            outcome.results.len()
                        );
                        self.expand(term, &outcome, max_depth, fan_out_limit)?;
                    }
                    Err(e) => {
                        // Recorded on the term already; the batch continues
                        tracing::warn!("Failed to crawl '{}': {}", term.term, e);
                    }
                }

                {
                    let mut store = self.store.lock().unwrap();
                    store.recompute_task_counters(self.task_id)?;
                }

                processed += 1;
                self.pacer.pause(interval).await;
            }

            // Guard against an expansion bug producing an endless frontier
            // of terms the loop never works through
            if processed == 0 {
                tracing::warn!("Task {} made no progress this iteration", self.task_id);
                break;
            }
        }

        if !self.cancel.is_cancelled() {
            let remaining = {
                let store = self.store.lock().unwrap();
                store.pending_terms(self.task_id)?
            };
            if remaining.is_empty() {
                let mut store = self.store.lock().unwrap();
                store.update_task_status(self.task_id, TaskStatus::Completed)?;
                tracing::info!("Task {} completed", self.task_id);
            }
        }

        Ok(())
    }

    /// Enqueues newly discovered terms at the next depth level
    fn expand(
        &self,
        term: &TermRecord,
        outcome: &CrawlOutcome,
        max_depth: u32,
        fan_out_limit: usize,
    ) -> Result<(), TermweaveError> {
        let next_depth = term.depth_level + 1;
        if next_depth >= max_depth || outcome.associations.is_empty() {
            return Ok(());
        }

        let mut store = self.store.lock().unwrap();
        let existing: HashSet<String> = store
            .list_terms(self.task_id, None)?
            .iter()
            .map(|t| normalize_term(&t.term))
            .collect();

        let new_terms = select_expansion_terms(&outcome.associations, &existing, fan_out_limit);
        if new_terms.is_empty() {
            return Ok(());
        }

        let inserted = store.add_terms(self.task_id, &new_terms, next_depth, Some(term.id))?;
        tracing::info!(
            "Discovered {} new terms from '{}' (will be depth {})",
            inserted,
            term.term,
            next_depth
        );
        Ok(())
    }
}
