//! Crawl service - the outward surface of the batch crawler
//!
//! One long-lived `CrawlService` instance owns the task registry, the
//! storage handle, and the injected capabilities (content source factory,
//! script normalizer, pacer). Callers create tasks and drive their
//! lifecycle through `start`, `cancel`, and `retry`.

use crate::config::CrawlConfig;
use crate::crawler::pacing::Pacer;
use crate::crawler::registry::TaskRegistry;
use crate::crawler::scheduler::BatchCrawler;
use crate::crawler::term::TermCrawler;
use crate::lang;
use crate::lang::VariantNormalizer;
use crate::source::SourceFactory;
use crate::state::{TaskStatus, TermStatus};
use crate::storage::{SqliteStore, TaskRecord, TaskStore, TermRecord};
use crate::{Result, TermweaveError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Per-task overrides applied on top of the configured defaults
#[derive(Debug, Clone, Default)]
pub struct TaskOptions {
    pub crawl_interval_ms: Option<u64>,
    pub max_depth: Option<u32>,
    pub fan_out_limit: Option<u32>,
    pub target_languages: Option<Vec<String>>,
}

/// Long-lived batch crawl service
pub struct CrawlService {
    store: Arc<Mutex<SqliteStore>>,
    sources: Arc<dyn SourceFactory>,
    normalizer: Arc<dyn VariantNormalizer>,
    pacer: Arc<dyn Pacer>,
    registry: TaskRegistry,
    defaults: CrawlConfig,
}

impl CrawlService {
    pub fn new(
        store: SqliteStore,
        sources: Arc<dyn SourceFactory>,
        normalizer: Arc<dyn VariantNormalizer>,
        pacer: Arc<dyn Pacer>,
        defaults: CrawlConfig,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            sources,
            normalizer,
            pacer,
            registry: TaskRegistry::new(),
            defaults,
        }
    }

    /// Shared handle to the underlying store (stats, export, inspection)
    pub fn store(&self) -> Arc<Mutex<SqliteStore>> {
        self.store.clone()
    }

    /// The static table of supported languages, for callers constructing
    /// task configuration
    pub fn supported_languages() -> &'static [(&'static str, &'static str)] {
        lang::supported_languages()
    }

    /// Creates a new batch task from seed terms
    ///
    /// Seeds are trimmed and deduplicated case-insensitively; requested
    /// languages must be in the supported table.
    ///
    /// # Returns
    ///
    /// The ID of the newly created task
    pub fn create_task(&self, seeds: &[String], options: TaskOptions) -> Result<i64> {
        if seeds.iter().all(|s| s.trim().is_empty()) {
            return Err(TermweaveError::EmptySeedList);
        }

        let languages = options
            .target_languages
            .unwrap_or_else(|| self.defaults.target_languages.clone());
        for code in &languages {
            if !lang::is_supported(code) {
                return Err(TermweaveError::UnsupportedLanguage(code.clone()));
            }
        }

        let task_id = {
            let mut store = self.store.lock().unwrap();
            store.create_task(
                seeds,
                options
                    .crawl_interval_ms
                    .unwrap_or(self.defaults.crawl_interval_ms),
                options.max_depth.unwrap_or(self.defaults.max_depth),
                options.fan_out_limit.unwrap_or(self.defaults.fan_out_limit),
                &languages,
            )?
        };

        tracing::info!("Created task {} with {} seed terms", task_id, seeds.len());
        Ok(task_id)
    }

    /// Starts asynchronous execution of a task
    ///
    /// Fails if a scheduling handle for the task is already registered or
    /// the task's status does not permit starting. Returns as soon as the
    /// run is spawned, without waiting for completion.
    pub async fn start(&self, task_id: i64) -> Result<()> {
        let task = {
            let store = self.store.lock().unwrap();
            store.get_task(task_id)?
        };
        if !task.status.is_startable() {
            if task.status == TaskStatus::Running {
                return Err(TermweaveError::TaskAlreadyRunning(task_id));
            }
            return Err(TermweaveError::TaskNotStartable {
                task_id,
                status: task.status,
            });
        }

        self.spawn_run(task_id).await
    }

    /// Registers a handle and spawns the run, without the status gate
    ///
    /// Retry goes through here directly: a task that finished with failures
    /// sits at `completed`, which the gate would refuse.
    async fn spawn_run(&self, task_id: i64) -> Result<()> {
        // Atomic with the duplicate-run check
        let cancel = self.registry.register(task_id).await?;

        let term_crawler = TermCrawler::new(
            self.store.clone(),
            self.sources.clone(),
            self.normalizer.clone(),
            &self.defaults.base_language,
        );
        let crawler = BatchCrawler::new(
            task_id,
            self.store.clone(),
            term_crawler,
            self.pacer.clone(),
            self.registry.clone(),
            cancel,
            Duration::from_millis(self.defaults.crawl_interval_ms),
        );

        let join = tokio::spawn(crawler.run());
        self.registry.attach(task_id, join).await;

        tracing::info!("Started task {}", task_id);
        Ok(())
    }

    /// Cancels a running task
    ///
    /// Fails if no handle is registered for the task. Signals the stop,
    /// waits for the run to unwind, and records the `cancelled` status.
    /// Cancellation is observed between terms: an in-flight fetch finishes
    /// first and every unprocessed term stays pending.
    pub async fn cancel(&self, task_id: i64) -> Result<()> {
        let (cancel, join) = self
            .registry
            .begin_cancel(task_id)
            .await
            .ok_or(TermweaveError::TaskNotRunning(task_id))?;

        cancel.cancel();
        if let Some(join) = join {
            if let Err(e) = join.await {
                tracing::error!("Task {} run aborted abnormally: {}", task_id, e);
            }
        }

        let mut store = self.store.lock().unwrap();
        store.update_task_status(task_id, TaskStatus::Cancelled)?;
        tracing::info!("Cancelled task {}", task_id);
        Ok(())
    }

    /// Retries a task's failed terms
    ///
    /// Resets every currently failed term back to pending with its error
    /// message cleared, then starts the task again. Returns the number of
    /// terms reset; zero means there was nothing to retry and no run is
    /// started.
    pub async fn retry(&self, task_id: i64) -> Result<u32> {
        let reset = {
            let mut store = self.store.lock().unwrap();
            // Existence check first so an unknown task is an error rather
            // than a zero result
            store.get_task(task_id)?;
            store.reset_failed_terms(task_id)?
        };

        if reset == 0 {
            tracing::info!("Task {} has no failed terms to retry", task_id);
            return Ok(0);
        }

        self.spawn_run(task_id).await?;
        tracing::info!("Retrying {} failed terms of task {}", reset, task_id);
        Ok(reset)
    }

    /// Waits for a running task to finish
    ///
    /// Returns immediately when the task is not running or another caller
    /// already claimed the join handle.
    pub async fn wait(&self, task_id: i64) -> Result<()> {
        if let Some(join) = self.registry.take_join(task_id).await {
            if let Err(e) = join.await {
                tracing::error!("Task {} run aborted abnormally: {}", task_id, e);
            }
        }
        Ok(())
    }

    /// Returns true if a scheduling handle is registered for the task
    pub async fn is_running(&self, task_id: i64) -> bool {
        self.registry.is_running(task_id).await
    }

    // ===== Store passthroughs =====

    pub fn get_task(&self, task_id: i64) -> Result<TaskRecord> {
        Ok(self.store.lock().unwrap().get_task(task_id)?)
    }

    pub fn list_tasks(&self) -> Result<Vec<TaskRecord>> {
        Ok(self.store.lock().unwrap().list_tasks()?)
    }

    pub fn list_terms(
        &self,
        task_id: i64,
        status: Option<TermStatus>,
    ) -> Result<Vec<TermRecord>> {
        Ok(self.store.lock().unwrap().list_terms(task_id, status)?)
    }

    /// Deletes a task and everything it owns; an explicit outward
    /// operation, never invoked by the scheduler
    pub fn delete_task(&self, task_id: i64) -> Result<()> {
        Ok(self.store.lock().unwrap().delete_task(task_id)?)
    }
}
