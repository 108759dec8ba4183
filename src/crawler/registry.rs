//! Process-wide registry of in-flight task runs
//!
//! The registry maps task IDs to their scheduling handles so cancellation
//! can reach a running loop and duplicate concurrent runs of the same task
//! are rejected. Registration is atomic with the already-running check:
//! both happen under one write lock.

use crate::{Result, TermweaveError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Scheduling handle for one running task
struct TaskHandle {
    cancel: CancellationToken,
    join: Option<JoinHandle<()>>,
}

/// Shared mapping from task ID to its in-flight scheduling handle
#[derive(Clone, Default)]
pub struct TaskRegistry {
    inner: Arc<RwLock<HashMap<i64, TaskHandle>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a task for execution and returns its cancellation token
    ///
    /// Fails with `TaskAlreadyRunning` if a handle for this task already
    /// exists; the check and the insert are atomic.
    pub async fn register(&self, task_id: i64) -> Result<CancellationToken> {
        let mut handles = self.inner.write().await;
        if handles.contains_key(&task_id) {
            return Err(TermweaveError::TaskAlreadyRunning(task_id));
        }
        let cancel = CancellationToken::new();
        handles.insert(
            task_id,
            TaskHandle {
                cancel: cancel.clone(),
                join: None,
            },
        );
        Ok(cancel)
    }

    /// Attaches the spawned join handle to an already registered task
    ///
    /// A no-op when the task has already finished and deregistered itself.
    pub async fn attach(&self, task_id: i64, join: JoinHandle<()>) {
        let mut handles = self.inner.write().await;
        if let Some(handle) = handles.get_mut(&task_id) {
            handle.join = Some(join);
        }
    }

    /// Removes a task's handle; called by the run itself on every exit path
    pub async fn deregister(&self, task_id: i64) {
        self.inner.write().await.remove(&task_id);
    }

    /// Returns true if a handle is registered for the task
    pub async fn is_running(&self, task_id: i64) -> bool {
        self.inner.read().await.contains_key(&task_id)
    }

    /// Takes what a canceller needs: the token to signal and the join
    /// handle to await. Returns None when the task is not running.
    ///
    /// The handle entry itself stays registered; the run removes it as it
    /// unwinds.
    pub async fn begin_cancel(
        &self,
        task_id: i64,
    ) -> Option<(CancellationToken, Option<JoinHandle<()>>)> {
        let mut handles = self.inner.write().await;
        handles
            .get_mut(&task_id)
            .map(|handle| (handle.cancel.clone(), handle.join.take()))
    }

    /// Takes the join handle for a waiter; None when not running or the
    /// handle was already claimed
    pub async fn take_join(&self, task_id: i64) -> Option<JoinHandle<()>> {
        let mut handles = self.inner.write().await;
        handles.get_mut(&task_id).and_then(|handle| handle.join.take())
    }
}
