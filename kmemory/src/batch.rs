//! Background operations collected for one explicit join point.
//!
//! ```rust
//! use kmemory::PendingOperationBatch;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let batch = PendingOperationBatch::new();
//! batch
//!     .enqueue("ok", async { Ok::<(), String>(()) })
//!     .expect("runtime available");
//! batch
//!     .enqueue("broken", async { Err::<(), _>("disk full".to_string()) })
//!     .expect("runtime available");
//!
//! let error = batch.join().await.expect_err("one operation failed");
//! assert_eq!(error.failures.len(), 1);
//! assert_eq!(error.failures[0].label, "broken");
//! assert_eq!(error.succeeded, 1);
//! assert!(batch.is_empty());
//! # });
//! ```

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use futures_util::future::poll_fn;
use kcommon::BoxFuture;
use tokio::task::{JoinError, JoinHandle};

use crate::error::{BatchError, MemoryError, OperationFailure, OperationId};

pub trait BatchHooks: Send + Sync {
    fn on_operation_enqueued(&self, _id: OperationId, _label: &str, _pending: usize) {}

    fn on_join_start(&self, _pending: usize) {}

    fn on_operation_failed(&self, _failure: &OperationFailure) {}

    fn on_join_complete(&self, _succeeded: usize, _failed: usize, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBatchHooks;

impl BatchHooks for NoopBatchHooks {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedOperation {
    pub id: OperationId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub completed: Vec<CompletedOperation>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.completed.len()
    }
}

struct PendingOperation {
    id: OperationId,
    label: String,
    completion: BoxFuture<'static, Result<(), String>>,
}

/// Collects in-flight background operations until [`PendingOperationBatch::join`] is called.
///
/// Operations run as soon as they are enqueued; the batch only tracks their completion.
/// Dropping the batch detaches anything still pending.
pub struct PendingOperationBatch {
    next_id: AtomicU64,
    pending: Mutex<Vec<PendingOperation>>,
    join_lock: tokio::sync::Mutex<()>,
    hooks: Arc<dyn BatchHooks>,
}

impl Default for PendingOperationBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingOperationBatch {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pending: Mutex::new(Vec::new()),
            join_lock: tokio::sync::Mutex::new(()),
            hooks: Arc::new(NoopBatchHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn BatchHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Spawns `operation` on the current tokio runtime and tracks it.
    pub fn enqueue<F, E>(
        &self,
        label: impl Into<String>,
        operation: F,
    ) -> Result<OperationId, MemoryError>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            MemoryError::other("pending operations need a running tokio runtime")
        })?;
        Ok(self.enqueue_handle(label, runtime.spawn(operation)))
    }

    /// Tracks a task the caller already spawned.
    pub fn enqueue_handle<E>(
        &self,
        label: impl Into<String>,
        handle: JoinHandle<Result<(), E>>,
    ) -> OperationId
    where
        E: Display + Send + 'static,
    {
        let completion = Box::pin(async move {
            match handle.await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(error)) => Err(error.to_string()),
                Err(error) => Err(describe_join_error(error)),
            }
        });

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let label = label.into();
        let pending = {
            let mut pending = self.pending();
            pending.push(PendingOperation {
                id,
                label: label.clone(),
                completion,
            });
            pending.len()
        };
        self.hooks.on_operation_enqueued(id, &label, pending);
        id
    }

    pub fn len(&self) -> usize {
        self.pending().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending().is_empty()
    }

    /// Waits for every tracked operation, including ones enqueued while the join runs.
    ///
    /// The batch is empty afterwards whatever the outcome. Concurrent joins are serialized.
    /// If the join future is dropped early, operations that had not finished go back into the
    /// batch, so a later join still reports them.
    pub async fn join(&self) -> Result<BatchReport, BatchError> {
        let _serialized = self.join_lock.lock().await;
        let started = Instant::now();
        self.hooks.on_join_start(self.len());

        let mut completed = Vec::new();
        let mut failures = Vec::new();
        loop {
            let mut in_flight = InFlight {
                batch: self,
                operations: std::mem::take(&mut *self.pending()),
            };
            if in_flight.operations.is_empty() {
                break;
            }

            while !in_flight.operations.is_empty() {
                let (index, outcome) = poll_fn(|cx| in_flight.poll_next(cx)).await;
                let PendingOperation { id, label, .. } = in_flight.operations.remove(index);
                match outcome {
                    Ok(()) => completed.push(CompletedOperation { id, label }),
                    Err(message) => {
                        let failure = OperationFailure { id, label, message };
                        self.hooks.on_operation_failed(&failure);
                        failures.push(failure);
                    }
                }
            }
        }

        completed.sort_by_key(|operation| operation.id);
        failures.sort_by_key(|failure| failure.id);
        let elapsed = started.elapsed();
        self.hooks
            .on_join_complete(completed.len(), failures.len(), elapsed);

        if failures.is_empty() {
            Ok(BatchReport { completed, elapsed })
        } else {
            Err(BatchError {
                failures,
                succeeded: completed.len(),
            })
        }
    }

    // Pushes and takes never panic while holding the lock, so the list is intact even
    // if another thread poisoned it.
    fn pending(&self) -> MutexGuard<'_, Vec<PendingOperation>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Operations taken out of the batch by a running join. A finished operation is removed
/// before its completion could be polled again; whatever is left on drop is handed back.
struct InFlight<'a> {
    batch: &'a PendingOperationBatch,
    operations: Vec<PendingOperation>,
}

impl InFlight<'_> {
    fn poll_next(&mut self, cx: &mut Context<'_>) -> Poll<(usize, Result<(), String>)> {
        for (index, operation) in self.operations.iter_mut().enumerate() {
            if let Poll::Ready(outcome) = operation.completion.as_mut().poll(cx) {
                return Poll::Ready((index, outcome));
            }
        }
        Poll::Pending
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.operations.is_empty() {
            return;
        }

        let mut pending = self.batch.pending();
        let enqueued_meanwhile = std::mem::take(&mut *pending);
        pending.append(&mut self.operations);
        pending.extend(enqueued_meanwhile);
    }
}

impl std::fmt::Debug for PendingOperationBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingOperationBatch")
            .field("pending", &self.len())
            .finish_non_exhaustive()
    }
}

fn describe_join_error(error: JoinError) -> String {
    if error.is_cancelled() {
        return "operation was cancelled before it finished".to_string();
    }

    match error.try_into_panic() {
        Ok(payload) => format!("operation panicked: {}", panic_message(payload.as_ref())),
        Err(_) => "operation failed to complete".to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}
