//! Bounded background task pool
//!
//! Network and cryptographic work runs off the interaction thread on a
//! fixed-capacity pool layered over the tokio runtime. A spawned task yields
//! a cancellable [`TaskHandle`]; completions are either awaited directly or
//! marshalled onto the interaction loop through a channel via
//! [`TaskPool::spawn_into`]. Cancelling a handle is a no-op once the task
//! has completed, and a cancelled task never delivers a queued completion.

use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::error;

/// Pool capacity: `max(2, min(cpuCount - 1, 4))`
pub fn default_pool_size() -> usize {
    let cpu_count = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    cpu_count.saturating_sub(1).clamp(2, 4)
}

/// Fixed-capacity task pool
///
/// At most `capacity` spawned tasks run concurrently; the rest queue on an
/// internal semaphore. One pool instance lives for the process lifetime.
#[derive(Debug, Clone)]
pub struct TaskPool {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl TaskPool {
    /// Create a pool with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(default_pool_size())
    }

    /// Create a pool with an explicit capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Maximum number of concurrently running tasks
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Run a future on the pool, returning a cancellable handle
    pub fn spawn<F>(&self, task: F) -> TaskHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let permits = Arc::clone(&self.permits);

        let inner = tokio::spawn(async move {
            // The semaphore is never closed; if it ever were, the task just
            // runs without backpressure
            let _permit = permits.acquire_owned().await.ok();
            task.await
        });

        TaskHandle { inner }
    }

    /// Run a future on the pool and send its result to the interaction loop
    ///
    /// The result is dropped (not delivered) when the task was cancelled or
    /// the receiving side is already gone, so a torn-down screen never sees a
    /// stale completion.
    pub fn spawn_into<F>(&self, task: F, completions: mpsc::UnboundedSender<F::Output>) -> TaskHandle<()>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.spawn(async move {
            let _ = completions.send(task.await);
        })
    }
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a task running on a [`TaskPool`]
#[derive(Debug)]
pub struct TaskHandle<T> {
    inner: JoinHandle<T>,
}

impl<T> TaskHandle<T> {
    /// Abandon the task; no-op if it already completed
    pub fn cancel(&self) {
        self.inner.abort();
    }

    /// Whether the task has finished (completed or cancelled)
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Wait for the result; `None` if the task was cancelled
    pub async fn join(self) -> Option<T> {
        match self.inner.await {
            Ok(value) => Some(value),
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                error!("Background task panicked: {}", e);
                None
            }
        }
    }
}
