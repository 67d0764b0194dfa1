use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::outcome::TaskError;
use crate::task::TaskId;

/// A failed attempt waiting for a retry decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryRecord {
    pub task_id: TaskId,
    pub error: TaskError,
    /// Attempts made so far, including the one that produced `error`.
    pub attempts: u32,
}

/// Concurrency-safe error channel between workers and the retry coordinator.
///
/// Any number of workers may enqueue at once; the coordinator drains it
/// sequentially. Clones share the same underlying queue.
#[derive(Debug, Clone, Default)]
pub struct ErrorQueue {
    inner: Arc<Mutex<VecDeque<RetryRecord>>>,
}

impl ErrorQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn enqueue(&self, task_id: TaskId, error: TaskError, attempts: u32) {
        self.inner.lock().await.push_back(RetryRecord {
            task_id,
            error,
            attempts,
        });
    }

    pub async fn try_dequeue(&self) -> Option<RetryRecord> {
        self.inner.lock().await.pop_front()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
