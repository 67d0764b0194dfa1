use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;
use crate::outcome::TaskError;
use crate::policy::RetryPolicy;
use crate::queue::{ErrorQueue, RetryRecord};
use crate::state::TaskState;
use crate::task::{Task, TaskId};
use crate::worker::Worker;

/// Hard ceiling on retries per task. Keeps every run bounded.
pub const MAX_RETRY_LIMIT: u32 = 16;

/// Final tally of a coordinated run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RetrySummary {
    pub succeeded: usize,
    pub failed: usize,
    pub gave_up: usize,
    /// Retry attempts launched, across all passes.
    pub retries: usize,
    /// Dispatch passes, the initial one included.
    pub passes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Retry,
    GiveUp,
    Fail,
}

/// Drains the error queue after each dispatch pass and re-submits the tasks
/// the retry policy wants attempted again, up to `retry_limit` retries each.
#[derive(Debug, Clone)]
pub struct RetryCoordinator {
    dispatcher: Dispatcher,
    retry_limit: u32,
}

impl RetryCoordinator {
    /// # Errors
    /// Returns [`DispatchError::InvalidRetryLimit`] above [`MAX_RETRY_LIMIT`].
    pub fn new(dispatcher: Dispatcher, retry_limit: u32) -> Result<Self, DispatchError> {
        if retry_limit > MAX_RETRY_LIMIT {
            return Err(DispatchError::InvalidRetryLimit {
                limit: retry_limit,
                max: MAX_RETRY_LIMIT,
            });
        }
        Ok(Self {
            dispatcher,
            retry_limit,
        })
    }

    pub fn retry_limit(&self) -> u32 {
        self.retry_limit
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Dispatch every task, then retry failures until each task is terminal.
    ///
    /// Only transport errors are offered to the policy; validation errors are
    /// final. A task whose policy still asks for a retry after `retry_limit`
    /// retries ends `GaveUp` with its last outcome kept.
    ///
    /// # Errors
    /// Returns [`DispatchError::DuplicateTaskId`] before dispatching anything
    /// if two tasks share an id.
    pub async fn run<I, T>(
        &self,
        tasks: &mut [Task<I, T>],
        worker: &Arc<dyn Worker<I, T>>,
        errors: &ErrorQueue,
        policy: &RetryPolicy,
    ) -> Result<RetrySummary, DispatchError>
    where
        I: Send + Sync + 'static,
        T: Send + 'static,
    {
        let mut index: HashMap<TaskId, usize> = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            if index.insert(task.id().clone(), i).is_some() {
                return Err(DispatchError::DuplicateTaskId(task.id().to_string()));
            }
        }

        let mut summary = RetrySummary::default();
        self.dispatcher.dispatch(tasks.iter_mut(), worker, errors).await;
        summary.passes = 1;

        loop {
            let mut retry: HashSet<TaskId> = HashSet::new();

            while let Some(record) = errors.try_dequeue().await {
                let Some(&i) = index.get(&record.task_id) else {
                    tracing::warn!(task = %record.task_id, "error for unknown task, dropped");
                    continue;
                };
                let task = &mut tasks[i];
                if task.state() != TaskState::Failed {
                    tracing::warn!(task = %task.id(), state = %task.state(), "stale error record, dropped");
                    continue;
                }

                match self.decide(&record, policy) {
                    Decision::Retry => {
                        if task.mark_retrying() {
                            retry.insert(record.task_id);
                        }
                    }
                    Decision::GiveUp => {
                        tracing::warn!(
                            task = %task.id(),
                            attempts = record.attempts,
                            error = %record.error,
                            "retry limit reached, giving up"
                        );
                        task.mark_gave_up();
                    }
                    Decision::Fail => {
                        tracing::debug!(task = %task.id(), error = %record.error, "not retryable");
                    }
                }
            }

            if retry.is_empty() {
                break;
            }

            summary.passes += 1;
            tracing::info!(count = retry.len(), pass = summary.passes, "re-dispatching failed tasks");
            summary.retries += self
                .dispatcher
                .dispatch(
                    tasks.iter_mut().filter(|t| retry.contains(t.id())),
                    worker,
                    errors,
                )
                .await;
        }

        for task in tasks.iter() {
            if !task.state().is_terminal() {
                tracing::warn!(task = %task.id(), state = %task.state(), "task left unfinished");
            }
            match task.state() {
                TaskState::Succeeded => summary.succeeded += 1,
                TaskState::Failed => summary.failed += 1,
                TaskState::GaveUp => summary.gave_up += 1,
                _ => {}
            }
        }

        Ok(summary)
    }

    fn decide(&self, record: &RetryRecord, policy: &RetryPolicy) -> Decision {
        let TaskError::Transport { code, .. } = &record.error else {
            return Decision::Fail;
        };
        if !policy.should_retry(*code, record.attempts) {
            return Decision::Fail;
        }
        let retries_used = record.attempts.saturating_sub(1);
        if retries_used >= self.retry_limit {
            Decision::GiveUp
        } else {
            Decision::Retry
        }
    }
}
