use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::outcome::{CODE_WORKER_PANICKED, Outcome, TaskError};
use crate::queue::ErrorQueue;
use crate::state::TaskState;
use crate::task::Task;
use crate::throttle::Throttle;
use crate::worker::Worker;

/// Fans tasks out to one tokio task each, pacing launches with a [`Throttle`].
///
/// Pacing spans calls: the first launch of a pass waits out the delay since
/// the last launch of the previous one. Clones share the same pacing.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    throttle: Throttle,
    last_launch: Arc<Mutex<Option<Instant>>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(throttle: Throttle) -> Self {
        Self {
            throttle,
            last_launch: Arc::default(),
        }
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    /// Run one attempt of every given task and wait for all of them.
    ///
    /// Launches are staggered by the throttle delay, measured from the last
    /// launch of any earlier call; a slow worker never holds back the next
    /// launch. Returns once every launched worker has
    /// joined, with each task's outcome slot written. Failed attempts are
    /// pushed onto `errors`, including panics, which become a transport
    /// error with [`CODE_WORKER_PANICKED`].
    ///
    /// Tasks that are not `Pending` or `Retrying` are skipped. Returns the
    /// number of workers launched.
    pub async fn dispatch<'a, I, T, It>(
        &self,
        tasks: It,
        worker: &Arc<dyn Worker<I, T>>,
        errors: &ErrorQueue,
    ) -> usize
    where
        I: Send + Sync + 'static,
        T: Send + 'static,
        It: IntoIterator<Item = &'a mut Task<I, T>>,
    {
        let mut batch: Vec<&mut Task<I, T>> = tasks
            .into_iter()
            .filter(|task| {
                let ready = task.state().can_transition_to(TaskState::Running);
                if !ready {
                    tracing::warn!(task = %task.id(), state = %task.state(), "task not runnable, skipped");
                }
                ready
            })
            .collect();

        let total = batch.len();
        let delay = self.throttle.delay();
        let mut handles = Vec::with_capacity(total);

        let mut last_launch = self.last_launch.lock().await;
        for (i, task) in batch.iter_mut().enumerate() {
            if let Some(last) = *last_launch {
                if !delay.is_zero() {
                    tokio::time::sleep_until(last + delay).await;
                }
            }
            *last_launch = Some(Instant::now());

            let attempt = task.begin_attempt();
            let id = task.id().clone();
            let input = task.shared_input();
            let worker = Arc::clone(worker);
            let errors = errors.clone();

            tracing::info!(task = %id, n = i + 1, total, attempt, "task started");

            handles.push(tokio::spawn(async move {
                let outcome = worker.call(&input).await;
                if let Some(error) = outcome.error() {
                    tracing::debug!(task = %id, attempt, error = %error, "task failed");
                    errors.enqueue(id, error, attempt).await;
                }
                outcome
            }));
        }
        drop(last_launch);

        for (task, handle) in batch.into_iter().zip(handles) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(task = %task.id(), error = %e, "worker aborted");
                    let error = TaskError::Transport {
                        code: CODE_WORKER_PANICKED,
                        message: "worker panicked".to_string(),
                        detail: e.to_string(),
                    };
                    errors
                        .enqueue(task.id().clone(), error.clone(), task.attempts())
                        .await;
                    Outcome::from(error)
                }
            };
            task.complete(outcome);
        }

        total
    }
}
