use std::sync::Arc;

use crate::outcome::Outcome;
use crate::state::TaskState;

/// Caller-chosen identifier of a task. Unique within one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for TaskId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One unit of dispatched work paired with a slot for its outcome.
///
/// The input is shared with the worker that runs the attempt; the outcome
/// slot is only written by the dispatcher once that worker has joined.
#[derive(Debug)]
pub struct Task<I, T> {
    id: TaskId,
    input: Arc<I>,
    outcome: Option<Outcome<T>>,
    attempts: u32,
    state: TaskState,
}

impl<I, T> Task<I, T> {
    pub fn new(id: impl Into<TaskId>, input: I) -> Self {
        Self {
            id: id.into(),
            input: Arc::new(input),
            outcome: None,
            attempts: 0,
            state: TaskState::Pending,
        }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    /// Last recorded outcome. `None` until the first attempt has joined.
    pub fn outcome(&self) -> Option<&Outcome<T>> {
        self.outcome.as_ref()
    }

    pub fn into_parts(self) -> (TaskId, Arc<I>, Option<Outcome<T>>) {
        (self.id, self.input, self.outcome)
    }

    /// Number of attempts launched so far, first attempt included.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub(crate) fn shared_input(&self) -> Arc<I> {
        Arc::clone(&self.input)
    }

    /// Marks the task running and returns the attempt number just started.
    pub(crate) fn begin_attempt(&mut self) -> u32 {
        if self.advance(TaskState::Running) {
            self.attempts += 1;
        }
        self.attempts
    }

    /// Records the outcome of the running attempt. Ignored unless running.
    pub(crate) fn complete(&mut self, outcome: Outcome<T>) {
        let next = if outcome.is_success() {
            TaskState::Succeeded
        } else {
            TaskState::Failed
        };
        if self.advance(next) {
            self.outcome = Some(outcome);
        }
    }

    pub(crate) fn mark_retrying(&mut self) -> bool {
        self.advance(TaskState::Retrying)
    }

    pub(crate) fn mark_gave_up(&mut self) -> bool {
        self.advance(TaskState::GaveUp)
    }

    /// Illegal transitions are refused and logged; the state is left as is.
    fn advance(&mut self, next: TaskState) -> bool {
        match self.state.transition_to(next) {
            Ok(state) => {
                self.state = state;
                true
            }
            Err(e) => {
                tracing::error!(task = %self.id, error = %e, "transition refused");
                false
            }
        }
    }
}
