mod dispatcher;
mod error;
mod outcome;
mod policy;
mod queue;
mod retry;
mod state;
mod task;
mod throttle;
mod worker;

pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use outcome::{CODE_UNREACHABLE, CODE_WORKER_PANICKED, Outcome, TaskError};
pub use policy::RetryPolicy;
pub use queue::{ErrorQueue, RetryRecord};
pub use retry::{MAX_RETRY_LIMIT, RetryCoordinator, RetrySummary};
pub use state::TaskState;
pub use task::{Task, TaskId};
pub use throttle::{RATE_LIMIT_DISABLED, Throttle, delay_for};
pub use worker::Worker;
