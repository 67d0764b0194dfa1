use thiserror::Error;

/// Errors raised while configuring or driving a dispatch run.
///
/// None of these describe a single task failing; per-task failures are
/// recovered into an `Outcome`. Everything here is a configuration problem
/// that must stop the run before the first worker is launched.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid rate limit: {0} (must be > 0, or -1 to disable throttling)")]
    InvalidRateLimit(i64),

    #[error("invalid retry limit: {limit} (max {max})")]
    InvalidRetryLimit { limit: u32, max: u32 },

    #[error("duplicate task id: {0}")]
    DuplicateTaskId(String),

    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}
