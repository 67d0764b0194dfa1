use async_trait::async_trait;

use crate::outcome::Outcome;

/// Callback invoked once per task attempt.
///
/// Implementations own the backend wiring (request construction, auth,
/// response parsing) and fold every failure into an [`Outcome`]. A panic is
/// tolerated: the dispatcher records it as a transport error for that task.
#[async_trait]
pub trait Worker<I, T>: Send + Sync {
    async fn call(&self, input: &I) -> Outcome<T>;
}
