use std::sync::Arc;

type Decide = dyn Fn(i32, u32) -> bool + Send + Sync;

/// Per-backend decision on whether a failed call is worth another attempt.
///
/// Wraps a pure `(error_code, attempt_count) -> bool` function. Attempt
/// counts start at 1; a count of 0 is treated as a caller bug and denied.
#[derive(Clone)]
pub struct RetryPolicy {
    name: &'static str,
    decide: Arc<Decide>,
}

impl RetryPolicy {
    pub fn new<F>(name: &'static str, decide: F) -> Self
    where
        F: Fn(i32, u32) -> bool + Send + Sync + 'static,
    {
        Self {
            name,
            decide: Arc::new(decide),
        }
    }

    /// Never retry. For backends whose failures are all permanent.
    #[must_use]
    pub fn never() -> Self {
        Self::new("never", |_, _| false)
    }

    /// Retry every transport error. The coordinator's limit still applies.
    #[must_use]
    pub fn always() -> Self {
        Self::new("always", |_, _| true)
    }

    /// Retry only the listed status codes.
    #[must_use]
    pub fn on_codes(codes: &[i32]) -> Self {
        let codes = codes.to_vec();
        Self::new("on_codes", move |code, _| codes.contains(&code))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn should_retry(&self, code: i32, attempts: u32) -> bool {
        if attempts == 0 {
            tracing::warn!(
                policy = self.name,
                code,
                attempts,
                "attempt count out of range, denying retry"
            );
            return false;
        }
        (self.decide)(code, attempts)
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_attempts_is_denied_even_when_policy_agrees() {
        assert!(!RetryPolicy::always().should_retry(503, 0));
        assert!(RetryPolicy::always().should_retry(503, 1));
    }

    #[test]
    fn on_codes_matches_only_listed_codes() {
        let policy = RetryPolicy::on_codes(&[418, 503]);
        assert!(policy.should_retry(418, 1));
        assert!(policy.should_retry(503, 3));
        assert!(!policy.should_retry(400, 1));
    }

    #[test]
    fn custom_policy_sees_attempt_count() {
        let policy = RetryPolicy::new("first_two", |_, attempts| attempts < 2);
        assert!(policy.should_retry(500, 1));
        assert!(!policy.should_retry(500, 2));
        assert_eq!(policy.name(), "first_two");
    }

    #[test]
    fn never_denies() {
        assert!(!RetryPolicy::never().should_retry(503, 1));
    }
}
