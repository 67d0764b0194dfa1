use std::time::Duration;

use crate::error::DispatchError;

/// Sentinel rate limit that turns pacing off entirely.
pub const RATE_LIMIT_DISABLED: i64 = -1;

/// Added on top of the computed spacing so scheduling jitter never pushes
/// actual throughput over the configured budget.
const SAFETY_MARGIN: Duration = Duration::from_secs(1);

/// Converts a requests-per-minute budget into the delay between two worker launches.
///
/// Returns zero for [`RATE_LIMIT_DISABLED`], otherwise `ceil(60 / max_per_minute)`
/// seconds plus a one second margin.
///
/// # Errors
/// Returns [`DispatchError::InvalidRateLimit`] for zero or any negative value
/// other than the disable sentinel.
pub fn delay_for(max_per_minute: i64) -> Result<Duration, DispatchError> {
    match max_per_minute {
        RATE_LIMIT_DISABLED => Ok(Duration::ZERO),
        n if n <= 0 => Err(DispatchError::InvalidRateLimit(n)),
        n => {
            let secs = 60u64.div_ceil(n.unsigned_abs());
            Ok(Duration::from_secs(secs) + SAFETY_MARGIN)
        }
    }
}

/// Launch pacing for one dispatch run. Validated once, at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    max_per_minute: i64,
    delay: Duration,
}

impl Throttle {
    /// # Errors
    /// Returns [`DispatchError::InvalidRateLimit`] when `max_per_minute` is
    /// neither positive nor [`RATE_LIMIT_DISABLED`].
    pub fn new(max_per_minute: i64) -> Result<Self, DispatchError> {
        let delay = delay_for(max_per_minute)?;
        Ok(Self {
            max_per_minute,
            delay,
        })
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_per_minute: RATE_LIMIT_DISABLED,
            delay: Duration::ZERO,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn max_per_minute(&self) -> i64 {
        self.max_per_minute
    }

    pub fn is_disabled(&self) -> bool {
        self.max_per_minute == RATE_LIMIT_DISABLED
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::disabled()
    }
}
