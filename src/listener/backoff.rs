use std::time::Duration;

/// Default number of connection attempts: the first try plus five retries.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Delay before retrying after attempt `attempt` failed: `attempt²` seconds.
///
/// Attempt 0 retries immediately. No jitter, so schedules are reproducible.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(u64::from(attempt).pow(2))
}

/// What to do after a failed connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { next_attempt: u32, delay: Duration },
    Exhausted,
}

/// Decides the step after attempt `attempt` (0-based) failed.
///
/// `max_attempts` below one is treated as one.
pub fn after_failure(attempt: u32, max_attempts: u32) -> RetryDecision {
    let next_attempt = attempt + 1;
    if next_attempt >= max_attempts.max(1) {
        return RetryDecision::Exhausted;
    }
    RetryDecision::Retry {
        next_attempt,
        delay: backoff_delay(attempt),
    }
}
