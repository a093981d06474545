use std::time::Duration;

use http::StatusCode;

use crate::model::ThrottleSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry(Duration),
    Fail,
}

/// Linear backoff on throttled responses: the n-th failed attempt waits
/// `n * unit` before the next one.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    unit: Duration,
    max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5), Duration::from_secs(60))
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, unit: Duration, max_wait: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            unit,
            max_wait,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        self.unit.saturating_mul(attempt)
    }

    /// 429 is always throttling. 403 only counts when the response says so,
    /// otherwise it is a real permission failure.
    pub fn is_retryable(status: StatusCode, signal: &ThrottleSignal) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS
            || (status == StatusCode::FORBIDDEN && signal.rate_limited)
    }

    /// `attempt` is the 1-based index of the attempt that just failed.
    pub fn decide(&self, attempt: u32, status: StatusCode, signal: &ThrottleSignal) -> RetryDecision {
        if attempt >= self.max_attempts || !Self::is_retryable(status, signal) {
            return RetryDecision::Fail;
        }

        let mut wait = self.backoff(attempt);
        if let Some(advised) = signal.retry_after {
            wait = wait.max(advised.min(self.max_wait));
        }
        RetryDecision::Retry(wait)
    }
}
