//! Retry policy and predicates for handling transient failures.
//!
//! A [`RetryPolicy`] says how many times and how long to wait; a
//! [`RetryPredicate`] says whether a particular failure deserves another try.

use crate::Error;
use http::StatusCode;
use rand::Rng;
use std::time::Duration;

/// Returns `true` for statuses that usually clear up on their own:
/// 408 Request Timeout, 429 Too Many Requests and every 5xx.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// Exponential backoff with additive random jitter.
///
/// The wait before retry `n` (1-indexed) is
/// `min(base_delay * 2^(n - 1), max_delay)` plus a random jitter drawn
/// uniformly from `[0, max_jitter]`.
///
/// # Examples
///
/// ```
/// use avaagent_client::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default()
///     .with_base_delay(Duration::from_millis(100))
///     .with_max_jitter(Duration::ZERO);
///
/// assert_eq!(policy.backoff(1), Duration::from_millis(100));
/// assert_eq!(policy.backoff(2), Duration::from_millis(200));
/// assert_eq!(policy.backoff(3), Duration::from_millis(400));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. `3` means up to four attempts.
    pub max_retries: usize,
    /// Wait before the first retry.
    pub base_delay: Duration,
    /// Upper bound on the exponential part of the wait.
    pub max_delay: Duration,
    /// Upper bound on the random jitter added to every wait.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_jitter: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Sets the number of retries.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the wait before the first retry.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Sets the cap on the exponential part of the wait.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Sets the cap on the random jitter. `Duration::ZERO` disables jitter.
    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// The exponential part of the wait before retry `retry` (1-indexed), without jitter.
    pub fn backoff(&self, retry: usize) -> Duration {
        let exponent = retry.saturating_sub(1).min(u32::MAX as usize) as u32;
        let multiplier = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(multiplier)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// The full wait before retry `retry` (1-indexed), jitter included.
    pub fn delay_for_retry(&self, retry: usize) -> Duration {
        let backoff = self.backoff(retry);
        if self.max_jitter.is_zero() {
            return backoff;
        }

        let jitter_ms = rand::thread_rng().gen_range(0..=self.max_jitter.as_millis() as u64);
        backoff.saturating_add(Duration::from_millis(jitter_ms))
    }
}

/// Decides whether a failed attempt should be repeated.
///
/// The client only asks once it knows attempts remain, so implementations
/// need not track attempt budgets themselves.
///
/// # Examples
///
/// ```
/// use avaagent_client::{Error, RetryPredicate};
///
/// struct RetryOnRateLimit;
///
/// impl RetryPredicate for RetryOnRateLimit {
///     fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
///         error.status().map(|s| s.as_u16()) == Some(429)
///     }
/// }
/// ```
pub trait RetryPredicate: Send + Sync {
    /// Determines whether the request should be retried.
    ///
    /// # Arguments
    ///
    /// * `error` - The error the attempt ended with
    /// * `attempt` - The attempt that just failed (1-indexed)
    fn should_retry(&self, error: &Error, attempt: usize) -> bool;
}

/// Retry responses with status 408, 429 or 5xx and transport failures.
///
/// Timeouts are not retried. This is the default predicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryOnTransient;

impl RetryPredicate for RetryOnTransient {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.is_retryable()
    }
}

/// Never retry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRetry;

impl RetryPredicate for NeverRetry {
    fn should_retry(&self, _error: &Error, _attempt: usize) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiError;

    #[test]
    fn test_backoff_doubles_until_capped() {
        let policy = RetryPolicy::default()
            .with_base_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(500))
            .with_max_jitter(Duration::ZERO);

        assert_eq!(policy.delay_for_retry(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_retry(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_retry(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for_retry(4), Duration::from_millis(500));
        assert_eq!(policy.delay_for_retry(40), Duration::from_millis(500));
    }

    #[test]
    fn test_backoff_non_decreasing_and_bounded() {
        let policy = RetryPolicy::default();
        let bound = policy.max_delay + policy.max_jitter;

        let mut previous = Duration::ZERO;
        for retry in 1..=64 {
            let backoff = policy.backoff(retry);
            assert!(backoff >= previous, "backoff shrank at retry {retry}");
            previous = backoff;

            let delay = policy.delay_for_retry(retry);
            assert!(delay >= backoff);
            assert!(delay <= bound, "delay {delay:?} exceeds {bound:?}");
        }
    }

    #[test]
    fn test_retryable_statuses() {
        for code in [408u16, 429, 500, 502, 503, 504] {
            assert!(is_retryable_status(StatusCode::from_u16(code).unwrap()));
        }
        for code in [200u16, 204, 400, 401, 403, 404, 422] {
            assert!(!is_retryable_status(StatusCode::from_u16(code).unwrap()));
        }
    }

    #[test]
    fn test_transient_predicate_skips_timeouts() {
        let predicate = RetryOnTransient;
        let server_error: Error = ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "boom").into();
        let timeout_response: Error = ApiError::new(StatusCode::REQUEST_TIMEOUT, "slow").into();

        assert!(predicate.should_retry(&server_error, 1));
        assert!(predicate.should_retry(&timeout_response, 1));
        assert!(!predicate.should_retry(&Error::Timeout, 1));
        assert!(!NeverRetry.should_retry(&server_error, 1));
    }
}
