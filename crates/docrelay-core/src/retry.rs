//! Retry policy shared by the proxy passthrough and other retrying fetches.
//!
//! A policy is a plain value: attempt count, per-attempt timeout growth,
//! and inter-attempt delay growth, both exponential with a cap.

use std::time::Duration;

/// Number of passthrough attempts before giving up.
const PROXY_MAX_ATTEMPTS: u32 = 5;

/// First attempt timeout. Doubles per attempt up to the cap.
const PROXY_INITIAL_TIMEOUT: Duration = Duration::from_secs(5);
const PROXY_MAX_TIMEOUT: Duration = Duration::from_secs(30);

/// Base for the wait between attempts. Doubles per retry up to the cap.
const PROXY_INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const PROXY_MAX_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_timeout: Duration,
    pub max_timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Policy used by the backend proxy passthrough route.
    pub fn proxy() -> Self {
        Self {
            max_attempts: PROXY_MAX_ATTEMPTS,
            initial_timeout: PROXY_INITIAL_TIMEOUT,
            max_timeout: PROXY_MAX_TIMEOUT,
            initial_backoff: PROXY_INITIAL_BACKOFF,
            max_backoff: PROXY_MAX_BACKOFF,
        }
    }

    /// Timeout for a given zero-based attempt.
    pub fn timeout_for(&self, attempt: u32) -> Duration {
        scaled(self.initial_timeout, attempt).min(self.max_timeout)
    }

    /// Delay before the given retry (1 = first retry).
    pub fn delay_before(&self, retry: u32) -> Duration {
        scaled(self.initial_backoff, retry).min(self.max_backoff)
    }
}

fn scaled(base: Duration, exponent: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(exponent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_double_and_cap() {
        let policy = RetryPolicy::proxy();
        assert_eq!(policy.timeout_for(0), Duration::from_secs(5));
        assert_eq!(policy.timeout_for(1), Duration::from_secs(10));
        assert_eq!(policy.timeout_for(2), Duration::from_secs(20));
        assert_eq!(policy.timeout_for(3), Duration::from_secs(30));
        assert_eq!(policy.timeout_for(4), Duration::from_secs(30));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::proxy();
        assert_eq!(policy.delay_before(1), Duration::from_secs(2));
        assert_eq!(policy.delay_before(2), Duration::from_secs(4));
        assert_eq!(policy.delay_before(3), Duration::from_secs(8));
        assert_eq!(policy.delay_before(4), Duration::from_secs(10));
    }

    #[test]
    fn large_exponents_saturate() {
        let policy = RetryPolicy::proxy();
        assert_eq!(policy.timeout_for(40), Duration::from_secs(30));
        assert_eq!(policy.delay_before(40), Duration::from_secs(10));
    }
}
