//! Retry policies for idempotent API reads.

use std::time::Duration;

use crate::error::FetchError;

/// Delay between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackoffStrategy {
    None,
    Fixed(Duration),
    /// Doubles from `base` on every attempt, capped at `max`.
    Exponential { base: Duration, max: Duration },
}

impl BackoffStrategy {
    /// Delay before retry number `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed(d) => *d,
            Self::Exponential { base, max } => {
                let factor = 2u32.saturating_pow(attempt);
                base.saturating_mul(factor).min(*max)
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(100),
            max: Duration::from_secs(2),
        }
    }
}

/// What counts as a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCondition {
    StatusCode(u16),
    /// Any 5xx.
    ServerError,
    /// The request never got a response.
    ConnectionError,
}

impl RetryCondition {
    pub fn matches(&self, error: &FetchError) -> bool {
        match (self, error) {
            (Self::StatusCode(code), FetchError::Http { status, .. }) => status == code,
            (Self::ServerError, FetchError::Http { status, .. }) => (500..600).contains(status),
            (Self::ConnectionError, FetchError::Connection(_)) => true,
            _ => false,
        }
    }
}

/// How often to retry a GET. Writes are never retried: creating an order
/// twice is worse than failing once.
///
/// The default policy never retries; callers opt in with
/// [`ApiClient::with_retry`](crate::ApiClient::with_retry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_attempts: u32,
    pub backoff: BackoffStrategy,
    pub retry_on: Vec<RetryCondition>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: BackoffStrategy::default(),
            retry_on: vec![RetryCondition::ServerError, RetryCondition::ConnectionError],
        }
    }

    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            backoff: BackoffStrategy::None,
            retry_on: Vec::new(),
        }
    }

    pub fn with_backoff(mut self, strategy: BackoffStrategy) -> Self {
        self.backoff = strategy;
        self
    }

    pub fn with_conditions(mut self, conditions: Vec<RetryCondition>) -> Self {
        self.retry_on = conditions;
        self
    }

    /// Whether `error` on retry number `attempt` deserves another try.
    pub fn should_retry(&self, error: &FetchError, attempt: u32) -> bool {
        attempt < self.max_attempts && self.retry_on.iter().any(|c| c.matches(error))
    }

    /// Wait out the backoff for `attempt`.
    pub(crate) async fn pause(&self, attempt: u32) {
        let delay = self.backoff.delay_for_attempt(attempt);
        if delay.is_zero() {
            return;
        }
        #[cfg(not(target_arch = "wasm32"))]
        tokio::time::sleep(delay).await;
        // No timer in Spin components; retry immediately.
        #[cfg(target_arch = "wasm32")]
        let _ = delay;
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> FetchError {
        FetchError::Http {
            status,
            url: "/api/products".into(),
        }
    }

    #[test]
    fn test_exponential_backoff_caps() {
        let backoff = BackoffStrategy::Exponential {
            base: Duration::from_millis(100),
            max: Duration::from_millis(500),
        };
        assert_eq!(backoff.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(backoff.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(backoff.delay_for_attempt(3), Duration::from_millis(500));
        assert_eq!(backoff.delay_for_attempt(40), Duration::from_millis(500));
    }

    #[test]
    fn test_retries_transient_failures_only() {
        let policy = RetryPolicy::new(2);
        assert!(policy.should_retry(&http(503), 0));
        assert!(policy.should_retry(&FetchError::Connection("refused".into()), 1));
        assert!(!policy.should_retry(&http(503), 2));
        assert!(!policy.should_retry(&http(404), 0));
        assert!(!policy.should_retry(&http(401), 0));
        assert!(!policy.should_retry(&FetchError::Deserialization("eof".into()), 0));
    }

    #[test]
    fn test_custom_status() {
        let policy = RetryPolicy::new(1).with_conditions(vec![RetryCondition::StatusCode(429)]);
        assert!(policy.should_retry(&http(429), 0));
        assert!(!policy.should_retry(&http(500), 0));
        assert!(!RetryPolicy::none().should_retry(&http(500), 0));
    }

    #[test]
    fn test_default_never_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy, RetryPolicy::none());
        assert!(!policy.should_retry(&http(503), 0));
        assert!(!policy.should_retry(&FetchError::Connection("reset".into()), 0));
    }
}
