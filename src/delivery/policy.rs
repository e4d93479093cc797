use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Once the retry counter reaches this value, a transport error is terminal.
    pub max_retries: u32,
    /// Linear backoff unit in milliseconds.
    pub backoff_unit_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_unit_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt made with the given retry counter.
    /// delay = backoff_unit_ms * retry
    pub fn delay_for(&self, retry: u32) -> Duration {
        Duration::from_millis(self.backoff_unit_ms.saturating_mul(u64::from(retry)))
    }

    /// Whether a transport error seen at this retry counter ends the delivery.
    pub fn is_exhausted(&self, retry: u32) -> bool {
        retry >= self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::ZERO);
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(4), Duration::from_secs(4));
    }

    #[test]
    fn custom_unit() {
        let policy = RetryPolicy {
            max_retries: 3,
            backoff_unit_ms: 250,
        };
        assert_eq!(policy.delay_for(3), Duration::from_millis(750));
    }

    #[test]
    fn exhaustion_boundary() {
        let policy = RetryPolicy::default();
        assert!(!policy.is_exhausted(4));
        assert!(policy.is_exhausted(5));
        assert!(policy.is_exhausted(6));
    }

    #[test]
    fn zero_retries_is_exhausted_immediately() {
        let policy = RetryPolicy {
            max_retries: 0,
            ..Default::default()
        };
        assert!(policy.is_exhausted(0));
    }
}
