//! Polling policy for observing a deposit on the child chain.

use crate::ConfigError;
use std::time::Duration;

/// Default delay between two child chain balance queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// How often and for how long to wait for the child chain balance to increase.
///
/// Without `max_attempts` and `timeout` the wait is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between two balance queries
    pub interval: Duration,
    /// Total number of balance queries, including the first one
    pub max_attempts: Option<u32>,
    /// Upper bound on the whole wait
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            timeout: None,
        }
    }
}

impl PollPolicy {
    pub fn new(
        interval: Duration,
        max_attempts: Option<u32>,
        timeout: Option<Duration>,
    ) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::InvalidPollPolicy("interval must be non-zero"));
        }
        if max_attempts == Some(0) {
            return Err(ConfigError::InvalidPollPolicy(
                "max attempts must be at least 1",
            ));
        }
        if timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::InvalidPollPolicy("timeout must be non-zero"));
        }

        Ok(Self {
            interval,
            max_attempts,
            timeout,
        })
    }

    pub const fn is_bounded(&self) -> bool {
        self.max_attempts.is_some() || self.timeout.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(30));
        assert!(!policy.is_bounded());
    }

    #[test]
    fn test_bounded_policy() {
        let policy = PollPolicy::new(Duration::from_secs(5), Some(10), None).unwrap();
        assert!(policy.is_bounded());
        assert_eq!(policy.max_attempts, Some(10));
    }

    #[test]
    fn test_rejects_zero_values() {
        assert!(PollPolicy::new(Duration::ZERO, None, None).is_err());
        assert!(PollPolicy::new(Duration::from_secs(1), Some(0), None).is_err());
        assert!(PollPolicy::new(Duration::from_secs(1), None, Some(Duration::ZERO)).is_err());
    }
}
