//! Poller configuration.

use super::backoff::RetryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a transition poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Delay between status queries in milliseconds.
    pub poll_interval_ms: u64,
    /// Overall deadline for the whole transition in milliseconds. Past this
    /// the poller fails with a timeout instead of waiting on a stuck
    /// resource forever.
    pub max_wait_ms: u64,
    /// How many consecutive not-found status responses are tolerated after
    /// a successful initiating call before the eventual-consistency reading
    /// gives way to a fatal classification.
    pub not_found_grace: u32,
    /// Retry policy for the transition-initiating call.
    pub initiate_retry: RetryConfig,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            max_wait_ms: 300_000,
            not_found_grace: 8,
            initiate_retry: RetryConfig::default(),
        }
    }
}

impl PollerConfig {
    /// Creates a new poller config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval_ms(mut self, interval: u64) -> Self {
        self.poll_interval_ms = interval;
        self
    }

    /// Sets the overall deadline.
    #[must_use]
    pub fn with_max_wait_ms(mut self, max_wait: u64) -> Self {
        self.max_wait_ms = max_wait;
        self
    }

    /// Sets the not-found grace window.
    #[must_use]
    pub fn with_not_found_grace(mut self, polls: u32) -> Self {
        self.not_found_grace = polls;
        self
    }

    /// Sets the retry policy for the initiating call.
    #[must_use]
    pub fn with_initiate_retry(mut self, retry: RetryConfig) -> Self {
        self.initiate_retry = retry;
        self
    }

    /// Returns the poll interval as a duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Returns the overall deadline as a duration.
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_conservative() {
        let config = PollerConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.max_wait(), Duration::from_secs(300));
        assert!(config.not_found_grace > 0);
    }

    #[test]
    fn test_builder() {
        let config = PollerConfig::new()
            .with_poll_interval_ms(500)
            .with_max_wait_ms(10_000)
            .with_not_found_grace(2)
            .with_initiate_retry(RetryConfig::new().with_max_attempts(1));

        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.max_wait_ms, 10_000);
        assert_eq!(config.not_found_grace, 2);
        assert_eq!(config.initiate_retry.max_attempts, 1);
    }

    #[test]
    fn test_serialization_round_trip() {
        let config = PollerConfig::new().with_max_wait_ms(60_000);
        let json = serde_json::to_string(&config).unwrap();
        let restored: PollerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.max_wait_ms, 60_000);
    }
}
