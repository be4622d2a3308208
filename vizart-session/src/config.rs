//! Session configuration
//!
//! Polling cadence and retry threshold are tunables, never hard-coded at
//! the use sites, so deployments can adapt to slow backends or flaky
//! networks.

use std::time::Duration;

use crate::error::SessionError;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How often to poll the backend for job status
    pub poll_interval: Duration,

    /// Consecutive poll failures tolerated before the session gives up
    /// on the job and reports a terminal transport error
    pub failure_threshold: u32,
}

impl SessionConfig {
    /// Creates a configuration with the default cadence (500 ms) and
    /// failure threshold (3)
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            failure_threshold: 3,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Recognized variables (all optional):
    /// - VIZART_POLL_INTERVAL_MS (default: 500)
    /// - VIZART_POLL_FAILURE_THRESHOLD (default: 3)
    pub fn from_env() -> Self {
        let poll_interval = std::env::var("VIZART_POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(500));

        let failure_threshold = std::env::var("VIZART_POLL_FAILURE_THRESHOLD")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(3);

        Self {
            poll_interval,
            failure_threshold,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.poll_interval.is_zero() {
            return Err(SessionError::Validation(
                "poll_interval must be greater than 0".to_string(),
            ));
        }

        if self.failure_threshold == 0 {
            return Err(SessionError::Validation(
                "failure_threshold must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}
