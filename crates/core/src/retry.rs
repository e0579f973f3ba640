//! Retry policy with exponential backoff
//!
//! Describes how often and how patiently outbound provider calls are retried.
//! The async retry loop itself lives next to the HTTP client; this module
//! only computes the schedule.
//!
//! # Example
//!
//! ```rust
//! use storefinder_core::retry::RetryConfig;
//! use std::time::Duration;
//!
//! let config = RetryConfig { jitter: false, ..RetryConfig::default() };
//! assert_eq!(config.delay_for_attempt(0), Duration::ZERO);
//! assert_eq!(config.delay_for_attempt(1), Duration::from_millis(100));
//! assert_eq!(config.delay_for_attempt(2), Duration::from_millis(200));
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Add random jitter to delays
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a config with no retries
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }

    /// Calculate delay before a given attempt (attempt 0 is the first call)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let base_delay = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let delay_secs = base_delay.min(self.max_delay.as_secs_f64());

        let final_delay = if self.jitter {
            // Add up to 25% jitter
            let jitter_factor = 1.0 + rand::random::<f64>() * 0.25;
            delay_secs * jitter_factor
        } else {
            delay_secs
        };

        Duration::from_secs_f64(final_delay)
    }
}
