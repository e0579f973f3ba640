//! Rate limiting for outbound geocoding and directions calls
//!
//! A sliding window limiter that also enforces a daily quota:
//! - The trailing window bounds burst volume (e.g. 100 calls per minute)
//! - The daily counter bounds total volume and resets 24h after the last reset
//!
//! # Example
//!
//! ```rust
//! use storefinder_core::rate_limit::{RateLimitConfig, SlidingWindowLimiter};
//!
//! let limiter = SlidingWindowLimiter::new(RateLimitConfig::default());
//!
//! if limiter.try_acquire() {
//!     // Proceed with provider call
//! } else {
//!     // Rate limited, use the offline fallback
//! }
//! ```

use crate::clock::{SharedClock, SystemClock};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Length of the daily quota period
pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Rate limiter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
    /// Maximum requests per 24h period
    pub daily_quota: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
            daily_quota: 2500,
        }
    }
}

impl RateLimitConfig {
    /// Window limit with an effectively unlimited daily quota
    #[must_use]
    pub fn strict(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            daily_quota: u32::MAX,
        }
    }

    /// Per-minute rate limit with the default daily quota
    #[must_use]
    pub fn per_minute(max: u32) -> Self {
        Self {
            max_requests: max,
            ..Self::default()
        }
    }

    /// Builder-style method to set the daily quota
    #[must_use]
    pub fn with_daily_quota(mut self, quota: u32) -> Self {
        self.daily_quota = quota;
        self
    }
}

#[derive(Debug)]
struct WindowState {
    timestamps: VecDeque<Instant>,
    daily_count: u32,
    last_reset: Instant,
}

impl WindowState {
    fn prune(&mut self, now: Instant, config: &RateLimitConfig) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.duration_since(oldest) >= config.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        if now.duration_since(self.last_reset) > DAY {
            self.daily_count = 0;
            self.last_reset = now;
        }
    }

    fn allows(&self, config: &RateLimitConfig) -> bool {
        self.timestamps.len() < config.max_requests as usize && self.daily_count < config.daily_quota
    }
}

/// Sliding window rate limiter with a daily quota
pub struct SlidingWindowLimiter {
    state: Mutex<WindowState>,
    config: RateLimitConfig,
    clock: SharedClock,
}

impl SlidingWindowLimiter {
    /// Create a new limiter using the system clock
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, SystemClock::shared())
    }

    /// Create a new limiter reading time from `clock`
    #[must_use]
    pub fn with_clock(config: RateLimitConfig, clock: SharedClock) -> Self {
        let now = clock.now();
        Self {
            state: Mutex::new(WindowState {
                timestamps: VecDeque::new(),
                daily_count: 0,
                last_reset: now,
            }),
            config,
            clock,
        }
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Whether a request may be issued right now
    #[must_use]
    pub fn can_proceed(&self) -> bool {
        let now = self.clock.now();
        // Handle poisoned lock by recovering the data (still valid even after panic)
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.prune(now, &self.config);
        state.allows(&self.config)
    }

    /// Register an issued request
    pub fn record(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.prune(now, &self.config);
        state.timestamps.push_back(now);
        state.daily_count = state.daily_count.saturating_add(1);
    }

    /// Check and record in one step
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.prune(now, &self.config);

        if state.allows(&self.config) {
            state.timestamps.push_back(now);
            state.daily_count = state.daily_count.saturating_add(1);
            true
        } else {
            false
        }
    }

    /// Get current request count in window
    #[must_use]
    pub fn current_count(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.prune(now, &self.config);
        state.timestamps.len()
    }

    /// Get rate limit status
    #[must_use]
    pub fn status(&self) -> RateLimitStatus {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.prune(now, &self.config);

        let window_reset_in = state
            .timestamps
            .front()
            .map_or(Duration::ZERO, |&oldest| {
                self.config.window.saturating_sub(now.duration_since(oldest))
            });

        RateLimitStatus {
            in_window: state.timestamps.len(),
            max_requests: self.config.max_requests,
            daily_used: state.daily_count,
            daily_remaining: self.config.daily_quota.saturating_sub(state.daily_count),
            window_reset_in,
        }
    }

    /// Forget all recorded requests
    pub fn reset(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.timestamps.clear();
        state.daily_count = 0;
        state.last_reset = now;
    }
}

/// Rate limit status
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStatus {
    /// Requests recorded in the trailing window
    pub in_window: usize,
    /// Maximum requests per window
    pub max_requests: u32,
    /// Requests counted against today's quota
    pub daily_used: u32,
    /// Requests left in today's quota
    pub daily_remaining: u32,
    /// Time until the oldest request leaves the window
    pub window_reset_in: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn limiter(config: RateLimitConfig) -> (SlidingWindowLimiter, ManualClock) {
        let clock = ManualClock::new();
        (SlidingWindowLimiter::with_clock(config, clock.shared()), clock)
    }

    #[test]
    fn test_sliding_window_basic() {
        let (limiter, _clock) = limiter(RateLimitConfig::strict(3, Duration::from_secs(60)));

        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire()); // Should be rate limited
        assert!(!limiter.can_proceed());
    }

    #[test]
    fn test_window_slides() {
        let (limiter, clock) = limiter(RateLimitConfig::strict(2, Duration::from_secs(60)));

        assert!(limiter.try_acquire());
        clock.advance(Duration::from_secs(30));
        assert!(limiter.try_acquire());
        assert!(!limiter.can_proceed());

        clock.advance(Duration::from_secs(31));
        assert!(limiter.can_proceed());
        assert_eq!(limiter.current_count(), 1);
    }

    #[test]
    fn test_can_proceed_does_not_record() {
        let (limiter, _clock) = limiter(RateLimitConfig::strict(1, Duration::from_secs(60)));

        assert!(limiter.can_proceed());
        assert!(limiter.can_proceed());
        limiter.record();
        assert!(!limiter.can_proceed());
    }

    #[test]
    fn test_daily_quota() {
        let config = RateLimitConfig::strict(100, Duration::from_secs(1)).with_daily_quota(2);
        let (limiter, clock) = limiter(config);

        assert!(limiter.try_acquire());
        clock.advance(Duration::from_secs(5));
        assert!(limiter.try_acquire());
        clock.advance(Duration::from_secs(5));
        assert!(!limiter.try_acquire());

        let status = limiter.status();
        assert_eq!(status.daily_used, 2);
        assert_eq!(status.daily_remaining, 0);
    }

    #[test]
    fn test_daily_quota_resets_after_a_day() {
        let config = RateLimitConfig::strict(100, Duration::from_secs(1)).with_daily_quota(1);
        let (limiter, clock) = limiter(config);

        assert!(limiter.try_acquire());
        assert!(!limiter.can_proceed());

        clock.advance(DAY);
        assert!(!limiter.can_proceed(), "reset requires strictly more than 24h");

        clock.advance(Duration::from_secs(1));
        assert!(limiter.try_acquire());
    }

    #[test]
    fn test_reset() {
        let (limiter, _clock) = limiter(RateLimitConfig::strict(1, Duration::from_secs(60)));

        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        limiter.reset();
        assert!(limiter.try_acquire());
    }

    #[test]
    fn test_status() {
        let (limiter, clock) = limiter(RateLimitConfig::per_minute(10));

        assert!(limiter.try_acquire());
        clock.advance(Duration::from_secs(20));

        let status = limiter.status();
        assert_eq!(status.in_window, 1);
        assert_eq!(status.max_requests, 10);
        assert_eq!(status.window_reset_in, Duration::from_secs(40));
    }
}
