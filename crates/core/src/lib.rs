//! Core utilities for storefinder
//!
//! This crate provides shared functionality used by the geocoding, navigation
//! and store-list crates:
//!
//! - **Error handling**: Stable error codes, exit statuses and JSON failure reports
//! - **Configuration**: TOML-based configuration with validation
//! - **Clock**: Injectable time source so expiry logic is testable
//! - **Caching**: In-memory TTL cache with size-bounded eviction
//! - **Rate limiting**: Sliding window limiter with a daily quota
//! - **Retry**: Exponential backoff policy for outbound calls
//!
//! # Example
//!
//! ```rust
//! use storefinder_core::rate_limit::{RateLimitConfig, SlidingWindowLimiter};
//! use std::time::Duration;
//!
//! let limiter = SlidingWindowLimiter::new(RateLimitConfig::strict(2, Duration::from_secs(60)));
//! assert!(limiter.try_acquire());
//! assert!(limiter.try_acquire());
//! assert!(!limiter.try_acquire());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod retry;

pub use error::{Error, ErrorCode, ErrorReport, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{CacheConfig, CacheStats, TtlCache};
    pub use crate::clock::{Clock, ManualClock, SharedClock, SystemClock};
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, ErrorReport, Result};
    pub use crate::rate_limit::{RateLimitConfig, RateLimitStatus, SlidingWindowLimiter};
    pub use crate::retry::RetryConfig;
}
