//! Address geocoding and directions for storefinder
//!
//! Resolves free-text store addresses to coordinates cheaply and without ever
//! blocking on a third-party outage:
//!
//! - **Normalization**: addresses are folded to an ASCII cache key
//! - **Caching**: provider results live 24h, fallbacks 1h, bounded in size
//! - **Rate limiting**: a sliding window plus daily quota guards the provider
//! - **Request queue**: one drain loop serializes provider calls
//! - **Gazetteer**: a static place table answers when the provider cannot
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use storefinder_core::rate_limit::{RateLimitConfig, SlidingWindowLimiter};
//! use storefinder_geocode::{Gazetteer, Geocoder, GeocoderConfig, OfflineProvider};
//!
//! # async fn run() {
//! let limiter = Arc::new(SlidingWindowLimiter::new(RateLimitConfig::default()));
//! let geocoder = Geocoder::new(
//!     Arc::new(OfflineProvider),
//!     limiter,
//!     Gazetteer::builtin(),
//!     GeocoderConfig::default(),
//! );
//!
//! let coord = geocoder.resolve("Koramangala, Bengaluru").await;
//! println!("{coord:?}");
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod directions;
pub mod error;
pub mod gazetteer;
pub mod geocoder;
pub mod normalize;
pub mod provider;
pub mod queue;

pub use directions::{DirectionsService, Route};
pub use error::{GeocodeError, Result};
pub use gazetteer::{Gazetteer, GazetteerMatch, MatchKind};
pub use geocoder::{Geocoder, GeocoderConfig, ResolvedAddress, StatsSnapshot};
pub use normalize::normalize_address;
pub use provider::{DirectionsProvider, GeocodeProvider, OfflineProvider};
pub use queue::{QueueOutcome, RequestQueue};
