//! HTTP maps client for storefinder
//!
//! Implements [`storefinder_geocode::GeocodeProvider`] and
//! [`storefinder_geocode::DirectionsProvider`] over a maps JSON API
//! (`geocode/json` and `directions/json`).
//!
//! # Features
//!
//! - **Environment-based configuration**: `STOREFINDER_MAPS_URL`,
//!   `STOREFINDER_MAPS_API_KEY`, `STOREFINDER_TIMEOUT_SECS`
//! - **Retry with exponential backoff**: Automatic retry for transient failures
//! - **Request correlation**: Every request carries an `X-Request-ID`
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use storefinder_api_client::MapsClient;
//! use storefinder_core::rate_limit::{RateLimitConfig, SlidingWindowLimiter};
//! use storefinder_geocode::{Gazetteer, Geocoder, GeocoderConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(MapsClient::from_env()?);
//!     let limiter = Arc::new(SlidingWindowLimiter::new(RateLimitConfig::default()));
//!     let geocoder = Geocoder::new(client, limiter, Gazetteer::builtin(), GeocoderConfig::default());
//!
//!     if let Some(point) = geocoder.resolve("MG Road, Bangalore").await {
//!         println!("{point}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod maps;

pub use client::MapsClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use maps::decode_polyline;
