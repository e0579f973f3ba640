//! Map navigation deep links for storefinder
//!
//! Builds "get directions" links for the client's platform:
//!
//! - **iOS**: Google Maps app, then Apple Maps, then the web
//! - **Android**: a Google Maps intent with a browser fallback, then the web
//! - **Desktop**: Google Maps in the browser
//!
//! Text is sanitized and percent-encoded, coordinates are validated before
//! any URL is built, and a per-session cooldown stops repeated taps.
//!
//! # Example
//!
//! ```
//! use storefinder_geo::Coordinate;
//! use storefinder_navigation::{ClientEnvironment, NavigationRequest, Navigator};
//!
//! let navigator = Navigator::default();
//! let request = NavigationRequest::new(Coordinate::new(12.9716, 77.5946), Coordinate::new(12.9352, 77.6245))
//!     .with_name("Acme");
//!
//! let plan = navigator.plan(&request, &ClientEnvironment::default()).unwrap();
//! assert!(plan.primary().unwrap().url.starts_with("https://www.google.com/maps/dir/"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cooldown;
pub mod error;
pub mod host;
pub mod links;
pub mod navigator;
pub mod platform;
pub mod sanitize;
pub mod strategy;

pub use error::{NavigationError, Result};
pub use host::{HostMessage, HostRelay};
pub use links::NavigationRequest;
pub use navigator::{
    LaunchAttempt, LaunchOutcome, LinkLauncher, NavigationOutcome, NavigationPlan, Navigator, WithGrace,
};
pub use platform::{ClientEnvironment, Os, PlatformInfo};
pub use strategy::{LinkKind, NavigationLink, NavigationStrategy};
