//! Geospatial utilities for storefinder.
//!
//! This crate provides:
//! - Coordinate validation and 6-decimal normalization
//! - Haversine distance calculations
//! - PostGIS POINT parsing (JSON and WKT formats)
//! - Batch processing with optional parallelism
//! - WASM bindings for browser usage
//!
//! # Example
//!
//! ```
//! use storefinder_geo::{distance_km, validate_coordinate, Coordinate};
//!
//! let center = validate_coordinate(Coordinate::new(12.9716, 77.5946)).unwrap();
//! let hebbal = Coordinate::new(13.0358, 77.5970);
//!
//! let d = distance_km(&center, &hebbal);
//! assert!((d - 7.14).abs() < 0.05);
//! ```

pub mod batch;

mod error;
mod haversine;
mod postgis;
mod validate;

#[cfg(feature = "wasm")]
mod wasm;

pub use batch::{calculate_distances, DistanceResult};
pub use error::{GeoError, Result};
pub use haversine::{
    distance_km, haversine_distance, haversine_distance_meters, EARTH_RADIUS_KM, EARTH_RADIUS_M,
};
pub use postgis::{parse_postgis_point, PostGISPoint};
pub use validate::{round_to, validate_coordinate, COORDINATE_DECIMALS};

/// A geographic coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    #[serde(alias = "latitude")]
    pub lat: f64,
    /// Longitude in degrees (-180 to 180)
    #[serde(alias = "longitude", alias = "lon")]
    pub lng: f64,
}

impl Coordinate {
    /// Creates a new coordinate without validating it.
    ///
    /// # Arguments
    /// * `lat` - Latitude in degrees (-90 to 90)
    /// * `lng` - Longitude in degrees (-180 to 180)
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns true if the coordinate passes [`validate_coordinate`].
    #[inline]
    pub fn is_valid(&self) -> bool {
        validate_coordinate(*self).is_ok()
    }

    /// Returns true for the `(0, 0)` "no fix" sentinel.
    #[inline]
    pub fn is_null_island(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.lat.to_radians(), self.lng.to_radians())
    }
}

impl std::fmt::Display for Coordinate {
    /// Formats as `lat,lng`, the form used in map URLs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}
