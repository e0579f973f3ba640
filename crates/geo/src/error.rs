//! Error types for the geo crate.

use storefinder_core::ErrorCode;
use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Latitude is not finite or outside [-90, 90]
    #[error("Invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude is not finite or outside [-180, 180]
    #[error("Invalid longitude: {0}")]
    InvalidLongitude(f64),

    /// Both components are exactly zero, the "no fix" sentinel
    #[error("Coordinate (0, 0) is treated as missing")]
    NullIsland,

    /// Invalid WKT format
    #[error("Invalid WKT format: {0}")]
    InvalidWkt(String),
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            GeoError::InvalidLatitude(_) => ErrorCode::InvalidLatitude,
            GeoError::InvalidLongitude(_) => ErrorCode::InvalidLongitude,
            GeoError::NullIsland => ErrorCode::NullIsland,
            GeoError::InvalidWkt(_) => ErrorCode::InvalidWkt,
        }
    }
}
