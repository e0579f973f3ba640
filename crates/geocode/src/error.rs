//! Error types for geocoding providers

use storefinder_core::ErrorCode;
use storefinder_geo::GeoError;
use thiserror::Error;

/// Result type alias for geocoding operations
pub type Result<T> = std::result::Result<T, GeocodeError>;

/// Geocoding and directions failures
///
/// None of these reach the caller of [`crate::Geocoder::resolve`]; they are
/// logged and replaced by the gazetteer fallback.
#[derive(Debug, Clone, Error)]
pub enum GeocodeError {
    /// Network or provider failure
    #[error("Geocoding provider unavailable: {0}")]
    Unavailable(String),

    /// Local limiter or provider quota refused the call
    #[error("Rate limited - too many geocoding requests")]
    RateLimited,

    /// Provider answered with something unusable
    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),

    /// Input coordinate failed validation
    #[error(transparent)]
    Coordinate(#[from] GeoError),
}

impl GeocodeError {
    /// Returns the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Unavailable(_) => ErrorCode::GeocodeUnavailable,
            Self::RateLimited => ErrorCode::RateLimited,
            Self::InvalidResponse(_) => ErrorCode::ProviderResponse,
            Self::Coordinate(e) => e.code(),
        }
    }
}
