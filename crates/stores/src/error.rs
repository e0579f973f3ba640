//! Error types for store records, catalogs and device location

use std::path::PathBuf;

use storefinder_core::ErrorCode;
use thiserror::Error;

/// A raw row that cannot become a [`crate::StoreRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// Row is not a JSON object
    #[error("Store row is not an object")]
    NotAnObject,

    /// None of the candidate columns held a non-empty value
    #[error("Store row has no usable '{0}' field")]
    MissingField(&'static str),
}

impl MappingError {
    /// Returns the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotAnObject => ErrorCode::InvalidRecord,
            Self::MissingField(_) => ErrorCode::MissingField,
        }
    }
}

/// Loading store rows failed
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Store file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Store file is not valid JSON
    #[error("Invalid store JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Top-level JSON value is not an array of rows
    #[error("Store data must be a JSON array")]
    NotAnArray,

    /// Remote source failure
    #[error("Store source failed: {0}")]
    Source(String),
}

impl CatalogError {
    /// Returns the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorCode::FileNotFound
            }
            Self::Io { .. } => ErrorCode::IoError,
            Self::Json(_) | Self::NotAnArray => ErrorCode::InvalidRecord,
            Self::Source(_) => ErrorCode::MappingError,
        }
    }
}

/// Device location failures, shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    /// User or OS refused location access
    #[error("Location permission denied")]
    PermissionDenied,

    /// No usable fix (no signal, stale or invalid)
    #[error("Location unavailable")]
    PositionUnavailable,

    /// No fix within the timeout
    #[error("Location request timed out")]
    Timeout,
}

impl GeolocationError {
    /// Returns the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::PermissionDenied => ErrorCode::GeolocationDenied,
            Self::PositionUnavailable => ErrorCode::GeolocationUnavailable,
            Self::Timeout => ErrorCode::GeolocationTimeout,
        }
    }

    /// Status text for the user.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Location access was denied. Enable location permissions or search for an area instead."
            }
            Self::PositionUnavailable => {
                "We couldn't determine your location. Check your connection and try again."
            }
            Self::Timeout => "Finding your location took too long. Please try again.",
        }
    }

    /// True if retrying without user action can help.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::PermissionDenied)
    }
}
