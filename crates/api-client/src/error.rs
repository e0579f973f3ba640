//! Error types for the maps client

use storefinder_core::ErrorCode;
use storefinder_geocode::GeocodeError;
use thiserror::Error;

/// Result type alias for maps API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Maps client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No API key configured
    #[error("No maps API key configured (set STOREFINDER_MAPS_API_KEY)")]
    MissingApiKey,

    /// Non-success HTTP status
    #[error("API error ({status}): {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// HTTP 200 with an error status in the body
    #[error("Provider returned {status}: {message}")]
    ProviderStatus {
        /// Provider status string, e.g. `REQUEST_DENIED`
        status: String,
        /// Provider error message, if any
        message: String,
    },

    /// Provider quota exceeded
    #[error("Rate limited - provider quota exceeded")]
    RateLimited,

    /// All retry attempts exhausted
    #[error("All {attempts} retry attempts failed: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last error message
        last_error: String,
    },
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API response error
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// Create a provider status error
    pub fn provider_status(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderStatus {
            status: status.into(),
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            Self::ApiResponse { status, .. } => *status >= 500,
            Self::ProviderStatus { status, .. } => status == "UNKNOWN_ERROR",
            Self::Json(_)
            | Self::Config(_)
            | Self::MissingApiKey
            | Self::RateLimited
            | Self::RetriesExhausted { .. } => false,
        }
    }

    /// Returns the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RateLimited | Self::ApiResponse { status: 429, .. } => ErrorCode::RateLimited,
            Self::Json(_) | Self::ProviderStatus { .. } => ErrorCode::ProviderResponse,
            Self::Config(_) | Self::MissingApiKey => ErrorCode::ConfigError,
            Self::Request(_) | Self::ApiResponse { .. } | Self::RetriesExhausted { .. } => {
                ErrorCode::GeocodeUnavailable
            }
        }
    }
}

impl From<ApiError> for GeocodeError {
    fn from(err: ApiError) -> Self {
        match err.code() {
            ErrorCode::RateLimited => GeocodeError::RateLimited,
            ErrorCode::ProviderResponse => GeocodeError::InvalidResponse(err.to_string()),
            _ => GeocodeError::Unavailable(err.to_string()),
        }
    }
}
