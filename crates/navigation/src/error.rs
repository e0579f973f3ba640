//! Navigation errors

use std::time::Duration;

use storefinder_core::ErrorCode;
use storefinder_geo::GeoError;
use thiserror::Error;

/// Result type alias for navigation operations
pub type Result<T> = std::result::Result<T, NavigationError>;

/// Reasons a navigation request produces no link
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavigationError {
    /// Origin failed coordinate validation
    #[error("Invalid origin: {0}")]
    InvalidOrigin(#[source] GeoError),

    /// Destination failed coordinate validation
    #[error("Invalid destination: {0}")]
    InvalidDestination(#[source] GeoError),

    /// A previous request is still inside the cooldown
    #[error("Please try again in {:.1}s", retry_after.as_secs_f64())]
    TryAgainShortly {
        /// Time left until the cooldown expires
        retry_after: Duration,
    },

    /// No strategy produced a link
    #[error("No navigation strategy available")]
    NoStrategy,

    /// Host side of the relay channel is gone
    #[error("Navigation host is not listening")]
    HostUnavailable,
}

impl NavigationError {
    /// Returns the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidOrigin(_) => ErrorCode::InvalidOrigin,
            Self::InvalidDestination(_) => ErrorCode::InvalidDestination,
            Self::TryAgainShortly { .. } => ErrorCode::NavigationCooldown,
            Self::NoStrategy => ErrorCode::NoNavigationStrategy,
            Self::HostUnavailable => ErrorCode::Internal,
        }
    }

    /// True for errors that go away by waiting.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TryAgainShortly { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_distinguish_reasons() {
        let lat = NavigationError::InvalidDestination(GeoError::InvalidLatitude(91.0));
        let null = NavigationError::InvalidDestination(GeoError::NullIsland);
        assert_ne!(lat.to_string(), null.to_string());
        assert!(lat.to_string().starts_with("Invalid destination"));
    }

    #[test]
    fn test_cooldown_message_and_code() {
        let err = NavigationError::TryAgainShortly {
            retry_after: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "Please try again in 1.5s");
        assert_eq!(err.code(), ErrorCode::NavigationCooldown);
        assert!(err.is_retryable());
        assert!(!NavigationError::NoStrategy.is_retryable());
    }
}
