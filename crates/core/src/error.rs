//! Error codes, the configuration error type and failure reports
//!
//! Every storefinder crate maps its own error enum onto an [`ErrorCode`] so
//! the CLI can print one stable code per failure and pick an exit status.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable error codes, grouped by thousands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum ErrorCode {
    // 1xxx
    Internal = 1001,

    // 2xxx
    IoError = 2000,
    FileNotFound = 2001,
    PermissionDenied = 2002,

    // 3xxx
    ConfigError = 3000,
    ConfigNotFound = 3001,
    ConfigParseError = 3002,
    ConfigValidationError = 3003,

    // 4xxx
    InvalidCoordinate = 4000,
    InvalidLatitude = 4001,
    InvalidLongitude = 4002,
    NullIsland = 4003,
    InvalidWkt = 4004,

    // 5xxx
    GeocodeUnavailable = 5000,
    RateLimited = 5001,
    ProviderResponse = 5002,

    // 6xxx
    InvalidDestination = 6000,
    InvalidOrigin = 6001,
    NavigationCooldown = 6002,
    NoNavigationStrategy = 6003,

    // 7xxx
    GeolocationDenied = 7000,
    GeolocationUnavailable = 7001,
    GeolocationTimeout = 7002,

    // 8xxx
    MappingError = 8000,
    MissingField = 8001,
    InvalidRecord = 8002,
}

impl ErrorCode {
    /// Numeric value
    #[must_use]
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Area of the system the code belongs to
    #[must_use]
    pub fn category(self) -> &'static str {
        match self.code() / 1000 {
            2 => "IO",
            3 => "Configuration",
            4 => "Coordinate",
            5 => "Geocoding",
            6 => "Navigation",
            7 => "Geolocation",
            8 => "Mapping",
            _ => "General",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Configuration and file errors raised by this crate
#[derive(Error, Debug)]
pub struct Error {
    /// Code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// What the user can do about it
    pub suggestion: Option<String>,
    /// Underlying cause
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  hint: {suggestion}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Error with a code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestion: None,
            source: None,
        }
    }

    /// Attach a hint for the user
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach the underlying cause
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Generic configuration failure
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// An explicit `--config` path that does not exist
    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("create .storefinder.toml or pass --config with an existing file")
    }

    /// A setting outside its allowed range
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigValidationError, message)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Self::new(code, err.to_string()).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::new(ErrorCode::ConfigParseError, format!("TOML parse error: {err}")).with_source(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Machine-readable failure, printed by the CLI under `--format json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Always `false`, mirroring the `ok: true` of successful output
    pub ok: bool,
    /// Stable code
    pub code: ErrorCode,
    /// Code as printed, e.g. `E4001`
    pub code_str: String,
    /// [`ErrorCode::category`]
    pub category: String,
    /// Human-readable message
    pub message: String,
}

impl ErrorReport {
    /// Report for any error that maps onto a code
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            code,
            code_str: code.to_string(),
            category: code.category().to_string(),
            message: message.into(),
        }
    }
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        Self::new(err.code, err.message.clone())
    }
}

/// Process exit statuses
#[allow(missing_docs)]
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const VALIDATION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    /// `EX_TEMPFAIL`: navigation cooldown still running
    pub const TRY_AGAIN: i32 = 75;
}
