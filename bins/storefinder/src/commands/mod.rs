//! CLI command implementations
//!
//! Each command returns the process exit code; hard failures bubble up as
//! `anyhow` errors and exit with `FAILURE`.

pub mod distance;
pub mod geocode;
pub mod navigate;
pub mod stores;
pub mod validate;

use owo_colors::OwoColorize;
use storefinder_cli::output::{print_json, Status};
use storefinder_cli::OutputFormat;
use storefinder_core::config::ConfigSchema;
use storefinder_core::error::exit_codes;
use storefinder_core::{ErrorCode, ErrorReport};
use storefinder_geo::Coordinate;

/// Settings shared by every command
pub struct Context {
    /// Loaded configuration
    pub config: ConfigSchema,
    /// Requested output format
    pub format: OutputFormat,
}

/// Parse `lat,lng` for clap.
pub fn parse_point(s: &str) -> Result<Coordinate, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG but got '{s}'"))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("latitude '{}' is not a number", lat.trim()))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("longitude '{}' is not a number", lng.trim()))?;
    Ok(Coordinate::new(lat, lng))
}

/// Report a domain error in the requested format and return its exit code.
pub fn report_failure(format: OutputFormat, code: ErrorCode, message: &str, exit_code: i32) -> anyhow::Result<i32> {
    if format.is_json() {
        print_json(&ErrorReport::new(code, message))?;
    } else {
        Status::error(&format!("{} {message}", format!("[{code}]").dimmed()));
    }
    Ok(exit_code)
}

/// Report an invalid coordinate.
pub fn report_invalid(format: OutputFormat, err: &storefinder_geo::GeoError) -> anyhow::Result<i32> {
    report_failure(format, err.code(), &err.to_string(), exit_codes::VALIDATION_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("12.97, 77.59"), Ok(Coordinate::new(12.97, 77.59)));
        assert_eq!(parse_point("-33.86,151.2"), Ok(Coordinate::new(-33.86, 151.2)));
        assert!(parse_point("12.97").is_err());
        assert!(parse_point("north,77.59").is_err());
    }
}
