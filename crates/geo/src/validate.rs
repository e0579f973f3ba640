//! Coordinate hygiene.
//!
//! Coordinates are rounded to 6 decimal places (about 0.11 m) before they are
//! stored or compared, so values from different sources line up.

use crate::{Coordinate, GeoError, Result};

/// Decimal places kept for stored coordinates.
pub const COORDINATE_DECIMALS: i32 = 6;

/// Rounds `value` to `decimals` decimal places.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Validates a coordinate and normalizes it to 6 decimal places.
///
/// Fails when latitude or longitude is non-finite or out of range, and when
/// both components are exactly zero.
///
/// # Example
/// ```
/// use storefinder_geo::{validate_coordinate, Coordinate, GeoError};
///
/// let c = validate_coordinate(Coordinate::new(12.9716001234, 77.5946007)).unwrap();
/// assert_eq!(c, Coordinate::new(12.9716, 77.594601));
///
/// assert_eq!(validate_coordinate(Coordinate::new(0.0, 0.0)), Err(GeoError::NullIsland));
/// ```
pub fn validate_coordinate(c: Coordinate) -> Result<Coordinate> {
    if !c.lat.is_finite() || !(-90.0..=90.0).contains(&c.lat) {
        return Err(GeoError::InvalidLatitude(c.lat));
    }
    if !c.lng.is_finite() || !(-180.0..=180.0).contains(&c.lng) {
        return Err(GeoError::InvalidLongitude(c.lng));
    }
    if c.is_null_island() {
        return Err(GeoError::NullIsland);
    }

    Ok(Coordinate::new(
        round_to(c.lat, COORDINATE_DECIMALS),
        round_to(c.lng, COORDINATE_DECIMALS),
    ))
}
