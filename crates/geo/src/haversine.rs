//! Haversine distance calculation.
//!
//! The Haversine formula calculates the great-circle distance between two points
//! on a sphere given their longitudes and latitudes.

use crate::validate::round_to;
use crate::{validate_coordinate, Coordinate};

/// Earth's mean radius in kilometers (IUGG mean radius).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_M: f64 = EARTH_RADIUS_KM * 1000.0;

/// Distance between two coordinates in kilometers, rounded to meters.
///
/// Both inputs are validated first. If either is invalid the result is
/// `f64::INFINITY`, so batch computations can skip the entry instead of
/// aborting; callers treat an infinite distance as "unknown".
///
/// # Example
/// ```
/// use storefinder_geo::{distance_km, Coordinate};
///
/// let a = Coordinate::new(12.9716, 77.5946);
/// assert_eq!(distance_km(&a, &a), 0.0);
/// assert!(distance_km(&a, &Coordinate::new(0.0, 0.0)).is_infinite());
/// ```
pub fn distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    match (validate_coordinate(*a), validate_coordinate(*b)) {
        (Ok(a), Ok(b)) => round_to(haversine_distance(&a, &b), 3),
        _ => f64::INFINITY,
    }
}

/// Calculates the great-circle distance between two coordinates in kilometers.
///
/// No validation or rounding is applied.
///
/// # Arguments
/// * `from` - Starting coordinate
/// * `to` - Ending coordinate
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_KM)
}

/// Calculates the great-circle distance between two coordinates in meters.
#[inline]
pub fn haversine_distance_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_M)
}

/// Internal function that calculates distance with a custom radius.
#[inline]
fn haversine_distance_with_radius(from: &Coordinate, to: &Coordinate, radius: f64) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    // Rounding can push `a` just past 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().asin();

    radius * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    const CENTER: Coordinate = Coordinate { lat: 12.9716, lng: 77.5946 };
    const HEBBAL: Coordinate = Coordinate { lat: 13.0358, lng: 77.5970 };
    const BERLIN: Coordinate = Coordinate { lat: 52.5200, lng: 13.4050 };
    const PARIS: Coordinate = Coordinate { lat: 48.8566, lng: 2.3522 };

    #[test]
    fn test_bangalore_points() {
        let d = distance_km(&CENTER, &HEBBAL);
        assert!((d - 7.14).abs() < 0.05, "center-hebbal: {d}");
    }

    #[test]
    fn test_berlin_to_paris() {
        let d = distance_km(&BERLIN, &PARIS);
        // Expected: ~878 km
        assert!((d - 878.0).abs() < 5.0, "Berlin-Paris: {d}");
    }

    #[test]
    fn test_same_point_zero_distance() {
        assert_eq!(distance_km(&BERLIN, &BERLIN), 0.0);
    }

    #[test]
    fn test_rounded_to_meters() {
        let d = distance_km(&CENTER, &HEBBAL);
        assert_eq!(d, round_to(d, 3));
    }

    #[test]
    fn test_antipodal_points() {
        let a = Coordinate::new(45.0, 30.0);
        let b = Coordinate::new(-45.0, -150.0);
        let d = distance_km(&a, &b);
        assert!(d.is_finite());
        assert!((d - PI * EARTH_RADIUS_KM).abs() < 0.01, "antipodal: {d}");
    }

    #[test]
    fn test_poles_and_antimeridian() {
        let north = Coordinate::new(90.0, 0.5);
        let south = Coordinate::new(-90.0, 0.5);
        assert!((distance_km(&north, &south) - PI * EARTH_RADIUS_KM).abs() < 0.01);

        let east = Coordinate::new(10.0, 179.9999);
        let west = Coordinate::new(10.0, -179.9999);
        assert!(distance_km(&east, &west) < 0.1);
    }

    #[test]
    fn test_invalid_input_is_infinite() {
        assert!(distance_km(&CENTER, &Coordinate::new(0.0, 0.0)).is_infinite());
        assert!(distance_km(&Coordinate::new(91.0, 0.0), &CENTER).is_infinite());
        assert!(distance_km(&Coordinate::new(f64::NAN, 1.0), &CENTER).is_infinite());
    }

    #[test]
    fn test_meters_conversion() {
        let km = haversine_distance(&BERLIN, &PARIS);
        let meters = haversine_distance_meters(&BERLIN, &PARIS);
        assert!((meters - km * 1000.0).abs() < 1.0);
    }

    fn valid_coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0)
            .prop_filter("null island", |(lat, lng)| !(*lat == 0.0 && *lng == 0.0))
            .prop_map(|(lat, lng)| Coordinate::new(lat, lng))
    }

    proptest! {
        #[test]
        fn prop_identity_is_zero(a in valid_coordinate()) {
            prop_assert_eq!(distance_km(&a, &a), 0.0);
        }

        #[test]
        fn prop_symmetric(a in valid_coordinate(), b in valid_coordinate()) {
            prop_assert_eq!(distance_km(&a, &b), distance_km(&b, &a));
        }

        #[test]
        fn prop_bounded_by_half_circumference(a in valid_coordinate(), b in valid_coordinate()) {
            let d = distance_km(&a, &b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= (PI * EARTH_RADIUS_KM * 1000.0).round() / 1000.0 + 0.001);
        }
    }
}
