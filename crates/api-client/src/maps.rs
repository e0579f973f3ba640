//! Geocoding and directions over the maps JSON API
//!
//! Both endpoints answer HTTP 200 with a `status` field; anything other than
//! `OK` or `ZERO_RESULTS` is mapped to an [`ApiError`].

use serde::Deserialize;
use storefinder_geo::Coordinate;
use storefinder_geocode::{DirectionsProvider, GeocodeError, GeocodeProvider, Route};
use tracing::{debug, warn};

use crate::client::MapsClient;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Copy, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<LatLng> for Coordinate {
    fn from(p: LatLng) -> Self {
        Coordinate::new(p.lat, p.lng)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<ApiRoute>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    #[serde(default)]
    overview_polyline: Option<Polyline>,
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Polyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct Leg {
    distance: TextValue,
    duration: TextValue,
    start_location: Option<LatLng>,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
}

#[derive(Debug, Deserialize)]
struct Step {
    end_location: LatLng,
}

/// `Ok(true)` for results, `Ok(false)` for an empty answer.
fn check_status(status: &str, message: Option<String>) -> ApiResult<bool> {
    match status {
        "OK" => Ok(true),
        "ZERO_RESULTS" => Ok(false),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => Err(ApiError::RateLimited),
        other => Err(ApiError::provider_status(other, message.unwrap_or_default())),
    }
}

fn next_value(bytes: &mut std::str::Bytes<'_>) -> Option<Option<i64>> {
    let mut result = 0i64;
    let mut shift = 0;
    let mut started = false;
    loop {
        let Some(b) = bytes.next() else {
            // Clean end only between values
            return if started { None } else { Some(None) };
        };
        started = true;
        let chunk = i64::from(b.checked_sub(63)?);
        if chunk > 0x3f || shift > 60 {
            return None;
        }
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }
    Some(Some(if result & 1 == 1 { !(result >> 1) } else { result >> 1 }))
}

/// Decode an encoded polyline (5 decimal places).
///
/// Returns `None` for truncated or malformed input.
pub fn decode_polyline(encoded: &str) -> Option<Vec<Coordinate>> {
    let mut bytes = encoded.bytes();
    let mut points = Vec::new();
    let (mut lat, mut lng) = (0i64, 0i64);

    loop {
        let Some(dlat) = next_value(&mut bytes)? else {
            break;
        };
        let dlng = next_value(&mut bytes)??;
        lat += dlat;
        lng += dlng;
        #[allow(clippy::cast_precision_loss)]
        points.push(Coordinate::new(lat as f64 / 1e5, lng as f64 / 1e5));
    }
    Some(points)
}

impl MapsClient {
    /// Geocode `address`. `Ok(None)` when the provider found nothing.
    pub async fn geocode_address(&self, address: &str) -> ApiResult<Option<Coordinate>> {
        let response: GeocodeResponse = self
            .get("geocode/json", &[("address", address.to_string())])
            .await?;

        if !check_status(&response.status, response.error_message)? {
            debug!(address = %address, "provider found no match");
            return Ok(None);
        }
        Ok(response
            .results
            .into_iter()
            .next()
            .map(|r| r.geometry.location.into()))
    }

    /// Driving route from `origin` to `destination`. `Ok(None)` when no route
    /// exists.
    pub async fn driving_route(&self, origin: Coordinate, destination: Coordinate) -> ApiResult<Option<Route>> {
        let response: DirectionsResponse = self
            .get(
                "directions/json",
                &[
                    ("origin", origin.to_string()),
                    ("destination", destination.to_string()),
                    ("mode", "driving".to_string()),
                ],
            )
            .await?;

        if !check_status(&response.status, response.error_message)? {
            return Ok(None);
        }
        let Some(route) = response.routes.into_iter().next() else {
            return Ok(None);
        };
        let Some(leg) = route.legs.first() else {
            return Err(ApiError::provider_status("OK", "route without legs"));
        };

        let mut path = route
            .overview_polyline
            .as_ref()
            .and_then(|p| decode_polyline(&p.points))
            .unwrap_or_default();
        if path.len() < 2 {
            if route.overview_polyline.is_some() {
                warn!("unusable overview polyline, using step endpoints");
            }
            path = leg.start_location.map(Coordinate::from).into_iter().collect();
            path.extend(route.legs.iter().flat_map(|l| l.steps.iter().map(|s| Coordinate::from(s.end_location))));
        }
        if path.len() < 2 {
            path = vec![origin, destination];
        }

        Ok(Some(Route {
            route_coordinates: path,
            distance_text: leg.distance.text.clone(),
            duration_text: leg.duration.text.clone(),
            estimated: false,
        }))
    }
}

impl GeocodeProvider for MapsClient {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        self.geocode_address(address).await.map_err(GeocodeError::from)
    }
}

impl DirectionsProvider for MapsClient {
    async fn directions(&self, origin: Coordinate, destination: Coordinate) -> Result<Option<Route>, GeocodeError> {
        self.driving_route(origin, destination)
            .await
            .map_err(GeocodeError::from)
    }
}
