//! Point columns as PostGIS hands them out
//!
//! A store row may carry its position as GeoJSON
//! (`{"type": "Point", "coordinates": [lng, lat]}`), as WKT
//! (`POINT(lng lat)`, optionally `SRID=4326;`-prefixed) or, in hand-edited
//! data, as a plain `{"lat": .., "lng": ..}` object.

use crate::{Coordinate, GeoError, Result};
use serde::{Deserialize, Serialize};

/// Any of the accepted point encodings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostGISPoint {
    /// GeoJSON geometry; axis order is `[lng, lat]`
    GeoJson {
        /// Geometry type, `Point` when present
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
        /// `[lng, lat]`, extra ordinates (altitude) ignored
        coordinates: Vec<f64>,
    },
    /// `{lat, lng}` object
    LatLng(Coordinate),
    /// WKT text
    Wkt(String),
}

impl PostGISPoint {
    /// Converts the point to a coordinate without validating its range.
    ///
    /// # Errors
    ///
    /// [`GeoError::InvalidWkt`] for malformed WKT, non-point geometries and
    /// GeoJSON with fewer than two ordinates.
    pub fn to_coordinate(&self) -> Result<Coordinate> {
        match self {
            Self::GeoJson { kind, coordinates } => {
                if let Some(other) = kind.as_deref().filter(|k| !k.eq_ignore_ascii_case("point")) {
                    return Err(GeoError::InvalidWkt(format!("Expected Point geometry, got {other}")));
                }
                match coordinates.as_slice() {
                    [lng, lat, ..] => Ok(Coordinate::new(*lat, *lng)),
                    _ => Err(GeoError::InvalidWkt("GeoJSON point needs [lng, lat]".into())),
                }
            }
            Self::LatLng(coord) => Ok(*coord),
            Self::Wkt(wkt) => parse_wkt_point(wkt),
        }
    }
}

/// Parse a point column, returning `None` for null or unparseable values.
///
/// ```
/// use storefinder_geo::parse_postgis_point;
/// use serde_json::json;
///
/// let geojson = json!({"type": "Point", "coordinates": [77.6245, 12.9352]});
/// assert_eq!(parse_postgis_point(&geojson).unwrap().lat, 12.9352);
///
/// let wkt = json!("SRID=4326;POINT(77.6245 12.9352)");
/// assert_eq!(parse_postgis_point(&wkt).unwrap().lng, 77.6245);
/// ```
pub fn parse_postgis_point(value: &serde_json::Value) -> Option<Coordinate> {
    if value.is_null() {
        return None;
    }
    PostGISPoint::deserialize(value).ok()?.to_coordinate().ok()
}

/// `POINT(lng lat)` with an optional `SRID=n;` prefix; case-insensitive.
fn parse_wkt_point(wkt: &str) -> Result<Coordinate> {
    let mut body = wkt.trim();
    if let Some((prefix, rest)) = body.split_once(';') {
        if prefix.trim().to_ascii_uppercase().starts_with("SRID=") {
            body = rest.trim();
        }
    }

    let (tag, rest) = body.split_at(body.find('(').unwrap_or(body.len()));
    if !tag.trim().eq_ignore_ascii_case("point") {
        return Err(GeoError::InvalidWkt(format!("Expected POINT, got: {body}")));
    }

    let inner = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| GeoError::InvalidWkt(format!("Unbalanced parentheses: {body}")))?;

    let mut ordinates = inner.split_whitespace().map(str::parse::<f64>);
    match (ordinates.next(), ordinates.next(), ordinates.next()) {
        (Some(Ok(lng)), Some(Ok(lat)), None) => Ok(Coordinate::new(lat, lng)),
        _ => Err(GeoError::InvalidWkt(format!("Expected two numbers in: {inner}"))),
    }
}
