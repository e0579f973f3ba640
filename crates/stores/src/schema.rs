//! Mapping raw backend rows to [`StoreRecord`]s
//!
//! Backends name their columns differently (`name`, `store_name`, `title`,
//! ...). A [`SchemaMapping`] lists candidate column names per field, tried in
//! order; the first non-empty value wins.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use storefinder_geo::{parse_postgis_point, validate_coordinate, Coordinate};
use tracing::debug;

use crate::error::MappingError;
use crate::record::StoreRecord;

/// Candidate column names per target field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaMapping {
    /// Backend id columns
    pub id: Vec<String>,
    /// Store name columns (required)
    pub name: Vec<String>,
    /// Address columns (required)
    pub location: Vec<String>,
    /// Opening hours columns
    pub hours: Vec<String>,
    /// Phone columns
    pub phone: Vec<String>,
    /// Rating columns
    pub rating: Vec<String>,
    /// PostGIS / GeoJSON point columns
    pub coordinates: Vec<String>,
    /// Latitude columns, paired with `longitude`
    pub latitude: Vec<String>,
    /// Longitude columns, paired with `latitude`
    pub longitude: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

impl Default for SchemaMapping {
    fn default() -> Self {
        Self {
            id: names(&["id", "store_id", "uuid"]),
            name: names(&["name", "store_name", "title", "shop_name"]),
            location: names(&["location", "address", "store_address", "full_address"]),
            hours: names(&["hours", "opening_hours", "store_hours", "timings"]),
            phone: names(&["phone", "phone_number", "contact", "mobile"]),
            rating: names(&["rating", "avg_rating", "stars"]),
            coordinates: names(&["coordinates", "geom", "geometry", "point", "location"]),
            latitude: names(&["latitude", "lat"]),
            longitude: names(&["longitude", "lng", "lon", "long"]),
        }
    }
}

impl SchemaMapping {
    /// Map one raw row, assigning `id`.
    ///
    /// # Errors
    ///
    /// [`MappingError::NotAnObject`] for non-object rows and
    /// [`MappingError::MissingField`] when `name` or `location` is absent.
    /// Bad coordinates are not an error: the record keeps `coordinates: None`.
    pub fn map_record(&self, raw: &Value, id: String) -> Result<StoreRecord, MappingError> {
        let row = raw.as_object().ok_or(MappingError::NotAnObject)?;

        let name = text(row, &self.name).ok_or(MappingError::MissingField("name"))?;
        let location = text(row, &self.location).ok_or(MappingError::MissingField("location"))?;

        Ok(StoreRecord {
            id,
            source_id: text(row, &self.id),
            name,
            location,
            coordinates: self.coordinates(row),
            hours: text(row, &self.hours),
            phone: text(row, &self.phone),
            rating: number(row, &self.rating),
            distance_km: None,
        })
    }

    /// Backend id of a raw row, if any.
    pub fn source_id(&self, raw: &Value) -> Option<String> {
        raw.as_object().and_then(|row| text(row, &self.id))
    }

    fn coordinates(&self, row: &Map<String, Value>) -> Option<Coordinate> {
        let point = self
            .coordinates
            .iter()
            .filter_map(|key| row.get(key))
            .find_map(parse_postgis_point);

        let pair = || Some(Coordinate::new(number(row, &self.latitude)?, number(row, &self.longitude)?));

        let coord = point.or_else(pair)?;
        match validate_coordinate(coord) {
            Ok(c) => Some(c),
            Err(e) => {
                debug!(error = %e, "dropping invalid store coordinates");
                None
            }
        }
    }
}

/// First candidate holding a non-empty string (or a number, stringified).
fn text(row: &Map<String, Value>, candidates: &[String]) -> Option<String> {
    candidates.iter().filter_map(|key| row.get(key)).find_map(|v| match v {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First candidate holding a number or a numeric string.
fn number(row: &Map<String, Value>, candidates: &[String]) -> Option<f64> {
    candidates.iter().filter_map(|key| row.get(key)).find_map(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(raw: Value) -> Result<StoreRecord, MappingError> {
        SchemaMapping::default().map_record(&raw, "store-1".into())
    }

    #[test]
    fn test_maps_canonical_columns() {
        let store = map(json!({
            "id": 42,
            "name": "Acme Grocers",
            "location": "80 Feet Rd, Koramangala",
            "hours": "8am - 10pm",
            "phone": "+91 80 1234 5678",
            "rating": 4.5,
            "coordinates": {"type": "Point", "coordinates": [77.6245, 12.9352]}
        }))
        .unwrap();

        assert_eq!(store.id, "store-1");
        assert_eq!(store.source_id.as_deref(), Some("42"));
        assert_eq!(store.name, "Acme Grocers");
        assert_eq!(store.coordinates, Some(Coordinate::new(12.9352, 77.6245)));
        assert_eq!(store.rating, Some(4.5));
        assert_eq!(store.distance_km, None);
    }

    #[test]
    fn test_maps_renamed_columns() {
        let store = map(json!({
            "store_id": "abc",
            "store_name": "Fresh Mart",
            "address": "12th Main, Indiranagar",
            "opening_hours": "Open 24 hours",
            "avg_rating": "3.9",
            "lat": "12.9784",
            "lng": 77.6408
        }))
        .unwrap();

        assert_eq!(store.source_id.as_deref(), Some("abc"));
        assert_eq!(store.name, "Fresh Mart");
        assert_eq!(store.location, "12th Main, Indiranagar");
        assert_eq!(store.hours.as_deref(), Some("Open 24 hours"));
        assert_eq!(store.rating, Some(3.9));
        assert_eq!(store.coordinates, Some(Coordinate::new(12.9784, 77.6408)));
    }

    #[test]
    fn test_wkt_location_column_is_not_an_address() {
        let store = map(json!({
            "title": "Corner Shop",
            "location": "SRID=4326;POINT(77.5946 12.9716)",
            "full_address": "MG Road"
        }))
        .unwrap();

        // "location" is a plain string, so it wins the address lookup too
        assert_eq!(store.location, "SRID=4326;POINT(77.5946 12.9716)");
        assert_eq!(store.coordinates, Some(Coordinate::new(12.9716, 77.5946)));
    }

    #[test]
    fn test_geojson_location_falls_through_to_address() {
        let store = map(json!({
            "name": "Corner Shop",
            "location": {"type": "Point", "coordinates": [77.5946, 12.9716]},
            "address": "MG Road"
        }))
        .unwrap();

        assert_eq!(store.location, "MG Road");
        assert_eq!(store.coordinates, Some(Coordinate::new(12.9716, 77.5946)));
    }

    #[test]
    fn test_empty_strings_are_missing() {
        assert_eq!(
            map(json!({"name": "  ", "location": "x"})),
            Err(MappingError::MissingField("name"))
        );
        assert_eq!(
            map(json!({"name": "A", "location": ""})),
            Err(MappingError::MissingField("location"))
        );
        let store = map(json!({"name": "A", "location": "B", "hours": ""})).unwrap();
        assert_eq!(store.hours, None);
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(map(json!(["a"])), Err(MappingError::NotAnObject));
        assert_eq!(map(json!("store")), Err(MappingError::NotAnObject));
    }

    #[test]
    fn test_invalid_coordinates_are_dropped() {
        let store = map(json!({"name": "A", "location": "B", "lat": 0, "lng": 0})).unwrap();
        assert_eq!(store.coordinates, None);

        let store = map(json!({"name": "A", "location": "B", "latitude": 95.0, "longitude": 10.0})).unwrap();
        assert_eq!(store.coordinates, None);

        let store = map(json!({"name": "A", "location": "B", "lat": 12.9})).unwrap();
        assert_eq!(store.coordinates, None);
    }

    #[test]
    fn test_custom_mapping() {
        let mapping = SchemaMapping {
            name: vec!["nombre".into()],
            location: vec!["direccion".into()],
            ..SchemaMapping::default()
        };
        let store = mapping
            .map_record(&json!({"nombre": "Tienda", "direccion": "Calle 1"}), "store-9".into())
            .unwrap();
        assert_eq!(store.name, "Tienda");
        assert_eq!(store.id, "store-9");
    }
}
