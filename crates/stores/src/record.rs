//! The store record shown in lists and on the map

use serde::{Deserialize, Serialize};
use storefinder_geo::Coordinate;

/// A store after ingestion.
///
/// `distance_km` is derived from the current reference location and is
/// recomputed by [`crate::pipeline::annotate_distances`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    /// Ingestion id, `store-<n>`
    pub id: String,
    /// Backend id, used to match change events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Display name
    pub name: String,
    /// Free-text address
    pub location: String,
    /// Resolved position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinate>,
    /// Opening hours text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    /// Contact number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Average rating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Distance from the reference location
    #[serde(default)]
    pub distance_km: Option<f64>,
}

impl StoreRecord {
    /// Minimal record.
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_id: None,
            name: name.into(),
            location: location.into(),
            coordinates: None,
            hours: None,
            phone: None,
            rating: None,
            distance_km: None,
        }
    }

    /// Set coordinates.
    pub fn with_coordinates(mut self, coordinate: Coordinate) -> Self {
        self.coordinates = Some(coordinate);
        self
    }

    /// Set hours text.
    pub fn with_hours(mut self, hours: impl Into<String>) -> Self {
        self.hours = Some(hours.into());
        self
    }

    /// Set rating.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Set distance.
    pub fn with_distance(mut self, km: f64) -> Self {
        self.distance_km = Some(km);
        self
    }
}

/// Ingestion id for the `n`th record (1-based).
pub fn store_id(n: usize) -> String {
    format!("store-{n}")
}
