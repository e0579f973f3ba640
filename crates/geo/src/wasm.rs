//! WASM bindings for the geo crate.
//!
//! Lets the store-locator front end call the same distance and validation
//! code from JavaScript/TypeScript.

use crate::{batch::LocationItem, calculate_distances, distance_km, validate_coordinate, Coordinate};
use wasm_bindgen::prelude::*;

/// Distance between two coordinates in kilometers, rounded to meters.
///
/// Returns `Infinity` if either coordinate is invalid.
#[wasm_bindgen]
pub fn distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    distance_km(&Coordinate::new(lat1, lng1), &Coordinate::new(lat2, lng2))
}

/// Validate a coordinate.
///
/// # Returns
/// JSON string `{"lat": .., "lng": ..}` rounded to 6 decimals, or an error
/// naming the invalid component.
#[wasm_bindgen]
pub fn validate(lat: f64, lng: f64) -> Result<String, JsValue> {
    let coord = validate_coordinate(Coordinate::new(lat, lng))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(&coord)
        .map_err(|e| JsValue::from_str(&format!("JSON serialize error: {e}")))
}

/// Calculate distances from the reference location to multiple stores.
///
/// # Arguments
/// * `ref_lat` - Reference latitude
/// * `ref_lng` - Reference longitude
/// * `items_json` - JSON array of `{id, coordinate}` objects
///
/// # Returns
/// JSON array of `{id, distance_km}` in input order
#[wasm_bindgen]
pub fn calculate_store_distances(ref_lat: f64, ref_lng: f64, items_json: &str) -> Result<String, JsValue> {
    let items: Vec<LocationItem> = serde_json::from_str(items_json)
        .map_err(|e| JsValue::from_str(&format!("JSON parse error: {e}")))?;

    let results = calculate_distances(&Coordinate::new(ref_lat, ref_lng), &items);

    serde_json::to_string(&results)
        .map_err(|e| JsValue::from_str(&format!("JSON serialize error: {e}")))
}
