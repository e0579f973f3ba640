//! Batch distance calculations with optional parallelism.
//!
//! Computes the distance from one reference point to many items. Items whose
//! coordinate is missing or invalid get `None` instead of failing the batch.

use crate::{distance_km, Coordinate};
use serde::{Deserialize, Serialize};

/// Result of a distance calculation for a single item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    /// The item ID
    pub id: String,
    /// Distance in kilometers, `None` if the location is missing or invalid
    pub distance_km: Option<f64>,
}

/// Input item for batch distance calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationItem {
    /// Item ID
    pub id: String,
    /// Item position, if known
    pub coordinate: Option<Coordinate>,
}

/// Calculate distances from a reference location to multiple items.
///
/// Output order matches input order.
///
/// # Example
/// ```
/// use storefinder_geo::{calculate_distances, batch::LocationItem, Coordinate};
///
/// let items = vec![
///     LocationItem { id: "a".into(), coordinate: Some(Coordinate::new(12.9352, 77.6245)) },
///     LocationItem { id: "b".into(), coordinate: None },
/// ];
///
/// let results = calculate_distances(&Coordinate::new(12.9716, 77.5946), &items);
/// assert_eq!(results.len(), 2);
/// assert!(results[0].distance_km.is_some());
/// assert!(results[1].distance_km.is_none());
/// ```
pub fn calculate_distances(reference: &Coordinate, items: &[LocationItem]) -> Vec<DistanceResult> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        items
            .par_iter()
            .map(|item| calculate_single_distance(reference, item))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        items
            .iter()
            .map(|item| calculate_single_distance(reference, item))
            .collect()
    }
}

/// Calculate distance for a single item.
#[inline]
fn calculate_single_distance(reference: &Coordinate, item: &LocationItem) -> DistanceResult {
    let distance_km = item
        .coordinate
        .map(|coord| distance_km(reference, &coord))
        .filter(|d| d.is_finite());

    DistanceResult {
        id: item.id.clone(),
        distance_km,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_items() -> Vec<LocationItem> {
        vec![
            LocationItem {
                id: "koramangala".into(),
                coordinate: Some(Coordinate::new(12.9352, 77.6245)),
            },
            LocationItem {
                id: "whitefield".into(),
                coordinate: Some(Coordinate::new(12.9698, 77.7500)),
            },
            LocationItem {
                id: "null-island".into(),
                coordinate: Some(Coordinate::new(0.0, 0.0)),
            },
            LocationItem {
                id: "unknown".into(),
                coordinate: None,
            },
        ]
    }

    #[test]
    fn test_batch_distances() {
        let items = create_test_items();
        let results = calculate_distances(&Coordinate::new(12.9716, 77.5946), &items);

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].id, "koramangala");

        let koramangala = results[0].distance_km.unwrap();
        assert!(koramangala > 4.0 && koramangala < 6.0, "{koramangala}");

        let whitefield = results[1].distance_km.unwrap();
        assert!(whitefield > koramangala);
    }

    #[test]
    fn test_invalid_locations_are_none() {
        let items = create_test_items();
        let results = calculate_distances(&Coordinate::new(12.9716, 77.5946), &items);

        assert!(results[2].distance_km.is_none());
        assert!(results[3].distance_km.is_none());
    }

    #[test]
    fn test_invalid_reference_yields_all_none() {
        let items = create_test_items();
        let results = calculate_distances(&Coordinate::new(0.0, 0.0), &items);
        assert!(results.iter().all(|r| r.distance_km.is_none()));
    }
}
