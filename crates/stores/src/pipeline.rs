//! Annotate, filter and sort a store list for display
//!
//! The pipeline never fails: a store with unknown coordinates simply has no
//! distance, fails radius filters and sorts last by distance.

use storefinder_geo::batch::LocationItem;
use storefinder_geo::{calculate_distances, validate_coordinate, Coordinate};
use tracing::debug;

use crate::filter::{passes_hours, within_distance, FilterState};
use crate::record::StoreRecord;
use crate::sort::sort_stores;

/// Recompute `distance_km` for every store against `reference`.
///
/// With no usable reference every distance is cleared.
pub fn annotate_distances(stores: &mut [StoreRecord], reference: Option<Coordinate>) {
    let Some(reference) = usable_reference(reference) else {
        stores.iter_mut().for_each(|s| s.distance_km = None);
        return;
    };

    let items: Vec<LocationItem> = stores
        .iter()
        .map(|s| LocationItem {
            id: s.id.clone(),
            coordinate: s.coordinates,
        })
        .collect();

    for (store, result) in stores.iter_mut().zip(calculate_distances(&reference, &items)) {
        store.distance_km = result.distance_km;
    }
}

/// Annotate, apply the radius and hours filters, then sort.
///
/// The radius filter is skipped when there is no reference location, or
/// when the reference is `(0, 0)` or out of range.
pub fn apply_filters(
    stores: &[StoreRecord],
    filter: &FilterState,
    reference: Option<Coordinate>,
) -> Vec<StoreRecord> {
    let reference = usable_reference(reference);
    let mut out = stores.to_vec();
    annotate_distances(&mut out, reference);

    if let (Some(max_km), Some(_)) = (filter.max_distance_km, reference) {
        out.retain(|s| within_distance(s, max_km));
    }

    if !filter.hours_tags.is_empty() {
        out.retain(|s| passes_hours(s, &filter.hours_tags));
    }

    sort_stores(&mut out, filter.sort_key);
    debug!(input = stores.len(), output = out.len(), sort = ?filter.sort_key, "filtered stores");
    out
}

fn usable_reference(reference: Option<Coordinate>) -> Option<Coordinate> {
    reference.and_then(|c| validate_coordinate(c).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::HoursTag;
    use crate::sort::SortKey;

    const CENTER: Coordinate = Coordinate::new(12.9716, 77.5946);

    fn stores() -> Vec<StoreRecord> {
        vec![
            StoreRecord::new("store-1", "Whitefield Mart", "Whitefield")
                .with_coordinates(Coordinate::new(12.9698, 77.7500))
                .with_hours("Open 24 hours"),
            StoreRecord::new("store-2", "Hebbal Fresh", "Hebbal")
                .with_coordinates(Coordinate::new(13.0358, 77.5970))
                .with_hours("6am - 9pm")
                .with_rating(4.2),
            StoreRecord::new("store-3", "Unknown Place", "Somewhere"),
            StoreRecord::new("store-4", "Koramangala Co-op", "Koramangala")
                .with_coordinates(Coordinate::new(12.9352, 77.6245))
                .with_hours("9am - 11pm")
                .with_rating(4.7),
        ]
    }

    fn ids(stores: &[StoreRecord]) -> Vec<&str> {
        stores.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_annotate_distances() {
        let mut list = stores();
        annotate_distances(&mut list, Some(CENTER));

        assert!((list[1].distance_km.unwrap() - 7.14).abs() < 0.05);
        assert_eq!(list[2].distance_km, None);

        annotate_distances(&mut list, None);
        assert!(list.iter().all(|s| s.distance_km.is_none()));
    }

    #[test]
    fn test_default_filter_sorts_by_distance_missing_last() {
        let out = apply_filters(&stores(), &FilterState::default(), Some(CENTER));
        assert_eq!(ids(&out), vec!["store-4", "store-2", "store-1", "store-3"]);
    }

    #[test]
    fn test_radius_filter() {
        let filter = FilterState::default().with_max_distance(10.0);
        let out = apply_filters(&stores(), &filter, Some(CENTER));
        assert_eq!(ids(&out), vec!["store-4", "store-2"]);
    }

    #[test]
    fn test_radius_ignored_without_reference() {
        let filter = FilterState::default().with_max_distance(1.0);
        let out = apply_filters(&stores(), &filter, None);
        assert_eq!(out.len(), 4);
        // No distances, so distance sort keeps input order
        assert_eq!(ids(&out), vec!["store-1", "store-2", "store-3", "store-4"]);
    }

    #[test]
    fn test_radius_ignored_for_unusable_reference() {
        let filter = FilterState::default().with_max_distance(10.0);

        for reference in [Coordinate::new(0.0, 0.0), Coordinate::new(120.0, 77.0)] {
            let out = apply_filters(&stores(), &filter, Some(reference));
            assert_eq!(out.len(), 4, "reference {reference}");
            assert!(out.iter().all(|s| s.distance_km.is_none()));
        }
    }

    #[test]
    fn test_hours_and_rating() {
        let filter = FilterState::default()
            .with_tag(HoursTag::OpenLate)
            .with_sort(SortKey::Rating);
        let out = apply_filters(&stores(), &filter, Some(CENTER));
        assert_eq!(ids(&out), vec!["store-4"]);
    }

    #[test]
    fn test_input_is_untouched() {
        let input = stores();
        let _ = apply_filters(&input, &FilterState::default(), Some(CENTER));
        assert!(input.iter().all(|s| s.distance_km.is_none()));
    }
}
