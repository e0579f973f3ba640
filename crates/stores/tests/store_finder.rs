//! Rows in, filtered list out, with geocoding served by the gazetteer.

use std::sync::Arc;

use serde_json::json;
use storefinder_core::rate_limit::{RateLimitConfig, SlidingWindowLimiter};
use storefinder_geo::Coordinate;
use storefinder_geocode::{Gazetteer, Geocoder, GeocoderConfig, OfflineProvider};
use storefinder_stores::{apply_filters, FilterState, SortKey, StoreCatalog};

fn offline_geocoder() -> Geocoder {
    let limiter = Arc::new(SlidingWindowLimiter::new(RateLimitConfig::default()));
    Geocoder::new(
        Arc::new(OfflineProvider),
        limiter,
        Gazetteer::builtin(),
        GeocoderConfig::default(),
    )
    .with_seed(42)
}

#[tokio::test(start_paused = true)]
async fn koramangala_store_is_within_ten_km_of_city_centre() {
    let mut catalog = StoreCatalog::default();
    catalog.ingest(&[
        json!({"id": 1, "store_name": "Koramangala Fresh", "address": "Koramangala"}),
        json!({"id": 2, "store_name": "Airport Depot", "address": "Devanahalli",
               "lat": 13.1986, "lng": 77.7066}),
        json!({"id": 3, "name": "Broken Row"}),
    ]);
    assert_eq!(catalog.len(), 2);

    let resolved = catalog.resolve_coordinates(&offline_geocoder()).await;
    assert_eq!(resolved, 1);

    let filter = FilterState::default().with_max_distance(10.0);
    let centre = Coordinate::new(12.9716, 77.5946);
    let visible = apply_filters(catalog.stores(), &filter, Some(centre));

    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name, "Koramangala Fresh");
    let km = visible[0].distance_km.unwrap();
    assert!(km > 4.0 && km < 10.0, "distance was {km}");
}

#[tokio::test(start_paused = true)]
async fn unresolved_store_sorts_last() {
    let mut catalog = StoreCatalog::default();
    catalog.ingest(&[
        json!({"name": "Far", "location": "x", "lat": 13.1986, "lng": 77.7066}),
        json!({"name": "Near", "location": "y", "lat": 12.9352, "lng": 77.6245}),
        json!({"name": "Nowhere", "location": "z"}),
    ]);

    let visible = apply_filters(
        catalog.stores(),
        &FilterState::default().with_sort(SortKey::Distance),
        Some(Coordinate::new(12.9716, 77.5946)),
    );
    let names: Vec<_> = visible.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Near", "Far", "Nowhere"]);
    assert!(visible[2].distance_km.is_none());
}
