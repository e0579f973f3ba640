//! Benchmarks for geo crate distance calculations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use storefinder_geo::{batch::LocationItem, calculate_distances, distance_km, parse_postgis_point, Coordinate};
use serde_json::json;

fn create_test_items(count: usize) -> Vec<LocationItem> {
    (0..count)
        .map(|i| {
            // Generate points in a grid around Bangalore
            let lat = 12.8 + (i as f64 * 0.001) % 0.4;
            let lng = 77.4 + (i as f64 * 0.001) % 0.4;
            LocationItem {
                id: format!("store-{i}"),
                coordinate: Some(Coordinate::new(lat, lng)),
            }
        })
        .collect()
}

fn bench_single_distance(c: &mut Criterion) {
    let center = Coordinate::new(12.9716, 77.5946);
    let hebbal = Coordinate::new(13.0358, 77.5970);

    c.bench_function("distance_km_single", |b| {
        b.iter(|| distance_km(black_box(&center), black_box(&hebbal)))
    });
}

fn bench_batch_distances(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_distances");
    let reference = Coordinate::new(12.9716, 77.5946);

    for size in [10, 100, 1000, 10000].iter() {
        let items = create_test_items(*size);

        group.bench_with_input(BenchmarkId::new("default", size), size, |b, _| {
            b.iter(|| calculate_distances(black_box(&reference), black_box(&items)))
        });
    }

    group.finish();
}

fn bench_postgis_parsing(c: &mut Criterion) {
    let geojson = json!({"type": "Point", "coordinates": [77.6245, 12.9352]});
    let wkt = json!("POINT(77.6245 12.9352)");

    let mut group = c.benchmark_group("postgis_parsing");

    group.bench_function("geojson", |b| b.iter(|| parse_postgis_point(black_box(&geojson))));
    group.bench_function("wkt", |b| b.iter(|| parse_postgis_point(black_box(&wkt))));

    group.finish();
}

criterion_group!(
    benches,
    bench_single_distance,
    bench_batch_distances,
    bench_postgis_parsing
);
criterion_main!(benches);
