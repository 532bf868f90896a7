//! Fare estimation benchmarks using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ride_core::{distance_km, FareEstimator, GeoPoint, VehicleTier};

fn trips() -> Vec<(&'static str, GeoPoint, GeoPoint)> {
    vec![
        (
            "cross_town",
            GeoPoint::new_unchecked(24.8607, 67.0011),
            GeoPoint::new_unchecked(24.9056, 67.0822),
        ),
        (
            "intercity",
            GeoPoint::new_unchecked(24.8607, 67.0011),
            GeoPoint::new_unchecked(31.5204, 74.3587),
        ),
        (
            "antipodal",
            GeoPoint::new_unchecked(89.9, -179.9),
            GeoPoint::new_unchecked(-89.9, 179.9),
        ),
    ]
}

fn bench_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance_km");
    for (name, a, b) in trips() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &(a, b), |bench, &(a, b)| {
            bench.iter(|| black_box(distance_km(black_box(a), black_box(b))));
        });
    }
    group.finish();
}

fn bench_estimate(c: &mut Criterion) {
    let estimator = FareEstimator::standard();
    let (_, pickup, dropoff) = trips()[0];

    let mut group = c.benchmark_group("estimate");
    for tier in VehicleTier::ALL {
        group.bench_with_input(BenchmarkId::new("tier", tier), &tier, |bench, &tier| {
            bench.iter(|| black_box(estimator.estimate(tier, pickup, dropoff)));
        });
    }
    group.bench_function("by_id", |bench| {
        bench.iter(|| black_box(estimator.estimate_id(black_box("AcCar"), pickup, dropoff)));
    });
    group.finish();
}

criterion_group!(benches, bench_distance, bench_estimate);
criterion_main!(benches);
