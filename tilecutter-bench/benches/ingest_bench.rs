use criterion::{criterion_group, criterion_main, Criterion};
use tilecutter_core::ingest::{FeatureIngestor, IngestConfig};

mod fixtures {
    /// A FeatureCollection of `n` scattered points, one coordinate apart so
    /// they spread across the whole world bbox rather than clustering.
    pub fn points(n: usize) -> String {
        let mut features = Vec::with_capacity(n);
        for i in 0..n {
            let lon = (i as f64 % 360.0) - 180.0;
            let lat = ((i as f64 * 7.0) % 170.0) - 85.0;
            features.push(format!(
                r#"{{"type":"Feature","properties":{{"id":{i},"name":"p{i}"}},"geometry":{{"type":"Point","coordinates":[{lon},{lat}]}}}}"#
            ));
        }
        format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","))
    }

    /// A FeatureCollection of `n` short zig-zag linestrings.
    pub fn lines(n: usize) -> String {
        let mut features = Vec::with_capacity(n);
        for i in 0..n {
            let x0 = (i as f64 % 360.0) - 180.0;
            let y0 = ((i as f64 * 3.0) % 170.0) - 85.0;
            features.push(format!(
                r#"{{"type":"Feature","properties":{{"id":{i}}},"geometry":{{"type":"LineString","coordinates":[[{x0},{y0}],[{x1},{y1}],[{x2},{y2}]]}}}}"#,
                x1 = x0 + 0.01,
                y1 = y0 + 0.01,
                x2 = x0 + 0.02,
                y2 = y0,
            ));
        }
        format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","))
    }
}

fn ingest(data: &str) {
    let dir = std::env::temp_dir();
    let mut ingestor = FeatureIngestor::new(&dir, IngestConfig::default()).unwrap();
    tilecutter_core::geojson_ingest::read_geojson_features(data.as_bytes(), &mut ingestor).unwrap();
    ingestor.finish().unwrap();
}

fn ingest_benchmark(c: &mut Criterion) {
    let small_points = fixtures::points(1_000);
    let large_points = fixtures::points(20_000);
    let lines = fixtures::lines(5_000);

    c.bench_function("ingest 1k points", |b| b.iter(|| ingest(&small_points)));
    c.bench_function("ingest 20k points", |b| b.iter(|| ingest(&large_points)));
    c.bench_function("ingest 5k lines", |b| b.iter(|| ingest(&lines)));
}

criterion_group!(name = benches; config = Criterion::default().sample_size(10); targets = ingest_benchmark);
criterion_main!(benches);
