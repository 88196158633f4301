use criterion::{criterion_group, criterion_main, Criterion};
use tilecutter_core::coord::WorldCoord;
use tilecutter_core::ops::{DrawOp, GeomKind};
use tilecutter_core::property::PropType;
use tilecutter_core::tile_encoder::{encode_tile, TileFeature};

/// A ring of `n` points around the tile's center, tagged as a closed polygon.
fn ring_ops(n: usize) -> Vec<DrawOp> {
    let mut ops = Vec::with_capacity(n + 1);
    let center = 1u32 << 31;
    let radius = 1u32 << 20;
    for i in 0..n {
        let angle = (i as f64) / (n as f64) * std::f64::consts::TAU;
        let x = (center as f64 + radius as f64 * angle.cos()) as u32;
        let y = (center as f64 + radius as f64 * angle.sin()) as u32;
        let c = WorldCoord::new(x, y);
        ops.push(if i == 0 { DrawOp::MoveTo(c) } else { DrawOp::LineTo(c) });
    }
    ops.push(DrawOp::ClosePath);
    ops
}

fn encode_polygons(count: usize, vertices: usize) {
    let ops = ring_ops(vertices);
    let props = vec![(PropType::String, "name".to_string(), "bench".to_string())];
    let features: Vec<TileFeature> = (0..count)
        .map(|_| TileFeature {
            kind: GeomKind::Polygon,
            ops: &ops,
            properties: &props,
        })
        .collect();
    encode_tile(14, 1 << 13, 1 << 13, 12, "bench", &features).unwrap();
}

fn encode_benchmark(c: &mut Criterion) {
    c.bench_function("encode 100 small polygons", |b| b.iter(|| encode_polygons(100, 8)));
    c.bench_function("encode 1000 small polygons", |b| b.iter(|| encode_polygons(1_000, 8)));
    c.bench_function("encode 100 detailed polygons", |b| b.iter(|| encode_polygons(100, 64)));
}

criterion_group!(benches, encode_benchmark);
criterion_main!(benches);
