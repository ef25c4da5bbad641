//! Criterion microbenches for the labelwarp transform engine.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - the full step sequence over boxes and polygons (apply_steps)
//! - YOLO detection encoding (encode_shapes)
//! - config ingestion and ordering (execution_order)

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use labelwarp::config::TransformConfig;
use labelwarp::encode::{encode_shapes, OutputKind};
use labelwarp::geometry::{BBoxXYXY, Canvas, Coord, LabeledShape, Polygon};
use labelwarp::pipeline::report::TransformReport;
use labelwarp::transform::{apply_steps, Step};

const CONFIG_FIXTURE: &str = r#"{
    "resize": {"enabled": true, "width": 640, "height": 640, "resize_mode": "fit_within"},
    "rotate": {"enabled": true, "angle": 12.5},
    "flip": {"enabled": true, "horizontal": true},
    "crop": {"enabled": true, "left": 10.0, "top": 10.0, "width": 80.0, "height": 80.0},
    "affine": {"enabled": true, "rotation_angle": 5.0, "scale_factor": 1.1, "horizontal_shift": 0.05},
    "shear": {"enabled": true, "angle": 8.0},
    "brightness": {"enabled": true, "factor": 1.3}
}"#;

fn fixture_steps() -> Vec<Step> {
    let config = TransformConfig::from_json_str(CONFIG_FIXTURE).expect("parse fixture config");
    config
        .execution_order(&mut TransformReport::new())
        .expect("order fixture config")
}

fn fixture_boxes(count: usize) -> Vec<LabeledShape> {
    (0..count)
        .map(|i| {
            let offset = (i % 50) as f64 * 10.0;
            LabeledShape::boxed(
                (i % 5) as u32,
                BBoxXYXY::from_xyxy(offset, offset / 2.0, offset + 120.0, offset / 2.0 + 90.0),
            )
        })
        .collect()
}

fn fixture_polygon(vertices: usize) -> Polygon<labelwarp::geometry::Pixel> {
    let points = (0..vertices)
        .map(|i| {
            let theta = i as f64 / vertices as f64 * std::f64::consts::TAU;
            Coord::new(500.0 + 200.0 * theta.cos(), 400.0 + 200.0 * theta.sin())
        })
        .collect();
    Polygon::new(points)
}

/// Benchmark the full step sequence over a batch of boxes.
fn bench_apply_steps_boxes(c: &mut Criterion) {
    let canvas = Canvas::new(1000.0, 800.0);
    let steps = fixture_steps();
    let shapes = fixture_boxes(100);

    let mut group = c.benchmark_group("apply_steps");
    group.throughput(Throughput::Elements(shapes.len() as u64));

    group.bench_function("boxes", |b| {
        b.iter(|| {
            let survivors: Vec<_> = shapes
                .iter()
                .cloned()
                .filter_map(|shape| apply_steps(shape, black_box(canvas), &steps).ok())
                .collect();
            black_box(survivors)
        })
    });

    group.finish();
}

/// Benchmark the full step sequence over a many-vertex polygon.
fn bench_apply_steps_polygon(c: &mut Criterion) {
    let canvas = Canvas::new(1000.0, 800.0);
    let steps = fixture_steps();
    let polygon = LabeledShape::polygon(0, fixture_polygon(64));

    let mut group = c.benchmark_group("apply_steps");
    group.throughput(Throughput::Elements(64));

    group.bench_function("polygon_64_vertices", |b| {
        b.iter(|| {
            let out = apply_steps(polygon.clone(), black_box(canvas), &steps);
            black_box(out)
        })
    });

    group.finish();
}

/// Benchmark YOLO detection encoding of a surviving batch.
fn bench_detection_encode(c: &mut Criterion) {
    let canvas = Canvas::new(1000.0, 800.0);
    let shapes = fixture_boxes(100);

    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(shapes.len() as u64));

    group.bench_function("detection_lines", |b| {
        b.iter(|| {
            let lines = encode_shapes(
                black_box(&shapes),
                canvas,
                OutputKind::Detection,
                None,
            );
            black_box(lines)
        })
    });

    group.finish();
}

/// Benchmark config ingestion and ordering.
fn bench_config_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("config");
    group.throughput(Throughput::Bytes(CONFIG_FIXTURE.len() as u64));

    group.bench_function("parse_and_order", |b| {
        b.iter(|| {
            let config =
                TransformConfig::from_json_str(black_box(CONFIG_FIXTURE)).expect("parse config");
            let steps = config
                .execution_order(&mut TransformReport::new())
                .expect("order config");
            black_box(steps)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_apply_steps_boxes,
    bench_apply_steps_polygon,
    bench_detection_encode,
    bench_config_ordering,
);
criterion_main!(benches);
