#![allow(dead_code)]

use labelwarp::geometry::{BBoxXYXY, Canvas, Pixel, Polygon};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// The fixed canvas the transform properties run on.
pub fn canvas() -> Canvas {
    Canvas::new(100.0, 100.0)
}

/// A live pixel box well inside the 100x100 canvas.
pub fn arb_pixel_box() -> impl Strategy<Value = BBoxXYXY<Pixel>> {
    (0.0..75.0f64, 0.0..75.0f64, 1.0..25.0f64, 1.0..25.0f64)
        .prop_map(|(x, y, w, h)| BBoxXYXY::from_xyxy(x, y, x + w, y + h))
}

/// A triangle with all vertices inside the 100x100 canvas.
pub fn arb_triangle() -> impl Strategy<Value = Polygon<Pixel>> {
    proptest::collection::vec((0.0..100.0f64, 0.0..100.0f64), 3).prop_map(|points| {
        Polygon::new(
            points
                .into_iter()
                .map(|(x, y)| labelwarp::geometry::Coord::new(x, y))
                .collect(),
        )
    })
}

pub fn assert_box_close(a: &BBoxXYXY<Pixel>, b: &BBoxXYXY<Pixel>, eps: f64) -> Result<(), String> {
    let pairs = [
        ("xmin", a.xmin(), b.xmin()),
        ("ymin", a.ymin(), b.ymin()),
        ("xmax", a.xmax(), b.xmax()),
        ("ymax", a.ymax(), b.ymax()),
    ];
    for (name, left, right) in pairs {
        if (left - right).abs() > eps {
            return Err(format!("{name} differs: {left} vs {right} (eps {eps})"));
        }
    }
    Ok(())
}
