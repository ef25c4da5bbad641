//! Encoding: final pixel coordinates into YOLO label lines.
//!
//! This is the final pass: coordinates are normalized against the final
//! canvas, clamped into `[0, 1]`, and written with six decimal places, one
//! line per surviving annotation. Degenerate geometry (a box without area,
//! a polygon below three distinct vertices) produces no line.

use std::fmt::Write as _;

use crate::geometry::{BBoxXYXY, Canvas, LabeledShape, Normalized, Polygon, Shape};

/// Which YOLO flavor to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputKind {
    /// One `class cx cy w h` line per box.
    #[default]
    Detection,
    /// One `class x1 y1 x2 y2 ...` line per polygon.
    Segmentation,
}

/// Injectable class-index override.
///
/// When supplied, its return value replaces every shape's own `class_id`
/// in the emitted output (e.g. to remap dataset classes to model classes).
pub type ClassResolver<'a> = dyn Fn(&LabeledShape) -> u32 + 'a;

fn resolve_class(shape: &LabeledShape, resolver: Option<&ClassResolver>) -> u32 {
    match resolver {
        Some(resolve) => resolve(shape),
        None => shape.class_id,
    }
}

/// Encodes one shape as a YOLO detection line.
///
/// Polygons are encoded via their axis-aligned hull. Returns `None` if the
/// geometry has no area on the final canvas.
pub fn detection_line(
    shape: &LabeledShape,
    canvas: Canvas,
    resolver: Option<&ClassResolver>,
) -> Option<String> {
    let bbox = match &shape.shape {
        Shape::Box(bbox) => *bbox,
        Shape::Polygon(polygon) => BBoxXYXY::hull_of(polygon.points.iter().copied())?,
    };

    let clamped = bbox.clamp_to(canvas);
    if !clamped.has_area() {
        return None;
    }

    let norm = clamped.to_normalized(canvas);
    let (cx, cy, w, h) = norm.to_cxcywh();
    Some(format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        resolve_class(shape, resolver),
        cx.clamp(0.0, 1.0),
        cy.clamp(0.0, 1.0),
        w.clamp(0.0, 1.0),
        h.clamp(0.0, 1.0),
    ))
}

/// Encodes one shape as a YOLO segmentation line.
///
/// Boxes are encoded as their four-corner outline. Vertices are clamped to
/// the canvas here - the polygon's deferred "final pass" - and the line is
/// skipped unless at least three distinct valid vertices remain.
pub fn segmentation_line(
    shape: &LabeledShape,
    canvas: Canvas,
    resolver: Option<&ClassResolver>,
) -> Option<String> {
    let polygon = match &shape.shape {
        Shape::Polygon(polygon) => polygon.clone(),
        Shape::Box(bbox) => {
            let clamped = bbox.clamp_to(canvas);
            if !clamped.has_area() {
                return None;
            }
            Polygon::new(clamped.corners().to_vec())
        }
    };

    let clamped = polygon.clamp_to(canvas);
    if clamped.distinct_finite_points() < 3 {
        return None;
    }

    let norm: Polygon<Normalized> = clamped.to_normalized(canvas);
    let mut line = resolve_class(shape, resolver).to_string();
    for point in &norm.points {
        let _ = write!(
            line,
            " {:.6} {:.6}",
            point.x.clamp(0.0, 1.0),
            point.y.clamp(0.0, 1.0)
        );
    }
    Some(line)
}

/// Encodes one shape in the requested flavor.
pub fn encode_shape(
    shape: &LabeledShape,
    canvas: Canvas,
    kind: OutputKind,
    resolver: Option<&ClassResolver>,
) -> Option<String> {
    match kind {
        OutputKind::Detection => detection_line(shape, canvas, resolver),
        OutputKind::Segmentation => segmentation_line(shape, canvas, resolver),
    }
}

/// Encodes a batch, preserving input order; dropped shapes emit no line.
pub fn encode_shapes(
    shapes: &[LabeledShape],
    canvas: Canvas,
    kind: OutputKind,
    resolver: Option<&ClassResolver>,
) -> Vec<String> {
    shapes
        .iter()
        .filter_map(|shape| encode_shape(shape, canvas, kind, resolver))
        .collect()
}
