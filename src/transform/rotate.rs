//! Rotate stage: rotation about the current canvas center.

use crate::geometry::{Canvas, Coord, Shape};

use super::{rebuild_box, rebuild_polygon, DropKind};

pub(super) fn apply(shape: Shape, canvas: Canvas, angle: f64) -> Result<Shape, DropKind> {
    let theta = angle.to_radians();
    let (sin, cos) = theta.sin_cos();
    let cx = canvas.width / 2.0;
    let cy = canvas.height / 2.0;

    // Image coordinates are y-down, so a positive angle rotates clockwise
    // on screen with the standard rotation matrix.
    let map = move |p: Coord<_>| {
        let dx = p.x - cx;
        let dy = p.y - cy;
        Coord::new(cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
    };

    match shape {
        // The axis-aligned hull of the four rotated corners, clamped.
        Shape::Box(bbox) => rebuild_box(bbox, canvas, map),
        // Vertices stay individually rotated; clamping happens in the
        // final encoding pass.
        Shape::Polygon(ref polygon) => rebuild_polygon(polygon, map),
    }
}
