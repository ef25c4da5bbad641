//! Flip stage: horizontal/vertical mirroring across the canvas.

use crate::geometry::{Canvas, Coord, Shape};

use super::{rebuild_box, rebuild_polygon, DropKind};

pub(super) fn apply(
    shape: Shape,
    canvas: Canvas,
    horizontal: bool,
    vertical: bool,
) -> Result<Shape, DropKind> {
    let map = |p: Coord<_>| {
        let x = if horizontal { canvas.width - p.x } else { p.x };
        let y = if vertical { canvas.height - p.y } else { p.y };
        Coord::new(x, y)
    };
    match shape {
        // Mirroring swaps min/max; the hull restores XYXY ordering.
        Shape::Box(bbox) => rebuild_box(bbox, canvas, map),
        Shape::Polygon(ref polygon) => rebuild_polygon(polygon, map),
    }
}
