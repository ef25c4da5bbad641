//! Affine stage: rotate, scale, and shift about the shape's own centroid.

use serde::Serialize;

use crate::geometry::{Canvas, Coord, Pixel, Shape};

use super::{rebuild_box, rebuild_polygon, DropKind};

/// Canonical affine parameters.
///
/// Shifts are fractions of the current canvas dimensions; the legacy
/// percent overload is rewritten to fractions at config ingestion, so the
/// engine only ever sees `[-1, 1]` here.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AffineParams {
    pub rotation_angle: f64,
    pub scale_factor: f64,
    pub horizontal_shift: f64,
    pub vertical_shift: f64,
}

impl Default for AffineParams {
    fn default() -> Self {
        Self {
            rotation_angle: 0.0,
            scale_factor: 1.0,
            horizontal_shift: 0.0,
            vertical_shift: 0.0,
        }
    }
}

pub(super) fn apply(shape: Shape, canvas: Canvas, params: &AffineParams) -> Result<Shape, DropKind> {
    let centroid = match &shape {
        Shape::Box(bbox) => bbox.center(),
        Shape::Polygon(polygon) => match polygon.centroid() {
            Some(c) => c,
            None => return Err(DropKind::DegeneratePolygon),
        },
    };

    let theta = params.rotation_angle.to_radians();
    let (sin, cos) = theta.sin_cos();
    let scale = params.scale_factor;
    let shift_x = canvas.width * params.horizontal_shift;
    let shift_y = canvas.height * params.vertical_shift;

    // Rotate about the centroid, then scale about it, then translate.
    let map = move |p: Coord<Pixel>| {
        let dx = p.x - centroid.x;
        let dy = p.y - centroid.y;
        let rx = dx * cos - dy * sin;
        let ry = dx * sin + dy * cos;
        Coord::new(
            centroid.x + rx * scale + shift_x,
            centroid.y + ry * scale + shift_y,
        )
    };

    match shape {
        Shape::Box(bbox) => rebuild_box(bbox, canvas, map),
        Shape::Polygon(ref polygon) => rebuild_polygon(polygon, map),
    }
}
