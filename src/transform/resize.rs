//! Resize stage: per-axis or aspect-preserving scaling.

use serde::Serialize;

use crate::geometry::{Canvas, Coord, Shape};

use super::{rebuild_box, rebuild_polygon, DropKind};

/// Target dimensions and scaling policy for the resize stage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ResizeParams {
    pub width: f64,
    pub height: f64,
    pub mode: ResizeMode,
}

/// How the source canvas reaches the target dimensions.
///
/// The three `Fit*` variants differ only in how the image side pads the
/// letterbox (reflected, black, or white edges); the coordinate math is the
/// same uniform scale for all three.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    /// Scale x and y independently to hit the target exactly.
    StretchTo,
    /// Uniform scale by the limiting axis; output may be smaller than the
    /// nominal target.
    FitWithin,
    FitReflectEdges,
    FitBlackEdges,
    FitWhiteEdges,
    /// Uniform scale by the covering axis. The image side center-crops the
    /// overflow; the corresponding coordinate offset is intentionally NOT
    /// applied here, matching the engine this pipeline mirrors.
    FillCenterCrop,
}

impl ResizeMode {
    /// Parses the canonical snake_case mode name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "stretch_to" => Some(ResizeMode::StretchTo),
            "fit_within" => Some(ResizeMode::FitWithin),
            "fit_reflect_edges" => Some(ResizeMode::FitReflectEdges),
            "fit_black_edges" => Some(ResizeMode::FitBlackEdges),
            "fit_white_edges" => Some(ResizeMode::FitWhiteEdges),
            "fill_center_crop" => Some(ResizeMode::FillCenterCrop),
            _ => None,
        }
    }

    /// The canonical snake_case mode name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeMode::StretchTo => "stretch_to",
            ResizeMode::FitWithin => "fit_within",
            ResizeMode::FitReflectEdges => "fit_reflect_edges",
            ResizeMode::FitBlackEdges => "fit_black_edges",
            ResizeMode::FitWhiteEdges => "fit_white_edges",
            ResizeMode::FillCenterCrop => "fill_center_crop",
        }
    }

    /// Returns true for the aspect-preserving letterbox variants.
    pub fn is_fit(&self) -> bool {
        matches!(
            self,
            ResizeMode::FitWithin
                | ResizeMode::FitReflectEdges
                | ResizeMode::FitBlackEdges
                | ResizeMode::FitWhiteEdges
        )
    }
}

/// The per-axis scale factors this resize applies to coordinates.
pub(super) fn scale_factors(canvas: Canvas, params: &ResizeParams) -> (f64, f64) {
    let sx = params.width / canvas.width;
    let sy = params.height / canvas.height;
    match params.mode {
        ResizeMode::StretchTo => (sx, sy),
        mode if mode.is_fit() => {
            let s = sx.min(sy);
            (s, s)
        }
        _ => {
            // fill_center_crop: cover the target with the larger scale.
            let s = sx.max(sy);
            (s, s)
        }
    }
}

pub(super) fn canvas_after(canvas: Canvas, params: &ResizeParams) -> Canvas {
    let (sx, sy) = scale_factors(canvas, params);
    canvas.scaled(sx, sy)
}

pub(super) fn apply(shape: Shape, canvas: Canvas, params: &ResizeParams) -> Result<Shape, DropKind> {
    let (sx, sy) = scale_factors(canvas, params);
    let scaled = canvas_after(canvas, params);
    let map = |p: Coord<_>| Coord::new(p.x * sx, p.y * sy);
    match shape {
        Shape::Box(bbox) => rebuild_box(bbox, scaled, map),
        Shape::Polygon(ref polygon) => rebuild_polygon(polygon, map),
    }
}
