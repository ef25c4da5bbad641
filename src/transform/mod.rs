//! The geometry transform engine.
//!
//! Each step maps annotation geometry from the canvas it entered on to the
//! canvas it leaves on. Box corners (4 points) and polygon vertices (N
//! points) go through identical point math; the difference is what happens
//! afterwards: a transformed box is re-hulled, clamped to the canvas, and
//! dropped if its area collapses, while polygon vertices are kept
//! individually (clamped only where a stage clips, and in the final
//! encoding pass) so later stages see undistorted geometry.
//!
//! Only resize and crop change the canvas. [`canvas_after`] is the single
//! source of truth for that evolution; [`apply_step`] uses it internally
//! and the pipeline uses it to compute the final canvas for encoding.

mod affine;
mod crop;
mod flip;
mod resize;
mod rotate;
mod shear;

pub use affine::AffineParams;
pub use crop::CropParams;
pub use resize::{ResizeMode, ResizeParams};

use std::fmt;

use serde::Serialize;

use crate::geometry::{BBoxXYXY, Canvas, Coord, LabeledShape, Pixel, Polygon, Shape};

/// One operation of the ordered transform sequence.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Resize(ResizeParams),
    Rotate { angle: f64 },
    Flip { horizontal: bool, vertical: bool },
    Crop(CropParams),
    Affine(AffineParams),
    Shear { angle: f64 },
    /// A transform that participates in the pipeline order but leaves
    /// coordinates untouched (it only affects pixel content).
    Passthrough { name: PassthroughKind },
}

/// Ordered transforms with no coordinate effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassthroughKind {
    Perspective,
    Cutout,
    RandomZoom,
}

impl Step {
    /// A stable name for display and report messages.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Resize(_) => "resize",
            Step::Rotate { .. } => "rotate",
            Step::Flip { .. } => "flip",
            Step::Crop(_) => "crop",
            Step::Affine(_) => "affine",
            Step::Shear { .. } => "shear",
            Step::Passthrough { name } => match name {
                PassthroughKind::Perspective => "perspective",
                PassthroughKind::Cutout => "cutout",
                PassthroughKind::RandomZoom => "random_zoom",
            },
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Resize(p) => {
                write!(f, "resize to {}x{} ({})", p.width, p.height, p.mode.as_str())
            }
            Step::Rotate { angle } => write!(f, "rotate by {} deg", angle),
            Step::Flip {
                horizontal,
                vertical,
            } => match (horizontal, vertical) {
                (true, true) => write!(f, "flip horizontal+vertical"),
                (true, false) => write!(f, "flip horizontal"),
                (false, true) => write!(f, "flip vertical"),
                (false, false) => write!(f, "flip (no axis)"),
            },
            Step::Crop(p) => write!(
                f,
                "crop {}%x{}% at ({}%, {}%)",
                p.width, p.height, p.left, p.top
            ),
            Step::Affine(p) => write!(
                f,
                "affine rotate={} scale={} shift=({}, {})",
                p.rotation_angle, p.scale_factor, p.horizontal_shift, p.vertical_shift
            ),
            Step::Shear { angle } => write!(f, "shear by {} deg", angle),
            Step::Passthrough { .. } => write!(f, "{} (coordinates unchanged)", self.name()),
        }
    }
}

/// Why a shape produced no output from a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropKind {
    /// A box collapsed to zero or negative area (or went non-finite).
    DegenerateBox,
    /// A polygon fell below three distinct valid vertices.
    DegeneratePolygon,
    /// A box landed entirely outside a crop window.
    CroppedOut,
}

/// Returns the canvas a step leaves behind.
///
/// Only resize and crop change it.
pub fn canvas_after(step: &Step, canvas: Canvas) -> Canvas {
    match step {
        Step::Resize(params) => resize::canvas_after(canvas, params),
        Step::Crop(params) => crop::canvas_after(canvas, params),
        _ => canvas,
    }
}

/// Applies a single step to a shape on the given input canvas.
pub fn apply_step(shape: Shape, canvas: Canvas, step: &Step) -> Result<Shape, DropKind> {
    match step {
        Step::Resize(params) => resize::apply(shape, canvas, params),
        Step::Rotate { angle } => rotate::apply(shape, canvas, *angle),
        Step::Flip {
            horizontal,
            vertical,
        } => flip::apply(shape, canvas, *horizontal, *vertical),
        Step::Crop(params) => crop::apply(shape, canvas, params),
        Step::Affine(params) => affine::apply(shape, canvas, params),
        Step::Shear { angle } => shear::apply(shape, canvas, *angle),
        Step::Passthrough { .. } => Ok(shape),
    }
}

/// Runs a shape through an ordered step sequence.
///
/// The canvas evolves alongside the shape; the first step that degenerates
/// the geometry stops the walk.
pub fn apply_steps(
    labeled: LabeledShape,
    canvas: Canvas,
    steps: &[Step],
) -> Result<LabeledShape, DropKind> {
    let mut shape = labeled.shape;
    let mut current = canvas;
    for step in steps {
        shape = apply_step(shape, current, step)?;
        current = canvas_after(step, current);
    }
    Ok(LabeledShape {
        class_id: labeled.class_id,
        shape,
    })
}

/// Returns the canvas left after the whole step sequence.
pub fn final_canvas(canvas: Canvas, steps: &[Step]) -> Canvas {
    steps
        .iter()
        .fold(canvas, |current, step| canvas_after(step, current))
}

/// Re-hulls a transformed box from mapped corners, clamps it to the canvas,
/// and enforces positive area.
pub(crate) fn rebuild_box(
    bbox: BBoxXYXY<Pixel>,
    canvas: Canvas,
    f: impl Fn(Coord<Pixel>) -> Coord<Pixel>,
) -> Result<Shape, DropKind> {
    let mapped = bbox.corners().map(f);
    let hull = BBoxXYXY::hull_of(mapped).ok_or(DropKind::DegenerateBox)?;
    let clamped = hull.clamp_to(canvas);
    if !clamped.has_area() {
        return Err(DropKind::DegenerateBox);
    }
    Ok(Shape::Box(clamped))
}

/// Maps polygon vertices without clamping; drops the polygon if the map
/// produced non-finite vertices.
pub(crate) fn rebuild_polygon(
    polygon: &Polygon<Pixel>,
    f: impl Fn(Coord<Pixel>) -> Coord<Pixel>,
) -> Result<Shape, DropKind> {
    let mapped = polygon.map_points(f);
    if !mapped.is_finite() {
        return Err(DropKind::DegeneratePolygon);
    }
    Ok(Shape::Polygon(mapped))
}
