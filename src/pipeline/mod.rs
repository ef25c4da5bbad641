//! Pipeline orchestration: extraction, ordering, transform, encoding.
//!
//! [`transform_image`] is the top-level entry point for one image: it
//! normalizes the raw annotation records, resolves the config into an
//! ordered step sequence, walks every shape through the engine, and encodes
//! the survivors as YOLO lines against the final canvas. Per-annotation
//! problems (missing geometry, degenerate results) skip that one annotation
//! and continue; a config-level problem aborts the transform for the whole
//! image and falls back to the original, untransformed coordinates, marked
//! in the report so callers can tell stale output from per-annotation drops.

pub mod report;

use crate::config::TransformConfig;
use crate::encode::{self, ClassResolver, OutputKind};
use crate::error::LabelwarpError;
use crate::extract::{self, GeometryPreference, RawAnnotation, SkipReason};
use crate::geometry::{Canvas, LabeledShape};
use crate::transform::{self, DropKind};

use report::{EntryCode, EntryContext, ReportEntry, TransformReport};

/// Per-invocation settings.
#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineOptions {
    /// Which YOLO flavor to emit.
    pub kind: OutputKind,
}

impl PipelineOptions {
    /// Options for YOLO detection output.
    pub fn detection() -> Self {
        Self {
            kind: OutputKind::Detection,
        }
    }

    /// Options for YOLO segmentation output.
    pub fn segmentation() -> Self {
        Self {
            kind: OutputKind::Segmentation,
        }
    }

    fn preference(&self) -> GeometryPreference {
        match self.kind {
            OutputKind::Detection => GeometryPreference::Box,
            OutputKind::Segmentation => GeometryPreference::Polygon,
        }
    }
}

/// Everything one image invocation produced.
#[derive(Clone, Debug)]
pub struct PipelineOutcome {
    /// YOLO label lines, one per surviving annotation, in input order.
    pub lines: Vec<String>,

    /// The surviving shapes in final-canvas pixel coordinates, for callers
    /// encoding into other formats.
    pub shapes: Vec<LabeledShape>,

    /// The canvas the lines were normalized against.
    pub canvas: Canvas,

    /// Everything that was skipped, dropped, or rewritten along the way.
    pub report: TransformReport,
}

/// Runs the full pipeline for one image.
///
/// `width` and `height` are the original image dimensions; they seed the
/// canvas that resize and crop stages evolve. Returns an error only for a
/// contract violation (non-positive dimensions); config problems yield the
/// fallback outcome instead.
pub fn transform_image(
    annotations: &[RawAnnotation],
    width: u32,
    height: u32,
    config: &TransformConfig,
    options: PipelineOptions,
    resolver: Option<&ClassResolver>,
) -> Result<PipelineOutcome, LabelwarpError> {
    let canvas = Canvas::of_image(width, height);
    if !canvas.is_valid() {
        return Err(LabelwarpError::InvalidImageDimensions { width, height });
    }

    let mut report = TransformReport::new();
    let extracted = extract_batch(annotations, canvas, options.preference(), &mut report);

    let steps = match config.execution_order(&mut report) {
        Ok(steps) => steps,
        Err(err) => {
            // Config-level failure: emit the original coordinates as-is.
            report.add(ReportEntry::warning(
                EntryCode::PipelineFallback,
                format!("{}; emitting untransformed coordinates", err),
                EntryContext::Image,
            ));
            let shapes: Vec<LabeledShape> = extracted.into_iter().map(|(_, s)| s).collect();
            let lines = encode::encode_shapes(&shapes, canvas, options.kind, resolver);
            return Ok(PipelineOutcome {
                lines,
                shapes,
                canvas,
                report,
            });
        }
    };

    let mut survivors = Vec::with_capacity(extracted.len());
    for (index, labeled) in extracted {
        match transform::apply_steps(labeled, canvas, &steps) {
            Ok(out) => survivors.push(out),
            Err(kind) => report.add(drop_entry(kind, index)),
        }
    }

    let final_canvas = transform::final_canvas(canvas, &steps);
    let lines = encode::encode_shapes(&survivors, final_canvas, options.kind, resolver);

    Ok(PipelineOutcome {
        lines,
        shapes: survivors,
        canvas: final_canvas,
        report,
    })
}

/// Extracts every record, recording skips; keeps the input index for later
/// report entries.
fn extract_batch(
    annotations: &[RawAnnotation],
    canvas: Canvas,
    prefer: GeometryPreference,
    report: &mut TransformReport,
) -> Vec<(usize, LabeledShape)> {
    let mut shapes = Vec::with_capacity(annotations.len());
    for (index, ann) in annotations.iter().enumerate() {
        match extract::extract_shape(ann, canvas, prefer) {
            Ok(shape) => shapes.push((index, shape)),
            Err(SkipReason::MissingGeometry) => report.add(ReportEntry::warning(
                EntryCode::MissingGeometry,
                "record carries no geometry fields",
                EntryContext::Annotation { index },
            )),
            Err(SkipReason::MalformedGeometry) => report.add(ReportEntry::warning(
                EntryCode::MalformedGeometry,
                "geometry present but unparseable or degenerate",
                EntryContext::Annotation { index },
            )),
        }
    }
    shapes
}

fn drop_entry(kind: DropKind, index: usize) -> ReportEntry {
    let (code, message) = match kind {
        DropKind::DegenerateBox => (
            EntryCode::DegenerateBox,
            "box collapsed to zero area and was dropped",
        ),
        DropKind::DegeneratePolygon => (
            EntryCode::DegeneratePolygon,
            "polygon fell below three distinct vertices and was dropped",
        ),
        DropKind::CroppedOut => (
            EntryCode::CroppedOut,
            "box landed entirely outside the crop window",
        ),
    };
    ReportEntry::warning(code, message, EntryContext::Annotation { index })
}
