//! Extraction: heterogeneous annotation records into canonical shapes.
//!
//! Upstream sources are messy: some records carry direct
//! `x_min`/`y_min`/`x_max`/`y_max` fields, some a `bbox` blob (a map or a
//! JSON-encoded string of one), some a `segmentation` blob in any of four
//! layouts. This module normalizes all of them into the tagged
//! [`Shape`] exactly once, at the boundary; the rest of the pipeline never
//! sees a raw record again.
//!
//! Extraction is deliberately forgiving: malformed or missing geometry
//! skips the one annotation (the caller records it in the report) and the
//! batch continues.

use serde::Deserialize;

use crate::geometry::{BBoxXYXY, Canvas, Coord, LabeledShape, Pixel, Polygon, Shape};

/// A raw annotation record as received from upstream storage.
///
/// All geometry fields are optional; [`extract_shape`] decides what the
/// record actually contains. Unknown fields are ignored so ORM rows with
/// extra columns deserialize cleanly.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawAnnotation {
    /// Class index; absent means class 0.
    #[serde(default)]
    pub class_id: Option<u32>,

    #[serde(default)]
    pub x_min: Option<f64>,
    #[serde(default)]
    pub y_min: Option<f64>,
    #[serde(default)]
    pub x_max: Option<f64>,
    #[serde(default)]
    pub y_max: Option<f64>,

    /// Bounding box blob: a map with the four corner keys, or a JSON string
    /// encoding such a map.
    #[serde(default)]
    pub bbox: Option<BBoxBlob>,

    /// Segmentation blob: point pairs, a flat coordinate list, a
    /// `{"points": [...]}` wrapper, or a JSON string encoding any of those.
    #[serde(default)]
    pub segmentation: Option<SegmentationBlob>,
}

impl RawAnnotation {
    /// Convenience constructor for a direct-field pixel box.
    pub fn with_box(class_id: u32, x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            class_id: Some(class_id),
            x_min: Some(x_min),
            y_min: Some(y_min),
            x_max: Some(x_max),
            y_max: Some(y_max),
            ..Self::default()
        }
    }

    /// Convenience constructor for a segmentation record.
    pub fn with_points(class_id: u32, pairs: Vec<[f64; 2]>) -> Self {
        Self {
            class_id: Some(class_id),
            segmentation: Some(SegmentationBlob::Points(PointList::Pairs(pairs))),
            ..Self::default()
        }
    }

    /// Returns true if the record carries no geometry at all.
    pub fn is_geometry_free(&self) -> bool {
        self.x_min.is_none()
            && self.y_min.is_none()
            && self.x_max.is_none()
            && self.y_max.is_none()
            && self.bbox.is_none()
            && self.segmentation.is_none()
    }
}

/// The polymorphic `bbox` field.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum BBoxBlob {
    /// A JSON string encoding a corner map.
    Json(String),
    /// A map with the four corner keys.
    Fields(BBoxFields),
}

/// The four corner values of a bbox blob.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct BBoxFields {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

/// The polymorphic `segmentation` field.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum SegmentationBlob {
    /// A JSON string encoding one of the other layouts.
    Json(String),
    /// A `{"points": [...]}` wrapper.
    Wrapped { points: PointList },
    /// A bare point list.
    Points(PointList),
}

/// A vertex list, either as `[x, y]` pairs or flat `[x1, y1, x2, y2, ...]`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum PointList {
    Pairs(Vec<[f64; 2]>),
    Flat(Vec<f64>),
}

impl PointList {
    fn to_pairs(&self) -> Option<Vec<(f64, f64)>> {
        match self {
            PointList::Pairs(pairs) => Some(pairs.iter().map(|p| (p[0], p[1])).collect()),
            PointList::Flat(coords) => {
                if coords.len() % 2 != 0 {
                    return None;
                }
                Some(coords.chunks_exact(2).map(|c| (c[0], c[1])).collect())
            }
        }
    }
}

/// Why [`extract_shape`] produced nothing for a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The record has no geometry fields at all.
    MissingGeometry,
    /// Geometry was present but unparseable, non-finite, or degenerate.
    MalformedGeometry,
}

/// Which geometry to prefer when a record carries both kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GeometryPreference {
    /// Prefer the bounding box (detection output).
    #[default]
    Box,
    /// Prefer the polygon (segmentation output).
    Polygon,
}

/// Extracts a pixel-space bounding box from a raw annotation.
///
/// Direct corner fields win over the `bbox` blob. If all four values lie in
/// `[0, 1]` they are treated as normalized and scaled by the image
/// dimensions; otherwise they are used as pixels. This heuristic is
/// ambiguous for genuinely tiny pixel boxes near the origin; the data
/// carries no flag that could disambiguate, so sub-pixel boxes are read as
/// normalized.
///
/// Returns `None` on missing or malformed input.
pub fn extract_bbox(ann: &RawAnnotation, img_w: f64, img_h: f64) -> Option<BBoxXYXY<Pixel>> {
    let fields = direct_fields(ann).or_else(|| blob_fields(ann))?;

    let values = [fields.x_min, fields.y_min, fields.x_max, fields.y_max];
    if values.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let bbox = if values.iter().all(|v| (0.0..=1.0).contains(v)) {
        BBoxXYXY::from_xyxy(
            fields.x_min * img_w,
            fields.y_min * img_h,
            fields.x_max * img_w,
            fields.y_max * img_h,
        )
    } else {
        BBoxXYXY::from_xyxy(fields.x_min, fields.y_min, fields.x_max, fields.y_max)
    };

    if !bbox.has_area() {
        return None;
    }
    Some(bbox)
}

/// Extracts a pixel-space polygon from a raw annotation.
///
/// Accepts every `segmentation` layout (see [`SegmentationBlob`]) and
/// requires at least three vertices. The same `[0, 1]` normalization
/// heuristic as [`extract_bbox`] applies, with the same known ambiguity.
///
/// Returns `None` on missing or malformed input.
pub fn extract_polygon(ann: &RawAnnotation, img_w: f64, img_h: f64) -> Option<Polygon<Pixel>> {
    let blob = ann.segmentation.as_ref()?;
    let pairs = resolve_segmentation(blob)?;

    if pairs.len() < 3 {
        return None;
    }
    if pairs.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return None;
    }

    let normalized = pairs
        .iter()
        .all(|(x, y)| (0.0..=1.0).contains(x) && (0.0..=1.0).contains(y));

    let points = pairs
        .into_iter()
        .map(|(x, y)| {
            if normalized {
                Coord::new(x * img_w, y * img_h)
            } else {
                Coord::new(x, y)
            }
        })
        .collect();

    Some(Polygon::new(points))
}

/// Extracts the canonical [`LabeledShape`] for a record.
///
/// With [`GeometryPreference::Polygon`] the segmentation blob wins when both
/// kinds are present; either preference falls back to the other kind rather
/// than skipping a record that has usable geometry.
pub fn extract_shape(
    ann: &RawAnnotation,
    canvas: Canvas,
    prefer: GeometryPreference,
) -> Result<LabeledShape, SkipReason> {
    if ann.is_geometry_free() {
        return Err(SkipReason::MissingGeometry);
    }

    let class_id = ann.class_id.unwrap_or(0);
    let bbox = extract_bbox(ann, canvas.width, canvas.height);
    let polygon = extract_polygon(ann, canvas.width, canvas.height);

    let shape = match prefer {
        GeometryPreference::Polygon => polygon
            .map(Shape::Polygon)
            .or_else(|| bbox.map(Shape::Box)),
        GeometryPreference::Box => bbox
            .map(Shape::Box)
            .or_else(|| polygon.map(Shape::Polygon)),
    };

    match shape {
        Some(shape) => Ok(LabeledShape { class_id, shape }),
        None => Err(SkipReason::MalformedGeometry),
    }
}

fn direct_fields(ann: &RawAnnotation) -> Option<BBoxFields> {
    match (ann.x_min, ann.y_min, ann.x_max, ann.y_max) {
        (Some(x_min), Some(y_min), Some(x_max), Some(y_max)) => Some(BBoxFields {
            x_min,
            y_min,
            x_max,
            y_max,
        }),
        _ => None,
    }
}

fn blob_fields(ann: &RawAnnotation) -> Option<BBoxFields> {
    match ann.bbox.as_ref()? {
        BBoxBlob::Fields(fields) => Some(*fields),
        BBoxBlob::Json(raw) => serde_json::from_str(raw).ok(),
    }
}

fn resolve_segmentation(blob: &SegmentationBlob) -> Option<Vec<(f64, f64)>> {
    match blob {
        SegmentationBlob::Points(list) | SegmentationBlob::Wrapped { points: list } => {
            list.to_pairs()
        }
        SegmentationBlob::Json(raw) => {
            #[derive(Deserialize)]
            #[serde(untagged)]
            enum Decoded {
                Wrapped { points: PointList },
                Points(PointList),
            }
            match serde_json::from_str::<Decoded>(raw).ok()? {
                Decoded::Wrapped { points } | Decoded::Points(points) => points.to_pairs(),
            }
        }
    }
}

/// Fuzz-only entrypoint for segmentation blob parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_segmentation_blob(input: &str) {
    if let Ok(blob) = serde_json::from_str::<SegmentationBlob>(input) {
        let _ = resolve_segmentation(&blob);
    }
}
