//! Bounding box types in canonical XYXY format.

use serde::{Deserialize, Serialize};

use super::canvas::Canvas;
use super::coord::Coord;

/// An axis-aligned bounding box in XYXY format (xmin, ymin, xmax, ymax).
///
/// The `TSpace` parameter should be either [`Pixel`](super::Pixel) or
/// [`Normalized`](super::Normalized), ensuring type safety across
/// coordinate spaces.
///
/// Note: This type does NOT enforce that min < max in the constructor,
/// allowing "malformed" boxes to exist mid-computation. This is intentional -
/// the transform engine checks for degeneracy after each stage and drops the
/// box rather than panicking inside point math.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYXY<TSpace> {
    pub min: Coord<TSpace>,
    pub max: Coord<TSpace>,
}

impl<TSpace> BBoxXYXY<TSpace> {
    /// Creates a new bounding box from min and max coordinates.
    #[inline]
    pub fn new(min: Coord<TSpace>, max: Coord<TSpace>) -> Self {
        Self { min, max }
    }

    /// Creates a new bounding box from explicit coordinates.
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            min: Coord::new(xmin, ymin),
            max: Coord::new(xmax, ymax),
        }
    }

    /// Creates the axis-aligned hull of an arbitrary set of points.
    ///
    /// Returns `None` for an empty or non-finite point set.
    pub fn hull_of(points: impl IntoIterator<Item = Coord<TSpace>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        if !first.is_finite() {
            return None;
        }

        let mut hull = Self::new(first, first);
        for point in iter {
            if !point.is_finite() {
                return None;
            }
            hull.min = Coord::new(hull.min.x.min(point.x), hull.min.y.min(point.y));
            hull.max = Coord::new(hull.max.x.max(point.x), hull.max.y.max(point.y));
        }
        Some(hull)
    }

    /// Returns the minimum x coordinate.
    #[inline]
    pub fn xmin(&self) -> f64 {
        self.min.x
    }

    /// Returns the minimum y coordinate.
    #[inline]
    pub fn ymin(&self) -> f64 {
        self.min.y
    }

    /// Returns the maximum x coordinate.
    #[inline]
    pub fn xmax(&self) -> f64 {
        self.max.x
    }

    /// Returns the maximum y coordinate.
    #[inline]
    pub fn ymax(&self) -> f64 {
        self.max.y
    }

    /// Returns the width of the bounding box.
    ///
    /// May be negative if the box is malformed (xmax < xmin).
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Returns the height of the bounding box.
    ///
    /// May be negative if the box is malformed (ymax < ymin).
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Returns the area of the bounding box.
    ///
    /// May be negative if the box is malformed.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Returns the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> Coord<TSpace> {
        Coord::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Returns the four corners, clockwise from top-left.
    #[inline]
    pub fn corners(&self) -> [Coord<TSpace>; 4] {
        [
            Coord::new(self.min.x, self.min.y),
            Coord::new(self.max.x, self.min.y),
            Coord::new(self.max.x, self.max.y),
            Coord::new(self.min.x, self.max.y),
        ]
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Returns true if the box has strictly positive area.
    #[inline]
    pub fn has_area(&self) -> bool {
        self.is_finite() && self.width() > 0.0 && self.height() > 0.0
    }
}

impl<TSpace> std::fmt::Debug for BBoxXYXY<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxXYXY")
            .field("xmin", &self.min.x)
            .field("ymin", &self.min.y)
            .field("xmax", &self.max.x)
            .field("ymax", &self.max.y)
            .finish()
    }
}

impl<TSpace> Default for BBoxXYXY<TSpace> {
    fn default() -> Self {
        Self::from_xyxy(0.0, 0.0, 0.0, 0.0)
    }
}

// Custom serde implementation to avoid TSpace: Serialize/Deserialize bounds
impl<TSpace> Serialize for BBoxXYXY<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("BBoxXYXY", 4)?;
        state.serialize_field("xmin", &self.min.x)?;
        state.serialize_field("ymin", &self.min.y)?;
        state.serialize_field("xmax", &self.max.x)?;
        state.serialize_field("ymax", &self.max.y)?;
        state.end()
    }
}

impl<'de, TSpace> Deserialize<'de> for BBoxXYXY<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct BBoxData {
            xmin: f64,
            ymin: f64,
            xmax: f64,
            ymax: f64,
        }
        let data = BBoxData::deserialize(deserializer)?;
        Ok(BBoxXYXY::from_xyxy(
            data.xmin, data.ymin, data.xmax, data.ymax,
        ))
    }
}

/// Conversion utilities for center-based formats.
impl<TSpace> BBoxXYXY<TSpace> {
    /// Converts from CXCYWH format (center-x, center-y, width, height).
    ///
    /// This is the layout of YOLO detection label lines.
    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::from_xyxy(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }

    /// Converts to CXCYWH format (center-x, center-y, width, height).
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        let center = self.center();
        (center.x, center.y, self.width(), self.height())
    }
}

use super::{Normalized, Pixel};

impl BBoxXYXY<Pixel> {
    /// Converts pixel coordinates to normalized coordinates against a canvas.
    pub fn to_normalized(&self, canvas: Canvas) -> BBoxXYXY<Normalized> {
        BBoxXYXY::from_xyxy(
            self.min.x / canvas.width,
            self.min.y / canvas.height,
            self.max.x / canvas.width,
            self.max.y / canvas.height,
        )
    }

    /// Returns a copy clamped to `[0, canvas.width] x [0, canvas.height]`.
    pub fn clamp_to(&self, canvas: Canvas) -> BBoxXYXY<Pixel> {
        BBoxXYXY::new(
            self.min.clamped(canvas.width, canvas.height),
            self.max.clamped(canvas.width, canvas.height),
        )
    }
}

impl BBoxXYXY<Normalized> {
    /// Converts normalized coordinates to pixel coordinates against a canvas.
    pub fn to_pixel(&self, canvas: Canvas) -> BBoxXYXY<Pixel> {
        BBoxXYXY::from_xyxy(
            self.min.x * canvas.width,
            self.min.y * canvas.height,
            self.max.x * canvas.width,
            self.max.y * canvas.height,
        )
    }
}
