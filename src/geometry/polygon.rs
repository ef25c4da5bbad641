//! Polygon annotations as ordered vertex lists.

use serde::{Deserialize, Serialize};

use super::canvas::Canvas;
use super::coord::Coord;
use super::{Normalized, Pixel};

/// An ordered polygon outline.
///
/// Like [`BBoxXYXY`](super::BBoxXYXY), construction is permissive: a polygon
/// with fewer than three vertices can exist mid-computation. The transform
/// engine and the encoder enforce the >= 3 distinct-vertex rule and drop the
/// annotation instead of erroring.
#[derive(Clone, PartialEq)]
pub struct Polygon<TSpace> {
    pub points: Vec<Coord<TSpace>>,
}

impl<TSpace> Polygon<TSpace> {
    /// Creates a polygon from a vertex list.
    #[inline]
    pub fn new(points: Vec<Coord<TSpace>>) -> Self {
        Self { points }
    }

    /// Creates a polygon from a flat `[x1, y1, x2, y2, ...]` slice.
    ///
    /// Returns `None` for odd-length input.
    pub fn from_flat(coords: &[f64]) -> Option<Self> {
        if coords.len() % 2 != 0 {
            return None;
        }
        let points = coords
            .chunks_exact(2)
            .map(|pair| Coord::new(pair[0], pair[1]))
            .collect();
        Some(Self::new(points))
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the polygon has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns true if every vertex is finite.
    pub fn is_finite(&self) -> bool {
        self.points.iter().all(Coord::is_finite)
    }

    /// Counts vertices that are finite and pairwise distinct.
    ///
    /// Clamping can collapse several vertices onto the same canvas corner;
    /// those count once.
    pub fn distinct_finite_points(&self) -> usize {
        let mut seen: Vec<(u64, u64)> = Vec::with_capacity(self.points.len());
        for point in &self.points {
            if !point.is_finite() {
                continue;
            }
            let key = (point.x.to_bits(), point.y.to_bits());
            if !seen.contains(&key) {
                seen.push(key);
            }
        }
        seen.len()
    }

    /// Returns the vertex centroid (arithmetic mean of the points).
    ///
    /// Returns `None` for an empty polygon.
    pub fn centroid(&self) -> Option<Coord<TSpace>> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Coord::new(sx / n, sy / n))
    }

    /// Returns a polygon with every vertex mapped through `f`.
    pub fn map_points(&self, f: impl Fn(Coord<TSpace>) -> Coord<TSpace>) -> Self {
        Self::new(self.points.iter().copied().map(f).collect())
    }
}

impl<TSpace> std::fmt::Debug for Polygon<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Polygon")
            .field("points", &self.points)
            .finish()
    }
}

impl<TSpace> Default for Polygon<TSpace> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

// Custom serde implementation to avoid TSpace: Serialize/Deserialize bounds
impl<TSpace> Serialize for Polygon<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Polygon", 1)?;
        state.serialize_field("points", &self.points)?;
        state.end()
    }
}

impl<'de, TSpace> Deserialize<'de> for Polygon<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(bound = "")]
        struct PolygonData<T> {
            points: Vec<Coord<T>>,
        }
        let data = PolygonData::deserialize(deserializer)?;
        Ok(Polygon::new(data.points))
    }
}

impl Polygon<Pixel> {
    /// Converts pixel vertices to normalized vertices against a canvas.
    pub fn to_normalized(&self, canvas: Canvas) -> Polygon<Normalized> {
        Polygon::new(
            self.points
                .iter()
                .map(|p| Coord::new(p.x / canvas.width, p.y / canvas.height))
                .collect(),
        )
    }

    /// Returns a copy with every vertex clamped to the canvas.
    pub fn clamp_to(&self, canvas: Canvas) -> Polygon<Pixel> {
        self.map_points(|p| p.clamped(canvas.width, canvas.height))
    }
}

impl Polygon<Normalized> {
    /// Converts normalized vertices to pixel vertices against a canvas.
    pub fn to_pixel(&self, canvas: Canvas) -> Polygon<Pixel> {
        Polygon::new(
            self.points
                .iter()
                .map(|p| Coord::new(p.x * canvas.width, p.y * canvas.height))
                .collect(),
        )
    }
}
