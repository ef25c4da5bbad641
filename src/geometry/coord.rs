//! Typed coordinate values using PhantomData for compile-time safety.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// A 2D coordinate with a type-level marker for the coordinate space.
///
/// The `TSpace` parameter should be either [`Pixel`](super::Pixel) or
/// [`Normalized`](super::Normalized), ensuring that coordinates from
/// different spaces cannot be accidentally mixed.
#[derive(PartialEq)]
pub struct Coord<TSpace> {
    pub x: f64,
    pub y: f64,
    _space: PhantomData<TSpace>,
}

// Manual Clone/Copy to avoid the implicit `TSpace: Clone`/`TSpace: Copy`
// bounds that `#[derive(...)]` would add (mirrors the serde impls below).
impl<TSpace> Clone for Coord<TSpace> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<TSpace> Copy for Coord<TSpace> {}

impl<TSpace> Coord<TSpace> {
    /// Creates a new coordinate with the given x and y values.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            _space: PhantomData,
        }
    }

    /// Returns true if both coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Returns a copy with both components clamped to the given ranges.
    #[inline]
    pub fn clamped(&self, max_x: f64, max_y: f64) -> Self {
        Self::new(self.x.clamp(0.0, max_x), self.y.clamp(0.0, max_y))
    }
}

impl<TSpace> std::fmt::Debug for Coord<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coord")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

impl<TSpace> Default for Coord<TSpace> {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

// Custom serde implementation to avoid TSpace: Serialize/Deserialize bounds
impl<TSpace> Serialize for Coord<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Coord", 2)?;
        state.serialize_field("x", &self.x)?;
        state.serialize_field("y", &self.y)?;
        state.end()
    }
}

impl<'de, TSpace> Deserialize<'de> for Coord<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct CoordData {
            x: f64,
            y: f64,
        }
        let data = CoordData::deserialize(deserializer)?;
        Ok(Coord::new(data.x, data.y))
    }
}
