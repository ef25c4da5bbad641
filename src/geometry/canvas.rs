//! The working canvas threaded through the transform engine.

use serde::{Deserialize, Serialize};

/// The size of the image the annotations currently live on.
///
/// The canvas starts as the original image dimensions and is updated only by
/// the resize and crop stages; every other stage leaves it untouched. It is
/// threaded by value through the pipeline, so no two annotations can observe
/// different canvases for the same stage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    /// Creates a canvas from explicit dimensions.
    #[inline]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Creates a canvas from integer image dimensions.
    #[inline]
    pub fn of_image(width: u32, height: u32) -> Self {
        Self::new(f64::from(width), f64::from(height))
    }

    /// Returns true if both dimensions are finite and strictly positive.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Returns the canvas aspect ratio (width / height).
    #[inline]
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Returns a canvas scaled per-axis by the given factors.
    #[inline]
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.width * sx, self.height * sy)
    }
}
