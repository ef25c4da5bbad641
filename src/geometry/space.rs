//! Coordinate space marker types.
//!
//! These are zero-sized types (ZSTs) used as type parameters to distinguish
//! between different coordinate systems at compile time.

use std::fmt;

/// Marker type for pixel coordinates (absolute values).
///
/// Pixel coordinates are absolute positions within the current working
/// canvas, where (0, 0) is the top-left corner. The canvas may change size
/// mid-pipeline (resize and crop stages), so "pixel" always means pixels of
/// the canvas a value was last transformed against.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Marker type for normalized coordinates (0.0 to 1.0).
///
/// Normalized coordinates represent positions as fractions of the canvas
/// dimensions, making them resolution-independent. YOLO label lines are
/// written in this space.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since Pixel has no variants
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since Normalized has no variants
    }
}
