//! Canonical geometry types for the transform pipeline.
//!
//! This module defines the format-agnostic values every pipeline stage
//! operates on: typed coordinates, bounding boxes, polygons, the tagged
//! [`Shape`] that unifies them, and the [`Canvas`] the engine threads
//! through a transform sequence.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: marker types prevent mixing pixel and normalized
//!    coordinates at compile time.
//!
//! 2. **Canonical Format**: the engine works exclusively in pixel-space
//!    XYXY boxes and pixel-space vertex lists; normalization happens once,
//!    at encoding.
//!
//! 3. **Permissive Construction**: degenerate geometry (zero-area boxes,
//!    two-vertex polygons) can be represented mid-computation, so the engine
//!    can detect and drop it rather than panic inside point math.

mod bbox;
mod canvas;
mod coord;
mod polygon;
mod shape;
mod space;

// Re-export core types for convenient access
pub use bbox::BBoxXYXY;
pub use canvas::Canvas;
pub use coord::Coord;
pub use polygon::Polygon;
pub use shape::{LabeledShape, Shape};
pub use space::{Normalized, Pixel};
