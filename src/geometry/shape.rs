//! The tagged shape value flowing through the pipeline.

use serde::{Deserialize, Serialize};

use super::bbox::BBoxXYXY;
use super::polygon::Polygon;
use super::Pixel;

/// Annotation geometry: either a bounding box or a polygon outline.
///
/// The variant is decided once, at the extraction boundary; every later
/// stage matches on it directly. There is no trait object or inheritance -
/// boxes and polygons are plain values with different degeneracy rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box(BBoxXYXY<Pixel>),
    Polygon(Polygon<Pixel>),
}

/// A shape paired with its class id: the unit the transform engine consumes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabeledShape {
    /// Class index of the annotation (non-negative).
    pub class_id: u32,

    /// The geometry in pixel coordinates of the current canvas.
    pub shape: Shape,
}

impl LabeledShape {
    /// Creates a labeled bounding box.
    pub fn boxed(class_id: u32, bbox: BBoxXYXY<Pixel>) -> Self {
        Self {
            class_id,
            shape: Shape::Box(bbox),
        }
    }

    /// Creates a labeled polygon.
    pub fn polygon(class_id: u32, polygon: Polygon<Pixel>) -> Self {
        Self {
            class_id,
            shape: Shape::Polygon(polygon),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_shape_constructors() {
        let boxed = LabeledShape::boxed(3, BBoxXYXY::from_xyxy(0.0, 0.0, 10.0, 10.0));
        assert_eq!(boxed.class_id, 3);
        assert!(matches!(boxed.shape, Shape::Box(_)));

        let poly = LabeledShape::polygon(1, Polygon::from_flat(&[0.0, 0.0, 1.0, 0.0, 1.0, 1.0]).unwrap());
        assert!(matches!(poly.shape, Shape::Polygon(ref p) if p.len() == 3));
    }
}
