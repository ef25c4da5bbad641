//! Shear stage: horizontal shear along x.

use crate::geometry::{Canvas, Coord, Shape};

use super::{rebuild_box, rebuild_polygon, DropKind};

pub(super) fn apply(shape: Shape, canvas: Canvas, angle: f64) -> Result<Shape, DropKind> {
    let slope = angle.to_radians().tan();
    let map = move |p: Coord<_>| Coord::new(p.x + p.y * slope, p.y);
    match shape {
        Shape::Box(bbox) => rebuild_box(bbox, canvas, map),
        Shape::Polygon(ref polygon) => rebuild_polygon(polygon, map),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BBoxXYXY, Polygon};

    #[test]
    fn zero_shear_is_identity() {
        let canvas = Canvas::new(100.0, 100.0);
        let original = Shape::Box(BBoxXYXY::from_xyxy(10.0, 20.0, 40.0, 60.0));
        let out = apply(original.clone(), canvas, 0.0).expect("kept");
        assert_eq!(out, original);
    }

    #[test]
    fn shear_slants_x_by_y() {
        let canvas = Canvas::new(200.0, 100.0);
        let shape = Shape::Box(BBoxXYXY::from_xyxy(10.0, 10.0, 50.0, 50.0));
        let Shape::Box(bbox) = apply(shape, canvas, 45.0).expect("kept") else {
            panic!("expected box");
        };
        // tan(45) = 1: the top edge moves by 10, the bottom edge by 50.
        assert!((bbox.xmin() - 20.0).abs() < 1e-9);
        assert!((bbox.xmax() - 100.0).abs() < 1e-9);
        assert_eq!(bbox.ymin(), 10.0);
        assert_eq!(bbox.ymax(), 50.0);
    }

    #[test]
    fn negative_shear_clamps_at_the_left_edge() {
        let canvas = Canvas::new(100.0, 100.0);
        let shape = Shape::Box(BBoxXYXY::from_xyxy(10.0, 40.0, 60.0, 80.0));
        let Shape::Box(bbox) = apply(shape, canvas, -45.0).expect("kept") else {
            panic!("expected box");
        };
        // The left corners shear far off-canvas and clamp to 0; the
        // (60, 40) corner keeps the box alive at x = 20.
        assert_eq!(bbox.xmin(), 0.0);
        assert!((bbox.xmax() - 20.0).abs() < 1e-9);
        assert_eq!(bbox.ymax(), 80.0);
    }

    #[test]
    fn polygon_vertices_shear_without_clamping() {
        let canvas = Canvas::new(100.0, 100.0);
        let polygon = Polygon::from_flat(&[10.0, 10.0, 50.0, 10.0, 30.0, 90.0]).unwrap();
        let Shape::Polygon(out) = apply(Shape::Polygon(polygon), canvas, 45.0).expect("kept")
        else {
            panic!("expected polygon");
        };
        assert!((out.points[2].x - 120.0).abs() < 1e-9);
        assert_eq!(out.points[2].y, 90.0);
    }
}
