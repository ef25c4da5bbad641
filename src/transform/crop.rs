//! Crop stage: percent window of the current canvas.

use serde::Serialize;

use crate::geometry::{Canvas, Coord, Shape};

use super::DropKind;

/// Crop window as percentages of the current canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CropParams {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CropParams {
    /// The window origin and size in pixels of the given canvas.
    fn window_px(&self, canvas: Canvas) -> (f64, f64, Canvas) {
        let left = self.left / 100.0 * canvas.width;
        let top = self.top / 100.0 * canvas.height;
        let cropped = Canvas::new(
            self.width / 100.0 * canvas.width,
            self.height / 100.0 * canvas.height,
        );
        (left, top, cropped)
    }
}

pub(super) fn canvas_after(canvas: Canvas, params: &CropParams) -> Canvas {
    let (_, _, cropped) = params.window_px(canvas);
    cropped
}

pub(super) fn apply(shape: Shape, canvas: Canvas, params: &CropParams) -> Result<Shape, DropKind> {
    let (left, top, cropped) = params.window_px(canvas);
    let map = |p: Coord<_>| Coord::new(p.x - left, p.y - top);

    match shape {
        Shape::Box(bbox) => {
            let moved = crate::geometry::BBoxXYXY::new(map(bbox.min), map(bbox.max));
            // Fully outside the window: nothing of the box survives.
            if moved.xmax() <= 0.0
                || moved.ymax() <= 0.0
                || moved.xmin() >= cropped.width
                || moved.ymin() >= cropped.height
            {
                return Err(DropKind::CroppedOut);
            }
            let clipped = moved.clamp_to(cropped);
            if !clipped.has_area() {
                return Err(DropKind::DegenerateBox);
            }
            Ok(Shape::Box(clipped))
        }
        Shape::Polygon(ref polygon) => {
            // Translate and clip; vertices collapsing onto the window border
            // may leave fewer than three distinct points.
            let clipped = polygon.map_points(map).clamp_to(cropped);
            if clipped.distinct_finite_points() < 3 {
                return Err(DropKind::DegeneratePolygon);
            }
            Ok(Shape::Polygon(clipped))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BBoxXYXY, Polygon};

    fn center_window() -> CropParams {
        CropParams {
            left: 25.0,
            top: 25.0,
            width: 50.0,
            height: 50.0,
        }
    }

    #[test]
    fn crop_translates_and_updates_canvas() {
        let canvas = Canvas::new(100.0, 100.0);
        assert_eq!(
            canvas_after(canvas, &center_window()),
            Canvas::new(50.0, 50.0)
        );

        let shape = Shape::Box(BBoxXYXY::from_xyxy(30.0, 30.0, 60.0, 60.0));
        let Shape::Box(bbox) = apply(shape, canvas, &center_window()).expect("kept") else {
            panic!("expected box");
        };
        assert_eq!(
            (bbox.xmin(), bbox.ymin(), bbox.xmax(), bbox.ymax()),
            (5.0, 5.0, 35.0, 35.0)
        );
    }

    #[test]
    fn partially_covered_box_is_clipped() {
        let canvas = Canvas::new(100.0, 100.0);
        let shape = Shape::Box(BBoxXYXY::from_xyxy(10.0, 10.0, 40.0, 40.0));
        let Shape::Box(bbox) = apply(shape, canvas, &center_window()).expect("kept") else {
            panic!("expected box");
        };
        // Only the (25,25)-(40,40) part survives, re-rooted at the window.
        assert_eq!(
            (bbox.xmin(), bbox.ymin(), bbox.xmax(), bbox.ymax()),
            (0.0, 0.0, 15.0, 15.0)
        );
    }

    #[test]
    fn box_fully_outside_window_is_dropped() {
        let canvas = Canvas::new(100.0, 100.0);
        let window = CropParams {
            left: 60.0,
            top: 60.0,
            width: 30.0,
            height: 30.0,
        };
        let shape = Shape::Box(BBoxXYXY::from_xyxy(0.0, 0.0, 10.0, 10.0));
        assert_eq!(
            apply(shape, canvas, &window).unwrap_err(),
            DropKind::CroppedOut
        );
    }

    #[test]
    fn polygon_collapsing_in_window_is_dropped() {
        let canvas = Canvas::new(100.0, 100.0);
        // Entirely left of the window: every vertex clamps onto the
        // window's left edge corner-to-corner.
        let polygon = Polygon::from_flat(&[0.0, 0.0, 10.0, 0.0, 5.0, 10.0]).unwrap();
        assert_eq!(
            apply(Shape::Polygon(polygon), canvas, &center_window()).unwrap_err(),
            DropKind::DegeneratePolygon
        );
    }

    #[test]
    fn polygon_straddling_window_is_clipped_but_kept() {
        let canvas = Canvas::new(100.0, 100.0);
        let polygon = Polygon::from_flat(&[20.0, 30.0, 60.0, 30.0, 60.0, 70.0, 20.0, 70.0]).unwrap();
        let Shape::Polygon(out) =
            apply(Shape::Polygon(polygon), canvas, &center_window()).expect("kept")
        else {
            panic!("expected polygon");
        };
        assert_eq!(out.len(), 4);
        assert!(out.points.iter().all(|p| p.x >= 0.0 && p.x <= 50.0));
    }
}
