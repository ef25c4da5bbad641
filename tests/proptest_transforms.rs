//! Property tests for the transform engine and encoder.

use labelwarp::encode::detection_line;
use labelwarp::geometry::{LabeledShape, Shape};
use labelwarp::transform::{
    apply_steps, final_canvas, CropParams, ResizeMode, ResizeParams, Step,
};
use proptest::prelude::*;

mod proptest_helpers;

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (-180.0..180.0f64).prop_map(|angle| Step::Rotate { angle }),
        (any::<bool>(), any::<bool>()).prop_map(|(horizontal, vertical)| Step::Flip {
            horizontal,
            vertical
        }),
        (-60.0..60.0f64).prop_map(|angle| Step::Shear { angle }),
        (50.0..200.0f64, 50.0..200.0f64).prop_map(|(width, height)| {
            Step::Resize(ResizeParams {
                width,
                height,
                mode: ResizeMode::StretchTo,
            })
        }),
    ]
}

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn horizontal_flip_is_an_involution(bbox in proptest_helpers::arb_pixel_box()) {
        let canvas = proptest_helpers::canvas();
        let flip = Step::Flip { horizontal: true, vertical: false };
        let labeled = LabeledShape::boxed(0, bbox);

        let once = apply_steps(labeled.clone(), canvas, std::slice::from_ref(&flip))
            .expect("flip keeps a live box");
        let twice = apply_steps(once, canvas, std::slice::from_ref(&flip))
            .expect("second flip keeps it too");

        let Shape::Box(result) = twice.shape else { panic!("expected box") };
        let res = proptest_helpers::assert_box_close(&result, &bbox, 1e-9);
        prop_assert!(res.is_ok(), "{}", res.unwrap_err());
    }

    #[test]
    fn rotate_by_zero_is_the_identity(bbox in proptest_helpers::arb_pixel_box()) {
        let canvas = proptest_helpers::canvas();
        let steps = vec![Step::Rotate { angle: 0.0 }];
        let out = apply_steps(LabeledShape::boxed(0, bbox), canvas, &steps)
            .expect("zero rotation keeps a live box");

        let Shape::Box(result) = out.shape else { panic!("expected box") };
        let res = proptest_helpers::assert_box_close(&result, &bbox, 1e-9);
        prop_assert!(res.is_ok(), "{}", res.unwrap_err());
    }

    #[test]
    fn polygon_rotation_reverses_exactly(
        polygon in proptest_helpers::arb_triangle(),
        angle in -180.0..180.0f64,
    ) {
        // Polygon vertices are never hulled or clamped mid-pipeline, so a
        // rotation and its inverse must cancel.
        let canvas = proptest_helpers::canvas();
        let steps = vec![Step::Rotate { angle }, Step::Rotate { angle: -angle }];
        let out = apply_steps(LabeledShape::polygon(0, polygon.clone()), canvas, &steps)
            .expect("rotations keep the polygon");

        let Shape::Polygon(result) = out.shape else { panic!("expected polygon") };
        for (before, after) in polygon.points.iter().zip(&result.points) {
            prop_assert!((before.x - after.x).abs() < 1e-6);
            prop_assert!((before.y - after.y).abs() < 1e-6);
        }
    }

    #[test]
    fn surviving_boxes_stay_on_the_final_canvas(
        bbox in proptest_helpers::arb_pixel_box(),
        steps in proptest::collection::vec(arb_step(), 0..4),
    ) {
        let canvas = proptest_helpers::canvas();
        if let Ok(out) = apply_steps(LabeledShape::boxed(0, bbox), canvas, &steps) {
            let end = final_canvas(canvas, &steps);
            let Shape::Box(result) = out.shape else { panic!("expected box") };
            prop_assert!(result.has_area());
            prop_assert!(result.xmin() >= 0.0 && result.xmax() <= end.width + 1e-9);
            prop_assert!(result.ymin() >= 0.0 && result.ymax() <= end.height + 1e-9);
        }
    }

    #[test]
    fn cropped_boxes_fit_the_crop_window(bbox in proptest_helpers::arb_pixel_box()) {
        let canvas = proptest_helpers::canvas();
        let steps = vec![Step::Crop(CropParams {
            left: 25.0,
            top: 25.0,
            width: 50.0,
            height: 50.0,
        })];
        if let Ok(out) = apply_steps(LabeledShape::boxed(0, bbox), canvas, &steps) {
            let Shape::Box(result) = out.shape else { panic!("expected box") };
            prop_assert!(result.xmin() >= 0.0 && result.xmax() <= 50.0);
            prop_assert!(result.ymin() >= 0.0 && result.ymax() <= 50.0);
        }
    }

    #[test]
    fn detection_lines_are_normalized_and_faithful(bbox in proptest_helpers::arb_pixel_box()) {
        let canvas = proptest_helpers::canvas();
        let line = detection_line(&LabeledShape::boxed(3, bbox), canvas, None)
            .expect("live box encodes");

        let tokens: Vec<&str> = line.split_whitespace().collect();
        prop_assert_eq!(tokens.len(), 5);
        prop_assert_eq!(tokens[0], "3");

        let values: Vec<f64> = tokens[1..]
            .iter()
            .map(|t| t.parse().expect("float token"))
            .collect();
        for value in &values {
            prop_assert!((0.0..=1.0).contains(value), "{} out of range", value);
        }

        // Six decimal places: each value is within 5e-7 of the exact ratio.
        let (cx, cy, w, h) = bbox.to_cxcywh();
        prop_assert!((values[0] - cx / 100.0).abs() < 1e-6);
        prop_assert!((values[1] - cy / 100.0).abs() < 1e-6);
        prop_assert!((values[2] - w / 100.0).abs() < 1e-6);
        prop_assert!((values[3] - h / 100.0).abs() < 1e-6);
    }
}
