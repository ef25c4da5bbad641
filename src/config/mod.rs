//! Transform configuration ingestion and execution ordering.
//!
//! Configs arrive as a map of transform-name to parameter object, from JSON
//! or YAML. This module is the single place where legacy spellings are
//! rewritten (`mode` vs `resize_mode`, `rotate` vs `rotation_angle`,
//! percent vs fractional shifts) so the engine only ever sees one canonical
//! representation, and where the fixed execution order is decided.
//!
//! The order is not user-controlled: the label pipeline must replay the
//! exact operation order the image side uses, or pixel content and label
//! boxes silently diverge.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::LabelwarpError;
use crate::pipeline::report::{EntryCode, EntryContext, ReportEntry, TransformReport};
use crate::transform::{
    AffineParams, CropParams, PassthroughKind, ResizeMode, ResizeParams, Step,
};

/// Coordinate-affecting transforms, in execution order.
///
/// Resize always runs first so every later stage sees the resized canvas;
/// the trailing entries are canonical regardless of config-map ordering.
const COORDINATE_ORDER: [&str; 9] = [
    "resize",
    "rotate",
    "flip",
    "crop",
    "affine",
    "perspective",
    "shear",
    "cutout",
    "random_zoom",
];

/// Transforms that only touch pixel content; this layer ignores them.
const PIXEL_ONLY: [&str; 8] = [
    "brightness",
    "blur",
    "noise",
    "color_jitter",
    "grayscale",
    "gamma",
    "equalize",
    "clahe",
];

/// A parsed-but-not-yet-canonicalized transform configuration.
#[derive(Clone, Debug, Default)]
pub struct TransformConfig {
    entries: serde_json::Map<String, Value>,
}

impl TransformConfig {
    /// Creates an empty configuration (no transforms enabled).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a config from an in-memory JSON value.
    ///
    /// The value must be an object mapping transform names to parameter
    /// objects.
    pub fn from_value(value: Value) -> Result<Self, LabelwarpError> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(LabelwarpError::ConfigParse {
                path: "<value>".into(),
                message: format!("expected an object of transforms, found {}", json_kind(&other)),
            }),
        }
    }

    /// Parses a JSON config string.
    pub fn from_json_str(raw: &str) -> Result<Self, LabelwarpError> {
        let value: Value = serde_json::from_str(raw).map_err(|e| LabelwarpError::ConfigParse {
            path: "<json>".into(),
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    /// Parses a YAML config string.
    pub fn from_yaml_str(raw: &str) -> Result<Self, LabelwarpError> {
        let value: Value = serde_yaml::from_str(raw).map_err(|e| LabelwarpError::ConfigParse {
            path: "<yaml>".into(),
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    /// Loads a config file, dispatching on the extension.
    pub fn from_file(path: &Path) -> Result<Self, LabelwarpError> {
        let raw = fs::read_to_string(path).map_err(LabelwarpError::Io)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let parsed = match ext.as_str() {
            "json" => Self::from_json_str(&raw),
            "yaml" | "yml" => Self::from_yaml_str(&raw),
            other => {
                return Err(LabelwarpError::UnsupportedFormat(format!(
                    "config extension '{}' (supported: json, yaml, yml)",
                    other
                )))
            }
        };
        parsed.map_err(|e| match e {
            LabelwarpError::ConfigParse { message, .. } => LabelwarpError::ConfigParse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Returns the raw parameter object for a transform, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Resolves the ordered, canonicalized steps this config enables.
    ///
    /// Unknown transform names and pixel-only transforms produce no step;
    /// unknown names additionally record a report warning. Invalid
    /// parameter values are config errors that abort the whole plan.
    pub fn execution_order(
        &self,
        report: &mut TransformReport,
    ) -> Result<Vec<Step>, LabelwarpError> {
        let mut steps = Vec::new();

        for name in COORDINATE_ORDER {
            let Some(params) = self.entries.get(name) else {
                continue;
            };
            if !entry_enabled(params) {
                continue;
            }
            if let Some(step) = canonicalize(name, params, report)? {
                steps.push(step);
            }
        }

        for name in self.entries.keys() {
            if COORDINATE_ORDER.contains(&name.as_str()) || PIXEL_ONLY.contains(&name.as_str()) {
                continue;
            }
            report.add(ReportEntry::warning(
                EntryCode::UnknownTransform,
                format!("transform '{}' is not recognized and was skipped", name),
                EntryContext::Config,
            ));
        }

        Ok(steps)
    }
}

fn entry_enabled(params: &Value) -> bool {
    params
        .get("enabled")
        .and_then(Value::as_bool)
        .unwrap_or(true)
}

fn canonicalize(
    name: &str,
    params: &Value,
    report: &mut TransformReport,
) -> Result<Option<Step>, LabelwarpError> {
    match name {
        "resize" => canonicalize_resize(params, report).map(Some),
        "rotate" => {
            let angle = require_f64(name, params, "angle")?;
            Ok(Some(Step::Rotate { angle }))
        }
        "flip" => Ok(Some(Step::Flip {
            horizontal: optional_bool(params, "horizontal"),
            vertical: optional_bool(params, "vertical"),
        })),
        "crop" => canonicalize_crop(params).map(Some),
        "affine" => canonicalize_affine(params, report).map(Some),
        "perspective" => Ok(Some(Step::Passthrough {
            name: PassthroughKind::Perspective,
        })),
        "shear" => {
            let angle = require_f64(name, params, "angle")?;
            if angle.abs() >= 90.0 {
                return Err(LabelwarpError::ConfigInvalid {
                    transform: name.to_string(),
                    message: format!("shear angle {} must lie strictly inside (-90, 90)", angle),
                });
            }
            Ok(Some(Step::Shear { angle }))
        }
        "cutout" => Ok(Some(Step::Passthrough {
            name: PassthroughKind::Cutout,
        })),
        "random_zoom" => Ok(Some(Step::Passthrough {
            name: PassthroughKind::RandomZoom,
        })),
        _ => Ok(None),
    }
}

fn canonicalize_resize(
    params: &Value,
    report: &mut TransformReport,
) -> Result<Step, LabelwarpError> {
    let width = require_f64("resize", params, "width")?;
    let height = require_f64("resize", params, "height")?;
    if width <= 0.0 || height <= 0.0 {
        return Err(LabelwarpError::ConfigInvalid {
            transform: "resize".to_string(),
            message: format!("target {}x{} must be positive", width, height),
        });
    }

    let mode_name = match params.get("resize_mode") {
        Some(value) => require_str("resize", "resize_mode", value)?,
        None => match params.get("mode") {
            // Legacy spelling: rewrite once, here.
            Some(value) => {
                let mode = require_str("resize", "mode", value)?;
                report.add(ReportEntry::info(
                    EntryCode::AliasCanonicalized,
                    "resize parameter 'mode' was read as 'resize_mode'",
                    EntryContext::Config,
                ));
                mode
            }
            None => "stretch_to",
        },
    };

    let mode = ResizeMode::parse(mode_name).ok_or_else(|| LabelwarpError::ConfigInvalid {
        transform: "resize".to_string(),
        message: format!("unknown resize_mode '{}'", mode_name),
    })?;

    if mode == ResizeMode::FillCenterCrop {
        report.add(ReportEntry::warning(
            EntryCode::FillCenterCropOffsetSkipped,
            "fill_center_crop does not shift coordinates by the centering crop; \
             labels may desync from pixels for this stage",
            EntryContext::Config,
        ));
    }

    Ok(Step::Resize(ResizeParams {
        width,
        height,
        mode,
    }))
}

fn canonicalize_crop(params: &Value) -> Result<Step, LabelwarpError> {
    let left = optional_f64("crop", params, "left")?.unwrap_or(0.0);
    let top = optional_f64("crop", params, "top")?.unwrap_or(0.0);
    let width = require_f64("crop", params, "width")?;
    let height = require_f64("crop", params, "height")?;

    if !(0.0..100.0).contains(&left) || !(0.0..100.0).contains(&top) {
        return Err(LabelwarpError::ConfigInvalid {
            transform: "crop".to_string(),
            message: format!("window origin ({}, {}) must lie in [0, 100)", left, top),
        });
    }
    if !(0.0..=100.0).contains(&width)
        || !(0.0..=100.0).contains(&height)
        || width == 0.0
        || height == 0.0
    {
        return Err(LabelwarpError::ConfigInvalid {
            transform: "crop".to_string(),
            message: format!("window size {}x{} must lie in (0, 100]", width, height),
        });
    }

    Ok(Step::Crop(CropParams {
        left,
        top,
        width,
        height,
    }))
}

fn canonicalize_affine(
    params: &Value,
    report: &mut TransformReport,
) -> Result<Step, LabelwarpError> {
    let rotation_angle = match params.get("rotation_angle") {
        Some(_) => require_f64("affine", params, "rotation_angle")?,
        None => match params.get("rotate") {
            // Legacy spelling: rewrite once, here.
            Some(value) => {
                let angle = require_f64_value("affine", "rotate", value)?;
                report.add(ReportEntry::info(
                    EntryCode::AliasCanonicalized,
                    "affine parameter 'rotate' was read as 'rotation_angle'",
                    EntryContext::Config,
                ));
                angle
            }
            None => 0.0,
        },
    };

    let scale_factor = optional_f64("affine", params, "scale_factor")?.unwrap_or(1.0);
    if scale_factor <= 0.0 {
        return Err(LabelwarpError::ConfigInvalid {
            transform: "affine".to_string(),
            message: format!("scale_factor {} must be positive", scale_factor),
        });
    }

    let horizontal_shift = canonical_shift(params, "horizontal_shift", report)?;
    let vertical_shift = canonical_shift(params, "vertical_shift", report)?;

    Ok(Step::Affine(AffineParams {
        rotation_angle,
        scale_factor,
        horizontal_shift,
        vertical_shift,
    }))
}

/// Resolves the legacy shift overload: magnitudes above 1 are percents in
/// `[-20, 20]` and become fractions; values in `[-1, 1]` pass through.
fn canonical_shift(
    params: &Value,
    key: &str,
    report: &mut TransformReport,
) -> Result<f64, LabelwarpError> {
    let Some(raw) = optional_f64("affine", params, key)? else {
        return Ok(0.0);
    };
    if raw.abs() <= 1.0 {
        return Ok(raw);
    }
    if raw.abs() > 20.0 {
        return Err(LabelwarpError::ConfigInvalid {
            transform: "affine".to_string(),
            message: format!("{} {} is outside both [-1, 1] and the legacy [-20, 20]", key, raw),
        });
    }
    report.add(ReportEntry::info(
        EntryCode::AliasCanonicalized,
        format!("affine {} {} was read as a legacy percent", key, raw),
        EntryContext::Config,
    ));
    Ok(raw / 100.0)
}

fn require_f64(transform: &str, params: &Value, key: &str) -> Result<f64, LabelwarpError> {
    match optional_f64(transform, params, key)? {
        Some(value) => Ok(value),
        None => Err(LabelwarpError::ConfigInvalid {
            transform: transform.to_string(),
            message: format!("missing required parameter '{}'", key),
        }),
    }
}

fn optional_f64(transform: &str, params: &Value, key: &str) -> Result<Option<f64>, LabelwarpError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => require_f64_value(transform, key, value).map(Some),
    }
}

fn require_f64_value(transform: &str, key: &str, value: &Value) -> Result<f64, LabelwarpError> {
    let number = value
        .as_f64()
        .ok_or_else(|| LabelwarpError::ConfigInvalid {
            transform: transform.to_string(),
            message: format!("parameter '{}' must be a number, found {}", key, json_kind(value)),
        })?;
    if !number.is_finite() {
        return Err(LabelwarpError::ConfigInvalid {
            transform: transform.to_string(),
            message: format!("parameter '{}' must be finite", key),
        });
    }
    Ok(number)
}

fn require_str<'v>(
    transform: &str,
    key: &str,
    value: &'v Value,
) -> Result<&'v str, LabelwarpError> {
    value.as_str().ok_or_else(|| LabelwarpError::ConfigInvalid {
        transform: transform.to_string(),
        message: format!("parameter '{}' must be a string, found {}", key, json_kind(value)),
    })
}

fn optional_bool(params: &Value, key: &str) -> bool {
    params.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Fuzz-only entrypoint for config parsing and ordering.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_config_str(input: &str) {
    if let Ok(config) = TransformConfig::from_json_str(input) {
        let mut report = TransformReport::new();
        let _ = config.execution_order(&mut report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_of(json: &str) -> (Vec<Step>, TransformReport) {
        let config = TransformConfig::from_json_str(json).expect("parse config");
        let mut report = TransformReport::new();
        let steps = config.execution_order(&mut report).expect("order config");
        (steps, report)
    }

    #[test]
    fn fixed_order_ignores_map_ordering() {
        let (steps, _) = order_of(
            r#"{
                "shear": {"enabled": true, "angle": 10.0},
                "flip": {"enabled": true, "horizontal": true},
                "resize": {"enabled": true, "width": 64, "height": 64, "resize_mode": "stretch_to"},
                "rotate": {"enabled": true, "angle": 90.0}
            }"#,
        );
        let names: Vec<_> = steps.iter().map(Step::name).collect();
        assert_eq!(names, vec!["resize", "rotate", "flip", "shear"]);
    }

    #[test]
    fn disabled_and_pixel_only_transforms_produce_no_steps() {
        let (steps, report) = order_of(
            r#"{
                "rotate": {"enabled": false, "angle": 90.0},
                "brightness": {"enabled": true, "factor": 1.4},
                "clahe": {"enabled": true}
            }"#,
        );
        assert!(steps.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn missing_enabled_counts_as_enabled() {
        let (steps, _) = order_of(r#"{"rotate": {"angle": 15.0}}"#);
        assert_eq!(steps, vec![Step::Rotate { angle: 15.0 }]);
    }

    #[test]
    fn unknown_transform_warns_but_does_not_fail() {
        let (steps, report) = order_of(r#"{"posterize": {"enabled": true}}"#);
        assert!(steps.is_empty());
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.entries[0].code, EntryCode::UnknownTransform);
    }

    #[test]
    fn legacy_resize_mode_key_is_canonicalized() {
        let (steps, report) = order_of(
            r#"{"resize": {"width": 100, "height": 50, "mode": "fit_within"}}"#,
        );
        assert_eq!(
            steps,
            vec![Step::Resize(ResizeParams {
                width: 100.0,
                height: 50.0,
                mode: ResizeMode::FitWithin,
            })]
        );
        assert!(report
            .entries
            .iter()
            .any(|e| e.code == EntryCode::AliasCanonicalized));
    }

    #[test]
    fn fill_center_crop_plan_carries_a_desync_warning() {
        let (_, report) = order_of(
            r#"{"resize": {"width": 100, "height": 100, "resize_mode": "fill_center_crop"}}"#,
        );
        assert!(report
            .entries
            .iter()
            .any(|e| e.code == EntryCode::FillCenterCropOffsetSkipped));
    }

    #[test]
    fn affine_legacy_rotate_key_and_percent_shift() {
        let (steps, report) = order_of(
            r#"{"affine": {"rotate": 12.0, "scale_factor": 1.5, "horizontal_shift": 10.0}}"#,
        );
        assert_eq!(
            steps,
            vec![Step::Affine(AffineParams {
                rotation_angle: 12.0,
                scale_factor: 1.5,
                horizontal_shift: 0.1,
                vertical_shift: 0.0,
            })]
        );
        // One rewrite for the key, one for the percent shift.
        assert_eq!(report.info_count(), 2);
    }

    #[test]
    fn fractional_shift_passes_through_unchanged() {
        let (steps, report) = order_of(r#"{"affine": {"horizontal_shift": -0.25}}"#);
        let Step::Affine(params) = &steps[0] else {
            panic!("expected affine");
        };
        assert_eq!(params.horizontal_shift, -0.25);
        assert_eq!(report.info_count(), 0);
    }

    #[test]
    fn out_of_range_shift_is_a_config_error() {
        let config =
            TransformConfig::from_json_str(r#"{"affine": {"horizontal_shift": 35.0}}"#).unwrap();
        let err = config
            .execution_order(&mut TransformReport::new())
            .unwrap_err();
        assert!(matches!(err, LabelwarpError::ConfigInvalid { .. }));
    }

    #[test]
    fn invalid_crop_window_is_a_config_error() {
        for bad in [
            r#"{"crop": {"left": 100.0, "top": 0.0, "width": 50.0, "height": 50.0}}"#,
            r#"{"crop": {"left": 0.0, "top": 0.0, "width": 0.0, "height": 50.0}}"#,
            r#"{"crop": {"left": 0.0, "top": 0.0, "width": 120.0, "height": 50.0}}"#,
        ] {
            let config = TransformConfig::from_json_str(bad).unwrap();
            let err = config
                .execution_order(&mut TransformReport::new())
                .unwrap_err();
            assert!(matches!(err, LabelwarpError::ConfigInvalid { .. }), "{}", bad);
        }
    }

    #[test]
    fn unknown_resize_mode_is_a_config_error() {
        let config = TransformConfig::from_json_str(
            r#"{"resize": {"width": 10, "height": 10, "resize_mode": "nearest"}}"#,
        )
        .unwrap();
        let err = config
            .execution_order(&mut TransformReport::new())
            .unwrap_err();
        assert!(matches!(err, LabelwarpError::ConfigInvalid { .. }));
    }

    #[test]
    fn non_object_config_is_a_parse_error() {
        let err = TransformConfig::from_json_str(r#"[1, 2, 3]"#).unwrap_err();
        assert!(matches!(err, LabelwarpError::ConfigParse { .. }));
    }

    #[test]
    fn yaml_configs_parse_like_json() {
        let config = TransformConfig::from_yaml_str(
            "flip:\n  enabled: true\n  horizontal: true\nrotate:\n  angle: 45.0\n",
        )
        .expect("parse yaml");
        let mut report = TransformReport::new();
        let steps = config.execution_order(&mut report).expect("order yaml");
        let names: Vec<_> = steps.iter().map(Step::name).collect();
        assert_eq!(names, vec!["rotate", "flip"]);
    }

    #[test]
    fn trailing_transforms_come_after_shear() {
        let (steps, _) = order_of(
            r#"{
                "random_zoom": {"enabled": true},
                "cutout": {"enabled": true},
                "shear": {"enabled": true, "angle": 5.0}
            }"#,
        );
        let names: Vec<_> = steps.iter().map(Step::name).collect();
        assert_eq!(names, vec!["shear", "cutout", "random_zoom"]);
    }
}
