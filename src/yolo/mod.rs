//! Ultralytics-style YOLO dataset directories for the CLI.
//!
//! This module handles the filesystem side the core pipeline stays out of:
//! discovering `images/` + `labels/` trees, resolving the class map from
//! `data.yaml` / `classes.txt` (or inferring one from the labels), reading
//! per-image dimensions, and parsing/writing label files. Parsed rows come
//! back as [`RawAnnotation`] values ready for extraction; both detection
//! rows (5 tokens) and segmentation rows (class plus at least 6
//! coordinates) are accepted.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::LabelwarpError;
use crate::extract::RawAnnotation;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "png", "jpeg", "bmp", "webp"];
const LABEL_EXTENSION: &str = "txt";

/// A discovered dataset directory.
#[derive(Clone, Debug)]
pub struct DatasetLayout {
    pub root: PathBuf,
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
    class_map_source: ClassMapSource,
}

#[derive(Clone, Debug)]
enum ClassMapSource {
    DataYaml(PathBuf),
    ClassesTxt(PathBuf),
    Inferred,
}

/// Class index to name mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassMap {
    pub names: Vec<String>,
}

impl ClassMap {
    /// Number of classes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no classes are known.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One image of the dataset, with its dimensions.
#[derive(Clone, Debug)]
pub struct ImageEntry {
    /// Path relative to `images/`, with forward slashes.
    pub rel_path: String,
    pub image_path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Locates the `images/` and `labels/` trees under `input`.
///
/// `input` may be the dataset root containing both, or the `labels/`
/// directory itself.
pub fn discover_layout(input: &Path) -> Result<DatasetLayout, LabelwarpError> {
    if !input.is_dir() {
        return Err(LabelwarpError::DatasetLayoutInvalid {
            path: input.to_path_buf(),
            message: "input must be a directory".to_string(),
        });
    }

    let (root, labels_dir) = if input.join("labels").is_dir() {
        (input.to_path_buf(), input.join("labels"))
    } else if is_dir_named(input, "labels") {
        let root = input
            .parent()
            .ok_or_else(|| LabelwarpError::DatasetLayoutInvalid {
                path: input.to_path_buf(),
                message: "labels directory has no parent directory".to_string(),
            })?
            .to_path_buf();
        (root, input.to_path_buf())
    } else {
        return Err(LabelwarpError::DatasetLayoutInvalid {
            path: input.to_path_buf(),
            message: "expected a dataset root containing labels/ or a labels/ directory itself"
                .to_string(),
        });
    };

    let images_dir = root.join("images");
    if !images_dir.is_dir() {
        return Err(LabelwarpError::DatasetLayoutInvalid {
            path: images_dir,
            message: "missing images/ directory".to_string(),
        });
    }

    let data_yaml = root.join("data.yaml");
    let classes_txt = root.join("classes.txt");
    let class_map_source = if data_yaml.is_file() {
        ClassMapSource::DataYaml(data_yaml)
    } else if classes_txt.is_file() {
        ClassMapSource::ClassesTxt(classes_txt)
    } else {
        ClassMapSource::Inferred
    };

    Ok(DatasetLayout {
        root,
        images_dir,
        labels_dir,
        class_map_source,
    })
}

/// Resolves the class map for a layout.
///
/// `data.yaml` wins over `classes.txt`; with neither present, names are
/// inferred as `class_N` from the ids the label files actually use.
pub fn read_class_map(layout: &DatasetLayout) -> Result<ClassMap, LabelwarpError> {
    match &layout.class_map_source {
        ClassMapSource::DataYaml(path) => read_data_yaml_names(path),
        ClassMapSource::ClassesTxt(path) => read_classes_txt(path),
        ClassMapSource::Inferred => infer_class_map(&layout.labels_dir),
    }
}

/// Collects every image under `images/`, sorted by relative path, with
/// dimensions read from the file headers.
pub fn collect_images(layout: &DatasetLayout) -> Result<Vec<ImageEntry>, LabelwarpError> {
    let mut image_files = collect_files_with_extensions(&layout.images_dir, &IMAGE_EXTENSIONS)?;
    image_files.sort_by_cached_key(|image_path| rel_string(&layout.images_dir, image_path));

    let mut entries = Vec::with_capacity(image_files.len());
    for image_path in image_files {
        let (width, height) = read_image_dimensions(&image_path)?;
        entries.push(ImageEntry {
            rel_path: rel_string(&layout.images_dir, &image_path),
            image_path,
            width,
            height,
        });
    }
    Ok(entries)
}

/// The label file an image's annotations live in (which may not exist).
pub fn label_path_for(layout: &DatasetLayout, entry: &ImageEntry) -> PathBuf {
    layout
        .labels_dir
        .join(&entry.rel_path)
        .with_extension(LABEL_EXTENSION)
}

/// Reads one label file into raw annotation records.
///
/// A missing file is an image with no annotations, not an error. With
/// `class_count` supplied, out-of-range class ids are parse errors.
pub fn read_labels(
    path: &Path,
    class_count: Option<usize>,
) -> Result<Vec<RawAnnotation>, LabelwarpError> {
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(LabelwarpError::Io)?;
    let mut annotations = Vec::new();

    for (line_idx, line) in content.lines().enumerate() {
        let line_num = line_idx + 1;
        let Some(row) = parse_label_line(line, path, line_num)? else {
            continue;
        };

        if let Some(count) = class_count {
            if row.class_id() >= count {
                return Err(LabelwarpError::LabelParse {
                    path: path.to_path_buf(),
                    line: line_num,
                    message: format!(
                        "class_id {} is out of range for class map with {} class(es)",
                        row.class_id(),
                        count
                    ),
                });
            }
        }

        annotations.push(row.into_raw());
    }

    Ok(annotations)
}

/// Writes one label file, creating parent directories.
pub fn write_labels(path: &Path, lines: &[String]) -> Result<(), LabelwarpError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(LabelwarpError::Io)?;
    }
    let mut file = fs::File::create(path).map_err(|source| LabelwarpError::LabelWrite {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;
    for line in lines {
        writeln!(file, "{}", line).map_err(LabelwarpError::Io)?;
    }
    Ok(())
}

/// Writes `data.yaml` with an index-to-name mapping.
pub fn write_data_yaml(output_root: &Path, names: &[String]) -> Result<(), LabelwarpError> {
    let mut yaml = String::from("names:\n");
    for (idx, name) in names.iter().enumerate() {
        yaml.push_str(&format!("  {}: {}\n", idx, yaml_single_quoted(name)));
    }

    let path = output_root.join("data.yaml");
    fs::write(&path, yaml).map_err(LabelwarpError::Io)
}

fn yaml_single_quoted(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}

/// One parsed label row.
#[derive(Debug, PartialEq)]
enum LabelRow {
    Detection {
        class_id: usize,
        cx: f64,
        cy: f64,
        w: f64,
        h: f64,
    },
    Segmentation {
        class_id: usize,
        coords: Vec<f64>,
    },
}

impl LabelRow {
    fn class_id(&self) -> usize {
        match self {
            LabelRow::Detection { class_id, .. } | LabelRow::Segmentation { class_id, .. } => {
                *class_id
            }
        }
    }

    /// Converts the row into a raw record for the extraction stage.
    ///
    /// Label rows are normalized by definition; stray values clamp into
    /// `[0, 1]` so extraction reads them as normalized.
    fn into_raw(self) -> RawAnnotation {
        match self {
            LabelRow::Detection {
                class_id,
                cx,
                cy,
                w,
                h,
            } => RawAnnotation::with_box(
                class_id as u32,
                (cx - w / 2.0).clamp(0.0, 1.0),
                (cy - h / 2.0).clamp(0.0, 1.0),
                (cx + w / 2.0).clamp(0.0, 1.0),
                (cy + h / 2.0).clamp(0.0, 1.0),
            ),
            LabelRow::Segmentation { class_id, coords } => {
                let pairs = coords
                    .chunks_exact(2)
                    .map(|c| [c[0].clamp(0.0, 1.0), c[1].clamp(0.0, 1.0)])
                    .collect();
                RawAnnotation::with_points(class_id as u32, pairs)
            }
        }
    }
}

fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<LabelRow>, LabelwarpError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();

    let class_id = tokens[0]
        .parse::<usize>()
        .map_err(|_| LabelwarpError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!(
                "invalid class_id '{}'; expected non-negative integer",
                tokens[0]
            ),
        })?;

    match tokens.len() {
        5 => {
            let cx = parse_f64_token(tokens[1], "x_center", file_path, line_num)?;
            let cy = parse_f64_token(tokens[2], "y_center", file_path, line_num)?;
            let w = parse_f64_token(tokens[3], "width", file_path, line_num)?;
            let h = parse_f64_token(tokens[4], "height", file_path, line_num)?;
            Ok(Some(LabelRow::Detection {
                class_id,
                cx,
                cy,
                w,
                h,
            }))
        }
        // Segmentation: class plus an even run of at least 3 vertices.
        n if n >= 7 && (n - 1) % 2 == 0 => {
            let mut coords = Vec::with_capacity(tokens.len() - 1);
            for token in &tokens[1..] {
                coords.push(parse_f64_token(token, "coordinate", file_path, line_num)?);
            }
            Ok(Some(LabelRow::Segmentation { class_id, coords }))
        }
        n => Err(LabelwarpError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!(
                "expected 5 tokens (detection) or class plus an even count of at least 6 \
                 coordinates (segmentation), found {} token(s)",
                n
            ),
        }),
    }
}

/// Fuzz-only entrypoint for label-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Result<(), LabelwarpError> {
    let _ = parse_label_line(input, Path::new("<fuzz>"), 1)?;
    Ok(())
}

fn parse_f64_token(
    raw: &str,
    field_name: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<f64, LabelwarpError> {
    raw.parse::<f64>().map_err(|_| LabelwarpError::LabelParse {
        path: file_path.to_path_buf(),
        line: line_num,
        message: format!("invalid {field_name} '{raw}'; expected floating-point number"),
    })
}

#[derive(Debug, Deserialize)]
struct DataYaml {
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

fn read_data_yaml_names(path: &Path) -> Result<ClassMap, LabelwarpError> {
    let data = fs::read_to_string(path).map_err(LabelwarpError::Io)?;
    let parsed: DataYaml =
        serde_yaml::from_str(&data).map_err(|source| LabelwarpError::DataYamlParse {
            path: path.to_path_buf(),
            source,
        })?;

    let names = match parsed.names {
        DataYamlNames::Sequence(names) => names,
        DataYamlNames::Mapping(mapping) => {
            if mapping.is_empty() {
                Vec::new()
            } else {
                let max_index = *mapping.keys().max().expect("checked non-empty");
                let mut names = vec![String::new(); max_index + 1];
                for (index, name) in mapping {
                    names[index] = name;
                }
                for (index, name) in names.iter_mut().enumerate() {
                    if name.trim().is_empty() {
                        *name = format!("class_{}", index);
                    }
                }
                names
            }
        }
    };

    Ok(ClassMap { names })
}

fn read_classes_txt(path: &Path) -> Result<ClassMap, LabelwarpError> {
    let data = fs::read_to_string(path).map_err(LabelwarpError::Io)?;
    let mut names = Vec::new();

    for (line_idx, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(LabelwarpError::ClassesTxtInvalid {
                path: path.to_path_buf(),
                message: format!("line {} is empty", line_idx + 1),
            });
        }
        names.push(trimmed.to_string());
    }

    Ok(ClassMap { names })
}

fn infer_class_map(labels_dir: &Path) -> Result<ClassMap, LabelwarpError> {
    let mut label_files = collect_files_with_extensions(labels_dir, &[LABEL_EXTENSION])?;
    label_files.sort_by_cached_key(|label_path| rel_string(labels_dir, label_path));

    let mut class_ids = BTreeSet::new();

    for label_path in label_files {
        let content = fs::read_to_string(&label_path).map_err(LabelwarpError::Io)?;
        for (line_idx, line) in content.lines().enumerate() {
            let Some(row) = parse_label_line(line, &label_path, line_idx + 1)? else {
                continue;
            };
            class_ids.insert(row.class_id());
        }
    }

    let names = match class_ids.into_iter().max() {
        Some(max_id) => (0..=max_id).map(|id| format!("class_{}", id)).collect(),
        None => Vec::new(),
    };

    Ok(ClassMap { names })
}

fn collect_files_with_extensions(
    root: &Path,
    extensions: &[&str],
) -> Result<Vec<PathBuf>, LabelwarpError> {
    let mut files = Vec::new();

    if !root.is_dir() {
        return Ok(files);
    }

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| LabelwarpError::DatasetLayoutInvalid {
            path: root.to_path_buf(),
            message: format!("failed while traversing directory: {source}"),
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.path().to_path_buf());
        }
    }

    Ok(files)
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}

fn read_image_dimensions(path: &Path) -> Result<(u32, u32), LabelwarpError> {
    let size = imagesize::size(path).map_err(|source| LabelwarpError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let width: u32 = size
        .width
        .try_into()
        .map_err(|_| LabelwarpError::DatasetLayoutInvalid {
            path: path.to_path_buf(),
            message: format!("image width {} does not fit in u32", size.width),
        })?;

    let height: u32 = size
        .height
        .try_into()
        .map_err(|_| LabelwarpError::DatasetLayoutInvalid {
            path: path.to_path_buf(),
            message: format!("image height {} does not fit in u32", size.height),
        })?;

    Ok((width, height))
}

fn is_dir_named(path: &Path, dir_name: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.eq_ignore_ascii_case(dir_name))
        .unwrap_or(false)
}

fn rel_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}
