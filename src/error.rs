use std::path::PathBuf;
use thiserror::Error;

/// The main error type for labelwarp operations.
#[derive(Debug, Error)]
pub enum LabelwarpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse transform config from {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Invalid '{transform}' parameters: {message}")]
    ConfigInvalid { transform: String, message: String },

    #[error("Invalid image dimensions {width}x{height} (must be positive)")]
    InvalidImageDimensions { width: u32, height: u32 },

    #[error("Invalid dataset layout at {path}: {message}")]
    DatasetLayoutInvalid { path: PathBuf, message: String },

    #[error("Failed to parse label line {line} in {path}: {message}")]
    LabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to parse data.yaml at {path}: {source}")]
    DataYamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid classes.txt at {path}: {message}")]
    ClassesTxtInvalid { path: PathBuf, message: String },

    #[error("Failed to read dimensions of {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Failed to write labels to {path}: {message}")]
    LabelWrite { path: PathBuf, message: String },

    #[error("Failed to encode plan as JSON: {0}")]
    PlanEncode(#[from] serde_json::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
