use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("inconsistent model artifact: {0}")]
    Shape(String),

    #[error("feature vector does not match model schema: expected {expected} features, got {found}")]
    FeatureMismatch { expected: usize, found: usize },

    #[error("classifier returned an empty distribution")]
    EmptyDistribution,

    #[error("class {index} has invalid probability {value}")]
    InvalidProbability { index: usize, value: f64 },

    #[error("no label for class index {0}")]
    UnknownClass(usize),
}
