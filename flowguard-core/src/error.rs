use thiserror::Error;

/// Raised when the summary metrics cannot be read back out of a feature vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    #[error("feature '{0}' is not part of the model schema")]
    MissingFeature(&'static str),

    #[error("feature '{key}' has non-finite value {value}")]
    NonFinite { key: &'static str, value: f64 },

    #[error("feature '{key}' has negative count {value}")]
    NegativeCount { key: &'static str, value: f64 },
}
