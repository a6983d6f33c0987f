use std::fmt;

use flowguard_capture::CaptureError;
use flowguard_classifier::ClassifierError;
use flowguard_core::MetricError;
use thiserror::Error;
use tokio::task::JoinError;

/// Stage of a cycle that can short-circuit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleStage {
    Capture,
    Classification,
}

impl CycleStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStage::Capture => "capture",
            CycleStage::Classification => "classification",
        }
    }
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("classification failed: {0}")]
    Classification(#[from] ClassifierError),

    #[error("could not derive flow metrics: {0}")]
    Metrics(#[from] MetricError),

    #[error("unexpected failure: {0}")]
    Unclassified(String),
}

impl From<JoinError> for CycleError {
    fn from(err: JoinError) -> Self {
        CycleError::Unclassified(err.to_string())
    }
}
