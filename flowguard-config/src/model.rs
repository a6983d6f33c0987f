use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Locations of the trained model and its label encoder.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub label_encoder_path: PathBuf,
}

impl ModelConfig {
    pub(crate) fn resolve(&mut self, base: &Path) {
        self.model_path = crate::resolve_path(base, &self.model_path);
        self.label_encoder_path = crate::resolve_path(base, &self.label_encoder_path);
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/flow_model.json"),
            label_encoder_path: PathBuf::from("models/label_encoder.json"),
        }
    }
}
