use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

/// Local log output. Remote log forwarding always follows the collector.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Optional append-only log file, in addition to stdout.
    pub file: Option<PathBuf>,

    /// Default filter level; `RUST_LOG` overrides it.
    #[validate(custom(function = validation::validate_level))]
    pub level: String,
}

impl LoggingConfig {
    pub(crate) fn resolve(&mut self, base: &Path) {
        if let Some(file) = self.file.take() {
            self.file = Some(crate::resolve_path(base, &file));
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".into(),
        }
    }
}
