//! Remote collector endpoint and reporter pool sizing.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct CollectorConfig {
    /// Classification POST endpoint, conventionally ending in `/predict`.
    #[validate(custom(function = validation::validate_endpoint))]
    pub endpoint: String,

    /// Concurrent reporter tasks.
    #[validate(range(min = 1, max = 64))]
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[validate(range(min = 1))]
    #[serde(default = "default_report_timeout")]
    pub report_timeout_ms: u64,

    #[validate(range(min = 1))]
    #[serde(default = "default_log_timeout")]
    pub log_timeout_ms: u64,
}

impl CollectorConfig {
    pub fn report_timeout(&self) -> Duration {
        Duration::from_millis(self.report_timeout_ms)
    }

    pub fn log_timeout(&self) -> Duration {
        Duration::from_millis(self.log_timeout_ms)
    }
}

fn default_workers() -> usize {
    5
}

fn default_report_timeout() -> u64 {
    5000
}

fn default_log_timeout() -> u64 {
    3000
}
