//! Timing of the capture/classify/report loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct CycleConfig {
    /// Sleep between cycles.
    #[validate(range(max = 3600))]
    pub pause_secs: u64,

    /// Ranked classes reported per cycle; the collector accepts at most five.
    #[validate(range(min = 1, max = 5))]
    pub top_k: usize,

    /// How long shutdown waits for in-flight reports.
    #[validate(range(max = 300))]
    pub shutdown_grace_secs: u64,
}

impl CycleConfig {
    pub fn pause(&self) -> Duration {
        Duration::from_secs(self.pause_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            pause_secs: 5,
            top_k: 5,
            shutdown_grace_secs: 10,
        }
    }
}
