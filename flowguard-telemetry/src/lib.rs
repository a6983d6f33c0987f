//! # flowguard-telemetry
//!
//! Local logging setup and the agent's Prometheus counters.

pub mod logging;
pub mod metrics;

pub use logging::{EventLogger, LoggingError};
pub use metrics::MetricsRecorder;
