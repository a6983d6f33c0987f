//! flowguard-reporter
//!
//! Delivers classification reports and operational log events to the
//! collector without ever blocking the capture cycle.

pub mod endpoint;
pub mod error;
pub mod http;
pub mod sink;

pub use endpoint::log_endpoint;
pub use error::ReportError;
pub use http::{HttpReporter, ReporterSettings};
pub use sink::ReportSink;
