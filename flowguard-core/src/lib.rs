//! # flowguard-core
//!
//! Foundation layer shared by every stage of the capture/classify/report cycle.
//!
//! ### Key Submodules:
//! - `events`: operational log events and their severities
//! - `features`: schema-shaped feature vectors and the per-cycle peer record
//! - `report`: classification results, flow metrics and the collector payload
//! - `stop`: cooperative stop signal observed between cycles
//!
//! Nothing in this crate outlives a single cycle except the stop signal.

pub mod error;
pub mod events;
pub mod features;
pub mod report;
pub mod stop;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::events::*;
    pub use crate::features::*;
    pub use crate::report::*;
    pub use crate::stop::*;
}

pub use error::MetricError;
pub use events::{LogEvent, Severity};
pub use features::{FeatureVector, ObservedPeers, UNKNOWN_PEER};
pub use report::{ClassificationResult, FlowMetrics, PredictedClass, RankedClass, ReportPayload};
pub use stop::StopSignal;
