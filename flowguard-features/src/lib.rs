//! # flowguard-features
//!
//! Turns one filtered capture window into the schema-shaped feature vector
//! the classifier consumes, plus the peers observed in that window.

pub mod extractor;
pub mod stats;

pub use extractor::{FeatureExtractor, FlowFeatures};
pub use stats::{FlowStats, Summary};
