//! flowguard-classifier
//!
//! The narrow interface the cycle uses to score a feature vector, the top-k
//! ranking built on top of it, and a JSON artifact format implementing it.

pub mod adapter;
pub mod artifacts;
pub mod error;
pub mod ranking;

pub use adapter::{Classifier, LabelMapper};
pub use artifacts::{load_artifacts, LabelEncoder, LinearModel};
pub use error::ClassifierError;
pub use ranking::{classify, Ranking, DEFAULT_TOP_K};
