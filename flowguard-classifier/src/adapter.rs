//! Seams between the cycle and whatever model backs it.

use flowguard_core::FeatureVector;

use crate::error::ClassifierError;

/// A trained model that turns a feature vector into a class distribution.
pub trait Classifier: Send + Sync {
    /// Ordered feature keys the model was trained on.
    fn schema(&self) -> &[String];

    /// One probability per class, indexed like the label mapper.
    fn predict(&self, features: &FeatureVector) -> Result<Vec<f64>, ClassifierError>;
}

/// Maps class indices back to human-readable labels.
pub trait LabelMapper: Send + Sync {
    fn label_of(&self, index: usize) -> Result<String, ClassifierError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
