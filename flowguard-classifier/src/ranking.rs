use flowguard_core::{ClassificationResult, FeatureVector, RankedClass};

use crate::adapter::{Classifier, LabelMapper};
use crate::error::ClassifierError;

pub type Ranking = ClassificationResult;

pub const DEFAULT_TOP_K: usize = 5;

/// Scores `features` and ranks the `top_k` most likely classes.
///
/// Ties keep class-index order. `top_k` is clamped to `1..=DEFAULT_TOP_K`:
/// zero still yields a confidence, and the collector never sees more than
/// five classes.
pub fn classify(
    classifier: &dyn Classifier,
    mapper: &dyn LabelMapper,
    features: &FeatureVector,
    top_k: usize,
) -> Result<Ranking, ClassifierError> {
    let probabilities = classifier.predict(features)?;
    validate(&probabilities)?;

    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    // stable: equal probabilities stay in index order
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));

    let ranked = order
        .into_iter()
        .take(top_k.clamp(1, DEFAULT_TOP_K))
        .map(|index| {
            Ok(RankedClass {
                label: mapper.label_of(index)?,
                probability: probabilities[index],
            })
        })
        .collect::<Result<Vec<_>, ClassifierError>>()?;

    ClassificationResult::from_ranked(ranked).ok_or(ClassifierError::EmptyDistribution)
}

fn validate(probabilities: &[f64]) -> Result<(), ClassifierError> {
    if probabilities.is_empty() {
        return Err(ClassifierError::EmptyDistribution);
    }
    for (index, &value) in probabilities.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(ClassifierError::InvalidProbability { index, value });
        }
    }
    Ok(())
}
