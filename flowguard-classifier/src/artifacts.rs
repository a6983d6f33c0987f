//! JSON model artifacts.
//!
//! `LinearModel` is a multinomial logistic regression:
//! `{"feature_names": [...], "coefficients": [[...], ...], "intercepts": [...]}`
//! with one coefficient row and one intercept per class. `LabelEncoder` is
//! `{"classes": [...]}`, indexed like the model's classes.

use std::fs;
use std::path::Path;

use flowguard_core::FeatureVector;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adapter::{Classifier, LabelMapper};
use crate::error::ClassifierError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    feature_names: Vec<String>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LinearModel {
    /// Builds a model, checking that the shapes agree.
    pub fn new(
        feature_names: Vec<String>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> Result<Self, ClassifierError> {
        let model = Self {
            feature_names,
            coefficients,
            intercepts,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn from_file(path: &Path) -> Result<Self, ClassifierError> {
        let model: Self = read_json(path)?;
        model.validate()?;
        Ok(model)
    }

    pub fn class_count(&self) -> usize {
        self.intercepts.len()
    }

    fn validate(&self) -> Result<(), ClassifierError> {
        if self.intercepts.is_empty() {
            return Err(ClassifierError::Shape("model declares no classes".into()));
        }
        if self.coefficients.len() != self.intercepts.len() {
            return Err(ClassifierError::Shape(format!(
                "{} coefficient rows for {} intercepts",
                self.coefficients.len(),
                self.intercepts.len()
            )));
        }
        let width = self.feature_names.len();
        if let Some((class, row)) = self
            .coefficients
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != width)
        {
            return Err(ClassifierError::Shape(format!(
                "class {class} has {} coefficients for {width} features",
                row.len()
            )));
        }
        let all_finite = self
            .coefficients
            .iter()
            .flatten()
            .chain(&self.intercepts)
            .all(|w| w.is_finite());
        if !all_finite {
            return Err(ClassifierError::Shape("non-finite weight".into()));
        }
        Ok(())
    }
}

impl Classifier for LinearModel {
    fn schema(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
        if features.len() != self.feature_names.len() {
            return Err(ClassifierError::FeatureMismatch {
                expected: self.feature_names.len(),
                found: features.len(),
            });
        }
        let inputs: Vec<f64> = features.values().collect();

        let logits: Vec<f64> = self
            .coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, bias)| row.iter().zip(&inputs).map(|(w, x)| w * x).sum::<f64>() + bias)
            .collect();

        Ok(softmax(&logits))
    }
}

/// Softmax shifted by the max logit so large inputs do not overflow.
fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn from_file(path: &Path) -> Result<Self, ClassifierError> {
        read_json(path)
    }
}

impl LabelMapper for LabelEncoder {
    fn label_of(&self, index: usize) -> Result<String, ClassifierError> {
        self.classes
            .get(index)
            .cloned()
            .ok_or(ClassifierError::UnknownClass(index))
    }

    fn len(&self) -> usize {
        self.classes.len()
    }
}

/// Loads both artifacts and checks that every model class has a label.
pub fn load_artifacts(
    model_path: &Path,
    encoder_path: &Path,
) -> Result<(LinearModel, LabelEncoder), ClassifierError> {
    let model = LinearModel::from_file(model_path)?;
    let encoder = LabelEncoder::from_file(encoder_path)?;
    if encoder.len() < model.class_count() {
        return Err(ClassifierError::Shape(format!(
            "label encoder has {} classes, model has {}",
            encoder.len(),
            model.class_count()
        )));
    }
    info!(
        features = model.schema().len(),
        classes = model.class_count(),
        "model artifacts loaded"
    );
    Ok((model, encoder))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ClassifierError> {
    let raw = fs::read_to_string(path).map_err(|source| ClassifierError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ClassifierError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn names(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    fn json_file(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn softmax_sums_to_one_and_survives_large_logits() {
        let probs = softmax(&[1000.0, 1000.0, 0.0]);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((probs[0] - 0.5).abs() < 1e-12);
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn predicts_the_class_with_the_highest_logit() {
        let model = LinearModel::new(
            names(&["a", "b"]),
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![0.0, 0.0],
        )
        .unwrap();
        let vector = FeatureVector::project(model.schema(), |key| match key {
            "a" => Some(0.0),
            "b" => Some(3.0),
            _ => None,
        });

        let probs = model.predict(&vector).unwrap();
        assert_eq!(probs.len(), 2);
        assert!(probs[1] > probs[0]);
    }

    #[test]
    fn rejects_vector_of_wrong_width() {
        let model = LinearModel::new(names(&["a"]), vec![vec![1.0]], vec![0.0]).unwrap();
        let vector = FeatureVector::project(&names(&["a", "b"]), |_| Some(1.0));
        assert!(matches!(
            model.predict(&vector),
            Err(ClassifierError::FeatureMismatch {
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn shape_errors() {
        let rows_vs_intercepts = LinearModel::new(names(&["a"]), vec![vec![1.0]], vec![0.0, 1.0]);
        assert!(matches!(rows_vs_intercepts, Err(ClassifierError::Shape(_))));

        let ragged = LinearModel::new(names(&["a", "b"]), vec![vec![1.0]], vec![0.0]);
        assert!(matches!(ragged, Err(ClassifierError::Shape(_))));

        let no_classes = LinearModel::new(names(&["a"]), vec![], vec![]);
        assert!(matches!(no_classes, Err(ClassifierError::Shape(_))));
    }

    #[test]
    fn loads_artifacts_from_json() {
        let model = json_file(
            r#"{"feature_names": ["Flow.Duration"], "coefficients": [[0.5], [-0.5]], "intercepts": [0.0, 0.1]}"#,
        );
        let encoder = json_file(r#"{"classes": ["DNS", "HTTP"]}"#);

        let (model, encoder) = load_artifacts(model.path(), encoder.path()).unwrap();
        assert_eq!(model.schema(), &["Flow.Duration".to_string()]);
        assert_eq!(encoder.label_of(1).unwrap(), "HTTP");
        assert!(matches!(
            encoder.label_of(2),
            Err(ClassifierError::UnknownClass(2))
        ));
    }

    #[test]
    fn encoder_must_cover_every_class() {
        let model = json_file(r#"{"feature_names": [], "coefficients": [[], []], "intercepts": [0.0, 0.0]}"#);
        let encoder = json_file(r#"{"classes": ["only"]}"#);
        assert!(matches!(
            load_artifacts(model.path(), encoder.path()),
            Err(ClassifierError::Shape(_))
        ));
    }

    #[test]
    fn missing_and_malformed_files() {
        let missing = LinearModel::from_file(Path::new("/nonexistent/model.json"));
        assert!(matches!(missing, Err(ClassifierError::Io { .. })));

        let garbage = json_file("not json");
        assert!(matches!(
            LabelEncoder::from_file(garbage.path()),
            Err(ClassifierError::Parse { .. })
        ));
    }
}
