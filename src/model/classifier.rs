use std::sync::Arc;

use crate::error::ModelError;

/// Output of a fitted classifier for a single row.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub label: i64,
    /// (class label, probability) pairs, classes in ascending order.
    pub probabilities: Vec<(i64, f64)>,
}

impl Prediction {
    /// Highest class probability.
    pub fn confidence(&self) -> f64 {
        self.probabilities
            .iter()
            .map(|&(_, p)| p)
            .fold(0.0, f64::max)
            .clamp(0.0, 1.0)
    }
}

/// An untrained estimator. `fit` produces a new fitted model and leaves the
/// estimator itself untouched, so the same estimator can be refitted any number of times.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &'static str;
    fn fit(&self, features: &[Vec<f64>], labels: &[i64]) -> Result<Arc<dyn FittedClassifier>, ModelError>;
}

pub trait FittedClassifier: Send + Sync {
    /// Number of features each row must carry.
    fn n_features(&self) -> usize;
    fn predict(&self, row: &[f64]) -> Result<Prediction, ModelError>;
}

/// Checks a training batch and returns its feature width.
pub fn validate_training_set(features: &[Vec<f64>], labels: &[i64]) -> Result<usize, ModelError> {
    if features.len() != labels.len() {
        return Err(ModelError::LengthMismatch {
            features: features.len(),
            labels: labels.len(),
        });
    }

    let first = features.first().ok_or(ModelError::EmptyDataset)?;
    let width = first.len();
    if width == 0 {
        return Err(ModelError::EmptyFeatureRow);
    }

    for (row, values) in features.iter().enumerate() {
        if values.len() != width {
            return Err(ModelError::RaggedFeatures {
                row,
                expected: width,
                found: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteFeature);
        }
    }

    Ok(width)
}

/// Checks a single row against the width a model was trained on.
pub fn validate_row(row: &[f64], expected: usize) -> Result<(), ModelError> {
    if row.len() != expected {
        return Err(ModelError::FeatureWidthMismatch {
            expected,
            found: row.len(),
        });
    }
    if row.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::NonFiniteFeature);
    }
    Ok(())
}
