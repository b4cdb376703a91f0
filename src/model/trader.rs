use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

use crate::error::ModelError;

use super::classifier::{Classifier, FittedClassifier};
use super::forest::{ForestParams, RandomForestClassifier};
use super::types::{PredictResponse, Signal, TraderStatus, TrainResponse};

/// Wraps a classifier and exposes the train/predict lifecycle.
///
/// A new fit is computed without holding the lock and then swapped in, so a
/// predict never observes a half-trained model.
pub struct SignalModel {
    estimator: Box<dyn Classifier>,
    fitted: RwLock<Option<Arc<dyn FittedClassifier>>>,
}

impl SignalModel {
    pub fn new(estimator: Box<dyn Classifier>) -> Self {
        Self {
            estimator,
            fitted: RwLock::new(None),
        }
    }

    pub fn random_forest(params: ForestParams) -> Self {
        Self::new(Box::new(RandomForestClassifier::new(params)))
    }

    fn current(&self) -> Option<Arc<dyn FittedClassifier>> {
        self.fitted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_trained(&self) -> bool {
        self.current().is_some()
    }

    pub fn model_type(&self) -> &'static str {
        self.estimator.name()
    }

    pub fn status(&self) -> TraderStatus {
        TraderStatus {
            is_trained: self.is_trained(),
            model_type: self.model_type().to_string(),
        }
    }

    /// Fit on the full batch, replacing any previous fit. On error the
    /// previous state (trained or not) is kept.
    pub fn train(&self, features: &[Vec<f64>], labels: &[i64]) -> Result<TrainResponse, ModelError> {
        if features.len() != labels.len() {
            return Err(ModelError::LengthMismatch {
                features: features.len(),
                labels: labels.len(),
            });
        }

        let fitted = self.estimator.fit(features, labels)?;
        *self.fitted.write().unwrap_or_else(PoisonError::into_inner) = Some(fitted);

        info!(
            "🧠 [MODEL] {} trained on {} samples",
            self.model_type(),
            labels.len()
        );

        Ok(TrainResponse {
            message: "Model trained successfully".to_string(),
            samples_trained: labels.len(),
        })
    }

    pub fn predict(&self, features: &[f64]) -> Result<PredictResponse, ModelError> {
        let Some(model) = self.current() else {
            warn!("⚠️ [MODEL] Predict requested before training");
            return Err(ModelError::NotTrained);
        };

        let prediction = model.predict(features)?;
        let signal = Signal::from_label(prediction.label);
        let confidence = prediction.confidence();

        debug!(
            "🔮 [MODEL] label={} -> {:?} (confidence {:.3})",
            prediction.label, signal, confidence
        );

        Ok(PredictResponse { signal, confidence })
    }
}

impl Default for SignalModel {
    fn default() -> Self {
        Self::random_forest(ForestParams::default())
    }
}
