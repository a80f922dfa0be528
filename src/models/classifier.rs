//! Risk classifier adapter

use crate::config::ModelConfig;
use crate::error::{PredictionError, PredictionResult};
use crate::feature_extractor::FeatureVector;
use crate::models::loader::ModelLoader;
use tracing::{error, info};

/// A trained binary classifier returning the positive-class probability.
///
/// Implementations are read-only after construction and shared across
/// concurrent requests.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    fn predict_probability(&self, features: &FeatureVector) -> anyhow::Result<f64>;
}

/// Process-wide classifier handle. Either holds a loaded model or the reason
/// loading failed; there is no transition between the two.
pub struct RiskClassifier {
    model: Result<Box<dyn Classifier>, String>,
}

impl RiskClassifier {
    /// Load the configured model. Never fails: a load error leaves the
    /// classifier permanently unavailable.
    pub fn load(config: &ModelConfig) -> Self {
        let loader = ModelLoader::with_threads(config.onnx_threads);
        match loader.load_configured(config) {
            Ok(model) => Self::from_model(model),
            Err(e) => {
                error!(
                    path = %config.path,
                    error = format!("{:#}", e),
                    "Model failed to load, scoring endpoints will be unavailable"
                );
                Self::unavailable(format!("{:#}", e))
            }
        }
    }

    /// Wrap an already-constructed classifier
    pub fn from_model<C: Classifier + 'static>(model: C) -> Self {
        info!(model = %model.name(), "Classifier ready");
        Self {
            model: Ok(Box::new(model)),
        }
    }

    /// A classifier that rejects every request
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            model: Err(reason.into()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_ok()
    }

    /// Why the model could not be loaded, if it could not
    pub fn unavailable_reason(&self) -> Option<&str> {
        self.model.as_ref().err().map(String::as_str)
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_ref().ok().map(|m| m.name())
    }

    /// Score a feature vector, returning a probability in [0, 1]
    pub fn score(&self, features: &FeatureVector) -> PredictionResult<f64> {
        let model = self
            .model
            .as_ref()
            .map_err(|reason| PredictionError::ModelUnavailable(reason.clone()))?;

        let probability = model
            .predict_probability(features)
            .map_err(|e| PredictionError::Inference(format!("{:#}", e)))?;

        if !(0.0..=1.0).contains(&probability) {
            return Err(PredictionError::Inference(format!(
                "model {} returned probability {} outside [0, 1]",
                model.name(),
                probability
            )));
        }

        Ok(probability)
    }
}
