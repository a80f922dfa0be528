//! Pre-delinquency Risk Scoring Library
//!
//! Scores credit-card customers for the likelihood of missing their next
//! payment: monthly repayment history is engineered into a fixed feature
//! vector, scored by a pre-trained ONNX classifier and mapped to a risk tier
//! with a recommended action.

pub mod api;
pub mod batch;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod predictor;
pub mod store;
pub mod types;

pub use config::AppConfig;
pub use error::{PredictionError, PredictionResult, RowFailure};
pub use feature_extractor::{engineer, FeatureExtractor, FeatureVector, FEATURE_NAMES};
pub use models::{Classifier, RiskClassifier};
pub use predictor::RiskPredictor;
pub use store::{CustomerStore, InMemoryCustomerStore};
pub use types::{bucket, CustomerAttributes, CustomerData, RiskAssessment, RiskTier};
