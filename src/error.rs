//! Prediction errors

use thiserror::Error;

/// Failure to score a single customer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    /// Classifier failed to load at startup; permanent for the process lifetime
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Customer attributes were missing or malformed
    #[error("invalid customer attributes: {0}")]
    FeatureEngineering(String),

    /// The classifier ran but produced no usable probability
    #[error("inference failed: {0}")]
    Inference(String),
}

pub type PredictionResult<T> = Result<T, PredictionError>;

/// Isolated failure of one record in a batch
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}: {error}")]
pub struct RowFailure {
    /// Zero-based position of the record in the batch
    pub row: usize,
    pub error: PredictionError,
}
