//! ML model components

pub mod classifier;
pub mod inference;
pub mod loader;

pub use classifier::{Classifier, RiskClassifier};
pub use inference::OnnxModel;
pub use loader::ModelLoader;
