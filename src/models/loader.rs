//! ONNX model loader

use crate::config::ModelConfig;
use crate::feature_extractor::FEATURE_NAMES;
use crate::models::inference::OnnxModel;
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

/// Default name of the column-order sidecar shipped next to the model
pub const FEATURE_INFO_FILE: &str = "feature_info.json";

/// Training metadata exported alongside the model artifact
#[derive(Debug, Deserialize)]
pub struct FeatureInfo {
    pub feature_names: Vec<String>,
}

/// Loader for ONNX models
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Load the configured model, verifying its column order first
    pub fn load_configured(&self, config: &ModelConfig) -> Result<OnnxModel> {
        let model_path = Path::new(&config.path);

        match &config.feature_info {
            Some(info_path) => verify_feature_info(info_path)?,
            None => {
                let sidecar = sidecar_path(model_path);
                if sidecar.exists() {
                    verify_feature_info(&sidecar)?;
                } else {
                    warn!(
                        path = %sidecar.display(),
                        "No feature info found, column order cannot be verified"
                    );
                }
            }
        }

        self.load_model(model_path, &config.name)
    }

    /// Load a single ONNX model from file
    pub fn load_model<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<OnnxModel> {
        let path = path.as_ref();

        info!(
            model = %name,
            path = %path.display(),
            threads = self.onnx_threads,
            "Loading ONNX model"
        );

        if !path.exists() {
            anyhow::bail!("Model file not found: {}", path.display());
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        // skl2onnx classifiers expose `label` and `probabilities`
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(OnnxModel {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// `feature_info.json` in the model's directory
pub fn sidecar_path(model_path: &Path) -> PathBuf {
    model_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(FEATURE_INFO_FILE)
}

/// Check that the model was trained on exactly [`FEATURE_NAMES`], in order.
pub fn verify_feature_info<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read feature info from {}", path.display()))?;
    let info: FeatureInfo = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse feature info from {}", path.display()))?;

    check_feature_order(&info.feature_names)?;

    info!(
        path = %path.display(),
        features = info.feature_names.len(),
        "Feature order verified against model metadata"
    );
    Ok(())
}

fn check_feature_order(names: &[String]) -> Result<()> {
    if names.len() != FEATURE_NAMES.len() {
        anyhow::bail!(
            "Model expects {} features, service produces {}",
            names.len(),
            FEATURE_NAMES.len()
        );
    }

    for (i, (expected, actual)) in FEATURE_NAMES.iter().zip(names).enumerate() {
        if expected != actual {
            anyhow::bail!(
                "Feature order mismatch at column {}: model expects `{}`, service produces `{}`",
                i,
                actual,
                expected
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_info(names: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::json!({ "feature_names": names });
        write!(file, "{}", json).unwrap();
        file
    }

    #[test]
    fn test_matching_feature_info() {
        let file = write_info(&FEATURE_NAMES);
        assert!(verify_feature_info(file.path()).is_ok());
    }

    #[test]
    fn test_reordered_feature_info_is_rejected() {
        let mut names = FEATURE_NAMES.to_vec();
        names.swap(5, 6);
        let file = write_info(&names);

        let err = verify_feature_info(file.path()).unwrap_err();
        assert!(err.to_string().contains("column 5"));
    }

    #[test]
    fn test_short_feature_info_is_rejected() {
        let file = write_info(&FEATURE_NAMES[..10]);
        assert!(verify_feature_info(file.path()).is_err());
    }

    #[test]
    fn test_missing_model_file() {
        let loader = ModelLoader::new();
        let result = loader.load_model("does/not/exist.onnx", "missing");
        assert!(result.is_err());
    }

    #[test]
    fn test_sidecar_path() {
        let path = sidecar_path(Path::new("models/pre_delinquency_model.onnx"));
        assert_eq!(path, Path::new("models").join(FEATURE_INFO_FILE));
    }
}
