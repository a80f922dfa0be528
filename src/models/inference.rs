//! ONNX Runtime inference for the delinquency classifier

use crate::feature_extractor::FeatureVector;
use crate::models::classifier::Classifier;
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::session::Session;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::sync::Mutex;
use tracing::debug;

/// Loaded ONNX classifier
pub struct OnnxModel {
    /// Model name
    pub name: String,
    /// ONNX Runtime session; `run` needs exclusive access
    pub session: Mutex<Session>,
    /// Input name for the model
    pub input_name: String,
    /// Output name for probabilities
    pub output_name: String,
}

impl Classifier for OnnxModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_probability(&self, features: &FeatureVector) -> Result<f64> {
        use ort::value::Tensor;

        let values = features.to_f32_vec();

        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, values.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, values)).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let outputs = session.run(ort::inputs![self.input_name.as_str() => input_tensor])?;

        extract_probability(&outputs, &self.output_name, &self.name)
    }
}

/// Extract the positive-class probability from model output.
///
/// Handles plain tensor outputs and the seq(map(int64, float)) outputs that
/// scikit-learn exports produce when ZipMap is enabled.
fn extract_probability(
    outputs: &ort::session::SessionOutputs,
    output_name: &str,
    model_name: &str,
) -> Result<f64> {
    if let Some(output) = outputs.get(output_name) {
        if let Some(prob) = probability_from_value(&output, model_name) {
            return Ok(prob);
        }
    }

    // Fallback: any non-label output that yields a probability
    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }
        if let Some(prob) = probability_from_value(&output, model_name) {
            debug!(
                model = %model_name,
                output = %name,
                prob = prob,
                "Extracted from fallback output"
            );
            return Ok(prob);
        }
    }

    Err(anyhow::anyhow!(
        "No probability output found in model {}",
        model_name
    ))
}

fn probability_from_value(output: &ort::value::DynValue, model_name: &str) -> Option<f64> {
    let dtype = output.dtype();

    if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
        let dims: Vec<i64> = shape.iter().copied().collect();
        let prob = positive_class_from_tensor(&dims, data)?;
        debug!(model = %model_name, prob = prob, "Extracted from tensor");
        return Some(prob);
    }

    if DynSequenceValueType::can_downcast(&dtype) {
        return extract_from_sequence_map(output, model_name).ok();
    }

    None
}

/// Extract probability from seq(map(int64, float)) format
fn extract_from_sequence_map(output: &ort::value::DynValue, model_name: &str) -> Result<f64> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

    // Batch size is always 1
    let map_value = maps
        .first()
        .ok_or_else(|| anyhow::anyhow!("Empty sequence"))?;

    let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

    if let Some((_, prob)) = kv_pairs.iter().find(|(class_id, _)| *class_id == 1) {
        debug!(model = %model_name, prob = *prob, "Extracted from seq(map)");
        return Ok(*prob as f64);
    }

    if let Some((_, prob)) = kv_pairs.iter().find(|(class_id, _)| *class_id == 0) {
        return Ok(1.0 - *prob as f64);
    }

    Err(anyhow::anyhow!("No probability found in map"))
}

/// Positive-class probability from a `[batch, classes]` or `[classes]` tensor
fn positive_class_from_tensor(dims: &[i64], data: &[f32]) -> Option<f64> {
    let classes = match dims {
        [_, classes] | [classes] => *classes,
        _ => return data.last().map(|&v| v as f64),
    };

    match classes {
        c if c >= 2 => data.get(1).map(|&v| v as f64),
        1 => data.first().map(|&v| v as f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_class_tensor() {
        assert_eq!(positive_class_from_tensor(&[1, 2], &[0.25, 0.75]), Some(0.75));
        assert_eq!(positive_class_from_tensor(&[2], &[0.9, 0.1]), Some(0.1f32 as f64));
    }

    #[test]
    fn test_single_probability_tensor() {
        assert_eq!(positive_class_from_tensor(&[1, 1], &[0.4]), Some(0.4f32 as f64));
    }

    #[test]
    fn test_empty_tensor() {
        assert_eq!(positive_class_from_tensor(&[1, 0], &[]), None);
        assert_eq!(positive_class_from_tensor(&[1, 2], &[]), None);
    }
}
