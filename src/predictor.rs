//! Prediction orchestration: feature engineering, scoring and bucketing.
//!
//! Direct callers (the public predict and batch endpoints) get explicit
//! errors. Internal aggregation over stored customers uses
//! [`RiskPredictor::predict_with_fallback`], which always yields an
//! assessment and reports failures through logs and metrics instead.

use crate::error::{PredictionError, PredictionResult, RowFailure};
use crate::feature_extractor::FeatureExtractor;
use crate::metrics::PredictionMetrics;
use crate::models::classifier::RiskClassifier;
use crate::types::assessment::RiskAssessment;
use crate::types::customer::CustomerAttributes;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Composes the feature extractor, classifier and bucketing policy
pub struct RiskPredictor {
    extractor: FeatureExtractor,
    classifier: RiskClassifier,
    metrics: Arc<PredictionMetrics>,
}

impl RiskPredictor {
    pub fn new(classifier: RiskClassifier, metrics: Arc<PredictionMetrics>) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            classifier,
            metrics,
        }
    }

    pub fn is_classifier_available(&self) -> bool {
        self.classifier.is_available()
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    pub fn metrics(&self) -> &Arc<PredictionMetrics> {
        &self.metrics
    }

    /// Score one customer, surfacing any failure to the caller
    pub fn predict_one(&self, attrs: &CustomerAttributes) -> PredictionResult<RiskAssessment> {
        let result = self.score(attrs);
        if result.is_err() {
            self.metrics.record_failure();
        }
        result
    }

    /// Score each record independently. Output order and length match the
    /// input; a failing record only affects its own row.
    pub fn predict_batch<I>(&self, records: I) -> Vec<Result<RiskAssessment, RowFailure>>
    where
        I: IntoIterator<Item = PredictionResult<CustomerAttributes>>,
    {
        records
            .into_iter()
            .enumerate()
            .map(|(row, record)| {
                let result = match record {
                    Ok(attrs) => self.predict_one(&attrs),
                    Err(error) => {
                        self.metrics.record_failure();
                        Err(error)
                    }
                };
                result.map_err(|error| {
                    debug!(row = row, error = %error, "Batch row failed");
                    RowFailure { row, error }
                })
            })
            .collect()
    }

    /// Score one customer, substituting the fallback assessment on failure
    pub fn predict_with_fallback(&self, attrs: &CustomerAttributes) -> RiskAssessment {
        self.assess_internal(attrs).0
    }

    /// Like [`Self::predict_with_fallback`], also handing back the error that
    /// triggered the fallback, if any
    pub fn assess_internal(
        &self,
        attrs: &CustomerAttributes,
    ) -> (RiskAssessment, Option<PredictionError>) {
        match self.score(attrs) {
            Ok(assessment) => (assessment, None),
            Err(e) => {
                warn!(error = %e, "Prediction failed, using default assessment");
                self.metrics.record_fallback();
                (RiskAssessment::fallback(), Some(e))
            }
        }
    }

    fn score(&self, attrs: &CustomerAttributes) -> PredictionResult<RiskAssessment> {
        let start = Instant::now();

        let features = self.extractor.extract(attrs);
        let probability = self.classifier.score(&features)?;
        let assessment = RiskAssessment::from_probability(probability);

        self.metrics
            .record_prediction(start.elapsed(), probability, assessment.tier);

        debug!(
            probability = probability,
            tier = %assessment.tier,
            avg_delay = features.avg_delay,
            utilization_avg = features.utilization_avg,
            "Customer scored"
        );
        debug!(features = ?features.named(), "Model input");

        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_extractor::FeatureVector;
    use crate::models::classifier::Classifier;
    use crate::types::assessment::RiskTier;
    use std::sync::atomic::Ordering;

    /// Probability rises with the average payment delay
    struct DelayModel;

    impl Classifier for DelayModel {
        fn name(&self) -> &str {
            "delay"
        }

        fn predict_probability(&self, features: &FeatureVector) -> anyhow::Result<f64> {
            Ok((0.2 + features.avg_delay * 0.25).clamp(0.0, 1.0))
        }
    }

    /// Fails for customers over a given age
    struct AgeLimitedModel(f64);

    impl Classifier for AgeLimitedModel {
        fn name(&self) -> &str {
            "age-limited"
        }

        fn predict_probability(&self, features: &FeatureVector) -> anyhow::Result<f64> {
            if features.age > self.0 {
                anyhow::bail!("age {} out of supported range", features.age);
            }
            Ok(0.1)
        }
    }

    fn predictor(classifier: RiskClassifier) -> RiskPredictor {
        RiskPredictor::new(classifier, Arc::new(PredictionMetrics::new()))
    }

    fn customer(pay: [i32; 6]) -> CustomerAttributes {
        let mut attrs = CustomerAttributes::new(100000.0, 30);
        attrs.pay = pay;
        attrs
    }

    #[test]
    fn test_predict_one() {
        let predictor = predictor(RiskClassifier::from_model(DelayModel));

        let low = predictor.predict_one(&customer([0; 6])).unwrap();
        assert_eq!(low.tier, RiskTier::Low);
        assert_eq!(low.action, "Approve normally");

        let high = predictor.predict_one(&customer([3, 2, 3, 2, 2, 1])).unwrap();
        assert_eq!(high.tier, RiskTier::High);
        assert_eq!(high.reason, "strong default signals");
    }

    #[test]
    fn test_predict_one_model_unavailable() {
        let predictor = predictor(RiskClassifier::unavailable("missing artifact"));

        assert!(!predictor.is_classifier_available());
        assert!(matches!(
            predictor.predict_one(&customer([0; 6])),
            Err(PredictionError::ModelUnavailable(_))
        ));
        assert_eq!(predictor.metrics().failures.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_fallback_when_unavailable() {
        let predictor = predictor(RiskClassifier::unavailable("missing artifact"));

        let (assessment, error) = predictor.assess_internal(&customer([0; 6]));
        assert_eq!(assessment, RiskAssessment::fallback());
        assert!(matches!(error, Some(PredictionError::ModelUnavailable(_))));

        assert_eq!(
            predictor.predict_with_fallback(&customer([1; 6])),
            RiskAssessment::fallback()
        );
        assert_eq!(predictor.metrics().fallbacks.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_fallback_not_used_on_success() {
        let predictor = predictor(RiskClassifier::from_model(DelayModel));
        let (assessment, error) = predictor.assess_internal(&customer([0; 6]));
        assert!(error.is_none());
        assert_eq!(assessment.tier, RiskTier::Low);
    }

    #[test]
    fn test_batch_isolates_failures() {
        let predictor = predictor(RiskClassifier::from_model(AgeLimitedModel(60.0)));

        let old = CustomerAttributes::new(1000.0, 70);
        let records = vec![
            Ok(customer([0; 6])),
            Err(PredictionError::FeatureEngineering("missing field `age`".to_string())),
            Ok(customer([0; 6])),
            Ok(old),
            Ok(customer([0; 6])),
        ];

        let results = predictor.predict_batch(records);
        assert_eq!(results.len(), 5);

        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(RowFailure {
                row: 1,
                error: PredictionError::FeatureEngineering("missing field `age`".to_string()),
            })
        );
        assert!(results[2].is_ok());
        match &results[3] {
            Err(RowFailure { row: 3, error: PredictionError::Inference(msg) }) => {
                assert!(msg.contains("age 70"));
            }
            other => panic!("unexpected row 3 result: {:?}", other),
        }
        assert!(results[4].is_ok());

        // rows rejected before scoring count as failures too
        assert_eq!(predictor.metrics().failures.load(Ordering::Relaxed), 2);
        assert_eq!(predictor.metrics().predictions.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_batch_preserves_order() {
        let predictor = predictor(RiskClassifier::from_model(DelayModel));
        let pays = [[0; 6], [3; 6], [1; 6], [0; 6]];

        let results = predictor.predict_batch(pays.iter().map(|&p| Ok(customer(p))));
        let tiers: Vec<RiskTier> = results.into_iter().map(|r| r.unwrap().tier).collect();
        assert_eq!(
            tiers,
            vec![RiskTier::Low, RiskTier::High, RiskTier::Medium, RiskTier::Low]
        );
    }

    #[test]
    fn test_empty_batch() {
        let predictor = predictor(RiskClassifier::from_model(DelayModel));
        let records: Vec<PredictionResult<CustomerAttributes>> = Vec::new();
        assert!(predictor.predict_batch(records).is_empty());
    }
}
