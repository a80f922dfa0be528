//! Presentation records returned by the HTTP API

use crate::types::assessment::RiskAssessment;
use crate::types::customer::CustomerRecord;
use rand::Rng;
use serde::Serialize;

/// Stored customer joined with its assessment.
///
/// `days_since_last_payment` and `payment_coverage_ratio` are mock values
/// generated per response; they never enter the scoring pipeline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerView {
    pub id: u64,
    pub name: String,
    pub account_number: String,
    pub risk_score: f64,
    pub risk_bucket: &'static str,
    pub risk_level: &'static str,
    pub utilization_rate: f64,
    pub current_balance: f64,
    pub credit_limit: f64,
    pub average_payment_delay: i64,
    pub days_since_last_payment: u32,
    pub payment_coverage_ratio: f64,
    pub trend: &'static str,
    pub behavior_flags: Vec<&'static str>,
    pub recommended_action: String,
    pub reason: String,
}

impl CustomerView {
    pub fn build<R: Rng>(
        customer: &CustomerRecord,
        assessment: &RiskAssessment,
        rng: &mut R,
    ) -> Self {
        let attrs = &customer.attributes;
        let utilization = if attrs.credit_limit > 0.0 {
            attrs.last_bill() / attrs.credit_limit
        } else {
            0.0
        };
        let mean_delay = attrs.mean_delay();

        Self {
            id: customer.id,
            name: customer.name.clone(),
            account_number: customer.account_number.clone(),
            risk_score: round2(assessment.probability),
            risk_bucket: assessment.tier.as_str(),
            risk_level: assessment.tier.label(),
            utilization_rate: round2(utilization),
            current_balance: attrs.last_bill(),
            credit_limit: attrs.credit_limit,
            average_payment_delay: mean_delay.trunc() as i64,
            days_since_last_payment: rng.gen_range(5..=30),
            payment_coverage_ratio: round2(rng.gen_range(0.3..0.9)),
            trend: trend(assessment.probability),
            behavior_flags: if mean_delay > 1.0 {
                vec!["Late payment history"]
            } else {
                Vec::new()
            },
            recommended_action: assessment.action.clone(),
            reason: assessment.reason.clone(),
        }
    }
}

fn trend(probability: f64) -> &'static str {
    if probability < 0.4 {
        "down"
    } else if probability > 0.6 {
        "up"
    } else {
        "stable"
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Body of a successful `/predict` response
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub risk_score: f64,
    pub risk_level: &'static str,
    pub recommended_action: String,
    pub reason: String,
}

impl From<RiskAssessment> for PredictionResponse {
    fn from(a: RiskAssessment) -> Self {
        Self {
            risk_score: a.probability,
            risk_level: a.tier.label(),
            recommended_action: a.action,
            reason: a.reason,
        }
    }
}
