//! Risk assessment data structures and the bucketing policy

use serde::{Deserialize, Serialize};

/// Probability at which a customer moves from LOW to MEDIUM
pub const MEDIUM_THRESHOLD: f64 = 0.3;
/// Probability at which a customer moves from MEDIUM to HIGH
pub const HIGH_THRESHOLD: f64 = 0.7;

/// Risk tier classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Determine the tier for a delinquency probability.
    ///
    /// Intervals are half-open: 0.3 is MEDIUM and 0.7 is HIGH.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_THRESHOLD {
            RiskTier::High
        } else if probability >= MEDIUM_THRESHOLD {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    /// Bucket name, e.g. `LOW`
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        }
    }

    /// Display label, e.g. `LOW RISK`
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW RISK",
            RiskTier::Medium => "MEDIUM RISK",
            RiskTier::High => "HIGH RISK",
        }
    }

    /// Recommended action for this tier
    pub fn action(&self) -> &'static str {
        match self {
            RiskTier::Low => "Approve normally",
            RiskTier::Medium => "Approve with caution",
            RiskTier::High => "Manual review required",
        }
    }

    /// Reason reported for this tier
    pub fn reason(&self) -> &'static str {
        match self {
            RiskTier::Low => "stable repayment behaviour",
            RiskTier::Medium => "moderate risk indicators",
            RiskTier::High => "strong default signals",
        }
    }

    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scored outcome for one customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Probability of delinquency (0.0 - 1.0)
    pub probability: f64,
    pub tier: RiskTier,
    pub action: String,
    pub reason: String,
}

impl RiskAssessment {
    /// Bucket a probability into a full assessment
    pub fn from_probability(probability: f64) -> Self {
        let (tier, action, reason) = bucket(probability);
        Self {
            probability,
            tier,
            action: action.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Fixed substitute used when scoring an internally sourced record fails
    pub fn fallback() -> Self {
        Self {
            probability: 0.5,
            tier: RiskTier::Medium,
            action: "Review required".to_string(),
            reason: "Prediction failed, using default".to_string(),
        }
    }
}

/// Map a probability to its tier, recommended action and reason.
pub fn bucket(probability: f64) -> (RiskTier, &'static str, &'static str) {
    let tier = RiskTier::from_probability(probability);
    (tier, tier.action(), tier.reason())
}
