//! Portfolio aggregation for the dashboard and analytics views.
//!
//! Every stored customer is scored with the fallback path, so these views
//! always cover the whole portfolio. Trend and intervention figures are
//! synthetic placeholders derived from the current scores, not history.

use crate::predictor::RiskPredictor;
use crate::store::CustomerStore;
use crate::types::assessment::{RiskAssessment, RiskTier};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

const TREND_MONTHS: [&str; 6] = ["Nov", "Dec", "Jan", "Feb", "Mar", "Apr"];
const SAVINGS_PER_AT_RISK_ACCOUNT: u64 = 1500;

/// Assessments for a whole portfolio
#[derive(Debug, Clone, Default)]
pub struct PortfolioScores {
    pub assessments: Vec<RiskAssessment>,
    /// Number of assessments that are fallbacks
    pub fallbacks: usize,
}

impl PortfolioScores {
    /// Score every stored customer, falling back per customer on failure
    pub fn collect(predictor: &RiskPredictor, store: &dyn CustomerStore) -> Self {
        let mut scores = Self::default();
        for customer in store.list_all() {
            let (assessment, error) = predictor.assess_internal(&customer.attributes);
            if let Some(e) = error {
                warn!(customer_id = customer.id, error = %e, "Error predicting for customer");
                scores.fallbacks += 1;
            }
            scores.assessments.push(assessment);
        }
        scores
    }

    pub fn total(&self) -> usize {
        self.assessments.len()
    }

    pub fn count(&self, tier: RiskTier) -> usize {
        self.assessments.iter().filter(|a| a.tier == tier).count()
    }

    /// MEDIUM and HIGH accounts
    pub fn at_risk(&self) -> usize {
        self.count(RiskTier::Medium) + self.count(RiskTier::High)
    }

    pub fn mean_probability(&self) -> Option<f64> {
        if self.assessments.is_empty() {
            return None;
        }
        let sum: f64 = self.assessments.iter().map(|a| a.probability).sum();
        Some(sum / self.assessments.len() as f64)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub total_accounts: usize,
    pub at_risk_accounts: usize,
    pub interventions_active: u64,
    pub prevented_defaults_30d: u64,
    pub estimated_savings: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RiskBucketShare {
    pub bucket: &'static str,
    pub count: usize,
    pub percentage: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub month: &'static str,
    pub avg_risk: f64,
    pub high_risk: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InterventionStat {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub success: u64,
    pub total: u64,
}

/// Payload of `/dashboard-metrics`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub portfolio_metrics: PortfolioMetrics,
    pub risk_distribution: Vec<RiskBucketShare>,
    pub risk_trend_data: Vec<TrendPoint>,
    pub intervention_effectiveness: Vec<InterventionStat>,
    pub fallback_assessments: usize,
}

/// Payload of `/analytics/risk-summary`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    pub total_customers: usize,
    pub risk_distribution: BTreeMap<RiskTier, usize>,
    pub average_risk_score: f64,
    pub timestamp: DateTime<Utc>,
}

/// `floor(n * fraction)` for the placeholder ratios
fn share(n: usize, fraction: f64) -> u64 {
    (n as f64 * fraction).floor() as u64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl DashboardMetrics {
    pub fn from_scores(scores: &PortfolioScores) -> Self {
        let total = scores.total();
        if total == 0 {
            return Self::empty();
        }

        let at_risk = scores.at_risk();
        let high = scores.count(RiskTier::High);

        let risk_distribution = [
            ("Low", RiskTier::Low),
            ("Medium", RiskTier::Medium),
            ("High", RiskTier::High),
        ]
        .into_iter()
        .map(|(bucket, tier)| {
            let count = scores.count(tier);
            RiskBucketShare {
                bucket,
                count,
                percentage: (count as f64 / total as f64 * 100.0).round_ties_even() as u64,
            }
        })
        .collect();

        let base_avg = scores.mean_probability().unwrap_or(0.0);
        let risk_trend_data = TREND_MONTHS
            .iter()
            .enumerate()
            .map(|(i, &month)| {
                let factor = 1.0 - i as f64 * 0.02;
                TrendPoint {
                    month,
                    avg_risk: round2(base_avg * factor),
                    high_risk: share(high, factor),
                }
            })
            .collect();

        let intervention_effectiveness = [
            ("SMS Reminder", 0.3, 0.4),
            ("Call Center", 0.25, 0.35),
            ("Payment Plan", 0.15, 0.2),
            ("Credit Limit Freeze", 0.1, 0.15),
        ]
        .into_iter()
        .map(|(kind, success, total)| InterventionStat {
            kind,
            success: share(at_risk, success),
            total: share(at_risk, total),
        })
        .collect();

        info!(
            low = scores.count(RiskTier::Low),
            medium = scores.count(RiskTier::Medium),
            high = high,
            total = total,
            at_risk = at_risk,
            "Dashboard risk distribution"
        );

        Self {
            portfolio_metrics: PortfolioMetrics {
                total_accounts: total,
                at_risk_accounts: at_risk,
                interventions_active: share(at_risk, 0.35),
                prevented_defaults_30d: share(at_risk, 0.17),
                estimated_savings: at_risk as u64 * SAVINGS_PER_AT_RISK_ACCOUNT,
            },
            risk_distribution,
            risk_trend_data,
            intervention_effectiveness,
            fallback_assessments: scores.fallbacks,
        }
    }

    /// Dashboard for an empty portfolio
    pub fn empty() -> Self {
        Self {
            portfolio_metrics: PortfolioMetrics {
                total_accounts: 0,
                at_risk_accounts: 0,
                interventions_active: 0,
                prevented_defaults_30d: 0,
                estimated_savings: 0,
            },
            risk_distribution: Vec::new(),
            risk_trend_data: Vec::new(),
            intervention_effectiveness: Vec::new(),
            fallback_assessments: 0,
        }
    }
}

impl RiskSummary {
    /// Summarize a portfolio; `None` when it has no customers
    pub fn from_scores(scores: &PortfolioScores) -> Option<Self> {
        let average = scores.mean_probability()?;
        let risk_distribution = RiskTier::ALL
            .into_iter()
            .map(|tier| (tier, scores.count(tier)))
            .collect();

        Some(Self {
            total_customers: scores.total(),
            risk_distribution,
            average_risk_score: round2(average),
            timestamp: Utc::now(),
        })
    }
}
