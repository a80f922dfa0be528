//! Feature engineering for credit card delinquency model inference.
//!
//! This module derives the engineered feature vector the classifier was
//! trained on. The column order in [`FEATURE_NAMES`] is part of the model
//! contract: a classifier fed the same numbers in a different order silently
//! returns wrong probabilities.

use crate::types::customer::{CustomerAttributes, PERIODS};

/// Number of features produced per customer
pub const FEATURE_COUNT: usize = 18;

/// Training column names, in the exact order the model expects them.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "limit_bal",
    "age",
    "avg_delay",
    "delay_trend",
    "pay_cover_ratio_avg",
    "bill_growth",
    "utilization_avg",
    "cash_flow_proxy",
    "sex_2",
    "education_1",
    "education_2",
    "education_3",
    "education_4",
    "education_5",
    "education_6",
    "marriage_1",
    "marriage_2",
    "marriage_3",
];

/// Engineered model input for one customer.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub credit_limit: f64,
    pub age: f64,
    pub avg_delay: f64,
    pub delay_trend: f64,
    pub pay_cover_ratio_avg: f64,
    pub bill_growth: f64,
    pub utilization_avg: f64,
    pub cash_flow_proxy: f64,
    pub sex_is_2: f64,
    pub education_is: [f64; 6],
    pub marital_status_is: [f64; 3],
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        let e = &self.education_is;
        let m = &self.marital_status_is;
        [
            self.credit_limit,
            self.age,
            self.avg_delay,
            self.delay_trend,
            self.pay_cover_ratio_avg,
            self.bill_growth,
            self.utilization_avg,
            self.cash_flow_proxy,
            self.sex_is_2,
            e[0],
            e[1],
            e[2],
            e[3],
            e[4],
            e[5],
            m[0],
            m[1],
            m[2],
        ]
    }

    /// Values in [`FEATURE_NAMES`] order, narrowed for ONNX float inputs
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.to_array().iter().map(|&v| v as f32).collect()
    }

    /// Pairs of column name and value, for logging
    pub fn named(&self) -> Vec<(&'static str, f64)> {
        FEATURE_NAMES.iter().copied().zip(self.to_array()).collect()
    }
}

/// Feature extractor that transforms customer attributes into model input features.
///
/// Matches the preprocessing done in the training pipeline.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Derive the feature vector for a customer. Never fails: unexpected
    /// categorical codes produce all-zero indicator flags.
    pub fn extract(&self, attrs: &CustomerAttributes) -> FeatureVector {
        let pay = &attrs.pay;
        let bills = &attrs.bill_amounts;

        let avg_bill = mean(bills);
        let avg_payment = mean(&attrs.payment_amounts);

        // pay_6 - pay_0
        let delay_trend = (pay[PERIODS - 1] - pay[0]) as f64;

        // bill_amt6 - bill_amt1, over bill_amt1 shifted by one
        let bill_growth = (bills[PERIODS - 1] - bills[0]) / (bills[0] + 1.0);

        FeatureVector {
            credit_limit: attrs.credit_limit,
            age: attrs.age as f64,
            avg_delay: attrs.mean_delay(),
            delay_trend,
            pay_cover_ratio_avg: avg_payment / (avg_bill + 1.0),
            bill_growth,
            utilization_avg: avg_bill / (attrs.credit_limit + 1.0),
            cash_flow_proxy: avg_payment,
            sex_is_2: indicator(attrs.sex == 2),
            education_is: one_hot(attrs.education),
            marital_status_is: one_hot(attrs.marital_status),
        }
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Get feature names (matching training order).
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive the feature vector for a customer.
pub fn engineer(attrs: &CustomerAttributes) -> FeatureVector {
    FeatureExtractor.extract(attrs)
}

fn mean(values: &[f64; PERIODS]) -> f64 {
    values.iter().sum::<f64>() / PERIODS as f64
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// Indicator flags for codes `1..=N`; any other code sets none.
fn one_hot<const N: usize>(code: i32) -> [f64; N] {
    let mut flags = [0.0; N];
    for (i, flag) in flags.iter_mut().enumerate() {
        *flag = indicator(code == i as i32 + 1);
    }
    flags
}
