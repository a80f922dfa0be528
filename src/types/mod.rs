//! Type definitions for the risk scoring service

pub mod assessment;
pub mod customer;

pub use assessment::{bucket, RiskAssessment, RiskTier};
pub use customer::{CustomerAttributes, CustomerData, CustomerRecord, NewCustomer};
