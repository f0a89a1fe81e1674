//! Risk tiers and policy thresholds

pub mod thresholds;
pub mod tier;

pub use tier::{RiskCategory, RiskScore, RiskSummary};
