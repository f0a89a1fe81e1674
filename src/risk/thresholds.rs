//! Risk policy constants.
//!
//! Tier bands are lower-inclusive and upper-exclusive; the top band is open.
//! The dashboard warning thresholds are independent of the tier bands.

/// Probabilities below this are Low Risk
pub const LOW_RISK_UPPER: f64 = 0.30;

/// Probabilities at or above this are High Risk
pub const HIGH_RISK_LOWER: f64 = 0.60;

/// More years than this without a promotion counts as stagnation
pub const PROMOTION_STAGNATION_YEARS: f64 = 3.0;

/// Encoded `OverTime` value meaning the employee works overtime
pub const OVERTIME_CODE: f64 = 1.0;
