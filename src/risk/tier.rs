//! Risk tiers derived from attrition probability

use std::fmt;
use std::str::FromStr;

use super::thresholds::{HIGH_RISK_LOWER, LOW_RISK_UPPER};
use crate::data::table::RecordId;

/// Discrete attrition risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    /// All tiers, highest first
    pub const ALL: [RiskCategory; 3] = [RiskCategory::High, RiskCategory::Medium, RiskCategory::Low];

    /// Tier of a probability.
    ///
    /// `p < 0.30` is Low, `0.30 <= p < 0.60` is Medium, `p >= 0.60` is High.
    pub fn from_probability(p: f64) -> Self {
        if p < LOW_RISK_UPPER {
            RiskCategory::Low
        } else if p < HIGH_RISK_LOWER {
            RiskCategory::Medium
        } else {
            RiskCategory::High
        }
    }

    /// Label written to the output dataset
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low Risk",
            RiskCategory::Medium => "Medium Risk",
            RiskCategory::High => "High Risk",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskCategory {
    type Err = String;

    /// Accepts the output labels as well as the short forms `low`, `medium`, `high`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low risk" | "low" => Ok(RiskCategory::Low),
            "medium risk" | "medium" => Ok(RiskCategory::Medium),
            "high risk" | "high" => Ok(RiskCategory::High),
            other => Err(format!("unknown risk category '{}'", other)),
        }
    }
}

/// Score of one record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskScore {
    pub id: RecordId,
    pub probability: f64,
    pub category: RiskCategory,
}

impl RiskScore {
    pub fn new(id: RecordId, probability: f64) -> Self {
        Self {
            id,
            probability,
            category: RiskCategory::from_probability(probability),
        }
    }
}

/// Tier breakdown over a set of scores
#[derive(Debug, Clone, PartialEq)]
pub struct RiskSummary {
    pub total: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub mean_probability: f64,
}

impl RiskSummary {
    pub fn from_scores<'a, I>(scores: I) -> Self
    where
        I: IntoIterator<Item = &'a RiskScore>,
    {
        let mut summary = RiskSummary {
            total: 0,
            low: 0,
            medium: 0,
            high: 0,
            mean_probability: 0.0,
        };
        let mut sum = 0.0;

        for score in scores {
            summary.total += 1;
            sum += score.probability;
            match score.category {
                RiskCategory::Low => summary.low += 1,
                RiskCategory::Medium => summary.medium += 1,
                RiskCategory::High => summary.high += 1,
            }
        }

        if summary.total > 0 {
            summary.mean_probability = sum / summary.total as f64;
        }
        summary
    }

    /// Count of a single tier
    pub fn count(&self, category: RiskCategory) -> usize {
        match category {
            RiskCategory::Low => self.low,
            RiskCategory::Medium => self.medium,
            RiskCategory::High => self.high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RiskCategory::from_probability(0.0), RiskCategory::Low);
        assert_eq!(RiskCategory::from_probability(0.29), RiskCategory::Low);
        assert_eq!(RiskCategory::from_probability(0.30), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_probability(0.599), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_probability(0.60), RiskCategory::High);
        assert_eq!(RiskCategory::from_probability(1.0), RiskCategory::High);
    }

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for category in RiskCategory::ALL {
            assert_eq!(category.as_str().parse::<RiskCategory>(), Ok(category));
        }
        assert_eq!("high".parse::<RiskCategory>(), Ok(RiskCategory::High));
        assert!("critical".parse::<RiskCategory>().is_err());
    }

    #[test]
    fn test_summary_counts() {
        let scores = [
            RiskScore::new(RecordId(0), 0.1),
            RiskScore::new(RecordId(1), 0.45),
            RiskScore::new(RecordId(2), 0.75),
            RiskScore::new(RecordId(3), 0.9),
        ];
        let summary = RiskSummary::from_scores(&scores);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.count(RiskCategory::Low), 1);
        assert_eq!(summary.count(RiskCategory::Medium), 1);
        assert_eq!(summary.count(RiskCategory::High), 2);
        assert!((summary.mean_probability - 0.55).abs() < 1e-12);
    }
}
