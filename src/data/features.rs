//! Feature engineering for attrition prediction
//!
//! Derives three composite features from raw HR columns. Every ratio uses a
//! `+1` denominator so new hires with zero tenure or experience stay finite.

use crate::data::table::EmployeeTable;
use crate::error::Result;

pub const INCOME_EXPERIENCE_RATIO: &str = "Income_Experience_Ratio";
pub const ENGAGEMENT_SCORE: &str = "Engagement_Score";
pub const PROMOTION_DELAY_RATIO: &str = "Promotion_Delay_Ratio";

/// Names of the engineered columns, in output order
pub const ENGINEERED_COLUMNS: [&str; 3] =
    [INCOME_EXPERIENCE_RATIO, ENGAGEMENT_SCORE, PROMOTION_DELAY_RATIO];

/// Raw columns the engineered features are computed from
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "MonthlyIncome",
    "TotalWorkingYears",
    "JobInvolvement",
    "JobSatisfaction",
    "EnvironmentSatisfaction",
    "RelationshipSatisfaction",
    "YearsSinceLastPromotion",
    "YearsAtCompany",
];

/// Monthly income per year of experience
pub fn income_experience_ratio(monthly_income: f64, total_working_years: f64) -> f64 {
    monthly_income / (total_working_years + 1.0)
}

/// Mean of the four engagement/satisfaction scores
pub fn engagement_score(
    job_involvement: f64,
    job_satisfaction: f64,
    environment_satisfaction: f64,
    relationship_satisfaction: f64,
) -> f64 {
    (job_involvement + job_satisfaction + environment_satisfaction + relationship_satisfaction)
        / 4.0
}

/// Share of tenure spent since the last promotion
pub fn promotion_delay_ratio(years_since_last_promotion: f64, years_at_company: f64) -> f64 {
    years_since_last_promotion / (years_at_company + 1.0)
}

/// Engineered feature columns, one value per record in table order
#[derive(Debug, Clone, PartialEq)]
pub struct EngineeredFeatures {
    pub income_experience_ratio: Vec<f64>,
    pub engagement_score: Vec<f64>,
    pub promotion_delay_ratio: Vec<f64>,
}

impl EngineeredFeatures {
    /// Number of records covered
    pub fn len(&self) -> usize {
        self.income_experience_ratio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.income_experience_ratio.is_empty()
    }

    /// Feature values of one record, in [`ENGINEERED_COLUMNS`] order
    pub fn row(&self, i: usize) -> [f64; 3] {
        [
            self.income_experience_ratio[i],
            self.engagement_score[i],
            self.promotion_delay_ratio[i],
        ]
    }
}

/// Feature engineering stage
#[derive(Debug, Default)]
pub struct FeatureEngineer;

impl FeatureEngineer {
    pub fn new() -> Self {
        Self
    }

    /// Compute all engineered features for the table.
    ///
    /// Fails with `SchemaMismatch` when a required column is absent and with
    /// `EncodingError` when one of its cells is not numeric.
    pub fn apply(&self, table: &EmployeeTable) -> Result<EngineeredFeatures> {
        for column in REQUIRED_COLUMNS {
            table.column_index(column)?;
        }

        let income = table.numeric_column("MonthlyIncome")?;
        let working_years = table.numeric_column("TotalWorkingYears")?;
        let involvement = table.numeric_column("JobInvolvement")?;
        let job_sat = table.numeric_column("JobSatisfaction")?;
        let env_sat = table.numeric_column("EnvironmentSatisfaction")?;
        let rel_sat = table.numeric_column("RelationshipSatisfaction")?;
        let since_promotion = table.numeric_column("YearsSinceLastPromotion")?;
        let at_company = table.numeric_column("YearsAtCompany")?;

        let n = table.len();
        let features = EngineeredFeatures {
            income_experience_ratio: (0..n)
                .map(|i| income_experience_ratio(income[i], working_years[i]))
                .collect(),
            engagement_score: (0..n)
                .map(|i| engagement_score(involvement[i], job_sat[i], env_sat[i], rel_sat[i]))
                .collect(),
            promotion_delay_ratio: (0..n)
                .map(|i| promotion_delay_ratio(since_promotion[i], at_company[i]))
                .collect(),
        };

        log::debug!("Engineered {} features for {} records", ENGINEERED_COLUMNS.len(), n);

        Ok(features)
    }
}
