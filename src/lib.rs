//! # Employee Attrition Risk Scoring
//!
//! Scores every employee record with a probability of attrition and a risk
//! tier, and offers a terminal dashboard over the scored dataset.
//!
//! ## Modules
//!
//! - `data` - Loading, feature engineering, encoding, scaling and persistence
//! - `models` - Class-balanced logistic regression
//! - `metrics` - Training diagnostics
//! - `risk` - Risk tiers and policy thresholds
//! - `pipeline` - End-to-end scoring run
//! - `viewer` - Score cache and dashboard views
//! - `utils` - Configuration and logging

pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod risk;
pub mod utils;
pub mod viewer;

pub use data::features::FeatureEngineer;
pub use data::{load_employees, load_scores, save_scores, EmployeeTable, RecordId, ScoredTable};
pub use error::{Result, RiskError};
pub use metrics::ClassificationMetrics;
pub use models::LogisticRegression;
pub use pipeline::{PipelineReport, ScoringPipeline};
pub use risk::{RiskCategory, RiskScore, RiskSummary};
pub use utils::{setup_logging, PipelineConfig};
