//! Read-only views over the scored output dataset

pub mod cache;
pub mod dashboard;

pub use cache::{clear, invalidate, load_cached, open_scores, MISSING_SCORES_MESSAGE};
pub use dashboard::{
    Dashboard, DashboardFilter, EmployeeDetail, IncomePoint, IncomeRisk, Kpis, RiskWarning,
    TierShare,
};
