//! Attrition risk dashboard over a persisted output dataset
//!
//! Filters, KPIs, the tier distribution, income vs risk, correlations and a
//! single-employee deep-dive. Computations return plain data; the `render_*`
//! functions turn them into terminal text.

use colored::{ColoredString, Colorize};
use std::collections::BTreeSet;

use crate::data::table::RecordId;
use crate::data::{ScoredRecord, ScoredTable};
use crate::data::scores::ATTRITION_PROBABILITY;
use crate::risk::thresholds::{OVERTIME_CODE, PROMOTION_STAGNATION_YEARS};
use crate::risk::RiskCategory;

pub const DEPARTMENT: &str = "Department";
pub const JOB_ROLE: &str = "JobRole";
pub const MONTHLY_INCOME: &str = "MonthlyIncome";
pub const OVERTIME: &str = "OverTime";
pub const YEARS_AT_COMPANY: &str = "YearsAtCompany";
pub const YEARS_SINCE_LAST_PROMOTION: &str = "YearsSinceLastPromotion";

/// Which records the filtered views show
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardFilter {
    /// Department values to keep; `None` keeps every department
    pub departments: Option<Vec<String>>,
    /// Tiers to keep
    pub risks: Vec<RiskCategory>,
}

impl Default for DashboardFilter {
    fn default() -> Self {
        Self {
            departments: None,
            risks: vec![RiskCategory::High, RiskCategory::Medium],
        }
    }
}

impl DashboardFilter {
    pub fn with_departments(mut self, departments: Vec<String>) -> Self {
        self.departments = if departments.is_empty() {
            None
        } else {
            Some(departments)
        };
        self
    }

    /// Replace the tier selection; an empty list keeps the default
    pub fn with_risks(mut self, risks: Vec<RiskCategory>) -> Self {
        if !risks.is_empty() {
            self.risks = risks;
        }
        self
    }

    pub fn matches(&self, table: &ScoredTable, record: &ScoredRecord) -> bool {
        let department_ok = match &self.departments {
            None => true,
            Some(keep) => table
                .value(record, DEPARTMENT)
                .map(|d| keep.iter().any(|k| k == d))
                .unwrap_or(false),
        };
        department_ok && self.risks.contains(&record.score.category)
    }
}

/// Headline numbers
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub total_employees: usize,
    pub high_risk_count: usize,
    /// Mean probability over all records, as a fraction
    pub avg_risk_score: f64,
    /// Records passing the filter
    pub potential_exits: usize,
}

/// Share of one tier in the whole dataset
#[derive(Debug, Clone, PartialEq)]
pub struct TierShare {
    pub category: RiskCategory,
    pub count: usize,
    pub share: f64,
}

/// One filtered record on the income vs risk plane
#[derive(Debug, Clone, PartialEq)]
pub struct IncomePoint {
    pub id: RecordId,
    pub job_role: Option<String>,
    pub monthly_income: f64,
    pub probability: f64,
    pub category: RiskCategory,
}

/// Monthly income against attrition probability for the filtered set
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeRisk {
    pub points: Vec<IncomePoint>,
    /// Pearson correlation, `None` with fewer than two points or no variance
    pub correlation: Option<f64>,
}

impl IncomeRisk {
    /// Mean income of the points in one tier
    pub fn mean_income(&self, category: RiskCategory) -> Option<f64> {
        let incomes: Vec<f64> = self
            .points
            .iter()
            .filter(|p| p.category == category)
            .map(|p| p.monthly_income)
            .collect();
        if incomes.is_empty() {
            None
        } else {
            Some(incomes.iter().sum::<f64>() / incomes.len() as f64)
        }
    }

    /// Points with the highest probability first, at most `limit`
    pub fn riskiest(&self, limit: usize) -> Vec<&IncomePoint> {
        let mut points: Vec<&IncomePoint> = self.points.iter().collect();
        points.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        points.truncate(limit);
        points
    }
}

/// Attention flags of the deep-dive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskWarning {
    Overtime,
    PromotionStagnation,
}

impl RiskWarning {
    pub fn message(&self) -> &'static str {
        match self {
            RiskWarning::Overtime => "Critical Factor: Working Overtime",
            RiskWarning::PromotionStagnation => "Critical Factor: Promotion Stagnation",
        }
    }
}

/// Single-employee deep-dive
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeDetail {
    pub id: RecordId,
    pub job_role: Option<String>,
    pub years_at_company: Option<String>,
    pub probability: f64,
    pub category: RiskCategory,
    pub warnings: Vec<RiskWarning>,
}

/// Pearson correlation of two equally long series
fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return None;
    }
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x < 1e-12 || var_y < 1e-12 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Views over one loaded output dataset
pub struct Dashboard<'a> {
    table: &'a ScoredTable,
    filter: DashboardFilter,
}

impl<'a> Dashboard<'a> {
    pub fn new(table: &'a ScoredTable, filter: DashboardFilter) -> Self {
        Self { table, filter }
    }

    /// Records passing the filter, in record order
    pub fn filtered(&self) -> Vec<&'a ScoredRecord> {
        self.table
            .records()
            .iter()
            .filter(|r| self.filter.matches(self.table, r))
            .collect()
    }

    /// Distinct department values, sorted
    pub fn departments(&self) -> Vec<String> {
        self.table
            .records()
            .iter()
            .filter_map(|r| self.table.value(r, DEPARTMENT))
            .map(String::from)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn kpis(&self) -> Kpis {
        let records = self.table.records();
        let total = records.len();
        let high = records
            .iter()
            .filter(|r| r.score.category == RiskCategory::High)
            .count();
        let avg = if total == 0 {
            0.0
        } else {
            records.iter().map(|r| r.score.probability).sum::<f64>() / total as f64
        };

        Kpis {
            total_employees: total,
            high_risk_count: high,
            avg_risk_score: avg,
            potential_exits: self.filtered().len(),
        }
    }

    /// Tier shares over the whole dataset, highest tier first
    pub fn risk_distribution(&self) -> Vec<TierShare> {
        let total = self.table.len();
        RiskCategory::ALL
            .iter()
            .map(|&category| {
                let count = self
                    .table
                    .records()
                    .iter()
                    .filter(|r| r.score.category == category)
                    .count();
                let share = if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64
                };
                TierShare {
                    category,
                    count,
                    share,
                }
            })
            .collect()
    }

    /// Filtered records with a numeric monthly income
    pub fn income_vs_risk(&self) -> IncomeRisk {
        let points: Vec<IncomePoint> = self
            .filtered()
            .into_iter()
            .filter_map(|r| {
                let income = self.table.numeric(r, MONTHLY_INCOME)?;
                Some(IncomePoint {
                    id: r.id,
                    job_role: self.table.value(r, JOB_ROLE).map(String::from),
                    monthly_income: income,
                    probability: r.score.probability,
                    category: r.score.category,
                })
            })
            .collect();

        let incomes: Vec<f64> = points.iter().map(|p| p.monthly_income).collect();
        let probabilities: Vec<f64> = points.iter().map(|p| p.probability).collect();

        IncomeRisk {
            correlation: pearson(&incomes, &probabilities),
            points,
        }
    }

    /// Correlation of every fully numeric column with the attrition
    /// probability over the whole dataset, strongest first
    pub fn correlations(&self) -> Vec<(String, f64)> {
        let records = self.table.records();
        let probabilities: Vec<f64> = records.iter().map(|r| r.score.probability).collect();

        let mut correlations: Vec<(String, f64)> = self
            .table
            .headers()
            .iter()
            .filter(|h| h.as_str() != ATTRITION_PROBABILITY)
            .filter_map(|column| {
                let values = records
                    .iter()
                    .map(|r| self.table.numeric(r, column))
                    .collect::<Option<Vec<f64>>>()?;
                pearson(&values, &probabilities).map(|r| (column.clone(), r))
            })
            .collect();

        correlations.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        correlations
    }

    /// Deep-dive of one record, if it exists
    pub fn employee(&self, id: RecordId) -> Option<EmployeeDetail> {
        let record = self.table.record(id)?;

        let mut warnings = Vec::new();
        if self.table.numeric(record, OVERTIME) == Some(OVERTIME_CODE) {
            warnings.push(RiskWarning::Overtime);
        }
        if self
            .table
            .numeric(record, YEARS_SINCE_LAST_PROMOTION)
            .map_or(false, |years| years > PROMOTION_STAGNATION_YEARS)
        {
            warnings.push(RiskWarning::PromotionStagnation);
        }

        Some(EmployeeDetail {
            id,
            job_role: self.table.value(record, JOB_ROLE).map(String::from),
            years_at_company: self.table.value(record, YEARS_AT_COMPANY).map(String::from),
            probability: record.score.probability,
            category: record.score.category,
            warnings,
        })
    }
}

/// Text in the tier's color: High red, Medium yellow, Low green
pub fn paint(category: RiskCategory, text: &str) -> ColoredString {
    match category {
        RiskCategory::High => text.red(),
        RiskCategory::Medium => text.yellow(),
        RiskCategory::Low => text.green(),
    }
}

fn heading(title: &str) -> String {
    format!("{}\n{}\n", title.bold(), "-".repeat(40))
}

pub fn render_kpis(kpis: &Kpis) -> String {
    let mut s = heading("Key Figures");
    s.push_str(&format!("  Total Employees:  {}\n", kpis.total_employees));
    s.push_str(&format!(
        "  High Risk Count:  {}\n",
        paint(RiskCategory::High, &kpis.high_risk_count.to_string())
    ));
    s.push_str(&format!("  Avg Risk Score:   {:.1}%\n", kpis.avg_risk_score * 100.0));
    s.push_str(&format!("  Potential Exits:  {}\n", kpis.potential_exits));
    s
}

pub fn render_distribution(shares: &[TierShare]) -> String {
    let mut s = heading("Risk Distribution");
    for share in shares {
        let bar = "#".repeat((share.share * 30.0).round() as usize);
        s.push_str(&format!(
            "  {:<12} {:>5} {:>6.1}%  {}\n",
            paint(share.category, share.category.as_str()),
            share.count,
            share.share * 100.0,
            paint(share.category, &bar)
        ));
    }
    s
}

/// Income summary plus the `limit` riskiest points with their job role
pub fn render_income_risk(income: &IncomeRisk, limit: usize) -> String {
    let mut s = heading("Monthly Income vs Attrition Risk");
    s.push_str(&format!("  Records: {}\n", income.points.len()));
    for category in RiskCategory::ALL {
        if let Some(mean) = income.mean_income(category) {
            s.push_str(&format!(
                "  {:<12} mean income {:>10.0}\n",
                paint(category, category.as_str()),
                mean
            ));
        }
    }
    match income.correlation {
        Some(r) => s.push_str(&format!("  Correlation: {:+.3}\n", r)),
        None => s.push_str("  Correlation: n/a\n"),
    }
    for point in income.riskiest(limit) {
        s.push_str(&format!(
            "  {:>6}  {:<26} {:>8.0}  {}\n",
            point.id.to_string(),
            point.job_role.as_deref().unwrap_or("-"),
            point.monthly_income,
            paint(point.category, &format!("{:.1}%", point.probability * 100.0))
        ));
    }
    s
}

pub fn render_correlations(correlations: &[(String, f64)], limit: usize) -> String {
    let mut s = heading("Correlation with Attrition Probability");
    for (column, r) in correlations.iter().take(limit) {
        s.push_str(&format!("  {:<28} {:+.3}\n", column, r));
    }
    s
}

pub fn render_employee(detail: &EmployeeDetail) -> String {
    let mut s = heading(&format!("Employee Deep-Dive: {}", detail.id));
    let unknown = "-".to_string();
    s.push_str(&format!(
        "  Role:             {}\n",
        detail.job_role.as_ref().unwrap_or(&unknown)
    ));
    s.push_str(&format!(
        "  Years at Company: {}\n",
        detail.years_at_company.as_ref().unwrap_or(&unknown)
    ));
    s.push_str(&format!(
        "  Current Status:   {}\n",
        paint(detail.category, detail.category.as_str())
    ));
    s.push_str(&format!("  Risk Score:       {:.2}%\n", detail.probability * 100.0));
    for warning in &detail.warnings {
        s.push_str(&format!("  {}\n", warning.message().yellow().bold()));
    }
    s
}

/// Filtered records as a table, at most `limit` rows
pub fn render_records(table: &ScoredTable, records: &[&ScoredRecord], limit: usize) -> String {
    let mut s = heading("Filtered Employees");
    s.push_str(&format!(
        "  {:>6}  {:<10}  {:<26}  {:>11}  {}\n",
        "ID", "Department", "Job Role", "Probability", "Category"
    ));
    for record in records.iter().take(limit) {
        s.push_str(&format!(
            "  {:>6}  {:<10}  {:<26}  {:>10.1}%  {}\n",
            record.id.to_string(),
            table.value(record, DEPARTMENT).unwrap_or("-"),
            table.value(record, JOB_ROLE).unwrap_or("-"),
            record.score.probability * 100.0,
            paint(record.score.category, record.score.category.as_str())
        ));
    }
    if records.len() > limit {
        s.push_str(&format!("  ... {} more\n", records.len() - limit));
    }
    s
}
