//! Terminal dashboard over the scored employee dataset
//!
//! Usage:
//! ```
//! cargo run --bin risk_dashboard -- --risk high --department 2 --employee 17
//! ```

use anyhow::{Context, Result};
use attrition_risk::viewer::dashboard::{
    render_correlations, render_distribution, render_employee, render_income_risk, render_kpis,
    render_records,
};
use attrition_risk::viewer::{open_scores, Dashboard, DashboardFilter, MISSING_SCORES_MESSAGE};
use attrition_risk::{setup_logging, PipelineConfig, RecordId, RiskCategory};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Employee attrition risk dashboard")]
struct Args {
    /// Scored dataset written by score_employees
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Department code to include (repeatable, default all)
    #[arg(short, long = "department")]
    departments: Vec<String>,

    /// Risk category to include: high, medium or low (repeatable, default high and medium)
    #[arg(short, long = "risk")]
    risks: Vec<RiskCategory>,

    /// Record id for the deep-dive
    #[arg(short, long)]
    employee: Option<usize>,

    /// Rows of the filtered listing
    #[arg(long, default_value = "20")]
    rows: usize,

    /// Correlations to show
    #[arg(long, default_value = "10")]
    top: usize,
}

fn main() -> Result<()> {
    setup_logging("warn");
    let args = Args::parse();

    let path = args
        .scores
        .unwrap_or_else(|| PipelineConfig::default().output_path);

    let table = match open_scores(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?
    {
        Some(table) => table,
        None => {
            println!("{}", MISSING_SCORES_MESSAGE.yellow());
            return Ok(());
        }
    };

    let filter = DashboardFilter::default()
        .with_departments(args.departments)
        .with_risks(args.risks);
    let dashboard = Dashboard::new(&table, filter);

    println!("{}", "=".repeat(60).blue());
    println!("{}", "Employee Attrition Risk Dashboard".bold().blue());
    println!("{}", "=".repeat(60).blue());
    println!("Departments: {}\n", dashboard.departments().join(", "));

    println!("{}", render_kpis(&dashboard.kpis()));
    println!("{}", render_distribution(&dashboard.risk_distribution()));
    println!("{}", render_income_risk(&dashboard.income_vs_risk(), args.top));
    println!("{}", render_correlations(&dashboard.correlations(), args.top));

    if let Some(id) = args.employee {
        match dashboard.employee(RecordId(id)) {
            Some(detail) => println!("{}", render_employee(&detail)),
            None => println!(
                "{} no employee with id {} ({} records)\n",
                "Warning:".yellow(),
                id,
                table.len()
            ),
        }
    }

    println!("{}", render_records(&table, &dashboard.filtered(), args.rows));

    Ok(())
}
