//! Score every employee in the default dataset
//!
//! Reads `data/Palo Alto Networks.csv`, fits the attrition model and writes
//! `data/Employee_Risk_Scores.csv`. Takes no arguments; `RUST_LOG` controls
//! log verbosity.
//!
//! Usage:
//! ```
//! cargo run --bin score_employees
//! ```

use anyhow::{Context, Result};
use attrition_risk::{setup_logging, PipelineConfig, ScoringPipeline};
use colored::Colorize;

fn main() -> Result<()> {
    setup_logging("info");

    let pipeline = ScoringPipeline::new(PipelineConfig::default());

    let report = pipeline.run().with_context(|| {
        format!(
            "Failed to score employees from {}",
            pipeline.config().input_path.display()
        )
    })?;

    log::debug!("{}", report.metrics.report());

    let file_name = report
        .output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let folder = report
        .output_path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".to_string());

    println!(
        "{} {} generated in {} folder.",
        "Success:".green().bold(),
        file_name,
        folder
    );
    println!(
        "Scored {} employees, {} at high risk.",
        report.records,
        report.high_risk_count().to_string().red()
    );

    Ok(())
}
