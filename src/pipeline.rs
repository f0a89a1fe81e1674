//! End-to-end scoring run
//!
//! load → engineer → encode/scale → train → score → persist. The model is
//! fit on the same records it scores, and nothing is written unless every
//! stage succeeds.

use std::path::PathBuf;

use crate::data::{
    load_employees, save_scores, CategoryMappings, EmployeeTable, Encoder, FeatureEngineer,
    ScoredDataset, StandardScaler,
};
use crate::error::{Result, RiskError};
use crate::metrics::ClassificationMetrics;
use crate::risk::{RiskScore, RiskSummary};
use crate::utils::PipelineConfig;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Records scored and written
    pub records: usize,
    pub output_path: PathBuf,
    pub summary: RiskSummary,
    /// In-sample diagnostics, never persisted
    pub metrics: ClassificationMetrics,
}

impl PipelineReport {
    pub fn high_risk_count(&self) -> usize {
        self.summary.high
    }
}

/// Scoring pipeline over one employee dataset
#[derive(Debug, Clone)]
pub struct ScoringPipeline {
    config: PipelineConfig,
}

impl Default for ScoringPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl ScoringPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Score the configured input and replace the configured output
    pub fn run(&self) -> Result<PipelineReport> {
        let table = load_employees(&self.config.input_path)?;
        let (dataset, metrics) = self.score_with_metrics(table)?;
        save_scores(&self.config.output_path, &dataset)?;

        let summary = RiskSummary::from_scores(dataset.scores());
        Ok(PipelineReport {
            records: dataset.len(),
            output_path: self.config.output_path.clone(),
            summary,
            metrics,
        })
    }

    /// Score a loaded table without touching the filesystem
    pub fn score(&self, table: EmployeeTable) -> Result<ScoredDataset> {
        self.score_with_metrics(table).map(|(dataset, _)| dataset)
    }

    fn score_with_metrics(
        &self,
        table: EmployeeTable,
    ) -> Result<(ScoredDataset, ClassificationMetrics)> {
        let features = FeatureEngineer::new().apply(&table)?;

        let mappings = CategoryMappings::fit(&table, &self.config.label_column)?;
        let encoded = Encoder::new(&mappings).encode(&table, &features)?;
        log::info!(
            "Encoded {} samples with {} features",
            encoded.n_samples(),
            encoded.n_features()
        );

        // Scaler is fit on the records it scores
        let (_, x_scaled) = StandardScaler::fit_transform(&encoded.x)?;

        let mut model = self.config.model.build();
        model.fit(&x_scaled, &encoded.y)?;
        log::debug!("{}", model.summary(Some(&encoded.feature_names)));

        let proba = model.predict_proba(&x_scaled)?;
        if let Some((idx, p)) = proba
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || !(0.0..=1.0).contains(*p))
        {
            return Err(RiskError::TrainingFailure(format!(
                "record {} scored an invalid probability {}",
                idx, p
            )));
        }

        let metrics = ClassificationMetrics::calculate(&encoded.y, &proba);
        log::info!(
            "In-sample accuracy {:.4}, recall {:.4}, AUC {:.4}",
            metrics.accuracy,
            metrics.recall,
            metrics.auc_roc
        );

        let scores: Vec<RiskScore> = encoded
            .record_ids
            .iter()
            .zip(proba.iter())
            .map(|(&id, &p)| RiskScore::new(id, p))
            .collect();

        let summary = RiskSummary::from_scores(&scores);
        log::info!(
            "Risk tiers: {} high, {} medium, {} low (mean probability {:.4})",
            summary.high,
            summary.medium,
            summary.low,
            summary.mean_probability
        );

        let dataset = ScoredDataset::new(table, mappings, features, scores)?;
        Ok((dataset, metrics))
    }
}
