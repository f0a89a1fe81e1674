//! Pipeline configuration
//!
//! The scoring entry point runs with [`PipelineConfig::default`]. Library
//! callers and tests may load a TOML file instead.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{ClassWeight, LogisticRegression, Solver};

/// Model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Inverse L2 regularization strength
    pub c: f64,
    pub tolerance: f64,
    pub max_iter: usize,
    pub class_weight: ClassWeight,
    /// Seed of the optimizer's random source
    pub random_state: u64,
    pub solver: Solver,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            tolerance: 1e-6,
            max_iter: 100,
            class_weight: ClassWeight::Balanced,
            random_state: 42,
            solver: Solver::Newton,
        }
    }
}

impl ModelConfig {
    /// Build an unfitted model with these settings
    pub fn build(&self) -> LogisticRegression {
        LogisticRegression::new(self.c, self.max_iter, self.tolerance, true)
            .with_class_weight(self.class_weight)
            .with_solver(self.solver)
            .with_random_state(self.random_state)
    }
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Raw employee dataset
    pub input_path: PathBuf,
    /// Scored output dataset read by the dashboard
    pub output_path: PathBuf,
    /// Historical outcome column
    pub label_column: String,
    pub model: ModelConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/Palo Alto Networks.csv"),
            output_path: PathBuf::from("data/Employee_Risk_Scores.csv"),
            label_column: "Attrition".to_string(),
            model: ModelConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from file or use default
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Same settings with different input and output locations
    pub fn with_paths(mut self, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        self.input_path = input.into();
        self.output_path = output.into();
        self
    }
}
