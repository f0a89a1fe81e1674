//! Utility module
//!
//! This module provides:
//! - Configuration management
//! - Logging setup

mod config;
mod logging;

pub use config::{ModelConfig, PipelineConfig};
pub use logging::setup_logging;
