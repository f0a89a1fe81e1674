//! Model evaluation metrics

pub mod classification;

pub use classification::{ClassificationMetrics, ConfusionMatrix};
