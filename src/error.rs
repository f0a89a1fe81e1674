//! Error taxonomy for the scoring pipeline
//!
//! Every stage fails fast with one of these variants; the run is aborted and
//! nothing is written.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::data::table::RecordId;
use crate::models::logistic::LogisticRegressionError;

/// Why a tabular file could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataIssue {
    /// The file does not exist
    NotFound,
    /// The file exists but could not be read or parsed
    Unreadable(String),
}

impl fmt::Display for DataIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataIssue::NotFound => write!(f, "file does not exist"),
            DataIssue::Unreadable(reason) => write!(f, "{}", reason),
        }
    }
}

/// Errors raised by the attrition scoring pipeline
#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Data unavailable at {}: {issue}", .path.display())]
    DataUnavailable { path: PathBuf, issue: DataIssue },

    #[error("Schema mismatch: required column '{column}' is absent")]
    SchemaMismatch { column: String },

    #[error("Encoding error in column '{column}'{}: {reason}", .record.map(|id| format!(" at record {}", id)).unwrap_or_default())]
    EncodingError {
        column: String,
        record: Option<RecordId>,
        reason: String,
    },

    #[error("Training failure: {0}")]
    TrainingFailure(String),

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RiskError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        RiskError::DataUnavailable {
            path: path.into(),
            issue: DataIssue::Unreadable(reason.to_string()),
        }
    }

    pub(crate) fn encoding(
        column: impl Into<String>,
        record: Option<RecordId>,
        reason: impl Into<String>,
    ) -> Self {
        RiskError::EncodingError {
            column: column.into(),
            record,
            reason: reason.into(),
        }
    }

    /// True when the error means the file simply has not been produced yet.
    ///
    /// The dashboard uses this to tell the operator to run the pipeline first
    /// instead of treating it as a crash.
    pub fn is_missing_file(&self) -> bool {
        matches!(
            self,
            RiskError::DataUnavailable {
                issue: DataIssue::NotFound,
                ..
            }
        )
    }
}

impl From<LogisticRegressionError> for RiskError {
    fn from(err: LogisticRegressionError) -> Self {
        RiskError::TrainingFailure(err.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, RiskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_detection() {
        let missing = RiskError::DataUnavailable {
            path: PathBuf::from("data/Employee_Risk_Scores.csv"),
            issue: DataIssue::NotFound,
        };
        assert!(missing.is_missing_file());

        let corrupt = RiskError::unreadable("data/x.csv", "invalid UTF-8");
        assert!(!corrupt.is_missing_file());
        assert!(corrupt.to_string().contains("invalid UTF-8"));
    }

    #[test]
    fn test_encoding_error_message() {
        let err = RiskError::encoding("Department", Some(RecordId(4)), "empty cell");
        assert_eq!(
            err.to_string(),
            "Encoding error in column 'Department' at record 4: empty cell"
        );

        let err = RiskError::encoding("Department", None, "mixed numeric and text values");
        assert_eq!(
            err.to_string(),
            "Encoding error in column 'Department': mixed numeric and text values"
        );
    }

    #[test]
    fn test_model_errors_become_training_failures() {
        let err: RiskError = LogisticRegressionError::ConvergenceFailed(100).into();
        assert!(matches!(err, RiskError::TrainingFailure(_)));
    }
}
