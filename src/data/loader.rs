//! CSV loading and saving
//!
//! Thin I/O wrappers around the `csv` crate. Loading keeps every cell as
//! text; saving writes the full output dataset or nothing at all.

use csv::{ReaderBuilder, Writer};
use std::fs;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::data::scores::{ScoredDataset, ScoredTable};
use crate::data::table::EmployeeTable;
use crate::error::{DataIssue, Result, RiskError};

/// Read a headed CSV into raw headers and rows
fn read_rows(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let file = fs::File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RiskError::DataUnavailable {
            path: path.to_path_buf(),
            issue: DataIssue::NotFound,
        },
        _ => RiskError::unreadable(path, e),
    })?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| RiskError::unreadable(path, e))?
        .iter()
        .map(String::from)
        .collect();
    if headers.is_empty() {
        return Err(RiskError::unreadable(path, "missing header row"));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| RiskError::unreadable(path, e))?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok((headers, rows))
}

/// Load the raw employee dataset.
///
/// Fails with `DataUnavailable` when the file is missing or cannot be parsed.
pub fn load_employees<P: AsRef<Path>>(path: P) -> Result<EmployeeTable> {
    let path = path.as_ref();
    let (headers, rows) = read_rows(path)?;
    let table =
        EmployeeTable::new(headers, rows).map_err(|e| RiskError::unreadable(path, e))?;

    log::info!(
        "Loaded {} employee records with {} columns from {}",
        table.len(),
        table.headers().len(),
        path.display()
    );
    Ok(table)
}

/// Load a persisted output dataset
pub fn load_scores<P: AsRef<Path>>(path: P) -> Result<ScoredTable> {
    let path = path.as_ref();
    let (headers, rows) = read_rows(path)?;
    let table = ScoredTable::from_rows(headers, rows)?;

    log::info!("Loaded {} scored records from {}", table.len(), path.display());
    Ok(table)
}

/// Write the output dataset, replacing any previous version.
///
/// Rows go to a uniquely named temporary file in the target's directory,
/// which is then renamed over the target. Concurrent writers each rename a
/// complete file, the last one wins, and readers never observe a partially
/// written file.
pub fn save_scores<P: AsRef<Path>>(path: P, dataset: &ScoredDataset) -> Result<()> {
    let path = path.as_ref();
    let io_err = |source: io::Error| RiskError::Io {
        path: path.to_path_buf(),
        source,
    };

    // Render first so an encoding failure leaves no file behind
    let rows = dataset.output_rows()?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    // Dropped (and removed) on any early return
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut writer = Writer::from_writer(tmp.as_file_mut());
        let written = (|| -> std::result::Result<(), csv::Error> {
            writer.write_record(dataset.headers())?;
            for row in &rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
            Ok(())
        })();
        written.map_err(|e| io_err(io::Error::from(e)))?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    log::info!("Wrote {} scored records to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::encoder::CategoryMappings;
    use crate::data::features::FeatureEngineer;
    use crate::data::table::RecordId;
    use crate::risk::RiskScore;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_keeps_columns_as_in_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("employees.csv");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "Age,Attrition,Department").unwrap();
        writeln!(file, "41,Yes,Sales").unwrap();
        writeln!(file, "49,No,\"Research & Development\"").unwrap();
        drop(file);

        let table = load_employees(&path).unwrap();
        assert_eq!(table.headers(), &["Age", "Attrition", "Department"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].values[2], "Research & Development");
    }

    #[test]
    fn test_missing_file_is_data_unavailable() {
        let dir = tempdir().unwrap();
        let err = load_employees(dir.path().join("absent.csv")).unwrap_err();

        assert!(err.is_missing_file());
        assert!(matches!(err, RiskError::DataUnavailable { .. }));
    }

    #[test]
    fn test_ragged_file_is_data_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        fs::write(&path, "Age,Attrition\n41,Yes\n49\n").unwrap();

        let err = load_employees(&path).unwrap_err();
        assert!(matches!(err, RiskError::DataUnavailable { .. }));
        assert!(!err.is_missing_file());
    }

    fn dataset(probabilities: &[f64]) -> ScoredDataset {
        let headers = [
            "Attrition",
            "MonthlyIncome",
            "TotalWorkingYears",
            "JobInvolvement",
            "JobSatisfaction",
            "EnvironmentSatisfaction",
            "RelationshipSatisfaction",
            "YearsSinceLastPromotion",
            "YearsAtCompany",
        ];
        let rows: Vec<Vec<String>> = probabilities
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let label = if i % 2 == 0 { "Yes" } else { "No" };
                [label, "2090", "0", "1", "1", "1", "1", "4", "0"]
                    .iter()
                    .map(|v| v.to_string())
                    .collect()
            })
            .collect();
        let table =
            EmployeeTable::new(headers.iter().map(|h| h.to_string()).collect(), rows).unwrap();
        let features = FeatureEngineer::new().apply(&table).unwrap();
        let mappings = CategoryMappings::fit(&table, "Attrition").unwrap();
        let scores = probabilities
            .iter()
            .enumerate()
            .map(|(i, &p)| RiskScore::new(RecordId(i), p))
            .collect();
        ScoredDataset::new(table, mappings, features, scores).unwrap()
    }

    #[test]
    fn test_save_leaves_only_the_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("Employee_Risk_Scores.csv");
        save_scores(&path, &dataset(&[0.8, 0.2])).unwrap();
        save_scores(&path, &dataset(&[0.8, 0.2, 0.5])).unwrap();

        let entries: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("Employee_Risk_Scores.csv")]);
        assert_eq!(load_scores(&path).unwrap().len(), 3);
    }

    #[test]
    fn test_concurrent_saves_each_write_a_whole_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Employee_Risk_Scores.csv");
        let small = dataset(&[0.8, 0.2]);
        let large = dataset(&vec![0.45; 400]);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| save_scores(&path, &small).unwrap());
                scope.spawn(|| save_scores(&path, &large).unwrap());
            }
        });

        // Whichever writer renamed last, its file is complete
        let len = load_scores(&path).unwrap().len();
        assert!(len == 2 || len == 400);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
