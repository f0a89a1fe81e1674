//! In-memory employee table
//!
//! Rows keep the raw text of every cell exactly as read from the source file.
//! Each row carries an explicit [`RecordId`] so later stages never rely on
//! positional alignment between separate collections.

use std::fmt;

use crate::error::{Result, RiskError};

/// Stable identity of an employee record (zero-based row position in the input)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub usize);

impl RecordId {
    /// Position of the record in its table
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Single employee row
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRecord {
    /// Record identity
    pub id: RecordId,
    /// Raw cell values, aligned with the table headers
    pub values: Vec<String>,
}

/// Table of employee records with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeTable {
    headers: Vec<String>,
    records: Vec<EmployeeRecord>,
}

impl EmployeeTable {
    /// Build a table from headers and raw rows.
    ///
    /// Record ids are assigned from row order. A row whose width differs from
    /// the header is rejected.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, values)| {
                if values.len() != headers.len() {
                    return Err(RiskError::encoding(
                        "<row>",
                        Some(RecordId(i)),
                        format!(
                            "row has {} fields, header has {}",
                            values.len(),
                            headers.len()
                        ),
                    ));
                }
                Ok(EmployeeRecord {
                    id: RecordId(i),
                    values,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { headers, records })
    }

    /// Column names in source order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in id order
    pub fn records(&self) -> &[EmployeeRecord] {
        &self.records
    }

    /// Look up a record by id
    pub fn record(&self, id: RecordId) -> Option<&EmployeeRecord> {
        self.records.get(id.index())
    }

    /// Record ids in order
    pub fn record_ids(&self) -> Vec<RecordId> {
        self.records.iter().map(|r| r.id).collect()
    }

    /// Index of a named column
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| RiskError::SchemaMismatch {
                column: name.to_string(),
            })
    }

    /// Raw values of a named column
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self.column_at(idx))
    }

    /// Raw values of the column at `idx`
    pub fn column_at(&self, idx: usize) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.values[idx].as_str())
            .collect()
    }

    /// Values of a named column parsed as finite numbers
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        self.records
            .iter()
            .map(|r| {
                parse_numeric(&r.values[idx]).ok_or_else(|| {
                    RiskError::encoding(
                        name,
                        Some(r.id),
                        format!("'{}' is not a number", r.values[idx]),
                    )
                })
            })
            .collect()
    }
}

/// Parse a cell as a finite number.
///
/// `NaN` and infinities are treated as non-numeric.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EmployeeTable {
        EmployeeTable::new(
            vec!["Department".into(), "MonthlyIncome".into()],
            vec![
                vec!["Sales".into(), "5993".into()],
                vec!["Research & Development".into(), "5130".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_record_ids_follow_row_order() {
        let table = sample();
        assert_eq!(table.record_ids(), vec![RecordId(0), RecordId(1)]);
        assert_eq!(table.record(RecordId(1)).unwrap().values[0], "Research & Development");
        assert!(table.record(RecordId(2)).is_none());
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let table = sample();
        let err = table.column("JobRole").unwrap_err();
        assert!(matches!(err, RiskError::SchemaMismatch { column } if column == "JobRole"));
    }

    #[test]
    fn test_numeric_column() {
        let table = sample();
        assert_eq!(table.numeric_column("MonthlyIncome").unwrap(), vec![5993.0, 5130.0]);
        assert!(matches!(
            table.numeric_column("Department"),
            Err(RiskError::EncodingError { .. })
        ));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let result = EmployeeTable::new(
            vec!["A".into(), "B".into()],
            vec![vec!["1".into()]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric(" 3 "), Some(3.0));
        assert_eq!(parse_numeric("2.5"), Some(2.5));
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("Yes"), None);
    }
}
