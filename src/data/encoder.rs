//! Categorical encoding
//!
//! Non-numeric columns are replaced by integer codes through an explicit
//! [`CategoryMapping`]. Codes follow the sorted order of the distinct values
//! observed in this run, so the same category universe always yields the same
//! codes, and a different universe may not.

use ndarray::{Array1, Array2};
use std::collections::BTreeSet;

use crate::data::features::{EngineeredFeatures, ENGINEERED_COLUMNS};
use crate::data::table::{parse_numeric, EmployeeTable, RecordId};
use crate::error::{Result, RiskError};

/// How a column is turned into numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every cell is a finite number
    Numeric,
    /// No cell is a number; values are replaced by codes
    Categorical,
}

/// Ordered `category -> code` pairs for one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMapping {
    column: String,
    /// Sorted by category; the code of a category is its position
    categories: Vec<String>,
}

impl CategoryMapping {
    /// Build a mapping from the distinct values of a column
    pub fn fit<'a, I>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let distinct: BTreeSet<&str> = values.into_iter().collect();
        Self {
            column: column.to_string(),
            categories: distinct.into_iter().map(String::from).collect(),
        }
    }

    /// Column this mapping belongs to
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Code assigned to a category
    pub fn code(&self, category: &str) -> Option<u32> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(category))
            .ok()
            .map(|i| i as u32)
    }

    /// Category behind a code
    pub fn category(&self, code: u32) -> Option<&str> {
        self.categories.get(code as usize).map(String::as_str)
    }

    /// `(category, code)` pairs in code order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, u32)> {
        self.categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i as u32))
    }

    /// Number of distinct categories
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Code of a value that must be present in the mapping
    fn encode(&self, value: &str, record: RecordId) -> Result<u32> {
        self.code(value).ok_or_else(|| {
            RiskError::encoding(
                self.column.as_str(),
                Some(record),
                format!("category '{}' has no code in this run", value),
            )
        })
    }
}

/// Column kinds and categorical mappings of one table, built once per run
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMappings {
    columns: Vec<String>,
    kinds: Vec<ColumnKind>,
    /// One entry per column, `Some` for categorical columns and the label
    mappings: Vec<Option<CategoryMapping>>,
    label_column: String,
}

impl CategoryMappings {
    /// Classify every column of the table and build its mapping.
    ///
    /// A column mixing numbers and text, or holding an empty cell, cannot be
    /// coerced to a single type and fails with `EncodingError`. The label
    /// column always receives a mapping, built from its textual values, so
    /// `No/Yes` and `0/1` labels both encode to `0/1`.
    pub fn fit(table: &EmployeeTable, label_column: &str) -> Result<Self> {
        let mut kinds = Vec::with_capacity(table.headers().len());
        let mut mappings = Vec::with_capacity(table.headers().len());
        let ids = table.record_ids();

        for (idx, name) in table.headers().iter().enumerate() {
            let values = table.column_at(idx);
            let kind = classify(name, &values, &ids)?;

            let mapping = if kind == ColumnKind::Categorical || name == label_column {
                Some(CategoryMapping::fit(name, values.iter().copied()))
            } else {
                None
            };

            if let Some(ref m) = mapping {
                log::debug!("Column '{}' mapped to {} codes", name, m.len());
            }

            kinds.push(kind);
            mappings.push(mapping);
        }

        Ok(Self {
            columns: table.headers().to_vec(),
            kinds,
            mappings,
            label_column: label_column.to_string(),
        })
    }

    /// Kind of the column at `idx`
    pub fn kind(&self, idx: usize) -> ColumnKind {
        self.kinds[idx]
    }

    /// Mapping of the column at `idx`, if it is encoded
    pub fn mapping_at(&self, idx: usize) -> Option<&CategoryMapping> {
        self.mappings.get(idx).and_then(Option::as_ref)
    }

    /// Mapping of a named column, if it is encoded
    pub fn get(&self, column: &str) -> Option<&CategoryMapping> {
        self.mappings
            .iter()
            .flatten()
            .find(|m| m.column() == column)
    }

    /// Name of the label column
    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// Mapping of the label column.
    ///
    /// Fails with `TrainingFailure` when the label is absent or does not hold
    /// exactly two classes.
    pub fn binary_label(&self) -> Result<&CategoryMapping> {
        let mapping = self.get(&self.label_column).ok_or_else(|| {
            RiskError::TrainingFailure(format!(
                "label column '{}' is absent",
                self.label_column
            ))
        })?;

        if mapping.len() != 2 {
            return Err(RiskError::TrainingFailure(format!(
                "label column '{}' must hold exactly two classes, found {}",
                self.label_column,
                mapping.len()
            )));
        }

        Ok(mapping)
    }

    /// Encoded (numeric) value of one cell
    pub fn encode_cell(&self, idx: usize, value: &str, record: RecordId) -> Result<f64> {
        match self.mapping_at(idx) {
            Some(mapping) => mapping.encode(value, record).map(f64::from),
            None => parse_numeric(value).ok_or_else(|| {
                RiskError::encoding(
                    self.columns[idx].as_str(),
                    Some(record),
                    format!("'{}' is not a number", value),
                )
            }),
        }
    }
}

fn classify(name: &str, values: &[&str], ids: &[RecordId]) -> Result<ColumnKind> {
    if let Some(pos) = values.iter().position(|v| v.trim().is_empty()) {
        return Err(RiskError::encoding(name, Some(ids[pos]), "empty cell"));
    }

    let numeric = values.iter().filter(|v| parse_numeric(v).is_some()).count();
    if numeric == values.len() {
        Ok(ColumnKind::Numeric)
    } else if numeric == 0 {
        Ok(ColumnKind::Categorical)
    } else {
        Err(RiskError::encoding(
            name,
            None,
            format!(
                "mixed numeric and text values ({} of {} numeric)",
                numeric,
                values.len()
            ),
        ))
    }
}

/// Numeric view of a table ready for scaling and training
#[derive(Debug, Clone)]
pub struct EncodedDataset {
    /// Feature matrix (n_records x n_features), not yet standardized
    pub x: Array2<f64>,
    /// Binary label, 1.0 for the positive (attrition) class
    pub y: Array1<f64>,
    /// Feature names, source columns first then engineered features
    pub feature_names: Vec<String>,
    /// Identity of each matrix row
    pub record_ids: Vec<RecordId>,
}

impl EncodedDataset {
    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }
}

/// Turns a table plus its engineered features into an [`EncodedDataset`]
#[derive(Debug)]
pub struct Encoder<'a> {
    mappings: &'a CategoryMappings,
}

impl<'a> Encoder<'a> {
    pub fn new(mappings: &'a CategoryMappings) -> Self {
        Self { mappings }
    }

    /// Encode every column except the label, followed by the engineered
    /// features. The label is encoded through its own mapping.
    pub fn encode(
        &self,
        table: &EmployeeTable,
        features: &EngineeredFeatures,
    ) -> Result<EncodedDataset> {
        let label = self.mappings.binary_label()?;
        let label_idx = table.column_index(self.mappings.label_column())?;

        let feature_columns: Vec<usize> = (0..table.headers().len())
            .filter(|&idx| idx != label_idx)
            .collect();

        let mut feature_names: Vec<String> = feature_columns
            .iter()
            .map(|&idx| table.headers()[idx].clone())
            .collect();
        feature_names.extend(ENGINEERED_COLUMNS.iter().map(|c| c.to_string()));

        let n_samples = table.len();
        let n_features = feature_names.len();
        let mut x = Array2::<f64>::zeros((n_samples, n_features));
        let mut y = Array1::<f64>::zeros(n_samples);

        for (i, record) in table.records().iter().enumerate() {
            for (j, &idx) in feature_columns.iter().enumerate() {
                x[[i, j]] = self.mappings.encode_cell(idx, &record.values[idx], record.id)?;
            }
            for (k, value) in features.row(i).into_iter().enumerate() {
                x[[i, feature_columns.len() + k]] = value;
            }
            y[i] = f64::from(label.encode(&record.values[label_idx], record.id)?);
        }

        Ok(EncodedDataset {
            x,
            y,
            feature_names,
            record_ids: table.record_ids(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::features::FeatureEngineer;

    fn hr_table() -> EmployeeTable {
        let headers = [
            "Attrition",
            "Department",
            "MonthlyIncome",
            "TotalWorkingYears",
            "JobInvolvement",
            "JobSatisfaction",
            "EnvironmentSatisfaction",
            "RelationshipSatisfaction",
            "YearsSinceLastPromotion",
            "YearsAtCompany",
        ];
        let rows = [
            ["Yes", "Sales", "2090", "0", "1", "1", "1", "1", "4", "0"],
            ["No", "Research & Development", "5130", "10", "2", "3", "3", "4", "1", "10"],
            ["No", "Sales", "5993", "8", "3", "4", "3", "3", "0", "6"],
            ["No", "Human Resources", "5237", "17", "3", "3", "3", "2", "7", "7"],
        ];
        EmployeeTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_mapping_uses_sorted_codes() {
        let mapping = CategoryMapping::fit(
            "Department",
            ["Sales", "Research & Development", "Sales", "Human Resources"],
        );

        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.code("Human Resources"), Some(0));
        assert_eq!(mapping.code("Research & Development"), Some(1));
        assert_eq!(mapping.code("Sales"), Some(2));
        assert_eq!(mapping.code("Marketing"), None);
        assert_eq!(mapping.category(2), Some("Sales"));
    }

    #[test]
    fn test_distinct_values_get_distinct_codes() {
        let values = ["b", "a", "c", "a", "d", "b"];
        let mapping = CategoryMapping::fit("col", values);
        let codes: BTreeSet<u32> = mapping.pairs().map(|(_, code)| code).collect();

        assert_eq!(codes.len(), 4);
        for v in values {
            let code = mapping.code(v).unwrap();
            assert_eq!(mapping.category(code), Some(v));
        }
    }

    #[test]
    fn test_column_classification() {
        let table = hr_table();
        let mappings = CategoryMappings::fit(&table, "Attrition").unwrap();

        assert_eq!(mappings.kind(0), ColumnKind::Categorical);
        assert_eq!(mappings.kind(1), ColumnKind::Categorical);
        assert_eq!(mappings.kind(2), ColumnKind::Numeric);
        assert!(mappings.get("MonthlyIncome").is_none());

        let label = mappings.binary_label().unwrap();
        assert_eq!(label.code("No"), Some(0));
        assert_eq!(label.code("Yes"), Some(1));
    }

    #[test]
    fn test_numeric_label_gets_a_mapping() {
        let table = EmployeeTable::new(
            vec!["Attrition".into(), "Age".into()],
            vec![vec!["1".into(), "30".into()], vec!["0".into(), "40".into()]],
        )
        .unwrap();
        let mappings = CategoryMappings::fit(&table, "Attrition").unwrap();

        assert_eq!(mappings.kind(0), ColumnKind::Numeric);
        let label = mappings.binary_label().unwrap();
        assert_eq!(label.code("0"), Some(0));
        assert_eq!(label.code("1"), Some(1));
    }

    #[test]
    fn test_mixed_column_is_encoding_error() {
        let table = EmployeeTable::new(
            vec!["Age".into()],
            vec![vec!["30".into()], vec!["thirty".into()]],
        )
        .unwrap();
        let err = CategoryMappings::fit(&table, "Attrition").unwrap_err();
        assert!(matches!(err, RiskError::EncodingError { column, .. } if column == "Age"));
    }

    #[test]
    fn test_empty_cell_is_encoding_error() {
        let table = EmployeeTable::new(
            vec!["Department".into()],
            vec![vec!["Sales".into()], vec!["".into()]],
        )
        .unwrap();
        let err = CategoryMappings::fit(&table, "Attrition").unwrap_err();
        assert!(matches!(
            err,
            RiskError::EncodingError { record: Some(RecordId(1)), .. }
        ));
    }

    #[test]
    fn test_degenerate_label() {
        let table = EmployeeTable::new(
            vec!["Attrition".into()],
            vec![vec!["No".into()], vec!["No".into()]],
        )
        .unwrap();
        let mappings = CategoryMappings::fit(&table, "Attrition").unwrap();
        assert!(matches!(
            mappings.binary_label(),
            Err(RiskError::TrainingFailure(_))
        ));

        let mappings = CategoryMappings::fit(&table, "Left").unwrap();
        assert!(matches!(
            mappings.binary_label(),
            Err(RiskError::TrainingFailure(_))
        ));
    }

    #[test]
    fn test_encode_builds_feature_matrix() {
        let table = hr_table();
        let features = FeatureEngineer::new().apply(&table).unwrap();
        let mappings = CategoryMappings::fit(&table, "Attrition").unwrap();
        let dataset = Encoder::new(&mappings).encode(&table, &features).unwrap();

        assert_eq!(dataset.n_samples(), 4);
        // 9 source columns without the label plus 3 engineered
        assert_eq!(dataset.n_features(), 12);
        assert_eq!(dataset.feature_names[0], "Department");
        assert_eq!(dataset.feature_names[9], "Income_Experience_Ratio");

        assert_eq!(dataset.y.to_vec(), vec![1.0, 0.0, 0.0, 0.0]);
        // Department codes: Human Resources=0, Research & Development=1, Sales=2
        assert_eq!(dataset.x[[0, 0]], 2.0);
        assert_eq!(dataset.x[[1, 0]], 1.0);
        assert_eq!(dataset.x[[3, 0]], 0.0);
        assert_eq!(dataset.x[[0, 1]], 2090.0);
        assert_eq!(dataset.x[[0, 9]], 2090.0);
        assert_eq!(dataset.record_ids[3], RecordId(3));
    }
}
