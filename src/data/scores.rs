//! Output dataset: scored records as written for the dashboard
//!
//! [`ScoredDataset`] is what the pipeline produces in memory;
//! [`ScoredTable`] is what the dashboard reads back from disk.

use crate::data::encoder::CategoryMappings;
use crate::data::features::{EngineeredFeatures, ENGINEERED_COLUMNS};
use crate::data::table::{parse_numeric, EmployeeTable, RecordId};
use crate::error::{Result, RiskError};
use crate::risk::{RiskCategory, RiskScore};

pub const ATTRITION_PROBABILITY: &str = "Attrition_Probability";
pub const RISK_CATEGORY: &str = "Risk_Category";

/// Source records joined with their engineered features and scores
#[derive(Debug, Clone)]
pub struct ScoredDataset {
    table: EmployeeTable,
    mappings: CategoryMappings,
    features: EngineeredFeatures,
    scores: Vec<RiskScore>,
}

impl ScoredDataset {
    /// Join the stage outputs; every part must cover the same records in order
    pub fn new(
        table: EmployeeTable,
        mappings: CategoryMappings,
        features: EngineeredFeatures,
        scores: Vec<RiskScore>,
    ) -> Result<Self> {
        let ids = table.record_ids();
        let aligned = features.len() == ids.len()
            && scores.len() == ids.len()
            && scores.iter().zip(ids.iter()).all(|(s, id)| s.id == *id);
        if !aligned {
            return Err(RiskError::TrainingFailure(format!(
                "scores cover {} records, table holds {}",
                scores.len(),
                ids.len()
            )));
        }

        Ok(Self {
            table,
            mappings,
            features,
            scores,
        })
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn scores(&self) -> &[RiskScore] {
        &self.scores
    }

    pub fn table(&self) -> &EmployeeTable {
        &self.table
    }

    pub fn features(&self) -> &EngineeredFeatures {
        &self.features
    }

    pub fn mappings(&self) -> &CategoryMappings {
        &self.mappings
    }

    /// Output column names
    pub fn headers(&self) -> Vec<String> {
        let mut headers = self.table.headers().to_vec();
        headers.extend(ENGINEERED_COLUMNS.iter().map(|c| c.to_string()));
        headers.push(ATTRITION_PROBABILITY.to_string());
        headers.push(RISK_CATEGORY.to_string());
        headers
    }

    /// Output rows in record order.
    ///
    /// Categorical cells are written as their codes, numeric cells keep their
    /// source text.
    pub fn output_rows(&self) -> Result<Vec<Vec<String>>> {
        self.table
            .records()
            .iter()
            .zip(self.scores.iter())
            .enumerate()
            .map(|(i, (record, score))| {
                let mut row = Vec::with_capacity(record.values.len() + 5);
                for (idx, value) in record.values.iter().enumerate() {
                    match self.mappings.mapping_at(idx) {
                        Some(mapping) => {
                            let code = mapping.code(value).ok_or_else(|| {
                                RiskError::encoding(
                                    mapping.column(),
                                    Some(record.id),
                                    format!("category '{}' has no code in this run", value),
                                )
                            })?;
                            row.push(code.to_string());
                        }
                        None => row.push(value.clone()),
                    }
                }
                row.extend(self.features.row(i).iter().map(|v| v.to_string()));
                row.push(score.probability.to_string());
                row.push(score.category.as_str().to_string());
                Ok(row)
            })
            .collect()
    }
}

/// One persisted row as seen by the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub id: RecordId,
    /// Cells aligned with [`ScoredTable::headers`]
    pub values: Vec<String>,
    pub score: RiskScore,
}

/// Persisted output dataset read back from disk
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTable {
    headers: Vec<String>,
    records: Vec<ScoredRecord>,
}

impl ScoredTable {
    /// Build from raw rows.
    ///
    /// `Attrition_Probability` and `Risk_Category` must be present; row
    /// position becomes the record id.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| RiskError::SchemaMismatch {
                    column: name.to_string(),
                })
        };
        let prob_idx = find(ATTRITION_PROBABILITY)?;
        let cat_idx = find(RISK_CATEGORY)?;

        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, values)| {
                let id = RecordId(i);
                let probability = values
                    .get(prob_idx)
                    .and_then(|v| parse_numeric(v))
                    .filter(|p| (0.0..=1.0).contains(p))
                    .ok_or_else(|| {
                        RiskError::encoding(
                            ATTRITION_PROBABILITY,
                            Some(id),
                            "expected a probability in [0, 1]",
                        )
                    })?;
                let category = values
                    .get(cat_idx)
                    .ok_or_else(|| RiskError::encoding(RISK_CATEGORY, Some(id), "missing cell"))?
                    .parse::<RiskCategory>()
                    .map_err(|e| RiskError::encoding(RISK_CATEGORY, Some(id), e))?;

                Ok(ScoredRecord {
                    id,
                    values,
                    score: RiskScore {
                        id,
                        probability,
                        category,
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { headers, records })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[ScoredRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, id: RecordId) -> Option<&ScoredRecord> {
        self.records.get(id.index())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Raw cell of a record
    pub fn value<'a>(&self, record: &'a ScoredRecord, column: &str) -> Option<&'a str> {
        self.column_index(column)
            .and_then(|idx| record.values.get(idx))
            .map(String::as_str)
    }

    /// Numeric cell of a record
    pub fn numeric(&self, record: &ScoredRecord, column: &str) -> Option<f64> {
        self.value(record, column).and_then(parse_numeric)
    }
}
