use crate::error::SdrfError;
use crate::helpers::string::{column_term, normalize};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors related to invalid analysis configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CriteriaError {
    #[error("Invalid low entropy threshold {0}: must be a finite, non-negative number")]
    EntropyThreshold(f64),

    #[error("Column name for '{0}' must not be empty")]
    EmptyColumnName(&'static str),
}

/// Conventions used to import tables, detect pools and judge column quality.
///
/// Every field has an SDRF default, so a JSON override only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QualityCriteria {
    /// Columns every SDRF file must carry; they are never recommended for removal.
    pub required_columns: Vec<String>,

    /// Column terms that are expected to hold one value for the whole table.
    pub uniform_columns: Vec<String>,

    /// Entropy under which a column with few distinct values is flagged.
    pub low_entropy_threshold: f64,

    /// Maximum distinct values for the low entropy rule.
    pub low_entropy_max_values: usize,

    /// SDRF null tokens.
    pub standard_nulls: Vec<String>,

    /// Null spellings that SDRF does not accept.
    pub non_standard_nulls: Vec<String>,

    /// Values a disease column must not use.
    pub disease_reserved_words: Vec<String>,

    /// Replacement for `disease_reserved_words`.
    pub disease_replacement: String,

    /// Reserved column that declares sample pools.
    pub pooled_column: String,

    /// Column holding the source name of each sample.
    pub source_column: String,
}

impl Default for QualityCriteria {
    fn default() -> Self {
        let strings = |values: &[&str]| values.iter().map(|value| value.to_string()).collect();
        Self {
            required_columns: strings(&[
                "source name",
                "characteristics[organism]",
                "characteristics[organism part]",
                "characteristics[disease]",
                "characteristics[cell type]",
                "characteristics[biological replicate]",
                "assay name",
                "technology type",
                "comment[technical replicate]",
                "comment[fraction identifier]",
                "comment[label]",
                "comment[data file]",
                "comment[instrument]",
                "comment[cleavage agent details]",
                "comment[modification parameters]",
            ]),
            uniform_columns: strings(&[
                "instrument",
                "label",
                "modification parameters",
                "organism",
                "cleavage agent details",
                "technology type",
                "proteomics data acquisition method",
            ]),
            low_entropy_threshold: 0.3,
            low_entropy_max_values: 2,
            standard_nulls: strings(&["not available", "not applicable", "anonymized", "pooled"]),
            non_standard_nulls: strings(&["na", "n/a", "none", "null", "unknown", "-", "--", "missing"]),
            disease_reserved_words: strings(&["control", "healthy"]),
            disease_replacement: "normal".to_string(),
            pooled_column: "characteristics[pooled sample]".to_string(),
            source_column: "source name".to_string(),
        }
    }
}

impl QualityCriteria {
    /// Parses criteria from JSON, filling missing keys with defaults.
    pub fn from_json(text: &str) -> Result<Self, SdrfError> {
        let criteria: Self = serde_json::from_str(text)?;
        criteria.validate()?;
        Ok(criteria)
    }

    /// Loads criteria from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read quality criteria '{}'", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Failed to parse quality criteria '{}'", path.display()))
    }

    pub fn validate(&self) -> Result<(), CriteriaError> {
        if !self.low_entropy_threshold.is_finite() || self.low_entropy_threshold < 0.0 {
            return Err(CriteriaError::EntropyThreshold(self.low_entropy_threshold));
        }
        if self.pooled_column.trim().is_empty() {
            return Err(CriteriaError::EmptyColumnName("pooledColumn"));
        }
        if self.source_column.trim().is_empty() {
            return Err(CriteriaError::EmptyColumnName("sourceColumn"));
        }
        Ok(())
    }

    /// Checks if a column header names a required column.
    pub fn is_required(&self, column_name: &str) -> bool {
        let name = normalize(column_name);
        self.required_columns.iter().any(|required| normalize(required) == name)
    }

    /// Checks if a column is expected to hold a single value.
    pub fn is_uniform_expected(&self, column_name: &str) -> bool {
        let term = column_term(column_name);
        self.uniform_columns.iter().any(|uniform| normalize(uniform) == term)
    }

    pub fn is_disease_column(&self, column_name: &str) -> bool {
        column_term(column_name) == "disease"
    }

    pub fn is_pooled_column(&self, column_name: &str) -> bool {
        normalize(column_name) == normalize(&self.pooled_column)
    }

    pub fn is_source_column(&self, column_name: &str) -> bool {
        normalize(column_name) == normalize(&self.source_column)
    }
}
