use crate::analysis::criteria::QualityCriteria;
use crate::analysis::pool::{detect_pools, SamplePool};
use crate::database::column::{Column, ColumnError};
use crate::database::range::{parse_selection, SampleIndex};
use crate::error::{ResultMessage, SdrfError};
use crate::helpers::string::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors related to table structure and sample bounds.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Sample {sample} is out of bounds (1-{sample_count})")]
    SampleOutOfBounds { sample: SampleIndex, sample_count: u32 },

    #[error("Row position {position} is out of bounds (1-{limit})")]
    RowPositionOutOfBounds { position: SampleIndex, limit: u32 },

    #[error("Column index {index} is out of bounds ({column_count} columns)")]
    ColumnOutOfBounds { index: usize, column_count: usize },

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Row {row} has {actual} cells, expected {expected}")]
    RowWidthMismatch { row: usize, expected: usize, actual: usize },

    #[error("Column '{column}' overrides sample {sample} beyond the table")]
    ModifierOutOfBounds { column: String, sample: SampleIndex },

    #[error("Column '{column}' is at position {index} but records {recorded}")]
    PositionMismatch { column: String, index: usize, recorded: usize },
}

/// Names of the columns pool detection reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolColumns {
    pub pooled: String,
    pub source: String,
}

impl Default for PoolColumns {
    fn default() -> Self {
        Self::from(&QualityCriteria::default())
    }
}

impl From<&QualityCriteria> for PoolColumns {
    fn from(criteria: &QualityCriteria) -> Self {
        Self {
            pooled: criteria.pooled_column.to_owned(),
            source: criteria.source_column.to_owned(),
        }
    }
}

impl PoolColumns {
    fn is_pooling(&self, column_name: &str) -> bool {
        let name = normalize(column_name);
        name == normalize(&self.pooled) || name == normalize(&self.source)
    }
}

/// A sparse SDRF table.
///
/// Columns are shared behind [`Arc`]: cloning a table is cheap and a mutation
/// copies only the column it touches. `sample_count` is the authoritative row
/// count; every column yields a value for every sample in `[1, sample_count]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTable")]
pub struct SparseTable {
    columns: Vec<Arc<Column>>,
    sample_count: u32,
    #[serde(default)]
    pools: Vec<SamplePool>,
    #[serde(default)]
    pool_columns: PoolColumns,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Wire form of a [`SparseTable`], validated before it becomes one.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTable {
    columns: Vec<Arc<Column>>,
    sample_count: u32,
    #[serde(default)]
    pools: Vec<SamplePool>,
    #[serde(default)]
    pool_columns: PoolColumns,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

impl TryFrom<RawTable> for SparseTable {
    type Error = SdrfError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        let table = SparseTable {
            columns: raw.columns,
            sample_count: raw.sample_count,
            pools: raw.pools,
            pool_columns: raw.pool_columns,
            metadata: raw.metadata,
        };
        table.validate()?;
        Ok(table)
    }
}

impl SparseTable {
    /// Creates an empty table with `sample_count` rows and no columns.
    pub fn new(sample_count: u32) -> Self {
        Self {
            sample_count,
            ..Self::default()
        }
    }

    /// Builds a table from a header row and dense data rows (row 0 is sample 1).
    ///
    /// Each column takes its most frequent value as default, required columns
    /// are flagged from `criteria`, and pools are detected on the raw rows.
    pub fn from_rows<H, R, S>(headers: &[H], rows: &[R], criteria: &QualityCriteria) -> Result<Self, SdrfError>
    where
        H: AsRef<str>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        for (row, cells) in rows.iter().enumerate() {
            if cells.as_ref().len() != headers.len() {
                Err(TableError::RowWidthMismatch {
                    row: row + 1,
                    expected: headers.len(),
                    actual: cells.as_ref().len(),
                })?;
            }
        }

        let columns = headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let values: Vec<&str> = rows.iter().map(|row| row.as_ref()[index].as_ref()).collect();
                let mut column = Column::from_values(header.as_ref(), &values)
                    .with_required(criteria.is_required(header.as_ref()));
                column.column_position = index;
                Arc::new(column)
            })
            .collect::<Vec<_>>();

        let pooled = headers.iter().position(|header| criteria.is_pooled_column(header.as_ref()));
        let source = headers.iter().position(|header| criteria.is_source_column(header.as_ref()));
        let pools = match pooled {
            Some(pooled) => detect_pools(rows, pooled, source),
            None => Vec::new(),
        };

        let table = Self {
            columns,
            sample_count: rows.len() as u32,
            pools,
            pool_columns: PoolColumns::from(criteria),
            metadata: BTreeMap::new(),
        };
        debug!(columns = table.columns.len(), samples = table.sample_count, pools = table.pools.len(), "built sparse table");
        Ok(table)
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> impl ExactSizeIterator<Item = &Column> + '_ {
        self.columns.iter().map(|column| column.as_ref())
    }

    pub fn pools(&self) -> &[SamplePool] {
        &self.pools
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn column(&self, index: usize) -> Result<&Column, TableError> {
        self.columns
            .get(index)
            .map(|column| column.as_ref())
            .ok_or(TableError::ColumnOutOfBounds {
                index,
                column_count: self.columns.len(),
            })
    }

    /// Index of the first column with this header (case-insensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = normalize(name);
        self.columns.iter().position(|column| normalize(&column.name) == name)
    }

    pub fn column_by_name(&self, name: &str) -> Result<&Column, TableError> {
        let index = self
            .column_index(name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_owned()))?;
        self.column(index)
    }

    fn check_sample(&self, sample: SampleIndex) -> Result<(), TableError> {
        if sample == 0 || sample > self.sample_count {
            return Err(TableError::SampleOutOfBounds {
                sample,
                sample_count: self.sample_count,
            });
        }
        Ok(())
    }

    /// Copy-on-write access to one column.
    fn column_mut(&mut self, index: usize) -> Result<&mut Column, TableError> {
        let column_count = self.columns.len();
        self.columns
            .get_mut(index)
            .map(Arc::make_mut)
            .ok_or(TableError::ColumnOutOfBounds { index, column_count })
    }

    pub fn get_value(&self, column: usize, sample: SampleIndex) -> Result<&str, TableError> {
        self.check_sample(sample)?;
        Ok(self.column(column)?.get_value(sample))
    }

    /// Effective values of one sample, in column order.
    pub fn row(&self, sample: SampleIndex) -> Result<Vec<&str>, TableError> {
        self.check_sample(sample)?;
        Ok(self.columns.iter().map(|column| column.get_value(sample)).collect())
    }

    /// Dense value matrix, one row per sample.
    pub fn to_dense(&self) -> Vec<Vec<String>> {
        (1..=self.sample_count)
            .map(|sample| self.columns.iter().map(|column| column.get_value(sample).to_owned()).collect())
            .collect()
    }

    pub fn find_samples_with_value(&self, column: usize, value: &str) -> Result<Vec<SampleIndex>, TableError> {
        Ok(self.column(column)?.find_samples_with_value(value, self.sample_count))
    }

    /// Writes one cell. Out-of-bounds samples are rejected without touching the column.
    /// Returns false when the cell already held `value`.
    pub fn set_value(&mut self, column: usize, sample: SampleIndex, value: &str) -> Result<bool, SdrfError> {
        if let Err(error) = self.check_sample(sample) {
            warn!(column, sample, "rejected write outside the table");
            Err(error)?;
        }
        let current = self.column(column)?;
        if current.get_value(sample) == value {
            return Ok(false);
        }
        let refresh = self.pool_columns.is_pooling(&current.name);
        self.column_mut(column)?.set_value(sample, value);
        if refresh {
            self.refresh_pools();
        }
        Ok(true)
    }

    /// Writes the same value to many samples, silently skipping indices outside the table.
    /// Returns the number of samples written.
    pub fn set_values_bulk<I>(&mut self, column: usize, samples: I, value: &str) -> Result<u64, SdrfError>
    where
        I: IntoIterator<Item = SampleIndex>,
    {
        let sample_count = self.sample_count;
        let refresh = self.pool_columns.is_pooling(&self.column(column)?.name);
        let target = self.column_mut(column)?;
        let written = target.set_values_bulk(
            samples.into_iter().filter(|&sample| sample >= 1 && sample <= sample_count),
            value,
        );
        debug!(column = %target.name, written, value, "bulk edit");
        if written > 0 && refresh {
            self.refresh_pools();
        }
        Ok(written)
    }

    /// Applies a user-typed selection such as `1-3,7` to one column.
    pub fn apply_selection(&mut self, column: usize, selection: &str, value: &str) -> Result<u64, SdrfError> {
        let name = self.column(column)?.name.to_owned();
        let samples = parse_selection(selection, self.sample_count)
            .map_err(SdrfError::from)
            .with_prefix(&name)?;
        self.set_values_bulk(column, samples, value)
    }

    /// Changes a column's default while every sample keeps its value.
    pub fn set_default(&mut self, column: usize, value: &str) -> Result<(), SdrfError> {
        let sample_count = self.sample_count;
        self.column_mut(column)?.set_default(value, sample_count);
        Ok(())
    }

    /// Inserts a column at the end of its section and returns its index.
    ///
    /// Sections follow `source name`, `characteristics`, `comment`,
    /// `factor value`, then everything else.
    pub fn insert_column(&mut self, column: Column) -> usize {
        let section = column.section;
        let index = match self.columns.iter().rposition(|existing| existing.section == section) {
            Some(last) => last + 1,
            None => self
                .columns
                .iter()
                .position(|existing| existing.section > section)
                .unwrap_or(self.columns.len()),
        };
        let refresh = self.pool_columns.is_pooling(&column.name);
        debug!(column = %column.name, index, "insert column");
        self.columns.insert(index, Arc::new(column));
        self.renumber_columns();
        if refresh {
            self.refresh_pools();
        }
        index
    }

    pub fn remove_column(&mut self, index: usize) -> Result<Column, SdrfError> {
        self.column(index)?;
        let column = self.columns.remove(index);
        debug!(column = %column.name, index, "remove column");
        self.renumber_columns();
        let column = Arc::try_unwrap(column).unwrap_or_else(|shared| shared.as_ref().clone());
        if self.pool_columns.is_pooling(&column.name) {
            self.refresh_pools();
        }
        Ok(column)
    }

    fn renumber_columns(&mut self) {
        for (index, column) in self.columns.iter_mut().enumerate() {
            if column.column_position != index {
                Arc::make_mut(column).column_position = index;
            }
        }
    }

    /// Inserts a row at `position` (1-based); samples at and after it move down.
    pub fn insert_row(&mut self, position: SampleIndex, initial: &str) -> Result<(), SdrfError> {
        let limit = self.sample_count + 1;
        if position == 0 || position > limit {
            Err(TableError::RowPositionOutOfBounds { position, limit })?;
        }
        for column in &mut self.columns {
            Arc::make_mut(column).insert_sample(position, initial);
        }
        self.sample_count += 1;
        debug!(position, samples = self.sample_count, "insert row");
        self.refresh_pools();
        Ok(())
    }

    /// Deletes rows; later samples move up to close the gaps. Returns the number of rows removed.
    pub fn delete_rows(&mut self, samples: &[SampleIndex]) -> Result<usize, SdrfError> {
        let mut deleted = samples.to_vec();
        deleted.sort_unstable();
        deleted.dedup();
        for &sample in &deleted {
            self.check_sample(sample)?;
        }
        if deleted.is_empty() {
            return Ok(0);
        }
        for column in &mut self.columns {
            Arc::make_mut(column).delete_samples(&deleted);
        }
        self.sample_count -= deleted.len() as u32;
        debug!(deleted = deleted.len(), samples = self.sample_count, "delete rows");
        self.refresh_pools();
        Ok(deleted.len())
    }

    /// Rebuilds the pools from the pooled and source columns.
    pub fn refresh_pools(&mut self) {
        let Some(pooled) = self.column_index(&self.pool_columns.pooled) else {
            self.pools.clear();
            return;
        };
        let source = self.column_index(&self.pool_columns.source);
        let rows: Vec<[&str; 2]> = (1..=self.sample_count)
            .map(|sample| {
                [
                    self.columns[pooled].get_value(sample),
                    source.map_or("", |source| self.columns[source].get_value(sample)),
                ]
            })
            .collect();
        let pools = detect_pools(&rows, 0, source.map(|_| 1));
        self.pools = pools;
    }

    /// Checks every column invariant plus table-level bounds and positions.
    pub fn validate(&self) -> Result<(), SdrfError> {
        for (index, column) in self.columns.iter().enumerate() {
            column.check_invariants().map_err(SdrfError::from)?;
            if column.column_position != index {
                Err(TableError::PositionMismatch {
                    column: column.name.to_owned(),
                    index,
                    recorded: column.column_position,
                })?;
            }
            for modifier in column.modifiers() {
                if let Some(sample) = modifier.samples.iter().find(|&sample| sample > self.sample_count) {
                    Err(TableError::ModifierOutOfBounds {
                        column: column.name.to_owned(),
                        sample,
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Checks a single column, for callers that edit one column at a time.
    pub fn validate_column(&self, index: usize) -> Result<(), ColumnError> {
        match self.columns.get(index) {
            Some(column) => column.check_invariants(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> SparseTable {
        let headers = [
            "source name",
            "characteristics[organism]",
            "characteristics[disease]",
            "characteristics[pooled sample]",
            "comment[data file]",
        ];
        let rows = [
            ["S1", "human", "normal", "SN=S1,S2", "f1.raw"],
            ["S2", "human", "cancer", "not pooled", "f2.raw"],
            ["S3", "human", "cancer", "not pooled", "f3.raw"],
            ["S4", "human", "normal", "not pooled", "f4.raw"],
            ["S5", "human", "cancer", "not pooled", "f5.raw"],
        ];
        SparseTable::from_rows(&headers, &rows, &QualityCriteria::default()).unwrap()
    }

    #[test]
    fn test_from_rows() {
        let table = sample_table();
        assert_eq!(table.sample_count(), 5);
        assert_eq!(table.column_count(), 5);
        let organism = table.column_by_name("characteristics[organism]").unwrap();
        assert_eq!(organism.value, "human");
        assert!(organism.modifiers().is_empty());
        assert!(organism.is_required);
        let disease = table.column(2).unwrap();
        assert_eq!(disease.value, "cancer");
        assert_eq!(disease.modifiers()[0].samples.to_string(), "1,4");
        assert_eq!(table.column(4).unwrap().column_position, 4);
        assert_eq!(table.pools().len(), 1);
        assert_eq!(table.pools()[0].pooled_only_samples, vec![1]);
        assert_eq!(table.pools()[0].pooled_and_independent_samples, vec![2]);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let rows = vec![vec!["a", "b"], vec!["c"]];
        let error = SparseTable::from_rows(&["x", "y"], &rows, &QualityCriteria::default()).unwrap_err();
        assert!(matches!(
            error,
            SdrfError::TableError(TableError::RowWidthMismatch { row: 2, expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_dense_round_trip() {
        let table = sample_table();
        let dense = table.to_dense();
        assert_eq!(dense.len(), 5);
        assert_eq!(dense[0], vec!["S1", "human", "normal", "SN=S1,S2", "f1.raw"]);
        assert_eq!(dense[4], vec!["S5", "human", "cancer", "not pooled", "f5.raw"]);
        assert_eq!(table.row(3).unwrap(), vec!["S3", "human", "cancer", "not pooled", "f3.raw"]);
        assert!(table.row(6).is_err());
    }

    #[test]
    fn test_set_value_bounds() {
        let mut table = sample_table();
        let before = table.clone();
        assert!(matches!(
            table.set_value(2, 6, "normal"),
            Err(SdrfError::TableError(TableError::SampleOutOfBounds { sample: 6, sample_count: 5 }))
        ));
        assert!(table.set_value(2, 0, "normal").is_err());
        assert!(table.set_value(9, 1, "normal").is_err());
        assert_eq!(table, before);

        assert!(table.set_value(2, 2, "normal").unwrap());
        assert!(!table.set_value(2, 2, "normal").unwrap());
        assert_eq!(table.get_value(2, 2).unwrap(), "normal");
    }

    #[test]
    fn test_set_values_bulk_filters_out_of_range() {
        let mut table = sample_table();
        let written = table.set_values_bulk(2, vec![0, 1, 2, 3, 99], "diabetes").unwrap();
        assert_eq!(written, 3);
        assert_eq!(table.find_samples_with_value(2, "diabetes").unwrap(), vec![1, 2, 3]);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_apply_selection() {
        let mut table = sample_table();
        assert_eq!(table.apply_selection(2, "1-3, 5", "normal").unwrap(), 4);
        assert_eq!(table.find_samples_with_value(2, "normal").unwrap(), vec![1, 2, 3, 4, 5]);

        let error = table.apply_selection(2, "2-9", "normal").unwrap_err();
        assert!(matches!(error, SdrfError::WithContextError(_)));
        assert!(error.to_string().starts_with("characteristics[disease]: "));
        assert!(error.to_string().contains("2-9"));
    }

    #[test]
    fn test_copy_on_write() {
        let table = sample_table();
        let mut edited = table.clone();
        edited.set_value(2, 1, "diabetes").unwrap();
        assert!(Arc::ptr_eq(&table.columns[1], &edited.columns[1]));
        assert!(!Arc::ptr_eq(&table.columns[2], &edited.columns[2]));
        assert_eq!(table.get_value(2, 1).unwrap(), "normal");
        assert_eq!(edited.get_value(2, 1).unwrap(), "diabetes");
    }

    #[test]
    fn test_insert_column_by_section() {
        let mut table = sample_table();
        assert_eq!(table.insert_column(Column::new("characteristics[cell type]", "not available")), 4);
        assert_eq!(table.insert_column(Column::new("factor value[disease]", "")), 6);
        assert_eq!(table.insert_column(Column::new("assay name", "run")), 7);
        assert_eq!(table.insert_column(Column::new("comment[instrument]", "")), 6);
        assert_eq!(
            table.headers(),
            vec![
                "source name",
                "characteristics[organism]",
                "characteristics[disease]",
                "characteristics[pooled sample]",
                "characteristics[cell type]",
                "comment[data file]",
                "comment[instrument]",
                "factor value[disease]",
                "assay name",
            ]
        );
        let positions: Vec<usize> = table.columns().map(|column| column.column_position).collect();
        assert_eq!(positions, (0..9).collect::<Vec<_>>());

        let mut empty = SparseTable::new(3);
        assert_eq!(empty.insert_column(Column::new("comment[label]", "label free sample")), 0);
        assert_eq!(empty.insert_column(Column::new("source name", "")), 0);
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn test_remove_column() {
        let mut table = sample_table();
        let removed = table.remove_column(1).unwrap();
        assert_eq!(removed.name, "characteristics[organism]");
        assert_eq!(table.column_count(), 4);
        assert_eq!(table.column(1).unwrap().column_position, 1);
        assert!(table.remove_column(10).is_err());

        table.remove_column(table.column_index("characteristics[pooled sample]").unwrap()).unwrap();
        assert!(table.pools().is_empty());
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_row_insert_delete_shift() {
        let mut table = SparseTable::new(10);
        let mut column = Column::new("characteristics[disease]", "normal");
        column.set_values_bulk(5..=7, "X");
        table.insert_column(column);
        table.insert_column(Column::new("characteristics[organism]", "human"));

        table.insert_row(3, "").unwrap();
        assert_eq!(table.sample_count(), 11);
        let disease = table.column(0).unwrap();
        assert_eq!(disease.modifiers()[0].samples.to_string(), "6-8");
        assert_eq!(disease.get_value(3), "");
        assert!(table.column(1).unwrap().modifiers().is_empty());
        assert!(table.validate().is_ok());

        assert_eq!(table.delete_rows(&[3]).unwrap(), 1);
        let disease = table.column(0).unwrap();
        assert_eq!(disease.modifiers().len(), 1);
        assert_eq!(disease.modifiers()[0].samples.to_string(), "5-7");
        assert_eq!(table.sample_count(), 10);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_row_bounds() {
        let mut table = SparseTable::new(3);
        assert!(table.insert_row(0, "").is_err());
        assert!(table.insert_row(5, "").is_err());
        assert!(table.insert_row(4, "").is_ok());
        assert!(table.delete_rows(&[1, 9]).is_err());
        assert_eq!(table.sample_count(), 4);
        assert_eq!(table.delete_rows(&[2, 2, 1]).unwrap(), 2);
        assert_eq!(table.delete_rows(&[]).unwrap(), 0);
        assert_eq!(table.sample_count(), 2);
    }

    #[test]
    fn test_pools_follow_edits() {
        let mut table = sample_table();
        let pooled = table.column_index("characteristics[pooled sample]").unwrap();
        table.set_value(pooled, 3, "pooled").unwrap();
        assert_eq!(table.pools()[0].pooled_and_independent_samples, vec![2]);

        table.set_value(pooled, 1, "not pooled").unwrap();
        assert_eq!(table.pools().len(), 1);
        assert!(!table.pools()[0].is_reference);
        assert_eq!(table.pools()[0].pooled_only_samples, vec![3]);
        assert_eq!(table.pools()[0].sdrf_value, "SN=S3");

        table.delete_rows(&[1, 2]).unwrap();
        assert_eq!(table.pools()[0].pooled_only_samples, vec![1]);
    }

    #[test]
    fn test_set_default() {
        let mut table = sample_table();
        let before = table.to_dense();
        table.set_default(2, "normal").unwrap();
        assert_eq!(table.column(2).unwrap().value, "normal");
        assert_eq!(table.to_dense(), before);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_validate_detects_out_of_bounds_modifier() {
        let mut table = SparseTable::new(3);
        let mut column = Column::new("x", "a");
        column.set_value(5, "b");
        table.insert_column(column);
        assert!(matches!(
            table.validate(),
            Err(SdrfError::TableError(TableError::ModifierOutOfBounds { sample: 5, .. }))
        ));
        assert!(table.validate_column(0).is_ok());
    }

    #[test]
    fn test_serde_round_trip() {
        let table = sample_table();
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains("\"samples\":\"1,4\""));
        assert!(json.contains("\"sampleCount\":5"));
        let back: SparseTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_deserialize_rejects_invalid_tables() {
        let beyond = r#"{"columns":[{"name":"x","value":"a","modifiers":[{"samples":"2,5","value":"b"}]}],"sampleCount":3}"#;
        let error = serde_json::from_str::<SparseTable>(beyond).unwrap_err();
        assert!(error.to_string().contains("beyond the table"));

        let misplaced = r#"{"columns":[{"name":"x","value":"a","columnPosition":4}],"sampleCount":3}"#;
        let error = serde_json::from_str::<SparseTable>(misplaced).unwrap_err();
        assert!(error.to_string().contains("records 4"));

        let overlapping = r#"{"columns":[{"name":"x","value":"a","modifiers":[{"samples":"1,2","value":"b"},{"samples":"2","value":"c"}]}],"sampleCount":3}"#;
        assert!(serde_json::from_str::<SparseTable>(overlapping).is_err());

        let valid = r#"{"columns":[{"name":"x","value":"a","modifiers":[{"samples":"2","value":"b"}]}],"sampleCount":3}"#;
        let table: SparseTable = serde_json::from_str(valid).unwrap();
        assert_eq!(table.row(2).unwrap(), vec!["b"]);
    }
}
