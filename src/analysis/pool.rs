//! # Sample Pool Detection
//!
//! Pools are read from the reserved pooled-sample column of the raw rows.
//! A value of `SN=S1,S2,...` declares a reference pool made of the listed
//! source names. When no row declares a pool but some rows are marked
//! `pooled`, those rows form one implicit pool.
//!
//! Pools are derived data: they are rebuilt from scratch whenever the pooled
//! column, the source column or the row set changes.
use crate::database::range::SampleIndex;
use crate::helpers::string::{normalize, split_list, starts_with_ignore_case};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

const POOL_PREFIX: &str = "SN=";

/// Pooled-column values meaning the sample is also analyzed on its own.
const INDEPENDENT_VALUES: [&str; 3] = ["not pooled", "", "independent"];

/// A group of samples combined into one analytical unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplePool {
    pub pool_name: String,
    /// Samples that only exist as part of the pool
    pub pooled_only_samples: Vec<SampleIndex>,
    /// Samples in the pool that are also analyzed independently
    pub pooled_and_independent_samples: Vec<SampleIndex>,
    pub is_reference: bool,
    /// Pooled-column value describing the pool, e.g. `SN=S1,S2`
    pub sdrf_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PoolMetadata>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolMetadata {
    /// Source names listed after `SN=`
    pub declared_sources: Vec<String>,
    /// Declared names that match no row
    pub unmatched_sources: Vec<String>,
}

impl SamplePool {
    /// All samples of the pool, ascending.
    pub fn samples(&self) -> Vec<SampleIndex> {
        let mut samples: Vec<SampleIndex> = self
            .pooled_only_samples
            .iter()
            .chain(&self.pooled_and_independent_samples)
            .copied()
            .collect();
        samples.sort_unstable();
        samples.dedup();
        samples
    }

    pub fn contains(&self, sample: SampleIndex) -> bool {
        self.pooled_only_samples.contains(&sample) || self.pooled_and_independent_samples.contains(&sample)
    }
}

#[inline]
fn cell<'a, R, S>(row: &'a R, column: usize) -> &'a str
where
    R: AsRef<[S]>,
    S: AsRef<str> + 'a,
{
    row.as_ref().get(column).map_or("", |value| value.as_ref())
}

/// Detects sample pools from raw rows (row 0 is sample 1).
///
/// `pooled_column` indexes the reserved pooled-sample column and
/// `source_column` the source name column, when the table has one. Declared
/// names that match no source are left out of the pool and recorded in its
/// metadata.
pub fn detect_pools<R, S>(rows: &[R], pooled_column: usize, source_column: Option<usize>) -> Vec<SamplePool>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let definitions: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| starts_with_ignore_case(cell(*row, pooled_column).trim(), POOL_PREFIX))
        .map(|(offset, _)| offset)
        .collect();

    let pools = if definitions.is_empty() {
        implicit_pool(rows, pooled_column, source_column).into_iter().collect()
    } else {
        definitions
            .iter()
            .enumerate()
            .map(|(ordinal, &definition)| reference_pool(rows, definition, ordinal, pooled_column, source_column))
            .collect::<Vec<_>>()
    };
    debug!(pools = pools.len(), rows = rows.len(), "detected sample pools");
    pools
}

fn reference_pool<R, S>(
    rows: &[R],
    definition: usize,
    ordinal: usize,
    pooled_column: usize,
    source_column: Option<usize>,
) -> SamplePool
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let sdrf_value = cell(&rows[definition], pooled_column).trim();
    let declared: Vec<&str> = split_list(&sdrf_value[POOL_PREFIX.len()..]).collect();
    let pool_name = source_column
        .map(|column| cell(&rows[definition], column).trim())
        .filter(|name| !name.is_empty())
        .map_or_else(|| format!("pool {}", ordinal + 1), str::to_owned);

    let mut pooled_only_samples = Vec::new();
    let mut pooled_and_independent_samples = Vec::new();
    let mut matched = HashSet::<&str>::new();
    if let Some(source_column) = source_column {
        for (offset, row) in rows.iter().enumerate() {
            let source = cell(row, source_column).trim();
            if !declared.contains(&source) {
                continue;
            }
            matched.insert(source);
            let pooled = normalize(cell(row, pooled_column));
            let sample = offset as SampleIndex + 1;
            if INDEPENDENT_VALUES.contains(&pooled.as_str()) {
                pooled_and_independent_samples.push(sample);
            } else if offset == definition || !starts_with_ignore_case(&pooled, POOL_PREFIX) {
                pooled_only_samples.push(sample);
            }
        }
    }

    let unmatched_sources: Vec<String> = declared
        .iter()
        .filter(|name| !matched.contains(*name))
        .map(|name| name.to_string())
        .collect();
    if !unmatched_sources.is_empty() {
        warn!(pool = %pool_name, unmatched = ?unmatched_sources, "pool declares unknown source names");
    }

    SamplePool {
        pool_name,
        pooled_only_samples,
        pooled_and_independent_samples,
        is_reference: true,
        sdrf_value: sdrf_value.to_owned(),
        metadata: Some(PoolMetadata {
            declared_sources: declared.iter().map(|name| name.to_string()).collect(),
            unmatched_sources,
        }),
    }
}

fn implicit_pool<R, S>(rows: &[R], pooled_column: usize, source_column: Option<usize>) -> Option<SamplePool>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let members: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| normalize(cell(*row, pooled_column)) == "pooled")
        .map(|(offset, _)| offset)
        .collect();
    if members.is_empty() {
        return None;
    }
    let sdrf_value = source_column
        .map(|column| {
            let names: Vec<&str> = members.iter().map(|&offset| cell(&rows[offset], column).trim()).collect();
            format!("{}{}", POOL_PREFIX, names.join(","))
        })
        .unwrap_or_default();
    Some(SamplePool {
        pool_name: "pooled".to_owned(),
        pooled_only_samples: members.iter().map(|&offset| offset as SampleIndex + 1).collect(),
        pooled_and_independent_samples: Vec::new(),
        is_reference: false,
        sdrf_value,
        metadata: None,
    })
}
