//! Sorted and filtered orderings of samples.
//!
//! Views never copy the table. They return sample indices computed from
//! repeated `get_value` calls, which the caller maps back onto rows.
use crate::database::range::SampleIndex;
use crate::database::table::{SparseTable, TableError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Keeps samples whose value in `column` contains `needle`, ignoring case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub column: usize,
    pub needle: String,
}

impl ColumnFilter {
    pub fn new(column: usize, needle: &str) -> Self {
        Self {
            column,
            needle: needle.to_owned(),
        }
    }
}

/// Numbers sort before text and compare by value; text compares case-insensitively.
fn compare_values(left: &str, right: &str) -> Ordering {
    match (left.trim().parse::<f64>(), right.trim().parse::<f64>()) {
        (Ok(left), Ok(right)) => left.total_cmp(&right),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.to_lowercase().cmp(&right.to_lowercase()).then_with(|| left.cmp(right)),
    }
}

/// All samples ordered by their value in `column`. Equal values keep sample order.
pub fn sorted_samples(table: &SparseTable, column: usize, order: SortOrder) -> Result<Vec<SampleIndex>, TableError> {
    let column = table.column(column)?;
    let mut samples: Vec<SampleIndex> = (1..=table.sample_count()).collect();
    samples.sort_by(|&a, &b| {
        let ordering = compare_values(column.get_value(a), column.get_value(b));
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
    Ok(samples)
}

/// Samples matching every filter, ascending. No filters keeps every sample.
pub fn filter_samples(table: &SparseTable, filters: &[ColumnFilter]) -> Result<Vec<SampleIndex>, TableError> {
    let filters = filters
        .iter()
        .map(|filter| Ok((table.column(filter.column)?, filter.needle.to_lowercase())))
        .collect::<Result<Vec<_>, TableError>>()?;
    Ok((1..=table.sample_count())
        .filter(|&sample| {
            filters
                .iter()
                .all(|(column, needle)| column.get_value(sample).to_lowercase().contains(needle.as_str()))
        })
        .collect())
}
