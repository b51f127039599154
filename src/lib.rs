//! # Sparse SDRF Tables
//!
//! An in-memory, column-oriented store for SDRF proteomics sample metadata.
//! Most SDRF columns repeat one value across thousands of samples, so each
//! column keeps a default value and only records the samples that differ.
//!
//! ## Features
//!
//! - **Range codec**: Compact `1-3,5,7-10` sample sets with union, difference and intersection
//! - **Sparse columns**: Single-cell and bulk edits that keep the representation minimal
//! - **Table editing**: Row and column insertion and deletion with index shifting
//! - **Copy-on-write snapshots**: Cloning a table shares unchanged columns
//! - **Quality analysis**: Entropy, redundancy and consistency checks computed from the sparse form
//! - **Pool detection**: Reference pools declared with `SN=` and implicit `pooled` groups
//!
//! ## Logging
//!
//! The crate emits `tracing` events and never installs a subscriber.
pub mod analysis;
pub mod database;
pub mod error;
mod helpers;

pub use analysis::criteria::QualityCriteria;
pub use analysis::pool::SamplePool;
pub use analysis::quality::{analyze_column, analyze_table, ColumnQuality, QualityAction, QualityReport};
pub use database::column::{Column, ColumnKind};
pub use database::range::{SampleIndex, SampleRange};
pub use database::table::SparseTable;
pub use error::SdrfError;
