//! # Sparse Storage Module
//!
//! Columns store one default value plus a list of modifiers, each pairing a
//! set of samples with the value they override. Sample sets travel as compact
//! range strings such as `1-3,5,7-10` and are held in memory as bitmaps.
pub mod column;
pub mod range;
pub mod table;
