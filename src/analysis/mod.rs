//! # Analysis Module
//!
//! Read-only passes over a [`SparseTable`](crate::database::table::SparseTable):
//! column quality scoring, sample pool detection and sorted or filtered views.
pub mod criteria;
pub mod pool;
pub mod quality;
pub mod view;
