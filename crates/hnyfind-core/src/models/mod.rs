//! Data models for Honeycomb entities.
//!
//! - `Team`: the owning team of a batch of datasets, with the UI host used
//!   to build links
//! - `Dataset`: a named dataset, the unit of search and selection

pub mod dataset;

pub use dataset::{Dataset, Team};
