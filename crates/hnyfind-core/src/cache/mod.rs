//! Local caching module for the dataset list.
//!
//! This module provides the `CacheManager`, a small JSON file store whose
//! staleness is judged from file modification times. The dataset list is
//! kept under `DATASETS_KEY` and considered stale after `MAX_CACHE_AGE`.

use std::time::Duration;

pub mod manager;

pub use manager::{age_display, CacheError, CacheManager};

/// Filename of the cached dataset list
pub const DATASETS_KEY: &str = "datasets.json";

/// How long a downloaded dataset list is served before refreshing
pub const MAX_CACHE_AGE: Duration = Duration::from_secs(180 * 60);
