//! Background refresh of the dataset cache.
//!
//! Queries are always answered from the cache. When the cache has expired,
//! the query path starts `hnyfind --download` as a detached process unless
//! one is already running, and asks the launcher to re-run the query shortly
//! so the fresh list shows up once it lands.
//!
//! - `RefreshPlan`: what a query invocation should do, given cache state
//! - `ProcessCoordinator`: starting and detecting the background job
//! - `DownloadLock`: keeps concurrent downloads out of each other's way
//! - `refresh`: one download cycle

pub mod lock;
pub mod process;

pub use lock::DownloadLock;
pub use process::{PidFileCoordinator, ProcessCoordinator, ProcessError};

use tracing::info;

use crate::api::ApiClient;
use crate::cache::{CacheManager, DATASETS_KEY};

/// Name of the background download job
pub const DOWNLOAD_JOB: &str = "download";

/// Arguments that make the binary run one download cycle
pub const DOWNLOAD_ARGS: &[&str] = &["--download"];

/// Seconds after which the launcher should re-run a stale query
pub const RERUN_INTERVAL: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPlan {
    /// Results may be outdated; ask for a re-run
    pub stale: bool,
    /// Start a background download
    pub trigger: bool,
    /// Nothing cached yet; show the "in progress" row instead of results
    pub placeholder: bool,
}

impl RefreshPlan {
    pub fn decide(expired: bool, has_data: bool, running: bool) -> Self {
        Self {
            stale: expired,
            trigger: expired && !running,
            placeholder: expired && !has_data,
        }
    }
}

/// Download the dataset list and replace the cache with it.
///
/// On any error the previous cache file is left untouched.
pub async fn refresh(
    client: &ApiClient,
    cache: &CacheManager,
    api_key: &str,
) -> anyhow::Result<usize> {
    let datasets = client.fetch_datasets(api_key).await?;
    cache.store_json(DATASETS_KEY, &datasets)?;
    info!(count = datasets.len(), "Dataset list downloaded");
    Ok(datasets.len())
}
