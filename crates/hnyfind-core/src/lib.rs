//! hnyfind core - search Honeycomb datasets from a launcher.
//!
//! The dataset list is downloaded in the background and cached on disk;
//! queries are answered from the cache with fuzzy matching, so the
//! interactive path never waits on the network.
//!
//! - `api`: Honeycomb REST client
//! - `cache`: atomic JSON file cache with mtime-based expiry
//! - `auth`: API key storage in the OS keychain
//! - `search`: weighted fuzzy ranking
//! - `refresh`: background download scheduling
//! - `feedback`: the result document sent to the launcher
//! - `workflow`: the three invocation modes wired together

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod feedback;
pub mod models;
pub mod refresh;
pub mod search;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use workflow::{set_credential, DownloadOutcome, Workflow};
