//! One invocation of hnyfind: store a key, download, or answer a query.

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::auth::CredentialStore;
use crate::cache::{age_display, CacheError, CacheManager, DATASETS_KEY, MAX_CACHE_AGE};
use crate::config::Config;
use crate::feedback::{Feedback, Icon, Item};
use crate::models::Dataset;
use crate::refresh::{
    self, DownloadLock, ProcessCoordinator, RefreshPlan, DOWNLOAD_ARGS, DOWNLOAD_JOB,
    RERUN_INTERVAL,
};
use crate::search::Filter;

/// Store the API key. Set mode needs nothing but the credential store.
pub fn set_credential<C: CredentialStore>(credentials: &C, api_key: &str) -> Result<()> {
    credentials.set(api_key).context("Failed to store API key")?;
    info!("API key stored");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Fresh list stored; number of datasets
    Stored(usize),
    /// Another download holds the lock
    AlreadyRunning,
}

pub struct Workflow<C, P> {
    config: Config,
    cache: CacheManager,
    credentials: C,
    coordinator: P,
    filter: Filter,
}

impl<C: CredentialStore, P: ProcessCoordinator> Workflow<C, P> {
    pub fn new(config: Config, cache: CacheManager, credentials: C, coordinator: P) -> Self {
        Self {
            config,
            cache,
            credentials,
            coordinator,
            filter: Filter::default(),
        }
    }

    /// Run one refresh cycle. A download already in progress makes this a
    /// no-op.
    pub async fn download(&self) -> Result<DownloadOutcome> {
        let Some(_lock) = DownloadLock::try_acquire(self.cache.dir())
            .context("Failed to open download lock")?
        else {
            info!("Download already running, skipping");
            return Ok(DownloadOutcome::AlreadyRunning);
        };

        let api_key = self.credentials.get().context("Failed to read API key")?;
        let client = ApiClient::new(&self.config)?;

        info!(api_host = %self.config.api_host, "Downloading dataset list");
        let count = refresh::refresh(&client, &self.cache, &api_key)
            .await
            .context("Failed to download dataset list")?;
        Ok(DownloadOutcome::Stored(count))
    }

    fn load_datasets(&self) -> Result<Vec<Dataset>, CacheError> {
        match self.cache.load_json(DATASETS_KEY) {
            Ok(datasets) => Ok(datasets),
            Err(CacheError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Answer a query from the cache, starting a background download if the
    /// cache has expired.
    ///
    /// Always returns a document with at least one item, except when the
    /// cache file is corrupt, which is returned as an error after a
    /// replacement download has been started.
    pub fn query(&self, query: &str) -> Result<Feedback> {
        debug!(query, "Query");
        let loaded = self.load_datasets();

        // A corrupt file is only ever fixed by a new download
        let expired = loaded.is_err() || self.cache.expired(DATASETS_KEY, MAX_CACHE_AGE);
        let has_data = loaded.as_ref().is_ok_and(|d| !d.is_empty());
        let running = expired && self.coordinator.is_running(DOWNLOAD_JOB);
        let plan = RefreshPlan::decide(expired, has_data, running);

        if let Some(age) = self.cache.age(DATASETS_KEY) {
            debug!(age = %age_display(age), expired, "Cache state");
        }

        let mut feedback = Feedback::new();
        if plan.stale {
            feedback.rerun(RERUN_INTERVAL);
        }
        if plan.trigger {
            match self.coordinator.run_detached(DOWNLOAD_JOB, DOWNLOAD_ARGS) {
                Ok(()) => info!("Started background download"),
                // Non-fatal: the cached list is still returned
                Err(e) => error!(error = %e, "Failed to start background download"),
            }
        } else if running {
            debug!("Download job already running");
        }

        let datasets = loaded.context("Failed to load cached datasets")?;

        if plan.placeholder {
            feedback.push(Item::notice(
                "Downloading datasets",
                "Results will appear shortly",
                Icon::info(),
            ));
            return Ok(feedback);
        }

        let candidates: Vec<Item> = datasets
            .iter()
            .filter_map(|dataset| match dataset.url() {
                Ok(url) => Some(Item::action(
                    dataset.uid(),
                    dataset.name.as_str(),
                    dataset.team.slug.as_str(),
                    url.as_str(),
                )),
                Err(e) => {
                    warn!(
                        dataset = %dataset.uid(),
                        ui_host = %dataset.team.ui_host,
                        error = %e,
                        "Bad dataset URL, skipping"
                    );
                    None
                }
            })
            .collect();

        let ranked = self
            .filter
            .apply_by(&candidates, query, |item| item.title.as_str());
        if !query.trim().is_empty() {
            info!(
                matched = ranked.len(),
                total = datasets.len(),
                query,
                "Filtered datasets"
            );
        }
        for result in ranked {
            feedback.push(result.item.clone());
        }

        feedback.warn_empty("No datasets found", "Try a different query?");
        Ok(feedback)
    }
}
