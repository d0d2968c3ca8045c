//! API client for the Honeycomb REST API.
//!
//! Only two read-only endpoints are used: the team lookup for an API key and
//! the dataset listing. Both authenticate with the `X-Honeycomb-Team` header.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::models::{Dataset, Team};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Header carrying the API key on every request
const TEAM_HEADER: &str = "x-honeycomb-team";

const TEAM_ENDPOINT: &str = "/1/team_slug";
const DATASETS_ENDPOINT: &str = "/1/datasets";

/// Ceiling for establishing the TCP connection.
const CONNECT_TIMEOUT_SECS: u64 = 60;

/// TCP keep-alive interval and idle lifetime of pooled connections.
const KEEPALIVE_SECS: u64 = 60;

/// Ceiling for any single read, which bounds the TLS handshake and the wait
/// for response headers.
const READ_TIMEOUT_SECS: u64 = 30;

/// Ceiling for a whole request, body included.
const REQUEST_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Deserialize)]
struct TeamResponse {
    team_slug: String,
}

#[derive(Debug, Deserialize)]
struct DatasetResponse {
    name: String,
    slug: String,
}

/// API client for Honeycomb.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    team_url: Url,
    datasets_url: Url,
    ui_host: String,
}

impl ApiClient {
    /// Create a new API client for the hosts in `config`
    pub fn new(config: &Config) -> Result<Self> {
        let api_host = parse_host(&config.api_host).context("Invalid API host")?;
        // The UI host is only used to build links, but a bad value is a
        // configuration error worth failing the download for.
        parse_host(&config.ui_host).context("Invalid UI host")?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .tcp_keepalive(Duration::from_secs(KEEPALIVE_SECS))
            .pool_idle_timeout(Duration::from_secs(KEEPALIVE_SECS))
            .read_timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("hnyfind/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            team_url: api_host.join(TEAM_ENDPOINT)?,
            datasets_url: api_host.join(DATASETS_ENDPOINT)?,
            ui_host: config.ui_host.clone(),
        })
    }

    fn auth_headers(api_key: &str) -> Result<header::HeaderMap, ApiError> {
        let mut value =
            header::HeaderValue::from_str(api_key).map_err(|_| ApiError::InvalidKey)?;
        value.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(TEAM_HEADER, value);
        Ok(headers)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &Url,
        endpoint: &'static str,
        api_key: &str,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url.clone())
            .headers(Self::auth_headers(api_key)?)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode { endpoint, source })
    }

    /// Fetch the team the API key belongs to
    pub async fn fetch_team(&self, api_key: &str) -> Result<Team, ApiError> {
        let response: TeamResponse = self.get(&self.team_url, TEAM_ENDPOINT, api_key).await?;
        debug!(team = %response.team_slug, "Team fetched");

        Ok(Team {
            slug: response.team_slug,
            ui_host: self.ui_host.clone(),
        })
    }

    /// Fetch every dataset of the key's team.
    ///
    /// Either both requests succeed and the full list is returned, or the
    /// first error is.
    pub async fn fetch_datasets(&self, api_key: &str) -> Result<Vec<Dataset>, ApiError> {
        let team = Arc::new(self.fetch_team(api_key).await?);

        let response: Vec<DatasetResponse> = self
            .get(&self.datasets_url, DATASETS_ENDPOINT, api_key)
            .await?;
        debug!(team = %team.slug, count = response.len(), "Datasets fetched");

        Ok(response
            .into_iter()
            .map(|d| Dataset::new(d.name, d.slug, Arc::clone(&team)))
            .collect())
    }
}

fn parse_host(host: &str) -> Result<Url> {
    let url = Url::parse(host).with_context(|| format!("Cannot parse {host:?}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow::anyhow!("Unsupported scheme {other:?} in {host:?}")),
    }
}
