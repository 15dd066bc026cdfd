//! HTTP page fetcher.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use stashline_core::constants::DEFAULT_HTTP_TIMEOUT_SECONDS;
use stashline_core::error::{Result, StashError};
use stashline_core::traits::PageFetcher;

/// HTTP fetcher configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Value of the User-Agent header
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
            user_agent: concat!("stashline/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl FetcherConfig {
    /// Overrides the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// Fetches pages with a plain HTTP GET.
///
/// No retries: a transport error or a non-2xx status is returned as
/// [`StashError::FetchFailed`].
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    config: FetcherConfig,
    http_client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(FetcherConfig::default())
    }

    /// Creates a fetcher with custom configuration.
    pub fn with_config(config: FetcherConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| StashError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http_client.get(url).send().await.map_err(|e| {
            warn!(url, error = %e, "Request failed");
            StashError::fetch_failed(url, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, %status, "Unexpected status");
            return Err(StashError::fetch_failed(url, format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StashError::fetch_failed(url, e))?;

        debug!(url, len = body.len(), "Fetched page");
        Ok(body.to_vec())
    }
}
