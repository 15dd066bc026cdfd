//! Read-through page cache.

use std::sync::Arc;

use tracing::{debug, instrument};

use stashline_core::constants::PAGE_CACHE_TTL_SECONDS;
use stashline_core::error::Result;
use stashline_core::keys;
use stashline_core::traits::{KeyValueStore, PageFetcher};

use crate::count::CountAccess;

/// Web page cache backed by an external key-value store.
///
/// | Key | Value | TTL |
/// |---|---|---|
/// | `cache:<url>` | page body | 10 s from the last write |
/// | `count:<url>` | number of network fetches | none |
///
/// # Concurrency
///
/// Lookup, fetch and write are three separate store calls. Two callers
/// missing on the same URL at the same time will both fetch, both count and
/// both write; the last write wins and restarts the TTL. This race is
/// accepted.
pub struct WebCache {
    store: Arc<dyn KeyValueStore>,
    fetcher: CountAccess<Arc<dyn PageFetcher>>,
}

impl WebCache {
    /// Creates a cache over `store` that fetches misses with `fetcher`.
    pub fn new(store: Arc<dyn KeyValueStore>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher: CountAccess::new(store.clone(), fetcher),
            store,
        }
    }

    /// Returns the content of `url` as text.
    ///
    /// A cached copy is returned without touching the network or the
    /// counter. Otherwise `count:<url>` is incremented, the page is fetched
    /// and cached for [`PAGE_CACHE_TTL_SECONDS`]. A failed fetch leaves the
    /// cache untouched and is returned as is.
    #[instrument(skip(self))]
    pub async fn get_page(&self, url: &str) -> Result<String> {
        let cache_key = keys::cache_key(url);

        if let Some(cached) = self.store.get(&cache_key).await? {
            debug!(url, "Cache hit");
            return Ok(decode_page(&cached));
        }

        debug!(url, "Cache miss");
        let content = self.fetcher.fetch(url).await?;
        self.store
            .setex(&cache_key, PAGE_CACHE_TTL_SECONDS, &content)
            .await?;

        Ok(decode_page(&content))
    }

    /// Number of times `url` was fetched from the network (0 if never).
    pub async fn fetch_count(&self, url: &str) -> Result<u64> {
        match self.store.get(&keys::count_key(url)).await? {
            Some(raw) => Ok(String::from_utf8(raw)?.trim().parse::<u64>()?),
            None => Ok(0),
        }
    }
}

impl std::fmt::Debug for WebCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebCache")
            .field("ttl_seconds", &PAGE_CACHE_TTL_SECONDS)
            .finish_non_exhaustive()
    }
}

/// Page bodies are decoded leniently; invalid UTF-8 becomes U+FFFD.
fn decode_page(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}
