//! Per-URL access counting.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use stashline_core::error::Result;
use stashline_core::keys;
use stashline_core::traits::{KeyValueStore, PageFetcher};

/// Fetcher wrapper that increments `count:<url>` before forwarding each call.
///
/// On its own it counts every access. [`crate::WebCache`] places it behind
/// the cache lookup, so there it counts misses only.
pub struct CountAccess<F> {
    store: Arc<dyn KeyValueStore>,
    inner: F,
}

impl<F: PageFetcher> CountAccess<F> {
    /// Wraps `inner`, keeping counters in `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, inner: F) -> Self {
        Self { store, inner }
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for CountAccess<F> {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let count = self.store.incr(&keys::count_key(url)).await?;
        debug!(url, count, "Counted access");
        self.inner.fetch(url).await
    }
}
