//! Common traits for Stashline.
//!
//! Both components talk to their collaborators only through these traits,
//! so backends can be swapped (Redis in production, in-memory in tests).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

// ═══════════════════════════════════════════════════════════════════════════════
// KEY-VALUE STORE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Primitive interface of the external key-value store.
///
/// Implementations must make `incr`, `set`, `setex` and `rpush` atomic;
/// Stashline adds no locking of its own.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key` with no expiry.
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Stores `value` under `key`, expiring `ttl_seconds` after this write.
    async fn setex(&self, key: &str, ttl_seconds: u64, value: &[u8]) -> Result<()>;

    /// Atomically increments the integer under `key` and returns the new value.
    ///
    /// An absent key counts as 0.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Appends `value` to the list under `key` and returns the new length.
    async fn rpush(&self, key: &str, value: &[u8]) -> Result<u64>;

    /// Returns list elements `start..=end`; negative indices count from the end.
    async fn lrange(&self, key: &str, start: i64, end: i64) -> Result<Vec<Vec<u8>>>;

    /// Deletes every key in the current database.
    async fn flushdb(&self) -> Result<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn setex(&self, key: &str, ttl_seconds: u64, value: &[u8]) -> Result<()> {
        (**self).setex(key, ttl_seconds, value).await
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        (**self).incr(key).await
    }

    async fn rpush(&self, key: &str, value: &[u8]) -> Result<u64> {
        (**self).rpush(key, value).await
    }

    async fn lrange(&self, key: &str, start: i64, end: i64) -> Result<Vec<Vec<u8>>> {
        (**self).lrange(key, start, end).await
    }

    async fn flushdb(&self) -> Result<()> {
        (**self).flushdb().await
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAGE FETCHER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for fetching the raw body of a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Performs an HTTP GET and returns the body.
    ///
    /// Non-success statuses are errors, not bodies.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch(url).await
    }
}
