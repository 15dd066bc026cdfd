//! Redis-backed key-value store.
//!
//! Every primitive maps to exactly one Redis command, so atomicity is
//! whatever Redis guarantees for that command.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError};
use tracing::{debug, info, instrument};

use stashline_core::error::{Result, StashError};
use stashline_core::traits::KeyValueStore;

/// Redis key-value store.
///
/// Wraps a [`ConnectionManager`], which reconnects on its own after a
/// dropped connection. Cloning is cheap and shares the connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connects to the Redis server at `url` (e.g. `redis://127.0.0.1/`).
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| StashError::Config(format!("invalid Redis URL '{}': {}", url, e)))?;
        let conn = ConnectionManager::new(client).await.map_err(store_error)?;

        info!(url, "Connected to Redis");
        Ok(Self { conn })
    }

    fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

/// Splits Redis failures into "could not reach the store" and "store said no".
fn store_error(err: RedisError) -> StashError {
    if err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        StashError::StoreUnavailable(err.to_string())
    } else {
        StashError::StoreCommand(err.to_string())
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value: Option<Vec<u8>> = self.conn().get(key).await.map_err(store_error)?;
        debug!(key, hit = value.is_some(), "GET");
        Ok(value)
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let _: () = self.conn().set(key, value).await.map_err(store_error)?;
        Ok(())
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    async fn setex(&self, key: &str, ttl_seconds: u64, value: &[u8]) -> Result<()> {
        let _: () = self
            .conn()
            .set_ex(key, value, ttl_seconds)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn incr(&self, key: &str) -> Result<i64> {
        let value: i64 = self.conn().incr(key, 1).await.map_err(store_error)?;
        debug!(key, value, "INCR");
        Ok(value)
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    async fn rpush(&self, key: &str, value: &[u8]) -> Result<u64> {
        let len: u64 = self.conn().rpush(key, value).await.map_err(store_error)?;
        Ok(len)
    }

    #[instrument(skip(self))]
    async fn lrange(&self, key: &str, start: i64, end: i64) -> Result<Vec<Vec<u8>>> {
        let items: Vec<Vec<u8>> = self
            .conn()
            .lrange(key, start as isize, end as isize)
            .await
            .map_err(store_error)?;
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn flushdb(&self) -> Result<()> {
        let mut conn = self.conn();
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut conn)
            .await
            .map_err(store_error)?;
        info!("Flushed Redis database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_is_config_error() {
        let result = RedisStore::connect("not a url").await;
        assert!(matches!(result, Err(StashError::Config(_))));
    }

    #[test]
    fn test_refused_connection_is_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = store_error(RedisError::from(io));
        assert!(matches!(err, StashError::StoreUnavailable(_)));
    }

    #[test]
    fn test_server_error_is_command_failure() {
        let err = store_error(RedisError::from((
            redis::ErrorKind::TypeError,
            "WRONGTYPE",
        )));
        assert!(matches!(err, StashError::StoreCommand(_)));
    }
}
