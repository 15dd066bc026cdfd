//! Instrumented store/fetch object.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use stashline_core::constants::STORE_OPERATION;
use stashline_core::error::{Result, StashError};
use stashline_core::traits::KeyValueStore;
use stashline_core::types::StoredValue;

use crate::layer::{CallHistory, CountCalls, Instrumented};
use crate::replay::{self, Replay};

/// Stores values under random keys in an external key-value store.
///
/// Every [`Cache::store`] call is counted under `Cache.store` and its
/// argument and returned key are appended to `Cache.store:inputs` and
/// `Cache.store:outputs`. Reads are not instrumented.
///
/// Construction never touches the store; call [`Cache::reset`] (or use
/// [`Cache::with_reset`]) to start from an empty database.
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
    store_op: Instrumented,
}

impl Cache {
    /// Wraps an existing store handle.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            store_op: Instrumented::new(STORE_OPERATION)
                .layer(CountCalls)
                .layer(CallHistory),
        }
    }

    /// Wraps `store` and flushes its current database.
    ///
    /// Destroys every key in that database, not only Stashline's.
    pub async fn with_reset(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let cache = Self::new(store);
        cache.reset().await?;
        Ok(cache)
    }

    /// Deletes every key in the store's current database.
    pub async fn reset(&self) -> Result<()> {
        self.store.flushdb().await?;
        info!("Store reset");
        Ok(())
    }

    /// Stores `data` under a fresh UUIDv4 key and returns the key.
    #[instrument(skip(self, data))]
    pub async fn store(&self, data: impl Into<StoredValue>) -> Result<String> {
        let value = data.into();
        let input = value.args_repr();
        let store = &self.store;

        let key = self
            .store_op
            .call(store.as_ref(), &input, || async move {
                let key = Uuid::new_v4().to_string();
                store.set(&key, &value.to_bytes()).await?;
                Ok::<_, StashError>(key)
            })
            .await?;

        debug!(operation = self.store_op.operation(), %key, "Stored value");
        Ok(key)
    }

    /// Reads `key` and applies `convert` to the raw bytes.
    ///
    /// Returns `Ok(None)` if the key is absent. Converter errors propagate.
    pub async fn get<T, F>(&self, key: &str, convert: F) -> Result<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> Result<T>,
    {
        match self.store.get(key).await? {
            Some(raw) => convert(raw).map(Some),
            None => Ok(None),
        }
    }

    /// Reads `key` without conversion.
    pub async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.get(key, Ok).await
    }

    /// Reads `key` as UTF-8 text.
    pub async fn get_str(&self, key: &str) -> Result<Option<String>> {
        self.get(key, |raw| Ok(String::from_utf8(raw)?)).await
    }

    /// Reads `key` as a decimal integer.
    pub async fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.get(key, |raw| Ok(String::from_utf8(raw)?.parse::<i64>()?))
            .await
    }

    /// Reads `key` as a floating-point number.
    pub async fn get_float(&self, key: &str) -> Result<Option<f64>> {
        self.get(key, |raw| Ok(String::from_utf8(raw)?.parse::<f64>()?))
            .await
    }

    /// Number of recorded calls to `operation` (0 if never called).
    pub async fn call_count(&self, operation: &str) -> Result<u64> {
        replay::call_count(self.store.as_ref(), operation).await
    }

    /// Reads the recorded history of `operation`.
    pub async fn replay(&self, operation: &str) -> Result<Replay> {
        replay::replay(self.store.as_ref(), operation).await
    }

    /// Prints the recorded history of `operation` to stdout.
    pub async fn print_replay(&self, operation: &str) -> Result<()> {
        let replay = self.replay(operation).await?;
        println!("{}", replay);
        Ok(())
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").field("store_op", &self.store_op).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use stashline_store::MemoryStore;
    use test_case::test_case;

    /// A store whose every command fails as if the server were down.
    struct Unreachable;

    #[async_trait]
    impl KeyValueStore for Unreachable {
        async fn get(&self, _: &str) -> Result<Option<Vec<u8>>> {
            Err(down())
        }
        async fn set(&self, _: &str, _: &[u8]) -> Result<()> {
            Err(down())
        }
        async fn setex(&self, _: &str, _: u64, _: &[u8]) -> Result<()> {
            Err(down())
        }
        async fn incr(&self, _: &str) -> Result<i64> {
            Err(down())
        }
        async fn rpush(&self, _: &str, _: &[u8]) -> Result<u64> {
            Err(down())
        }
        async fn lrange(&self, _: &str, _: i64, _: i64) -> Result<Vec<Vec<u8>>> {
            Err(down())
        }
        async fn flushdb(&self) -> Result<()> {
            Err(down())
        }
    }

    fn down() -> StashError {
        StashError::StoreUnavailable("connection refused".into())
    }

    fn new_cache() -> (Arc<MemoryStore>, Cache) {
        let store = Arc::new(MemoryStore::new());
        let cache = Cache::new(store.clone());
        (store, cache)
    }

    #[test_case(StoredValue::from("cat") ; "text")]
    #[test_case(StoredValue::from(42) ; "integer")]
    #[test_case(StoredValue::from(2.5) ; "float")]
    #[test_case(StoredValue::from(vec![0u8, 159, 146, 150]) ; "bytes")]
    #[tokio::test]
    async fn test_store_round_trip(value: StoredValue) {
        let (_, cache) = new_cache();
        let key = cache.store(value.clone()).await.unwrap();

        assert_eq!(cache.get_raw(&key).await.unwrap(), Some(value.to_bytes()));
        match value {
            StoredValue::Text(s) => assert_eq!(cache.get_str(&key).await.unwrap(), Some(s)),
            StoredValue::Integer(i) => assert_eq!(cache.get_int(&key).await.unwrap(), Some(i)),
            StoredValue::Float(f) => assert_eq!(cache.get_float(&key).await.unwrap(), Some(f)),
            StoredValue::Bytes(_) => {}
        }
    }

    #[tokio::test]
    async fn test_keys_are_uuids() {
        let (_, cache) = new_cache();
        let a = cache.store("a").await.unwrap();
        let b = cache.store("a").await.unwrap();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let (_, cache) = new_cache();
        assert_eq!(cache.get_str("missing").await.unwrap(), None);
        assert_eq!(cache.get_int("missing").await.unwrap(), None);
        assert_eq!(cache.get("missing", |raw| Ok(raw.len())).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_with_custom_converter() {
        let (_, cache) = new_cache();
        let key = cache.store("hello").await.unwrap();
        let len = cache.get(&key, |raw| Ok(raw.len())).await.unwrap();
        assert_eq!(len, Some(5));
    }

    #[tokio::test]
    async fn test_get_int_on_text_fails() {
        let (_, cache) = new_cache();
        let key = cache.store("cat").await.unwrap();
        assert!(matches!(
            cache.get_int(&key).await,
            Err(StashError::Conversion(_))
        ));
    }

    #[tokio::test]
    async fn test_get_str_on_invalid_utf8_fails() {
        let (_, cache) = new_cache();
        let key = cache.store(vec![0xffu8, 0xfe]).await.unwrap();
        assert!(matches!(
            cache.get_str(&key).await,
            Err(StashError::Conversion(_))
        ));
    }

    #[tokio::test]
    async fn test_new_does_not_flush() {
        let store = Arc::new(MemoryStore::new());
        store.set("existing", b"kept").await.unwrap();

        let _cache = Cache::new(store.clone());
        assert!(store.contains_key("existing"));
    }

    #[tokio::test]
    async fn test_with_reset_flushes() {
        let store = Arc::new(MemoryStore::new());
        store.set("existing", b"gone").await.unwrap();

        let cache = Cache::with_reset(store.clone()).await.unwrap();
        assert!(store.is_empty());
        assert_eq!(cache.call_count(STORE_OPERATION).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_is_counted_and_recorded() {
        let (store, cache) = new_cache();
        let k1 = cache.store("foo").await.unwrap();
        let k2 = cache.store(42).await.unwrap();

        assert_eq!(cache.call_count("Cache.store").await.unwrap(), 2);
        assert_eq!(
            store.lrange("Cache.store:outputs", 0, -1).await.unwrap(),
            vec![k1.into_bytes(), k2.into_bytes()]
        );
    }

    #[tokio::test]
    async fn test_reads_are_not_counted() {
        let (_, cache) = new_cache();
        let key = cache.store("foo").await.unwrap();
        cache.get_str(&key).await.unwrap();
        cache.get_raw(&key).await.unwrap();
        assert_eq!(cache.call_count("Cache.store").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_store_errors_propagate() {
        let cache = Cache::new(Arc::new(Unreachable));

        assert!(matches!(cache.store("foo").await, Err(StashError::StoreUnavailable(_))));
        assert!(matches!(cache.get_str("k").await, Err(StashError::StoreUnavailable(_))));
        assert!(matches!(cache.get_raw("k").await, Err(StashError::StoreUnavailable(_))));
        assert!(matches!(cache.reset().await, Err(StashError::StoreUnavailable(_))));
        assert!(matches!(
            cache.replay(STORE_OPERATION).await,
            Err(StashError::StoreUnavailable(_))
        ));
    }
}
