//! In-memory key-value store.
//!
//! Implements the same primitive semantics as Redis for the commands
//! Stashline uses, including lazy TTL expiry and WRONGTYPE errors.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, instrument};

use stashline_core::error::{Result, StashError};
use stashline_core::traits::KeyValueStore;

const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

#[derive(Clone, Debug)]
enum Value {
    Bytes(Vec<u8>),
    List(Vec<Vec<u8>>),
}

/// A stored value and its optional deadline.
#[derive(Clone, Debug)]
struct Slot {
    value: Value,
    expires_at: Option<Instant>,
}

impl Slot {
    fn persistent(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// In-memory key-value store.
///
/// Each command runs under the lock of the key's shard, so `incr`, `set`,
/// `setex` and `rpush` are atomic with respect to each other.
///
/// # Expiry
///
/// Deadlines use [`tokio::time::Instant`], so tests running on a paused
/// clock can move past a TTL with `tokio::time::advance`. Expired keys are
/// removed lazily on access or by [`MemoryStore::cleanup_expired`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: DashMap<String, Slot>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Returns the number of keys, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns true if `key` holds a live value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.with_live(key, |_| ()).is_some()
    }

    /// Remaining time to live of `key`, or `None` if absent or persistent.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.with_live(key, |slot| slot.expires_at)
            .flatten()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Removes all expired keys.
    pub fn cleanup_expired(&self) {
        self.slots.retain(|_, slot| !slot.is_expired());
    }

    /// Runs `f` on the live slot under `key`, evicting it if expired.
    fn with_live<R>(&self, key: &str, f: impl FnOnce(&Slot) -> R) -> Option<R> {
        let expired = match self.slots.get(key) {
            Some(slot) if !slot.is_expired() => return Some(f(&*slot)),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.slots.remove_if(key, |_, slot| slot.is_expired());
        }
        None
    }

    fn put(&self, key: &str, slot: Slot) {
        self.slots.insert(key.to_string(), slot);
    }
}

/// Resolves Redis-style inclusive `start..=end` indices against `len`.
fn list_bounds(len: usize, start: i64, end: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let end = if end < 0 { len + end } else { end.min(len - 1) };
    if len == 0 || start > end || start >= len {
        return None;
    }
    Some((start as usize, end as usize))
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.with_live(key, |slot| slot.value.clone()) {
            Some(Value::Bytes(bytes)) => Ok(Some(bytes)),
            Some(Value::List(_)) => Err(StashError::StoreCommand(WRONG_TYPE.into())),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.put(key, Slot::persistent(Value::Bytes(value.to_vec())));
        Ok(())
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    async fn setex(&self, key: &str, ttl_seconds: u64, value: &[u8]) -> Result<()> {
        if ttl_seconds == 0 {
            return Err(StashError::StoreCommand(
                "invalid expire time in 'setex' command".into(),
            ));
        }
        let expires_at = Instant::now() + Duration::from_secs(ttl_seconds);
        self.put(
            key,
            Slot {
                value: Value::Bytes(value.to_vec()),
                expires_at: Some(expires_at),
            },
        );
        debug!(key, ttl_seconds, "Stored with expiry");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn incr(&self, key: &str) -> Result<i64> {
        let mut slot = self
            .slots
            .entry(key.to_string())
            .or_insert_with(|| Slot::persistent(Value::Bytes(b"0".to_vec())));
        if slot.is_expired() {
            *slot = Slot::persistent(Value::Bytes(b"0".to_vec()));
        }

        let Value::Bytes(bytes) = &mut slot.value else {
            return Err(StashError::StoreCommand(WRONG_TYPE.into()));
        };
        let not_an_integer =
            || StashError::StoreCommand("value is not an integer or out of range".into());
        let current: i64 = std::str::from_utf8(bytes)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or_else(not_an_integer)?;
        let next = current.checked_add(1).ok_or_else(not_an_integer)?;
        *bytes = next.to_string().into_bytes();

        debug!(key, value = next, "Incremented");
        Ok(next)
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    async fn rpush(&self, key: &str, value: &[u8]) -> Result<u64> {
        let mut slot = self
            .slots
            .entry(key.to_string())
            .or_insert_with(|| Slot::persistent(Value::List(Vec::new())));
        if slot.is_expired() {
            *slot = Slot::persistent(Value::List(Vec::new()));
        }

        match &mut slot.value {
            Value::List(items) => {
                items.push(value.to_vec());
                Ok(items.len() as u64)
            }
            Value::Bytes(_) => Err(StashError::StoreCommand(WRONG_TYPE.into())),
        }
    }

    #[instrument(skip(self))]
    async fn lrange(&self, key: &str, start: i64, end: i64) -> Result<Vec<Vec<u8>>> {
        let items = match self.with_live(key, |slot| slot.value.clone()) {
            Some(Value::List(items)) => items,
            Some(Value::Bytes(_)) => return Err(StashError::StoreCommand(WRONG_TYPE.into())),
            None => return Ok(Vec::new()),
        };

        Ok(match list_bounds(items.len(), start, end) {
            Some((from, to)) => items[from..=to].to_vec(),
            None => Vec::new(),
        })
    }

    #[instrument(skip(self))]
    async fn flushdb(&self) -> Result<()> {
        let removed = self.slots.len();
        self.slots.clear();
        debug!(removed, "Flushed store");
        Ok(())
    }
}
