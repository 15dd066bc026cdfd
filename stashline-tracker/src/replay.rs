//! Reading back the recorded history of an operation.

use std::fmt;

use serde::Serialize;

use stashline_core::error::Result;
use stashline_core::keys;
use stashline_core::traits::KeyValueStore;

/// One recorded call: the argument representation and the returned value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Argument tuple, e.g. `('foo',)`
    pub input: String,
    /// Returned value
    pub output: String,
}

/// Call count and history of one operation, in call order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Replay {
    /// Qualified operation name
    pub operation: String,
    /// Value of the call counter (0 if never called)
    pub call_count: u64,
    /// Recorded calls, oldest first
    pub entries: Vec<HistoryEntry>,
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} was called {} times:", self.operation, self.call_count)?;
        for entry in &self.entries {
            write!(f, "\n{}(*{}) -> {}", self.operation, entry.input, entry.output)?;
        }
        Ok(())
    }
}

/// Reads the call counter for `operation`, treating an absent counter as 0.
pub(crate) async fn call_count(store: &dyn KeyValueStore, operation: &str) -> Result<u64> {
    match store.get(&keys::calls_key(operation)).await? {
        Some(raw) => Ok(String::from_utf8(raw)?.trim().parse::<u64>()?),
        None => Ok(0),
    }
}

/// Reads the counter and both history lists of `operation`.
///
/// Read-only. Inputs and outputs are paired by position; if a call failed
/// after recording its input, the unmatched trailing input is left out.
pub async fn replay(store: &dyn KeyValueStore, operation: &str) -> Result<Replay> {
    let call_count = call_count(store, operation).await?;
    let inputs = store.lrange(&keys::inputs_key(operation), 0, -1).await?;
    let outputs = store.lrange(&keys::outputs_key(operation), 0, -1).await?;

    let entries = inputs
        .into_iter()
        .zip(outputs)
        .map(|(input, output)| HistoryEntry {
            input: String::from_utf8_lossy(&input).into_owned(),
            output: String::from_utf8_lossy(&output).into_owned(),
        })
        .collect();

    Ok(Replay {
        operation: operation.to_string(),
        call_count,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stashline_store::MemoryStore;

    #[tokio::test]
    async fn test_replay_never_called() {
        let store = MemoryStore::new();
        let replay = replay(&store, "Cache.store").await.unwrap();

        assert_eq!(replay.call_count, 0);
        assert!(replay.entries.is_empty());
        assert_eq!(replay.to_string(), "Cache.store was called 0 times:");
    }

    #[tokio::test]
    async fn test_replay_rendering() {
        let store = MemoryStore::new();
        store.set("Cache.store", b"2").await.unwrap();
        store.rpush("Cache.store:inputs", b"('foo',)").await.unwrap();
        store.rpush("Cache.store:inputs", b"(42,)").await.unwrap();
        store.rpush("Cache.store:outputs", b"k1").await.unwrap();
        store.rpush("Cache.store:outputs", b"k2").await.unwrap();

        let replay = replay(&store, "Cache.store").await.unwrap();
        assert_eq!(
            replay.to_string(),
            "Cache.store was called 2 times:\n\
             Cache.store(*('foo',)) -> k1\n\
             Cache.store(*(42,)) -> k2"
        );
    }

    #[tokio::test]
    async fn test_replay_pairs_by_position() {
        let store = MemoryStore::new();
        store.set("Op", b"2").await.unwrap();
        store.rpush("Op:inputs", b"a").await.unwrap();
        store.rpush("Op:inputs", b"b").await.unwrap();
        store.rpush("Op:outputs", b"A").await.unwrap();

        let replay = replay(&store, "Op").await.unwrap();
        assert_eq!(replay.call_count, 2);
        assert_eq!(
            replay.entries,
            vec![HistoryEntry { input: "a".into(), output: "A".into() }]
        );
    }

    #[tokio::test]
    async fn test_corrupt_counter_is_conversion_error() {
        let store = MemoryStore::new();
        store.set("Op", b"many").await.unwrap();
        assert!(matches!(
            replay(&store, "Op").await,
            Err(stashline_core::StashError::Conversion(_))
        ));
    }

    #[tokio::test]
    async fn test_replay_is_read_only() {
        let store = MemoryStore::new();
        replay(&store, "Op").await.unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_replay_serializes() {
        let replay = Replay {
            operation: "Op".into(),
            call_count: 1,
            entries: vec![HistoryEntry { input: "(1,)".into(), output: "k".into() }],
        };
        let json = serde_json::to_value(&replay).unwrap();
        assert_eq!(json["call_count"], 1);
        assert_eq!(json["entries"][0]["output"], "k");
    }
}
