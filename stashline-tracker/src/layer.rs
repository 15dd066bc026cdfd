//! Instrumentation layers.
//!
//! An [`Instrumented`] operation runs every layer's `before` hook from the
//! outermost layer inwards, then the operation, then every `after` hook from
//! the innermost layer outwards. All bookkeeping lives in the key-value
//! store, so layers themselves are stateless.

use std::fmt::Display;
use std::future::Future;

use async_trait::async_trait;
use tracing::debug;

use stashline_core::error::Result;
use stashline_core::keys;
use stashline_core::traits::KeyValueStore;

/// Hooks run around an instrumented operation.
#[async_trait]
pub trait Layer: Send + Sync {
    /// Runs before the operation. An error aborts the call.
    async fn before(&self, _store: &dyn KeyValueStore, _operation: &str, _input: &str) -> Result<()> {
        Ok(())
    }

    /// Runs after the operation succeeded.
    async fn after(&self, _store: &dyn KeyValueStore, _operation: &str, _output: &str) -> Result<()> {
        Ok(())
    }
}

/// Increments the operation's call counter (key: the operation name).
#[derive(Clone, Copy, Debug, Default)]
pub struct CountCalls;

#[async_trait]
impl Layer for CountCalls {
    async fn before(&self, store: &dyn KeyValueStore, operation: &str, _input: &str) -> Result<()> {
        let calls = store.incr(&keys::calls_key(operation)).await?;
        debug!(operation, calls, "Counted call");
        Ok(())
    }
}

/// Appends inputs to `<op>:inputs` before the call and outputs to
/// `<op>:outputs` after it.
#[derive(Clone, Copy, Debug, Default)]
pub struct CallHistory;

#[async_trait]
impl Layer for CallHistory {
    async fn before(&self, store: &dyn KeyValueStore, operation: &str, input: &str) -> Result<()> {
        store.rpush(&keys::inputs_key(operation), input.as_bytes()).await?;
        Ok(())
    }

    async fn after(&self, store: &dyn KeyValueStore, operation: &str, output: &str) -> Result<()> {
        store.rpush(&keys::outputs_key(operation), output.as_bytes()).await?;
        Ok(())
    }
}

/// A named operation wrapped in a stack of layers.
///
/// Layers added first are outermost:
///
/// ```rust,ignore
/// let op = Instrumented::new("Cache.store").layer(CountCalls).layer(CallHistory);
/// // incr(Cache.store) -> rpush(inputs) -> operation -> rpush(outputs)
/// ```
pub struct Instrumented {
    operation: String,
    layers: Vec<Box<dyn Layer>>,
}

impl Instrumented {
    /// Creates an operation with no layers.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            layers: Vec::new(),
        }
    }

    /// Adds `layer` inside every layer added so far.
    pub fn layer(mut self, layer: impl Layer + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// Qualified operation name used for bookkeeping keys.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Runs `op` through the layer stack.
    ///
    /// If `op` fails, the `before` bookkeeping stays recorded and no
    /// `after` hook runs.
    pub async fn call<T, F, Fut>(&self, store: &dyn KeyValueStore, input: &str, op: F) -> Result<T>
    where
        T: Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        for layer in &self.layers {
            layer.before(store, &self.operation, input).await?;
        }

        let output = op().await?;
        let rendered = output.to_string();

        for layer in self.layers.iter().rev() {
            layer.after(store, &self.operation, &rendered).await?;
        }
        Ok(output)
    }
}

impl std::fmt::Debug for Instrumented {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instrumented")
            .field("operation", &self.operation)
            .field("layers", &self.layers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use stashline_core::error::StashError;
    use stashline_store::MemoryStore;

    /// Records hook order into a shared log.
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Layer for Recorder {
        async fn before(&self, _: &dyn KeyValueStore, _: &str, _: &str) -> Result<()> {
            self.log.lock().push(format!("{}:before", self.name));
            Ok(())
        }

        async fn after(&self, _: &dyn KeyValueStore, _: &str, _: &str) -> Result<()> {
            self.log.lock().push(format!("{}:after", self.name));
            Ok(())
        }
    }

    struct Refuse;

    #[async_trait]
    impl Layer for Refuse {
        async fn before(&self, _: &dyn KeyValueStore, _: &str, _: &str) -> Result<()> {
            Err(StashError::StoreUnavailable("refused".into()))
        }
    }

    #[tokio::test]
    async fn test_hook_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let op = Instrumented::new("Demo.op")
            .layer(Recorder { name: "outer", log: log.clone() })
            .layer(Recorder { name: "inner", log: log.clone() });
        let store = MemoryStore::new();

        let inner_log = log.clone();
        let out = op
            .call(&store, "()", || async move {
                inner_log.lock().push("op".to_string());
                Ok(7)
            })
            .await
            .unwrap();

        assert_eq!(out, 7);
        assert_eq!(op.operation(), "Demo.op");
        assert_eq!(
            *log.lock(),
            vec!["outer:before", "inner:before", "op", "inner:after", "outer:after"]
        );
    }

    #[tokio::test]
    async fn test_failing_before_skips_operation() {
        let ran = Arc::new(Mutex::new(false));
        let op = Instrumented::new("Demo.op").layer(CountCalls).layer(Refuse);
        let store = MemoryStore::new();

        let flag = ran.clone();
        let result = op
            .call(&store, "()", || async move {
                *flag.lock() = true;
                Ok("done")
            })
            .await;

        assert!(matches!(result, Err(StashError::StoreUnavailable(_))));
        assert!(!*ran.lock());
        // The outer layer already ran.
        assert_eq!(store.get("Demo.op").await.unwrap(), Some(b"1".to_vec()));
    }

    #[tokio::test]
    async fn test_count_and_history_keys() {
        let op = Instrumented::new("Demo.op").layer(CountCalls).layer(CallHistory);
        let store = MemoryStore::new();

        op.call(&store, "(1,)", || async { Ok("one") }).await.unwrap();
        op.call(&store, "(2,)", || async { Ok("two") }).await.unwrap();

        assert_eq!(store.get("Demo.op").await.unwrap(), Some(b"2".to_vec()));
        assert_eq!(
            store.lrange("Demo.op:inputs", 0, -1).await.unwrap(),
            vec![b"(1,)".to_vec(), b"(2,)".to_vec()]
        );
        assert_eq!(
            store.lrange("Demo.op:outputs", 0, -1).await.unwrap(),
            vec![b"one".to_vec(), b"two".to_vec()]
        );
    }

    #[tokio::test]
    async fn test_failing_operation_records_input_only() {
        let op = Instrumented::new("Demo.op").layer(CountCalls).layer(CallHistory);
        let store = MemoryStore::new();

        let result: Result<String> = op
            .call(&store, "('x',)", || async {
                Err(StashError::StoreUnavailable("down".into()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.get("Demo.op").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.lrange("Demo.op:inputs", 0, -1).await.unwrap().len(), 1);
        assert!(store.lrange("Demo.op:outputs", 0, -1).await.unwrap().is_empty());
    }
}
