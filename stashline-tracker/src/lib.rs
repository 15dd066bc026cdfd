//! # Stashline Tracker
//!
//! A store/fetch object over an external key-value store that records how
//! it is used.
//!
//! - [`Cache`]: stores values under random keys and reads them back
//! - [`Layer`]: before/after hooks composed around an operation
//!   ([`CountCalls`], [`CallHistory`])
//! - [`replay`]: reads back the recorded history of an operation
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stashline_store::MemoryStore;
//! use stashline_tracker::Cache;
//!
//! let cache = Cache::new(Arc::new(MemoryStore::new()));
//! let key = cache.store("cat").await?;
//! assert_eq!(cache.get_str(&key).await?, Some("cat".to_string()));
//!
//! let replay = cache.replay("Cache.store").await?;
//! assert_eq!(replay.call_count, 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod layer;
mod replay;

pub use cache::Cache;
pub use layer::{CallHistory, CountCalls, Instrumented, Layer};
pub use replay::{replay, HistoryEntry, Replay};
