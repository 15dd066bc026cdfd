//! # Stashline Store
//!
//! Backends for the [`KeyValueStore`] trait.
//!
//! - **Memory**: in-process store with TTL support, for tests and offline runs
//! - **Redis**: the production backend (enable the `redis` feature)
//!
//! ## Example
//!
//! ```rust,ignore
//! use stashline_store::{KeyValueStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.setex("cache:http://example.com", 10, b"<html>").await?;
//! assert_eq!(store.incr("count:http://example.com").await?, 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod memory;
#[cfg(feature = "redis")]
mod redis;

pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;

// Re-export the trait from core
pub use stashline_core::traits::KeyValueStore;
