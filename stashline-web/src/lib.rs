//! # Stashline Web
//!
//! Fetches web pages through a short-lived cache in an external key-value
//! store and counts how often each URL actually went to the network.
//!
//! - [`WebCache`]: read-through cache, 10 second TTL, miss-only counting
//! - [`CountAccess`]: fetcher wrapper counting every call it forwards
//! - [`HttpFetcher`]: reqwest-based [`PageFetcher`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stashline_store::MemoryStore;
//! use stashline_web::{HttpFetcher, WebCache};
//!
//! let cache = WebCache::new(Arc::new(MemoryStore::new()), Arc::new(HttpFetcher::new()?));
//! let page = cache.get_page("https://www.example.com/").await?;
//! assert_eq!(cache.fetch_count("https://www.example.com/").await?, 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod count;
mod fetcher;

pub use cache::WebCache;
pub use count::CountAccess;
pub use fetcher::{FetcherConfig, HttpFetcher};

// Re-export the trait from core
pub use stashline_core::traits::PageFetcher;
