//! # Stashline Core
//!
//! Core types, errors, and traits shared by every Stashline crate.
//!
//! Stashline is a thin orchestration layer over an external key-value store.
//! This crate defines the seams:
//!
//! - **Traits**: [`KeyValueStore`] (the primitive store interface) and
//!   [`PageFetcher`] (HTTP GET)
//! - **Types**: [`StoredValue`] and the key-naming helpers in [`keys`]
//! - **Errors**: [`StashError`] and the crate-wide [`Result`] alias
//! - **Constants**: TTLs, key prefixes and defaults
//!
//! ## Example
//!
//! ```rust
//! use stashline_core::{keys, StoredValue};
//!
//! assert_eq!(keys::cache_key("http://example.com"), "cache:http://example.com");
//! assert_eq!(StoredValue::from(42).to_bytes(), b"42".to_vec());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{Result, StashError};
pub use traits::*;
pub use types::*;
