//! Domain types for Stashline.
//!
//! - [`StoredValue`]: text, bytes, integer or float accepted by the instrumented store
//! - [`keys`]: layout of the shared keyspace

pub mod keys;
mod value;

pub use value::*;
