//! Key naming for the shared keyspace.
//!
//! The keyspace is flat; these helpers are the only place key layouts are
//! spelled out.

use crate::constants::{CACHE_KEY_PREFIX, COUNT_KEY_PREFIX, INPUTS_KEY_SUFFIX, OUTPUTS_KEY_SUFFIX};

/// Key of the cached page for `url`.
pub fn cache_key(url: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, url)
}

/// Key of the fetch counter for `url`.
pub fn count_key(url: &str) -> String {
    format!("{}{}", COUNT_KEY_PREFIX, url)
}

/// Key of the call counter for a qualified operation name.
pub fn calls_key(operation: &str) -> String {
    operation.to_string()
}

/// Key of the input history list for `operation`.
pub fn inputs_key(operation: &str) -> String {
    format!("{}{}", operation, INPUTS_KEY_SUFFIX)
}

/// Key of the output history list for `operation`.
pub fn outputs_key(operation: &str) -> String {
    format!("{}{}", operation, OUTPUTS_KEY_SUFFIX)
}
