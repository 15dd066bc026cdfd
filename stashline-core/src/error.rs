//! Error types for Stashline.
//!
//! Stashline surfaces the failures of its collaborators unchanged in
//! meaning. A missing key is not an error: lookups return `Ok(None)`.

use thiserror::Error;

/// Result type alias using `StashError`.
pub type Result<T> = std::result::Result<T, StashError>;

/// Main error type for all Stashline operations.
#[derive(Debug, Error)]
pub enum StashError {
    // ═══════════════════════════════════════════════════════════════════════════
    // STORE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The key-value store could not be reached.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store was reached but rejected the command (e.g. wrong value type).
    #[error("Store command failed: {0}")]
    StoreCommand(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONVERSION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A converter could not turn stored bytes into the requested type.
    #[error("Conversion failed: {0}")]
    Conversion(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // NETWORK ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Fetching a page failed (transport error or non-success status).
    #[error("Fetch failed for '{url}': {reason}")]
    FetchFailed {
        /// URL that was requested
        url: String,
        /// Transport error or status line
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StashError {
    /// Creates a fetch failure for `url`.
    pub fn fetch_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        StashError::FetchFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if retrying the same call could succeed.
    ///
    /// Nothing in Stashline retries on its own.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StashError::StoreUnavailable(_) | StashError::FetchFailed { .. }
        )
    }
}

impl From<std::string::FromUtf8Error> for StashError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        StashError::Conversion(format!("invalid UTF-8: {}", err))
    }
}

impl From<std::num::ParseIntError> for StashError {
    fn from(err: std::num::ParseIntError) -> Self {
        StashError::Conversion(format!("invalid integer: {}", err))
    }
}

impl From<std::num::ParseFloatError> for StashError {
    fn from(err: std::num::ParseFloatError) -> Self {
        StashError::Conversion(format!("invalid float: {}", err))
    }
}
