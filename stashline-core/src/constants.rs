//! Constants for Stashline.
//!
//! Key-naming conventions are part of the external contract: other tools
//! reading the same store rely on them, so they must not change.

// ═══════════════════════════════════════════════════════════════════════════════
// WEB CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Lifetime of a cached page in seconds.
/// Anchored to the most recent cache write.
pub const PAGE_CACHE_TTL_SECONDS: u64 = 10;

/// Prefix of the key holding a cached page (`cache:<url>`).
pub const CACHE_KEY_PREFIX: &str = "cache:";

/// Prefix of the key holding a per-URL fetch counter (`count:<url>`).
pub const COUNT_KEY_PREFIX: &str = "count:";

// ═══════════════════════════════════════════════════════════════════════════════
// CALL HISTORY
// ═══════════════════════════════════════════════════════════════════════════════

/// Suffix of the list holding input representations (`<op>:inputs`).
pub const INPUTS_KEY_SUFFIX: &str = ":inputs";

/// Suffix of the list holding output representations (`<op>:outputs`).
pub const OUTPUTS_KEY_SUFFIX: &str = ":outputs";

/// Qualified name of the instrumented store operation.
pub const STORE_OPERATION: &str = "Cache.store";

// ═══════════════════════════════════════════════════════════════════════════════
// DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default Redis connection URL.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1/";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// URL fetched by the demonstration binary.
/// The delay service makes cache hits easy to notice.
pub const DEMO_URL: &str =
    "http://slowwly.robertomurray.co.uk/delay/3000/url/https://www.example.com/";

/// Number of characters of page content shown by the demonstration binary.
pub const DEMO_PREVIEW_CHARS: usize = 200;
