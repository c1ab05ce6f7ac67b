//! Error types for the factryl-search crate.
//!
//! Errors stay inside the crate for the most part: source, cache and
//! scoring failures are recovered locally and only logged. The variants
//! here describe what went wrong inside a single collector call, a cache
//! round trip, or a configuration check. No API keys appear in messages.

/// Errors that can occur while collecting or processing records.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A collector failed while validating or fetching.
    #[error("collector error: {0}")]
    Collector(String),

    /// A collector call exceeded its time budget.
    #[error("timed out: {0}")]
    Timeout(String),

    /// An HTTP request made by a collector failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A collector response could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid engine or source configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A caller broke the collector contract (e.g. fetch before validate).
    #[error("contract violation: {0}")]
    Contract(String),

    /// The cache backing store failed.
    #[error("cache error: {0}")]
    Cache(String),
}

/// Convenience type alias for factryl-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
