//! Trait definition for pluggable content collectors.
//!
//! Each source family (news site, forum, video platform, encyclopedia,
//! search engine) implements [`Collector`] to turn a query into raw
//! records. Site-specific parsing lives entirely behind this trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{RawRecord, SourceClass};

/// A pluggable content source.
///
/// Lifecycle: constructed once at start-up, [`validate`](Collector::validate)d
/// by the registry, shared read-only for the process lifetime, and
/// [`close`](Collector::close)d on shutdown. Implementations own their
/// connection (typically a lazily created HTTP session).
///
/// All implementations must be `Send + Sync`; the orchestrator fetches
/// from many collectors concurrently.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Registered source name (e.g. `"wikipedia"`).
    fn name(&self) -> &str;

    /// Source family, which drives fetch timeout and cache TTL.
    fn class(&self) -> SourceClass;

    /// Check configuration and reachability.
    ///
    /// Returns `false` when the source cannot be used; the registry then
    /// excludes it. Must not panic.
    async fn validate(&self) -> bool;

    /// Fetch raw records for `query`.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the response cannot be
    /// parsed, and [`SearchError::Contract`](crate::SearchError::Contract)
    /// when called before a successful `validate`.
    async fn fetch(&self, query: &str) -> Result<Vec<RawRecord>>;

    /// Release the collector's connection. Idempotent.
    async fn close(&self);
}
