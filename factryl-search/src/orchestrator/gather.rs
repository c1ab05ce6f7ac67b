//! Concurrent fan-out of one query to many sources.
//!
//! Each requested source runs as an independent future: rate-limit
//! acquire, collector fetch, release, all inside the source's fetch
//! timeout and a panic boundary. Futures are polled together on a
//! [`FuturesUnordered`] under an overall deadline. Failures are logged and
//! counted, never propagated.

use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use serde_json::Value;

use crate::circuit_breaker::CircuitBreaker;
use crate::error::{Result, SearchError};
use crate::registry::{RegisteredSource, Registry};
use crate::types::{RawRecord, Record, SourceClass};

/// Metadata keys written by source enrichment.
pub const SOURCE_TYPE_KEY: &str = "source_type";
pub const SOURCE_CATEGORY_KEY: &str = "source_category";
pub const BIAS_RATING_KEY: &str = "bias_rating";
pub const SOURCE_CREDIBILITY_KEY: &str = "source_credibility";

/// What came back from a fan-out.
#[derive(Debug, Default)]
pub struct GatherOutcome {
    /// Normalised records from every successful source.
    pub records: Vec<Record>,
    /// Sources the query was dispatched to.
    pub searched: Vec<String>,
    /// Sources that answered without error, with their classes.
    pub successful: Vec<(String, SourceClass)>,
    /// Sources that failed, timed out or were skipped by the breaker.
    pub failed: Vec<String>,
}

/// Fetch `query` from every source in `names` that is registered.
///
/// Unknown names are ignored. Sources whose circuit is open are skipped
/// and reported as failed. The whole call returns within
/// `overall_timeout`; sources still running then are abandoned.
pub async fn gather(
    registry: &Registry,
    breaker: &Mutex<CircuitBreaker>,
    query: &str,
    names: &[String],
    overall_timeout: Duration,
) -> GatherOutcome {
    let mut outcome = GatherOutcome::default();
    let requested: BTreeSet<&str> = names.iter().map(String::as_str).collect();

    let mut dispatched = Vec::new();
    for name in requested {
        let Some(source) = registry.get(name) else {
            tracing::debug!(source = %name, "requested source is not registered");
            continue;
        };
        let allowed = breaker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .should_attempt(name);
        if !allowed {
            tracing::info!(source = %name, "circuit open, skipping source");
            outcome.failed.push(name.to_owned());
            continue;
        }
        dispatched.push(source);
    }
    outcome.searched = dispatched.iter().map(|s| s.name().to_owned()).collect();

    let mut pending: BTreeSet<String> = outcome.searched.iter().cloned().collect();
    let mut tasks: FuturesUnordered<_> = dispatched
        .into_iter()
        .map(|source| fetch_one(source, query))
        .collect();

    let deadline = tokio::time::Instant::now() + overall_timeout;
    loop {
        let next = match tokio::time::timeout_at(deadline, tasks.next()).await {
            Ok(Some(done)) => done,
            Ok(None) => break,
            Err(_) => {
                tracing::warn!(
                    pending = pending.len(),
                    timeout_secs = overall_timeout.as_secs(),
                    "overall fetch deadline reached, abandoning remaining sources"
                );
                let mut guard = breaker.lock().unwrap_or_else(PoisonError::into_inner);
                for name in &pending {
                    guard.record_failure(name);
                    outcome.failed.push(name.clone());
                }
                break;
            }
        };

        let (source, result) = next;
        pending.remove(source.name());
        match result {
            Ok(raw) => {
                breaker
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .record_success(source.name());
                let records = normalise(registry, source, &raw);
                tracing::debug!(
                    source = %source.name(),
                    raw = raw.len(),
                    kept = records.len(),
                    "source returned records"
                );
                outcome.records.extend(records);
                outcome
                    .successful
                    .push((source.name().to_owned(), source.class()));
            }
            Err(err) => {
                breaker
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .record_failure(source.name());
                tracing::warn!(source = %source.name(), error = %err, "source fetch failed");
                outcome.failed.push(source.name().to_owned());
            }
        }
    }

    outcome.successful.sort();
    outcome.failed.sort();
    outcome
}

/// One source's task: limiter, fetch, release, bounded by the source's
/// timeout. Panics inside the collector become errors.
async fn fetch_one<'a>(
    source: &'a RegisteredSource,
    query: &str,
) -> (&'a RegisteredSource, Result<Vec<RawRecord>>) {
    let timeout = source.fetch_timeout();
    let work = async {
        source.limiter().acquire().await;
        let result = source.collector().fetch(query).await;
        source.limiter().release();
        result
    };

    let result = match tokio::time::timeout(timeout, AssertUnwindSafe(work).catch_unwind()).await {
        Ok(Ok(result)) => result,
        Ok(Err(_panic)) => Err(SearchError::Collector(format!(
            "{} panicked during fetch",
            source.name()
        ))),
        Err(_) => Err(SearchError::Timeout(format!(
            "{} after {}s",
            source.name(),
            timeout.as_secs()
        ))),
    };
    (source, result)
}

/// Convert raw records, apply the per-source cap and attach the source's
/// baseline profile.
fn normalise(registry: &Registry, source: &RegisteredSource, raw: &[RawRecord]) -> Vec<Record> {
    let profile = registry.source_credibility(source.name());
    let cap = source.settings().max_results.unwrap_or(usize::MAX);

    let mut dropped = 0usize;
    let records: Vec<Record> = raw
        .iter()
        .filter_map(|r| {
            let record = Record::from_raw(source.name(), r);
            if record.is_none() {
                dropped += 1;
            }
            record
        })
        .take(cap)
        .map(|mut record| {
            let meta = &mut record.metadata;
            meta.insert(SOURCE_TYPE_KEY.into(), Value::from(source.class().name()));
            meta.insert(SOURCE_CATEGORY_KEY.into(), Value::from(profile.category.clone()));
            meta.insert(BIAS_RATING_KEY.into(), Value::from(profile.bias.clone()));
            meta.insert(SOURCE_CREDIBILITY_KEY.into(), Value::from(profile.score));
            record
        })
        .collect();

    if dropped > 0 {
        tracing::debug!(source = %source.name(), dropped, "raw records without title or body dropped");
    }
    records
}
