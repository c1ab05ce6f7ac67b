//! The public search facade.
//!
//! [`Engine`] owns the validated registry, the result cache and the
//! circuit breaker, and runs the full pipeline for each query:
//!
//! 1. Resolve the requested sources against the registry
//! 2. Serve from the cache when a fresh entry exists
//! 3. Fan out with [`gather`](super::gather::gather)
//! 4. Score every record concurrently
//! 5. Cluster near-duplicates and rank the representatives
//! 6. Cache the full ranked list, then truncate to `max_results`

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::aggregate::aggregate;
use crate::analysis::analyze_all;
use crate::cache::{CacheStore, ResultCache};
use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::registry::{Registration, Registry};
use crate::types::{Record, SearchResponse, SearchStats, SourceClass, SourceProfile};

use super::gather::gather;

/// TTL used when no contributing source reports a class.
const FALLBACK_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Multi-source search engine.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    registry: Registry,
    cache: ResultCache,
    breaker: Mutex<CircuitBreaker>,
}

impl Engine {
    /// Validate `config`, then construct and validate every registration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`](crate::SearchError::Config) when the
    /// configuration is invalid. Individual sources that fail to construct
    /// or validate are excluded with a warning and never cause an error.
    pub async fn new(config: EngineConfig, registrations: Vec<Registration>) -> Result<Self> {
        config.validate()?;
        let registry = Registry::discover(&config, registrations).await;
        let cache = ResultCache::from_config(&config.cache);
        let breaker = Mutex::new(CircuitBreaker::new(config.circuit_breaker.clone()));
        Ok(Self {
            config,
            registry,
            cache,
            breaker,
        })
    }

    /// Use `store` as the cache backend instead of the in-process store.
    pub fn with_cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache = self.cache.with_store(store);
        self
    }

    /// Run `query` against the configured number of results and every source.
    pub async fn search_default(&self, query: &str) -> SearchResponse {
        self.search(query, self.config.max_results, None).await
    }

    /// Search `sources` (every registered source when `None`) for `query`
    /// and return at most `max_results` ranked records.
    ///
    /// Never fails: source errors, timeouts and cache failures only reduce
    /// what is returned. An empty query or an empty source selection yields
    /// an empty response.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        sources: Option<&[String]>,
    ) -> SearchResponse {
        let started = Instant::now();
        let query = query.trim();
        if query.is_empty() {
            tracing::debug!("empty query, nothing to search");
            return empty_response(query, started);
        }

        let selected = self.resolve_sources(sources);
        if selected.is_empty() {
            tracing::warn!("no registered sources selected for search");
            return empty_response(query, started);
        }
        tracing::trace!(query, sources = ?selected, "search started");

        if let Some(mut items) = self.cache.get(query, &selected).await {
            items.truncate(max_results);
            let contributing = count_sources(&items);
            let stats = SearchStats {
                total_found: items.len(),
                unique_items: items.len(),
                duplicates_removed: 0,
                final_items: items.len(),
                sources_searched: selected.len(),
                successful_sources: contributing.len(),
                mean_credibility: self.mean_credibility(&items),
                source_counts: contributing,
                processing_time_ms: elapsed_ms(started),
                cached: true,
            };
            return SearchResponse {
                query: query.to_owned(),
                items,
                stats,
            };
        }

        let outcome = gather(
            &self.registry,
            &self.breaker,
            query,
            &selected,
            self.config.overall_timeout(),
        )
        .await;

        let analysed = analyze_all(outcome.records, query).await;
        let aggregated = aggregate(analysed, self.config.cluster_title_threshold, |name| {
            self.registry.source_credibility(name).score
        });
        let total_found = aggregated.total;
        let duplicates_removed = aggregated.duplicates_removed();
        let mut items = aggregated.items;
        let unique_items = items.len();

        if !outcome.successful.is_empty() {
            let ttl = cache_ttl(outcome.successful.iter().map(|(_, class)| *class));
            self.cache.put(query, &selected, &items, ttl).await;
        }

        items.truncate(max_results);
        let source_counts = count_sources(&items);
        let stats = SearchStats {
            total_found,
            unique_items,
            duplicates_removed,
            final_items: items.len(),
            sources_searched: outcome.searched.len(),
            successful_sources: outcome.successful.len(),
            mean_credibility: self.mean_credibility(&items),
            source_counts,
            processing_time_ms: elapsed_ms(started),
            cached: false,
        };
        tracing::info!(
            total = stats.total_found,
            unique = stats.unique_items,
            returned = stats.final_items,
            failed = outcome.failed.len(),
            elapsed_ms = stats.processing_time_ms,
            "search complete"
        );

        SearchResponse {
            query: query.to_owned(),
            items,
            stats,
        }
    }

    /// Sorted names of every validated source.
    pub fn list_sources(&self) -> Vec<String> {
        self.registry.list_sources()
    }

    /// Baseline profile of `name`, or the unknown profile.
    pub fn source_credibility(&self, name: &str) -> SourceProfile {
        self.registry.source_credibility(name)
    }

    /// Circuit state and consecutive failures per source seen so far.
    pub fn health_report(&self) -> Vec<(String, CircuitState, u32)> {
        self.breaker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .health_report()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Close every collector. The engine should not be used afterwards.
    pub async fn shutdown(&self) {
        self.registry.close_all().await;
    }

    fn resolve_sources(&self, requested: Option<&[String]>) -> Vec<String> {
        let Some(requested) = requested else {
            return self.registry.list_sources();
        };
        requested
            .iter()
            .filter(|name| {
                let known = self.registry.contains(name);
                if !known {
                    tracing::debug!(source = %name, "ignoring unknown source");
                }
                known
            })
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn mean_credibility(&self, items: &[Record]) -> f64 {
        if items.is_empty() {
            return 0.0;
        }
        let sum: f64 = items
            .iter()
            .map(|r| {
                r.credibility()
                    .unwrap_or_else(|| self.registry.source_credibility(&r.source).score)
            })
            .sum();
        sum / items.len() as f64
    }
}

/// Shortest cache TTL among `classes`.
fn cache_ttl(classes: impl Iterator<Item = SourceClass>) -> Duration {
    classes
        .map(|c| c.cache_ttl())
        .min()
        .unwrap_or(FALLBACK_CACHE_TTL)
}

fn count_sources(items: &[Record]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for source in items.iter().flat_map(Record::contributing_sources) {
        *counts.entry(source).or_insert(0) += 1;
    }
    counts
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn empty_response(query: &str, started: Instant) -> SearchResponse {
    SearchResponse {
        query: query.to_owned(),
        items: Vec::new(),
        stats: SearchStats {
            processing_time_ms: elapsed_ms(started),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SOURCES_KEY;
    use serde_json::json;

    fn record(sources: &[&str]) -> Record {
        let mut r = Record::new("t", "c", "", sources[0]);
        r.metadata.insert(SOURCES_KEY.into(), json!(sources));
        r
    }

    #[test]
    fn cache_ttl_uses_most_volatile_class() {
        let ttl = cache_ttl([SourceClass::Reference, SourceClass::News].into_iter());
        assert_eq!(ttl, SourceClass::News.cache_ttl());
        assert!(ttl <= SourceClass::Reference.cache_ttl());
    }

    #[test]
    fn cache_ttl_falls_back_when_empty() {
        assert_eq!(cache_ttl(std::iter::empty()), FALLBACK_CACHE_TTL);
    }

    #[test]
    fn source_counts_follow_merged_sources() {
        let items = vec![record(&["bing", "wikipedia"]), record(&["bing"])];
        let counts = count_sources(&items);
        assert_eq!(counts.get("bing"), Some(&2));
        assert_eq!(counts.get("wikipedia"), Some(&1));
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let config = EngineConfig {
            max_results: 0,
            ..Default::default()
        };
        let err = Engine::new(config, Vec::new()).await.unwrap_err();
        assert!(err.to_string().contains("max_results"));
    }

    #[tokio::test]
    async fn no_sources_gives_empty_response() {
        let engine = Engine::new(EngineConfig::default(), Vec::new())
            .await
            .expect("engine");
        let response = engine.search_default("rust").await;
        assert!(response.items.is_empty());
        assert_eq!(response.stats.sources_searched, 0);
        assert!(!response.stats.cached);
    }
}
