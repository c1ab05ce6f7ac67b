//! Engine configuration with sensible defaults.
//!
//! [`EngineConfig`] is handed to the registry at construction time as a
//! plain value. This crate never reads files or the environment; the host
//! application deserialises it from wherever it keeps its settings.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::error::SearchError;

/// Per-source settings supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Whether the source takes part in searches.
    pub enabled: bool,
    /// Maximum outbound requests per second. Falls back to
    /// [`EngineConfig::default_rate_limit_per_sec`].
    pub rate_limit_per_sec: Option<f64>,
    /// Maximum number of records kept from one fetch.
    pub max_results: Option<usize>,
    /// Per-fetch timeout override in seconds.
    pub timeout_secs: Option<u64>,
    /// API key or token, for sources that need one.
    pub api_key: Option<String>,
    /// Endpoint override (used for self-hosted mirrors and tests).
    pub base_url: Option<String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            rate_limit_per_sec: None,
            max_results: None,
            timeout_secs: None,
            api_key: None,
            base_url: None,
        }
    }
}

/// Result cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether ranked results are cached at all.
    pub enabled: bool,
    /// Capacity of the in-process store.
    pub max_entries: u64,
    /// Fixed TTL in seconds; when unset the TTL follows source volatility.
    pub ttl_override_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 256,
            ttl_override_secs: None,
        }
    }
}

/// Top-level configuration for the aggregation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Settings keyed by source name. Sources without an entry use defaults.
    pub sources: BTreeMap<String, SourceSettings>,
    /// Rate limit applied to sources that do not configure their own.
    pub default_rate_limit_per_sec: f64,
    /// Budget for each collector's start-up `validate()` call.
    pub validate_timeout_secs: u64,
    /// Upper bound on the whole fan-out, however many sources hang.
    pub overall_timeout_secs: u64,
    /// Default number of ranked items returned by a search.
    pub max_results: usize,
    /// Result cache settings.
    pub cache: CacheConfig,
    /// Per-source failure tracking.
    pub circuit_breaker: CircuitBreakerConfig,
    /// Title-token Jaccard similarity at or above which two records cluster.
    pub cluster_title_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sources: BTreeMap::new(),
            default_rate_limit_per_sec: 1.0,
            validate_timeout_secs: 5,
            overall_timeout_secs: 45,
            max_results: 25,
            cache: CacheConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            cluster_title_threshold: 0.8,
        }
    }
}

impl EngineConfig {
    /// Settings for `name`, or defaults when the source is not configured.
    pub fn source(&self, name: &str) -> SourceSettings {
        self.sources.get(name).cloned().unwrap_or_default()
    }

    /// Minimum interval between two requests to `name`.
    pub fn min_interval(&self, name: &str) -> Duration {
        let rate = self
            .sources
            .get(name)
            .and_then(|s| s.rate_limit_per_sec)
            .unwrap_or(self.default_rate_limit_per_sec);
        if rate <= 0.0 || !rate.is_finite() {
            return Duration::from_secs(1);
        }
        Duration::from_secs_f64(1.0 / rate)
    }

    /// Timeout for start-up validation of a single collector.
    pub fn validate_timeout(&self) -> Duration {
        Duration::from_secs(self.validate_timeout_secs)
    }

    /// Timeout for the whole concurrent fan-out.
    pub fn overall_timeout(&self) -> Duration {
        Duration::from_secs(self.overall_timeout_secs)
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_results` must be greater than 0
    /// - both timeouts must be greater than 0
    /// - every rate limit must be a positive, finite number
    /// - `cluster_title_threshold` must lie in `(0, 1]`
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.validate_timeout_secs == 0 || self.overall_timeout_secs == 0 {
            return Err(SearchError::Config(
                "timeouts must be greater than 0".into(),
            ));
        }
        if !(self.default_rate_limit_per_sec > 0.0 && self.default_rate_limit_per_sec.is_finite()) {
            return Err(SearchError::Config(
                "default_rate_limit_per_sec must be positive".into(),
            ));
        }
        for (name, source) in &self.sources {
            if let Some(rate) = source.rate_limit_per_sec {
                if !(rate > 0.0 && rate.is_finite()) {
                    return Err(SearchError::Config(format!(
                        "rate_limit_per_sec for {name} must be positive"
                    )));
                }
            }
            if source.timeout_secs == Some(0) {
                return Err(SearchError::Config(format!(
                    "timeout_secs for {name} must be greater than 0"
                )));
            }
        }
        if !(self.cluster_title_threshold > 0.0 && self.cluster_title_threshold <= 1.0) {
            return Err(SearchError::Config(
                "cluster_title_threshold must be in (0, 1]".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = EngineConfig::default();
        assert_eq!(config.max_results, 25);
        assert_eq!(config.validate_timeout_secs, 5);
        assert_eq!(config.overall_timeout_secs, 45);
        assert!(config.cache.enabled);
        assert!((config.default_rate_limit_per_sec - 1.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_interval_is_one_second() {
        let config = EngineConfig::default();
        assert_eq!(config.min_interval("anything"), Duration::from_secs(1));
    }

    #[test]
    fn per_source_rate_limit_overrides_default() {
        let mut config = EngineConfig::default();
        config.sources.insert(
            "wikipedia".into(),
            SourceSettings {
                rate_limit_per_sec: Some(4.0),
                ..Default::default()
            },
        );
        assert_eq!(config.min_interval("wikipedia"), Duration::from_millis(250));
        assert_eq!(config.min_interval("bing"), Duration::from_secs(1));
    }

    #[test]
    fn zero_max_results_rejected() {
        let config = EngineConfig {
            max_results: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_results"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = EngineConfig {
            overall_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("timeouts"));
    }

    #[test]
    fn negative_source_rate_rejected() {
        let mut config = EngineConfig::default();
        config.sources.insert(
            "bing".into(),
            SourceSettings {
                rate_limit_per_sec: Some(-1.0),
                ..Default::default()
            },
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("bing"));
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        let config = EngineConfig {
            cluster_title_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_source_gets_enabled_defaults() {
        let config = EngineConfig::default();
        let s = config.source("missing");
        assert!(s.enabled);
        assert!(s.api_key.is_none());
    }

    #[test]
    fn deserialises_partial_json() {
        let json = r#"{ "max_results": 5, "sources": { "bing": { "enabled": false } } }"#;
        let config: EngineConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(config.max_results, 5);
        assert!(!config.source("bing").enabled);
        assert_eq!(config.overall_timeout_secs, 45);
    }
}
