//! Collector registry: instantiation, validation and lookup of sources.
//!
//! Sources are added through an explicit list of [`Registration`]s, each
//! mapping a source name to a constructor. At start-up every enabled
//! registration is constructed and validated under a timeout; sources that
//! fail either step are logged and left out. The resulting map is read-only
//! for the rest of the process lifetime.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use futures::future::join_all;
use futures::FutureExt;

use crate::collector::Collector;
use crate::config::{EngineConfig, SourceSettings};
use crate::error::Result;
use crate::rate_limit::RateLimiter;
use crate::types::{SourceClass, SourceProfile};

/// Constructor for one source, given its settings.
pub type CollectorFactory =
    Box<dyn Fn(&SourceSettings) -> Result<Box<dyn Collector>> + Send + Sync>;

/// One entry of the registration list: a source name and how to build it.
pub struct Registration {
    name: String,
    factory: CollectorFactory,
}

impl Registration {
    /// Register `factory` under `name`.
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&SourceSettings) -> Result<Box<dyn Collector>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Box::new(factory),
        }
    }

    /// The source name this registration provides.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// `(name, score, bias, category, class)` for sources with a declared baseline.
const BASELINE_PROFILES: &[(&str, f64, &str, &str, SourceClass)] = &[
    ("bbc", 0.90, "Center", "News", SourceClass::News),
    ("techcrunch", 0.85, "Center-Left", "Technology News", SourceClass::News),
    ("google_news", 0.80, "Varies", "News Aggregator", SourceClass::News),
    ("duckduckgo", 0.75, "Neutral", "Search Engine", SourceClass::Search),
    ("bing", 0.75, "Neutral", "Search Engine", SourceClass::Search),
    ("wikipedia", 0.85, "Neutral", "Knowledge Base", SourceClass::Reference),
    ("dictionary", 0.95, "Neutral", "Reference", SourceClass::Reference),
    ("hackernews", 0.80, "Center", "Technology Community", SourceClass::Forum),
    ("reddit", 0.50, "Varies", "Community Forum", SourceClass::Forum),
    ("stackoverflow", 0.75, "Neutral", "Q&A Community", SourceClass::Forum),
    ("youtube", 0.45, "Varies", "Video Platform", SourceClass::Video),
];

/// Declared baseline profile for `name`, or [`SourceProfile::unknown`].
pub fn baseline_profile(name: &str) -> SourceProfile {
    BASELINE_PROFILES
        .iter()
        .find(|(n, ..)| *n == name)
        .map_or_else(SourceProfile::unknown, |(_, score, bias, category, class)| {
            SourceProfile {
                score: *score,
                bias: (*bias).to_owned(),
                category: (*category).to_owned(),
                class: Some(*class),
            }
        })
}

/// A validated source ready for fetching.
pub struct RegisteredSource {
    name: String,
    collector: Box<dyn Collector>,
    limiter: RateLimiter,
    settings: SourceSettings,
}

impl RegisteredSource {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> SourceClass {
        self.collector.class()
    }

    pub fn collector(&self) -> &dyn Collector {
        self.collector.as_ref()
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn settings(&self) -> &SourceSettings {
        &self.settings
    }

    /// Per-fetch timeout: the configured override, else the class default.
    pub fn fetch_timeout(&self) -> Duration {
        self.settings
            .timeout_secs
            .map_or_else(|| self.class().fetch_timeout(), Duration::from_secs)
    }
}

impl fmt::Debug for RegisteredSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredSource")
            .field("name", &self.name)
            .field("class", &self.class())
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

/// Name → validated source map.
#[derive(Debug, Default)]
pub struct Registry {
    sources: BTreeMap<String, RegisteredSource>,
}

impl Registry {
    /// Construct and validate every enabled registration.
    ///
    /// A construction error or panic, a `false` or panic from `validate`,
    /// and validation that outlives [`EngineConfig::validate_timeout`] each
    /// exclude the source with a warning. Discovery itself never fails.
    pub async fn discover(config: &EngineConfig, registrations: Vec<Registration>) -> Self {
        let validate_timeout = config.validate_timeout();
        let mut seen = std::collections::HashSet::new();
        let mut candidates = Vec::new();

        for registration in registrations {
            let name = registration.name;
            if !seen.insert(name.clone()) {
                tracing::warn!(source = %name, "duplicate registration ignored");
                continue;
            }
            let settings = config.source(&name);
            if !settings.enabled {
                tracing::debug!(source = %name, "source disabled by configuration");
                continue;
            }
            let factory = &registration.factory;
            match panic::catch_unwind(AssertUnwindSafe(|| factory(&settings))) {
                Ok(Ok(collector)) => candidates.push((name, settings, collector)),
                Ok(Err(err)) => {
                    tracing::warn!(source = %name, error = %err, "collector construction failed, excluding");
                }
                Err(_panic) => {
                    tracing::warn!(source = %name, "collector constructor panicked, excluding");
                }
            }
        }

        let checks = candidates.into_iter().map(|(name, settings, collector)| async move {
            let check = AssertUnwindSafe(collector.validate()).catch_unwind();
            let valid = match tokio::time::timeout(validate_timeout, check).await {
                Ok(Ok(true)) => true,
                Ok(Ok(false)) => {
                    tracing::warn!(source = %name, "collector failed validation, excluding");
                    false
                }
                Ok(Err(_panic)) => {
                    tracing::warn!(source = %name, "collector panicked during validation, excluding");
                    false
                }
                Err(_) => {
                    tracing::warn!(
                        source = %name,
                        timeout_secs = validate_timeout.as_secs(),
                        "collector validation timed out, excluding"
                    );
                    false
                }
            };
            (name, settings, collector, valid)
        });

        let mut sources = BTreeMap::new();
        for (name, settings, collector, valid) in join_all(checks).await {
            if !valid {
                collector.close().await;
                continue;
            }
            let limiter = RateLimiter::new(config.min_interval(&name));
            tracing::debug!(source = %name, class = %collector.class(), "source registered");
            sources.insert(
                name.clone(),
                RegisteredSource {
                    name,
                    collector,
                    limiter,
                    settings,
                },
            );
        }

        tracing::info!(count = sources.len(), "collector registry ready");
        Self { sources }
    }

    /// Every validated source, ordered by name.
    pub fn sources(&self) -> impl Iterator<Item = &RegisteredSource> {
        self.sources.values()
    }

    /// Sorted names of every validated source.
    pub fn list_sources(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredSource> {
        self.sources.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Static baseline information for `name`.
    ///
    /// Works for any name; a registered source without a declared baseline
    /// still reports its class.
    pub fn source_credibility(&self, name: &str) -> SourceProfile {
        let mut profile = baseline_profile(name);
        if let Some(source) = self.sources.get(name) {
            profile.class = Some(source.class());
        }
        profile
    }

    /// Close every collector's connection.
    pub async fn close_all(&self) {
        join_all(self.sources.values().map(|s| s.collector.close())).await;
        tracing::debug!(count = self.sources.len(), "collectors closed");
    }
}
