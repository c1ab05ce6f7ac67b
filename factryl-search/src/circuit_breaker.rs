//! Per-source circuit breaker.
//!
//! Tracks consecutive failures per source and temporarily skips sources
//! that keep failing. After a cooldown a tripped source enters a
//! half-open state where a single probe decides whether to restore it;
//! other callers are refused until that probe reports back.
//!
//! ```text
//! ┌────────┐  N failures   ┌────────┐  cooldown   ┌──────────┐
//! │ Closed ├──────────────►│  Open  ├────────────►│ HalfOpen │
//! └───▲────┘               └────────┘             └────┬─────┘
//!     │                         ▲                      │
//!     │  success                │  failure             │
//!     └─────────────────────────┴──────────────────────┘
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Circuit state for a single source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Source is healthy; fetches go through.
    Closed,
    /// Source failed too often; fetches are skipped until cooldown expires.
    Open,
    /// Cooldown elapsed; exactly one probe fetch is allowed.
    HalfOpen,
}

#[derive(Debug, Clone)]
struct SourceHealth {
    state: CircuitState,
    consecutive_failures: u32,
    last_failure_at: Option<Instant>,
    probe_in_flight: bool,
}

impl Default for SourceHealth {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            last_failure_at: None,
            probe_in_flight: false,
        }
    }
}

/// Circuit breaker tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before a source is tripped to Open.
    pub failure_threshold: u32,
    /// Seconds a tripped source stays Open before a probe is allowed.
    pub cooldown_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown_secs: 60,
        }
    }
}

/// Failure tracking keyed by source name.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    sources: HashMap<String, SourceHealth>,
}

impl CircuitBreaker {
    /// Create a breaker with the given configuration.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            sources: HashMap::new(),
        }
    }

    /// Record a successful fetch; the source returns to Closed.
    pub fn record_success(&mut self, source: &str) {
        let health = self.sources.entry(source.to_owned()).or_default();
        health.state = CircuitState::Closed;
        health.consecutive_failures = 0;
        health.probe_in_flight = false;
    }

    /// Record a failed fetch, tripping the circuit at the threshold.
    pub fn record_failure(&mut self, source: &str) {
        let health = self.sources.entry(source.to_owned()).or_default();
        health.consecutive_failures += 1;
        health.last_failure_at = Some(Instant::now());
        health.probe_in_flight = false;

        if health.consecutive_failures >= self.config.failure_threshold
            || health.state == CircuitState::HalfOpen
        {
            health.state = CircuitState::Open;
        }
    }

    /// Whether a fetch to `source` should be attempted now.
    ///
    /// An Open source whose cooldown has elapsed moves to HalfOpen and is
    /// allowed one attempt. Further calls are refused until that attempt is
    /// recorded with [`record_success`](Self::record_success) or
    /// [`record_failure`](Self::record_failure).
    pub fn should_attempt(&mut self, source: &str) -> bool {
        let cooldown = Duration::from_secs(self.config.cooldown_secs);
        let health = self.sources.entry(source.to_owned()).or_default();

        match health.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => {
                if health.probe_in_flight {
                    false
                } else {
                    health.probe_in_flight = true;
                    true
                }
            }
            CircuitState::Open => {
                let elapsed = health
                    .last_failure_at
                    .is_none_or(|t| t.elapsed() >= cooldown);
                if elapsed {
                    health.state = CircuitState::HalfOpen;
                    health.probe_in_flight = true;
                }
                elapsed
            }
        }
    }

    /// Current state for `source` (Closed when never seen).
    pub fn state(&self, source: &str) -> CircuitState {
        self.sources
            .get(source)
            .map_or(CircuitState::Closed, |h| h.state)
    }

    /// `(source, state, consecutive_failures)` for every tracked source,
    /// sorted by name.
    pub fn health_report(&self) -> Vec<(String, CircuitState, u32)> {
        let mut report: Vec<_> = self
            .sources
            .iter()
            .map(|(name, h)| (name.clone(), h.state, h.consecutive_failures))
            .collect();
        report.sort_by(|a, b| a.0.cmp(&b.0));
        report
    }
}
