//! Per-source interval gate for outbound requests.
//!
//! Each registered source owns one [`RateLimiter`] enforcing a minimum
//! interval between consecutive grants. This is an interval gate, not a
//! sliding-window counter: a collector serialises its own calls, so the
//! time since the previous grant is all that needs tracking.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum-interval gate. `acquire` suspends the caller for whatever is
/// left of the interval since the previous grant.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_grant: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a gate with the given minimum interval between grants.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_grant: Mutex::new(None),
        }
    }

    /// Create a gate allowing at most `rate` grants per second.
    ///
    /// Non-positive or non-finite rates fall back to one per second.
    pub fn per_second(rate: f64) -> Self {
        if rate > 0.0 && rate.is_finite() {
            Self::new(Duration::from_secs_f64(1.0 / rate))
        } else {
            Self::new(Duration::from_secs(1))
        }
    }

    /// The configured minimum interval.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a request may be sent, then record the grant.
    ///
    /// Concurrent callers queue on the internal lock and are granted one
    /// interval apart.
    pub async fn acquire(&self) {
        let mut last = self.last_grant.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::trace!(wait_ms = wait.as_millis() as u64, "rate limiter waiting");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Counterpart to [`acquire`](Self::acquire). Grants are time based,
    /// so there is nothing to give back.
    pub fn release(&self) {}
}
