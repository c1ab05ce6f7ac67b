//! Per-collector HTTP session with User-Agent rotation.
//!
//! Each collector owns one [`HttpSession`]. The underlying
//! [`reqwest::Client`] is created by [`HttpSession::open`] (called from the
//! collector's `validate`) and dropped by [`HttpSession::close`]. Asking
//! for the client before the session was opened is a contract violation.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use factryl_search::SearchError;
use rand::seq::SliceRandom;

/// Realistic browser User-Agent strings, rotated per session.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // USER_AGENTS is a non-empty const array; choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Lazily created HTTP client owned by one collector.
#[derive(Debug)]
pub struct HttpSession {
    source: &'static str,
    timeout: Duration,
    user_agent: Option<String>,
    client: Mutex<Option<reqwest::Client>>,
}

impl HttpSession {
    /// A closed session for `source`; requests time out after `timeout`.
    pub fn new(source: &'static str, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            user_agent: None,
            client: Mutex::new(None),
        }
    }

    /// Use a fixed User-Agent instead of the rotation list.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Create the client if needed and return a handle to it.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the client cannot be constructed.
    pub fn open(&self) -> Result<reqwest::Client, SearchError> {
        let mut slot = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = self.build()?;
        tracing::debug!(source = self.source, "HTTP session opened");
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Handle to the open client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Contract`] if [`HttpSession::open`] has not
    /// succeeded or the session was closed.
    pub fn client(&self) -> Result<reqwest::Client, SearchError> {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| {
                SearchError::Contract(format!("{} fetched before validate succeeded", self.source))
            })
    }

    /// Drop the client. Idempotent.
    pub fn close(&self) {
        let previous = self.client.lock().unwrap_or_else(PoisonError::into_inner).take();
        if previous.is_some() {
            tracing::debug!(source = self.source, "HTTP session closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.client.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    fn build(&self) -> Result<reqwest::Client, SearchError> {
        let ua = match self.user_agent {
            Some(ref custom) => custom.clone(),
            None => random_user_agent().to_owned(),
        };

        reqwest::Client::builder()
            .cookie_store(true)
            .timeout(self.timeout)
            .user_agent(ua)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_user_agent_returns_valid_ua() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        assert!(ua.contains("Mozilla/5.0"));
    }

    #[test]
    fn client_before_open_is_contract_error() {
        let session = HttpSession::new("test", Duration::from_secs(5));
        let err = session.client().unwrap_err();
        assert!(matches!(err, SearchError::Contract(_)));
        assert!(err.to_string().contains("before validate"));
    }

    #[test]
    fn open_close_lifecycle() {
        let session = HttpSession::new("test", Duration::from_secs(5)).with_user_agent("TestBot/1.0");
        assert!(!session.is_open());
        assert!(session.open().is_ok());
        assert!(session.is_open());
        assert!(session.client().is_ok());
        session.close();
        session.close();
        assert!(!session.is_open());
        assert!(session.client().is_err());
    }
}
