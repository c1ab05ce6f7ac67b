//! Wikipedia collector backed by the MediaWiki search API.

use async_trait::async_trait;
use factryl_search::{Collector, RawRecord, Result, SearchError, SourceClass, SourceSettings};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::http::HttpSession;
use super::{endpoint, http_timeout, raw_record, strip_html, DEFAULT_MAX_RESULTS};

const DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    query: Option<QueryBlock>,
}

#[derive(Debug, Deserialize)]
struct QueryBlock {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    pageid: Option<u64>,
    #[serde(default)]
    wordcount: Option<u64>,
}

/// MediaWiki full-text search.
#[derive(Debug)]
pub struct Wikipedia {
    base: String,
    max_results: usize,
    session: HttpSession,
}

impl Wikipedia {
    pub const NAME: &'static str = "wikipedia";

    pub fn new(settings: &SourceSettings) -> Self {
        Self {
            base: endpoint(settings, DEFAULT_ENDPOINT),
            max_results: settings.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            session: HttpSession::new(Self::NAME, http_timeout(settings, SourceClass::Reference))
                .with_user_agent(concat!("factryl/", env!("CARGO_PKG_VERSION"))),
        }
    }

    fn article_url(&self, title: &str) -> String {
        let raw = format!("{}/wiki/{}", self.base, title.replace(' ', "_"));
        Url::parse(&raw).map_or(raw, |u| u.to_string())
    }
}

#[async_trait]
impl Collector for Wikipedia {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn class(&self) -> SourceClass {
        SourceClass::Reference
    }

    async fn validate(&self) -> bool {
        match self.session.open() {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(source = Self::NAME, error = %err, "session could not be opened");
                false
            }
        }
    }

    async fn fetch(&self, query: &str) -> Result<Vec<RawRecord>> {
        let client = self.session.client()?;
        tracing::trace!(query, "Wikipedia search");

        let limit = self.max_results.to_string();
        let body: ApiResponse = client
            .get(format!("{}/w/api.php", self.base))
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("format", "json"),
                ("utf8", "1"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("Wikipedia request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("Wikipedia HTTP error: {e}")))?
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("Wikipedia response not understood: {e}")))?;

        let hits = body.query.map(|q| q.search).unwrap_or_default();
        let records: Vec<RawRecord> = hits
            .into_iter()
            .take(self.max_results)
            .map(|hit| self.to_record(hit))
            .collect();

        tracing::debug!(count = records.len(), "Wikipedia results parsed");
        Ok(records)
    }

    async fn close(&self) {
        self.session.close();
    }
}

impl Wikipedia {
    fn to_record(&self, hit: SearchHit) -> RawRecord {
        let snippet = strip_html(&hit.snippet);
        let content = if snippet.is_empty() {
            hit.title.clone()
        } else {
            snippet
        };
        let mut raw = raw_record(&hit.title, &content, &self.article_url(&hit.title));
        raw.insert("source_detail".into(), Value::from("Wikipedia encyclopedia"));
        if let Some(ts) = hit.timestamp {
            raw.insert("published".into(), Value::from(ts));
        }
        if let Some(id) = hit.pageid {
            raw.insert("page_id".into(), Value::from(id));
        }
        if let Some(words) = hit.wordcount {
            raw.insert("word_count".into(), Value::from(words));
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collector() -> Wikipedia {
        Wikipedia::new(&SourceSettings::default())
    }

    #[test]
    fn article_url_replaces_spaces() {
        assert_eq!(
            collector().article_url("Python (programming language)"),
            "https://en.wikipedia.org/wiki/Python_(programming_language)"
        );
    }

    #[test]
    fn hit_becomes_record() {
        let hit: SearchHit = serde_json::from_value(json!({
            "title": "Rust (programming language)",
            "snippet": "<span class=\"searchmatch\">Rust</span> is a general-purpose language",
            "timestamp": "2024-05-01T12:00:00Z",
            "pageid": 29414838,
            "wordcount": 9000
        }))
        .expect("hit");
        let raw = collector().to_record(hit);
        assert_eq!(raw["content"], "Rust is a general-purpose language");
        assert_eq!(raw["published"], "2024-05-01T12:00:00Z");
        assert_eq!(raw["page_id"], 29414838);
    }

    #[test]
    fn empty_snippet_falls_back_to_title() {
        let hit: SearchHit = serde_json::from_value(json!({ "title": "Stub" })).expect("hit");
        let raw = collector().to_record(hit);
        assert_eq!(raw["content"], "Stub");
    }
}
