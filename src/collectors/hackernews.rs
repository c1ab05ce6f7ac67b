//! Hacker News collector backed by the Algolia search API.

use async_trait::async_trait;
use factryl_search::{Collector, RawRecord, Result, SearchError, SourceClass, SourceSettings};
use serde::Deserialize;
use serde_json::Value;

use super::http::HttpSession;
use super::{endpoint, http_timeout, raw_record, strip_html, DEFAULT_MAX_RESULTS};

const DEFAULT_ENDPOINT: &str = "https://hn.algolia.com";
const ITEM_URL: &str = "https://news.ycombinator.com/item?id=";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "objectID")]
    object_id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    story_text: Option<String>,
    #[serde(default)]
    points: Option<i64>,
    #[serde(default)]
    num_comments: Option<i64>,
}

/// Story search over Hacker News.
#[derive(Debug)]
pub struct HackerNews {
    base: String,
    max_results: usize,
    session: HttpSession,
}

impl HackerNews {
    pub const NAME: &'static str = "hackernews";

    pub fn new(settings: &SourceSettings) -> Self {
        Self {
            base: endpoint(settings, DEFAULT_ENDPOINT),
            max_results: settings.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            session: HttpSession::new(Self::NAME, http_timeout(settings, SourceClass::Forum)),
        }
    }
}

#[async_trait]
impl Collector for HackerNews {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn class(&self) -> SourceClass {
        SourceClass::Forum
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
        tracing::trace!(query, "Hacker News search");

        let per_page = self.max_results.to_string();
        let body: ApiResponse = client
            .get(format!("{}/api/v1/search", self.base))
            .query(&[
                ("query", query),
                ("tags", "story"),
                ("hitsPerPage", per_page.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("Hacker News request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("Hacker News HTTP error: {e}")))?
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("Hacker News response not understood: {e}")))?;

        let records: Vec<RawRecord> = body
            .hits
            .into_iter()
            .filter_map(to_record)
            .take(self.max_results)
            .collect();

        tracing::debug!(count = records.len(), "Hacker News results parsed");
        Ok(records)
    }

    async fn close(&self) {
        self.session.close();
    }
}

/// Stories without a title are skipped. Link-only stories get a short
/// activity summary as their body.
fn to_record(hit: Hit) -> Option<RawRecord> {
    let title = hit.title.filter(|t| !t.trim().is_empty())?;
    let discussion = format!("{ITEM_URL}{}", hit.object_id);
    let url = hit.url.filter(|u| !u.is_empty()).unwrap_or_else(|| discussion.clone());

    let text = hit.story_text.as_deref().map(strip_html).unwrap_or_default();
    let content = if text.is_empty() {
        format!(
            "{} points, {} comments on Hacker News",
            hit.points.unwrap_or(0),
            hit.num_comments.unwrap_or(0)
        )
    } else {
        text
    };

    let mut raw = raw_record(&title, &content, &url);
    raw.insert("source_detail".into(), Value::from("Hacker News"));
    raw.insert("tags".into(), Value::from(vec!["story"]));
    raw.insert("discussion_url".into(), Value::from(discussion));
    if let Some(author) = hit.author {
        raw.insert("author".into(), Value::from(author));
    }
    if let Some(created) = hit.created_at {
        raw.insert("published".into(), Value::from(created));
    }
    if let Some(points) = hit.points {
        raw.insert("points".into(), Value::from(points));
    }
    if let Some(comments) = hit.num_comments {
        raw.insert("num_comments".into(), Value::from(comments));
    }
    Some(raw)
}
