//! Core types: source classes, baseline source profiles, raw and canonical records.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::aggregate::url_normalize::normalize_url;
use crate::analysis::text::normalize_text;
use crate::analysis::ScoreBag;

/// Loosely-typed record as returned by a collector.
///
/// Must contain at least a `title` and one of `content` / `summary`
/// (`description` and `snippet` are accepted as well). Any other keys
/// are carried through into [`Record::metadata`].
pub type RawRecord = serde_json::Map<String, Value>;

/// Metadata key holding the sorted list of contributing source names.
pub const SOURCES_KEY: &str = "sources";

/// Broad family a source belongs to.
///
/// The class decides how long a single fetch may run and how long a
/// result set containing the source's records stays cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceClass {
    /// News outlets and aggregators.
    News,
    /// Discussion forums and communities.
    Forum,
    /// Video platforms.
    Video,
    /// Encyclopedias, dictionaries and other reference works.
    Reference,
    /// General web search engines.
    Search,
    /// Social networks.
    Social,
}

impl SourceClass {
    /// Returns the lower-case name of this class.
    pub fn name(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Forum => "forum",
            Self::Video => "video",
            Self::Reference => "reference",
            Self::Search => "search",
            Self::Social => "social",
        }
    }

    /// Default per-fetch timeout for sources of this class.
    pub fn fetch_timeout(&self) -> Duration {
        let secs = match self {
            Self::Reference => 10,
            Self::Search => 15,
            Self::News | Self::Forum => 20,
            Self::Video | Self::Social => 30,
        };
        Duration::from_secs(secs)
    }

    /// How long results from this class stay fresh in the cache.
    ///
    /// Volatile classes (news, social) expire quickly; reference
    /// material is kept for an hour.
    pub fn cache_ttl(&self) -> Duration {
        let minutes = match self {
            Self::News | Self::Social => 15,
            Self::Forum | Self::Search => 30,
            Self::Video => 45,
            Self::Reference => 60,
        };
        Duration::from_secs(minutes * 60)
    }
}

impl fmt::Display for SourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static, source-declared baseline information about a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProfile {
    /// Baseline credibility in `[0, 1]`, used when no score was computed.
    pub score: f64,
    /// Declared editorial bias rating (e.g. `"Center"`, `"Neutral"`).
    pub bias: String,
    /// Human-readable category (e.g. `"Knowledge Base"`).
    pub category: String,
    /// Source family, if known.
    pub class: Option<SourceClass>,
}

impl SourceProfile {
    /// Profile returned for sources with no baseline entry.
    pub fn unknown() -> Self {
        Self {
            score: 0.5,
            bias: "Unknown".into(),
            category: "Uncategorized".into(),
            class: None,
        }
    }
}

/// Canonical unit flowing through the pipeline: one content item plus its scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Item title.
    pub title: String,
    /// Body text or snippet.
    pub content: String,
    /// Canonical URL (may be empty when the source provides none).
    pub url: String,
    /// Registered name of the source that produced this record.
    pub source: String,
    /// Finer-grained origin inside the source (feed, section, subreddit...).
    pub source_detail: String,
    /// Publication time, when the source provides one.
    pub published: Option<DateTime<Utc>>,
    /// Author string, when the source provides one.
    pub author: Option<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Computed scores; `None` until the analysis pipeline has run.
    pub scores: Option<ScoreBag>,
    /// Everything else the source reported, plus enrichment fields.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl Record {
    /// Create a record with the required fields and nothing else.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            url: url.into(),
            source: source.into(),
            source_detail: String::new(),
            published: None,
            author: None,
            tags: Vec::new(),
            scores: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Convert a collector's raw record into a canonical one.
    ///
    /// Returns `None` when the title is missing/blank or when none of
    /// `content`, `summary`, `description`, `snippet` is present.
    pub fn from_raw(source: &str, raw: &RawRecord) -> Option<Self> {
        let title = string_field(raw, &["title"])?;
        let content = string_field(raw, &["content", "summary", "description", "snippet"])?;
        let url = string_field(raw, &["url", "link"]).unwrap_or_default();
        let source_detail = string_field(raw, &["source_detail", "source"]).unwrap_or_default();
        let author = string_field(raw, &["author"]);
        let published = ["published", "published_date", "date", "timestamp"]
            .iter()
            .filter_map(|key| raw.get(*key))
            .find_map(parse_timestamp);
        let tags = match raw.get("tags") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|t| t.as_str().map(str::to_owned))
                .collect(),
            _ => Vec::new(),
        };

        let consumed: &[&str] = &[
            "title",
            "content",
            "summary",
            "description",
            "snippet",
            "url",
            "link",
            "source_detail",
            "source",
            "author",
            "published",
            "published_date",
            "date",
            "timestamp",
            "tags",
        ];
        let metadata = raw
            .iter()
            .filter(|(k, _)| !consumed.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Some(Self {
            title,
            content,
            url,
            source: source.to_owned(),
            source_detail,
            published,
            author,
            tags,
            scores: None,
            metadata,
        })
    }

    /// Content identity: SHA-256 over the normalised title and normalised URL.
    ///
    /// Two records with the same identity are treated as the same item.
    pub fn identity(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(normalize_text(&self.title).as_bytes());
        hasher.update(b"|");
        hasher.update(self.normalized_url().as_bytes());
        hex(&hasher.finalize())
    }

    /// URL after canonicalisation, or empty when the record has no URL.
    pub fn normalized_url(&self) -> String {
        if self.url.trim().is_empty() {
            String::new()
        } else {
            normalize_url(self.url.trim())
        }
    }

    /// Names of every source that contributed to this record.
    ///
    /// Reads the merged [`SOURCES_KEY`] list written by the aggregator and
    /// falls back to the record's own source.
    pub fn contributing_sources(&self) -> Vec<String> {
        match self.metadata.get(SOURCES_KEY) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect(),
            _ => vec![self.source.clone()],
        }
    }

    /// Computed credibility, if the record has been analysed.
    pub fn credibility(&self) -> Option<f64> {
        self.scores.as_ref().map(|s| s.credibility.score)
    }

    /// Computed relevance, if the record has been analysed.
    pub fn relevance(&self) -> Option<f64> {
        self.scores.as_ref().map(|s| s.relevance.score)
    }
}

/// Aggregate statistics reported alongside a ranked result list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Records returned by all collectors before deduplication.
    pub total_found: usize,
    /// Records left after clustering.
    pub unique_items: usize,
    /// `total_found - unique_items`.
    pub duplicates_removed: usize,
    /// Records in the returned list (after `max_results` truncation).
    pub final_items: usize,
    /// Number of sources the query was dispatched to.
    pub sources_searched: usize,
    /// Number of sources that answered without error.
    pub successful_sources: usize,
    /// For each source, how many returned items it contributed to.
    pub source_counts: BTreeMap<String, usize>,
    /// Mean credibility of the returned items (0 when empty).
    pub mean_credibility: f64,
    /// Wall-clock time spent serving the request, in milliseconds.
    pub processing_time_ms: u64,
    /// Whether the items were served from the result cache.
    pub cached: bool,
}

/// Response returned by [`crate::Engine::search`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The query as submitted.
    pub query: String,
    /// Ranked, deduplicated, annotated records.
    pub items: Vec<Record>,
    /// Statistics about how the items were produced.
    pub stats: SearchStats,
}

fn string_field(raw: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Parse the timestamp formats collectors commonly emit.
///
/// Accepts RFC 3339, RFC 2822, naive ISO date-times and dates (taken as
/// UTC), and numeric Unix timestamps in seconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let secs = n.as_f64()?;
            Utc.timestamp_opt(secs.trunc() as i64, 0).single()
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                return Some(Utc.from_utc_datetime(&naive));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive))
        }
        _ => None,
    }
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => RawRecord::new(),
        }
    }

    #[test]
    fn from_raw_requires_title() {
        let r = raw(json!({ "content": "body only" }));
        assert!(Record::from_raw("bbc", &r).is_none());
    }

    #[test]
    fn from_raw_requires_some_body() {
        let r = raw(json!({ "title": "Headline", "url": "https://a.com" }));
        assert!(Record::from_raw("bbc", &r).is_none());
    }

    #[test]
    fn from_raw_accepts_summary_and_link() {
        let r = raw(json!({
            "title": "Headline",
            "summary": "Short summary",
            "link": "https://news.example.com/a",
            "author": "Jane Doe",
            "published": "2024-03-01T10:00:00Z",
            "views": 1200,
        }));
        let record = Record::from_raw("bbc", &r).expect("valid raw record");
        assert_eq!(record.content, "Short summary");
        assert_eq!(record.url, "https://news.example.com/a");
        assert_eq!(record.author.as_deref(), Some("Jane Doe"));
        assert!(record.published.is_some());
        assert_eq!(record.metadata.get("views"), Some(&json!(1200)));
        assert!(!record.metadata.contains_key("title"));
    }

    #[test]
    fn from_raw_blank_title_rejected() {
        let r = raw(json!({ "title": "   ", "content": "body" }));
        assert!(Record::from_raw("bbc", &r).is_none());
    }

    #[test]
    fn identity_ignores_case_and_url_noise() {
        let a = Record::new("Python  Release", "x", "https://www.Python.org/news/", "a");
        let b = Record::new("python release", "y", "https://python.org/news?utm_source=x", "b");
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn identity_differs_for_different_titles() {
        let a = Record::new("Python", "x", "https://python.org", "a");
        let b = Record::new("Rust", "x", "https://python.org", "a");
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn contributing_sources_falls_back_to_own_source() {
        let r = Record::new("t", "c", "", "wikipedia");
        assert_eq!(r.contributing_sources(), vec!["wikipedia".to_string()]);
    }

    #[test]
    fn parse_timestamp_formats() {
        assert!(parse_timestamp(&json!("2024-01-02T03:04:05+02:00")).is_some());
        assert!(parse_timestamp(&json!("Tue, 1 Jul 2003 10:52:37 +0200")).is_some());
        assert!(parse_timestamp(&json!("2024-01-02T03:04:05")).is_some());
        assert!(parse_timestamp(&json!("2024-01-02")).is_some());
        assert!(parse_timestamp(&json!(1_700_000_000)).is_some());
        assert!(parse_timestamp(&json!("yesterday")).is_none());
        assert!(parse_timestamp(&json!(null)).is_none());
    }

    #[test]
    fn class_timeouts_within_bounds() {
        for class in [
            SourceClass::News,
            SourceClass::Forum,
            SourceClass::Video,
            SourceClass::Reference,
            SourceClass::Search,
            SourceClass::Social,
        ] {
            let t = class.fetch_timeout().as_secs();
            assert!((10..=30).contains(&t), "{class} timeout {t}");
            let ttl = class.cache_ttl().as_secs();
            assert!((15 * 60..=60 * 60).contains(&ttl), "{class} ttl {ttl}");
        }
    }

    #[test]
    fn unknown_profile_is_neutral() {
        let p = SourceProfile::unknown();
        assert!((p.score - 0.5).abs() < f64::EPSILON);
        assert_eq!(p.bias, "Unknown");
        assert!(p.class.is_none());
    }
}
