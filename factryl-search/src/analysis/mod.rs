//! Analysis pipeline: four independent, pure scorers run per record.
//!
//! Every scorer takes an explicit input and returns a well-formed result
//! for empty or missing text, so the pipeline never fails on incomplete
//! records.

pub mod bias;
pub mod credibility;
pub mod entities;
pub mod relevance;
pub mod sentiment;
pub mod text;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::types::Record;

pub use bias::BiasScore;
pub use credibility::CredibilityScore;
pub use relevance::RelevanceScore;
pub use sentiment::SentimentScore;

/// The four-part annotation attached to every analysed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBag {
    pub relevance: RelevanceScore,
    pub sentiment: SentimentScore,
    pub credibility: CredibilityScore,
    pub bias: BiasScore,
}

/// Run every scorer over one record.
///
/// `now` is the reference time for recency.
pub fn analyze_record(record: &Record, query: &str, now: DateTime<Utc>) -> ScoreBag {
    let relevance = relevance::score(&relevance::RelevanceInput {
        query,
        title: &record.title,
        content: &record.content,
        tags: &record.tags,
    });

    let sentiment = sentiment::score(&format!("{} {}", record.title, record.content));

    let source = if record.source_detail.is_empty() {
        record.source.as_str()
    } else {
        record.source_detail.as_str()
    };
    let credibility = credibility::score(&credibility::CredibilityInput {
        url: &record.url,
        source,
        title: &record.title,
        content: &record.content,
        author: record.author.as_deref(),
        published: record.published,
        now,
    });

    let bias = bias::score(&record.title, &record.content);

    ScoreBag {
        relevance,
        sentiment,
        credibility,
        bias,
    }
}

/// Annotate every record with its [`ScoreBag`].
///
/// Records are scored as independent futures; each record's scores are
/// private to it, so no coordination is needed. Input order is kept.
pub async fn analyze_all(records: Vec<Record>, query: &str) -> Vec<Record> {
    let now = Utc::now();
    let tasks = records.into_iter().map(|mut record| async move {
        record.scores = Some(analyze_record(&record, query, now));
        record
    });
    join_all(tasks).await
}
