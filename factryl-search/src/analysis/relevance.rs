//! Lexical relevance of a record to the query.
//!
//! Four signals are blended with fixed weights: keyword overlap, title
//! overlap (boosted), a term-frequency score against a fixed notional
//! corpus, and token-set Jaccard similarity. Queries naming a known entity
//! get an extra boost or penalty; see [`super::entities`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::entities::{self, EntityMatch};
use super::text::{jaccard, tokenize};

pub const KEYWORD_WEIGHT: f64 = 0.3;
pub const TITLE_WEIGHT: f64 = 0.3;
pub const TFIDF_WEIGHT: f64 = 0.2;
pub const SEMANTIC_WEIGHT: f64 = 0.2;

/// Multiplier on the title overlap before weighting.
pub const TITLE_BOOST: f64 = 2.0;
/// Size of the notional corpus behind the IDF approximation.
pub const IDF_CORPUS_SIZE: f64 = 1000.0;

/// Multiplier applied when a record mentions the queried entity.
pub const ENTITY_BOOST: f64 = 1.5;
/// Entity-mode scores under this value are halved.
pub const ENTITY_PENALTY_THRESHOLD: f64 = 0.3;
pub const ENTITY_PENALTY_FACTOR: f64 = 0.5;
/// Minimum pre-boost score for a record naming the entity itself.
pub const ALIAS_FLOOR: f64 = 0.4;
/// Minimum pre-boost score for a record mentioning only members or related terms.
pub const RELATED_FLOOR: f64 = 0.25;
/// Related-only matches never reach the lowest alias score.
pub const RELATED_CAP: f64 = 0.5;

/// Text a relevance score is computed over.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceInput<'a> {
    pub query: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub tags: &'a [String],
}

/// Qualitative relevance band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RelevanceLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 0.2 {
            Self::Low
        } else if score < 0.5 {
            Self::Moderate
        } else if score < 0.8 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }
}

/// Individual signals behind a relevance score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelevanceComponents {
    pub keyword: f64,
    pub title: f64,
    pub tfidf: f64,
    pub semantic: f64,
    /// Name of the entity the query refers to, if any.
    pub entity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceScore {
    /// Final relevance in `[0, 1]`.
    pub score: f64,
    pub level: RelevanceLevel,
    pub explanation: String,
    /// Query tokens found anywhere in the record.
    pub matches: Vec<String>,
    /// Query tokens found in the title.
    pub title_matches: Vec<String>,
    /// Matched query tokens per content token.
    pub keyword_density: f64,
    pub components: RelevanceComponents,
}

impl RelevanceScore {
    fn empty(explanation: &str) -> Self {
        Self {
            score: 0.0,
            level: RelevanceLevel::Low,
            explanation: explanation.to_owned(),
            matches: Vec::new(),
            title_matches: Vec::new(),
            keyword_density: 0.0,
            components: RelevanceComponents::default(),
        }
    }
}

/// Score how relevant a record is to the query.
pub fn score(input: &RelevanceInput<'_>) -> RelevanceScore {
    if input.query.trim().is_empty() {
        return RelevanceScore::empty("No query provided");
    }

    let mut full_text = format!("{} {}", input.title, input.content);
    for tag in input.tags {
        full_text.push(' ');
        full_text.push_str(tag);
    }

    let query_tokens = tokenize(input.query);
    let content_tokens = tokenize(&full_text);
    let title_tokens = tokenize(input.title);

    let keyword = keyword_score(&query_tokens, &content_tokens);
    let title = keyword_score(&query_tokens, &title_tokens) * TITLE_BOOST;
    let tfidf = tfidf_score(&query_tokens, &content_tokens);
    let semantic = jaccard(&query_tokens, &content_tokens);

    let base = keyword * KEYWORD_WEIGHT
        + title * TITLE_WEIGHT
        + tfidf * TFIDF_WEIGHT
        + semantic * SEMANTIC_WEIGHT;
    let mut score = base.min(1.0);

    let entity = entities::detect(input.query);
    let mut entity_note = None;
    if let Some(entity) = entity {
        let kind = entities::match_text(entity, &full_text);
        score = match kind {
            EntityMatch::Alias => score.max(ALIAS_FLOOR) * ENTITY_BOOST,
            EntityMatch::Related => (score.max(RELATED_FLOOR) * ENTITY_BOOST).min(RELATED_CAP),
            EntityMatch::None => score,
        };
        if score < ENTITY_PENALTY_THRESHOLD {
            score *= ENTITY_PENALTY_FACTOR;
        }
        entity_note = match kind {
            EntityMatch::Alias => Some(format!("mentions {}", entity.name)),
            EntityMatch::Related => Some(format!("related to {} ({})", entity.name, entity.kind)),
            EntityMatch::None => None,
        };
    }
    let score = score.clamp(0.0, 1.0);

    let matches = find_matches(&query_tokens, &content_tokens);
    let title_matches = find_matches(&query_tokens, &title_tokens);
    let keyword_density = matches.len() as f64 / content_tokens.len().max(1) as f64;

    let mut explanation = explain(score, &matches, &title_matches, keyword_density);
    if let Some(note) = entity_note {
        explanation.push_str("; ");
        explanation.push_str(&note);
    }

    RelevanceScore {
        score,
        level: RelevanceLevel::from_score(score),
        explanation,
        matches,
        title_matches,
        keyword_density,
        components: RelevanceComponents {
            keyword,
            title,
            tfidf,
            semantic,
            entity: entity.map(|e| e.name.to_owned()),
        },
    }
}

/// Fraction of query tokens present in `content`.
fn keyword_score(query: &[String], content: &[String]) -> f64 {
    if query.is_empty() || content.is_empty() {
        return 0.0;
    }
    let set: HashSet<&str> = content.iter().map(String::as_str).collect();
    let hits = query.iter().filter(|t| set.contains(t.as_str())).count();
    hits as f64 / query.len() as f64
}

fn tfidf_score(query: &[String], content: &[String]) -> f64 {
    if query.is_empty() || content.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in content {
        *counts.entry(token.as_str()).or_default() += 1;
    }
    let total = content.len() as f64;

    let sum: f64 = query
        .iter()
        .filter_map(|t| counts.get(t.as_str()))
        .map(|&n| {
            let tf = n as f64 / total;
            let idf = (IDF_CORPUS_SIZE / (n as f64 + 1.0)).ln();
            tf * idf
        })
        .sum();
    sum.min(1.0)
}

fn find_matches(query: &[String], content: &[String]) -> Vec<String> {
    let set: HashSet<&str> = content.iter().map(String::as_str).collect();
    query
        .iter()
        .filter(|t| set.contains(t.as_str()))
        .cloned()
        .collect()
}

fn explain(score: f64, matches: &[String], title_matches: &[String], density: f64) -> String {
    let n = matches.len();
    match RelevanceLevel::from_score(score) {
        RelevanceLevel::Low => format!("Low relevance - few matching keywords ({n} matches)"),
        RelevanceLevel::Moderate => {
            format!("Moderate relevance - some matching keywords ({n} matches)")
        }
        RelevanceLevel::High => {
            let mut s = format!("High relevance - many matching keywords ({n} matches)");
            if !title_matches.is_empty() {
                s.push_str(&format!(", including {} in title", title_matches.len()));
            }
            s
        }
        RelevanceLevel::VeryHigh => {
            let mut s = format!("Very high relevance - strong keyword matches ({n} matches)");
            if !title_matches.is_empty() {
                s.push_str(&format!(", {} in title", title_matches.len()));
            }
            if density > 0.05 {
                s.push_str(&format!(", high keyword density ({:.1}%)", density * 100.0));
            }
            s
        }
    }
}
