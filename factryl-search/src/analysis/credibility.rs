//! Heuristic credibility of a record.
//!
//! Weighted sum of five factors: domain reputation, source-name reputation,
//! content quality, recency and author credentials. Also reports discrete
//! risk-factor tags for the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DOMAIN_WEIGHT: f64 = 0.3;
pub const SOURCE_WEIGHT: f64 = 0.2;
pub const CONTENT_WEIGHT: f64 = 0.25;
pub const RECENCY_WEIGHT: f64 = 0.15;
pub const AUTHOR_WEIGHT: f64 = 0.1;

/// Score for factors whose input is missing.
pub const NEUTRAL: f64 = 0.5;
/// Domain score for URLs that cannot be parsed.
pub const MALFORMED_URL: f64 = 0.3;

const TRUSTED_DOMAINS: &[(&str, f64)] = &[
    ("reuters.com", 0.95),
    ("bbc.com", 0.95),
    ("apnews.com", 0.95),
    ("npr.org", 0.90),
    ("cnn.com", 0.85),
    ("nytimes.com", 0.90),
    ("washingtonpost.com", 0.90),
    ("theguardian.com", 0.85),
    ("wsj.com", 0.90),
    ("arxiv.org", 0.95),
    ("pubmed.ncbi.nlm.nih.gov", 0.95),
    ("scholar.google.com", 0.90),
    ("researchgate.net", 0.85),
    ("ieee.org", 0.90),
    ("acm.org", 0.90),
    ("github.com", 0.80),
    ("stackoverflow.com", 0.75),
    ("medium.com", 0.60),
    ("dev.to", 0.65),
    ("twitter.com", 0.40),
    ("facebook.com", 0.35),
    ("reddit.com", 0.50),
    ("quora.com", 0.45),
    ("youtube.com", 0.45),
];

const TLD_SCORES: &[(&str, f64)] = &[(".gov", 0.90), (".edu", 0.85), (".org", 0.70), (".com", 0.60)];
const OTHER_TLD: f64 = 0.50;

const SOURCE_KEYWORDS: &[(&[&str], f64)] = &[
    (&["university", "research", "institute", "journal"], 0.90),
    (&["government", "official", "agency"], 0.85),
    (&["news", "times", "post", "herald", "tribune"], 0.75),
    (&["tech", "developer", "engineering"], 0.70),
    (&["social", "twitter", "facebook", "reddit"], 0.45),
];
const DEFAULT_SOURCE: f64 = 0.60;

const QUALITY_POSITIVE: &[&str] = &[
    "citations", "references", "study", "research", "data", "analysis", "peer-reviewed",
    "published", "journal", "university", "professor", "expert", "official", "verified",
    "fact-check", "evidence",
];
const QUALITY_NEGATIVE: &[&str] = &[
    "rumor", "unconfirmed", "alleged", "conspiracy", "hoax", "fake", "misleading", "clickbait",
    "sensational", "breaking", "exclusive", "shocking", "you won't believe", "doctors hate this",
];

const AUTHOR_KEYWORDS: &[(&[&str], f64)] = &[
    (&["dr.", "prof.", "phd", "md"], 0.85),
    (&["researcher", "scientist", "expert"], 0.80),
    (&["journalist", "reporter", "correspondent"], 0.75),
];
const NAMED_AUTHOR: f64 = 0.60;

/// Recency buckets: `(max age in days, score)`.
const RECENCY_BUCKETS: &[(i64, f64)] = &[(1, 0.95), (7, 0.85), (30, 0.75), (90, 0.65), (365, 0.55)];
const ANCIENT: f64 = 0.45;

const CLICKBAIT_PHRASES: &[&str] = &["you won't believe", "shocking", "doctors hate", "one weird trick"];
const CONSPIRACY_PHRASES: &[&str] = &["conspiracy", "cover-up", "they don't want you to know"];
const CITATION_PHRASES: &[&str] = &["source", "study", "research", "according to"];
const SUSPICIOUS_URL_TERMS: &[&str] = &["fake", "hoax", "conspiracy"];
const EMOTIONAL_WORDS: &[&str] = &["outrageous", "shocking", "unbelievable", "devastating", "explosive"];

/// Everything credibility scoring looks at.
#[derive(Debug, Clone, Copy)]
pub struct CredibilityInput<'a> {
    pub url: &'a str,
    /// Source name or publication, e.g. `"BBC News"`.
    pub source: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub author: Option<&'a str>,
    pub published: Option<DateTime<Utc>>,
    /// Reference time for recency.
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredibilityLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl CredibilityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::VeryHigh
        } else if score >= 0.6 {
            Self::High
        } else if score >= 0.4 {
            Self::Medium
        } else if score >= 0.2 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    ClickbaitTitle,
    ConspiracyLanguage,
    NoSourcesCited,
    SuspiciousDomain,
    ExcessiveEmotionalLanguage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredibilityComponents {
    pub domain: f64,
    pub source: f64,
    pub content: f64,
    pub recency: f64,
    pub author: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredibilityScore {
    /// Weighted credibility in `[0, 1]`.
    pub score: f64,
    pub level: CredibilityLevel,
    pub explanation: String,
    pub risk_factors: Vec<RiskFactor>,
    pub components: CredibilityComponents,
}

/// Score the credibility of a record.
pub fn score(input: &CredibilityInput<'_>) -> CredibilityScore {
    let components = CredibilityComponents {
        domain: domain_score(input.url),
        source: source_score(input.source),
        content: content_quality(input.title, input.content),
        recency: recency_score(input.published, input.now),
        author: author_score(input.author.unwrap_or_default()),
    };

    let score = (components.domain * DOMAIN_WEIGHT
        + components.source * SOURCE_WEIGHT
        + components.content * CONTENT_WEIGHT
        + components.recency * RECENCY_WEIGHT
        + components.author * AUTHOR_WEIGHT)
        .clamp(0.0, 1.0);

    CredibilityScore {
        score,
        level: CredibilityLevel::from_score(score),
        explanation: explain(score, &components),
        risk_factors: risk_factors(input.title, input.content, input.url),
        components,
    }
}

/// Reputation of the URL's host: exact table entry, then TLD fallback.
pub fn domain_score(url: &str) -> f64 {
    let url = url.trim();
    if url.is_empty() {
        return NEUTRAL;
    }
    let host = match url::Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(h) => h.to_lowercase(),
            None => return MALFORMED_URL,
        },
        Err(_) => return MALFORMED_URL,
    };
    let domain = host.strip_prefix("www.").unwrap_or(&host);

    if let Some((_, s)) = TRUSTED_DOMAINS.iter().find(|(d, _)| *d == domain) {
        return *s;
    }
    TLD_SCORES
        .iter()
        .find(|(tld, _)| domain.ends_with(tld))
        .map_or(OTHER_TLD, |(_, s)| *s)
}

fn source_score(source: &str) -> f64 {
    let source = source.trim().to_lowercase();
    if source.is_empty() {
        return NEUTRAL;
    }
    first_keyword_score(&source, SOURCE_KEYWORDS).unwrap_or(DEFAULT_SOURCE)
}

fn content_quality(title: &str, content: &str) -> f64 {
    let full = format!("{title} {content}").to_lowercase();
    let positive = QUALITY_POSITIVE.iter().filter(|w| full.contains(*w)).count();
    let negative = QUALITY_NEGATIVE.iter().filter(|w| full.contains(*w)).count();

    let mut quality = 0.5;
    if positive > 0 {
        quality += (positive as f64 * 0.1).min(0.3);
    }
    if negative > 0 {
        quality -= (negative as f64 * 0.15).min(0.4);
    }

    let title_len = title.chars().count();
    if title_len > 0 {
        let upper = title.chars().filter(|c| c.is_uppercase()).count();
        if upper as f64 / title_len as f64 > 0.3 {
            quality -= 0.2;
        }
        if title.matches('!').count() > 2 {
            quality -= 0.1;
        }
    }
    quality.clamp(0.0, 1.0)
}

fn recency_score(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(published) = published else {
        return NEUTRAL;
    };
    let age_days = (now - published).num_days();
    RECENCY_BUCKETS
        .iter()
        .find(|(max, _)| age_days <= *max)
        .map_or(ANCIENT, |(_, s)| *s)
}

fn author_score(author: &str) -> f64 {
    let author = author.trim().to_lowercase();
    if author.is_empty() {
        return NEUTRAL;
    }
    first_keyword_score(&author, AUTHOR_KEYWORDS).unwrap_or(NAMED_AUTHOR)
}

fn first_keyword_score(text: &str, table: &[(&[&str], f64)]) -> Option<f64> {
    table
        .iter()
        .find(|(terms, _)| terms.iter().any(|t| text.contains(t)))
        .map(|(_, s)| *s)
}

fn risk_factors(title: &str, content: &str, url: &str) -> Vec<RiskFactor> {
    let full = format!("{title} {content}").to_lowercase();
    let title = title.to_lowercase();
    let mut risks = Vec::new();

    if CLICKBAIT_PHRASES.iter().any(|p| title.contains(p)) {
        risks.push(RiskFactor::ClickbaitTitle);
    }
    if CONSPIRACY_PHRASES.iter().any(|p| full.contains(p)) {
        risks.push(RiskFactor::ConspiracyLanguage);
    }
    if content.chars().count() > 500 && !CITATION_PHRASES.iter().any(|p| full.contains(p)) {
        risks.push(RiskFactor::NoSourcesCited);
    }
    let url = url.to_lowercase();
    if SUSPICIOUS_URL_TERMS.iter().any(|t| url.contains(t)) {
        risks.push(RiskFactor::SuspiciousDomain);
    }
    if EMOTIONAL_WORDS.iter().filter(|w| full.contains(*w)).count() > 3 {
        risks.push(RiskFactor::ExcessiveEmotionalLanguage);
    }
    risks
}

fn explain(score: f64, c: &CredibilityComponents) -> String {
    let mut notes = Vec::new();
    if c.domain >= 0.8 {
        notes.push("trusted domain");
    } else if c.domain <= 0.4 {
        notes.push("questionable domain");
    }
    if c.source >= 0.8 {
        notes.push("reputable source");
    } else if c.source <= 0.4 {
        notes.push("unverified source");
    }
    if c.content >= 0.7 {
        notes.push("high-quality content");
    } else if c.content <= 0.4 {
        notes.push("low-quality content indicators");
    }
    if c.recency >= 0.8 {
        notes.push("recent publication");
    } else if c.recency <= 0.4 {
        notes.push("outdated content");
    }

    if notes.is_empty() {
        format!("Moderate credibility (score: {score:.2})")
    } else {
        format!("Credibility based on: {}", notes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn input<'a>(url: &'a str, author: Option<&'a str>) -> CredibilityInput<'a> {
        CredibilityInput {
            url,
            source: "",
            title: "Annual water quality report",
            content: "Measurements for the year.",
            author,
            published: None,
            now: Utc::now(),
        }
    }

    #[test]
    fn gov_domain_and_doctor_beat_anonymous() {
        let strong = score(&input("https://www.epa.gov/report", Some("Dr. Jane Smith")));
        let weak = score(&input("", None));
        assert!(strong.score > weak.score);
        assert!((strong.components.domain - 0.90).abs() < 1e-9);
        assert!((strong.components.author - 0.85).abs() < 1e-9);
    }

    #[test]
    fn empty_record_is_neutral() {
        let now = Utc::now();
        let s = score(&CredibilityInput {
            url: "",
            source: "",
            title: "",
            content: "",
            author: None,
            published: None,
            now,
        });
        assert!((s.score - 0.5).abs() < 1e-9);
        assert_eq!(s.level, CredibilityLevel::Medium);
        assert!(s.risk_factors.is_empty());
        assert_eq!(s.explanation, "Moderate credibility (score: 0.50)");
    }

    #[test]
    fn domain_table_and_fallbacks() {
        assert!((domain_score("https://www.reuters.com/world") - 0.95).abs() < 1e-9);
        assert!((domain_score("https://mit.edu/x") - 0.85).abs() < 1e-9);
        assert!((domain_score("https://example.org") - 0.70).abs() < 1e-9);
        assert!((domain_score("https://example.io") - 0.50).abs() < 1e-9);
        assert!((domain_score("not a url") - MALFORMED_URL).abs() < 1e-9);
    }

    #[test]
    fn source_keywords() {
        assert!((source_score("Harvard University Press") - 0.90).abs() < 1e-9);
        assert!((source_score("BBC News") - 0.75).abs() < 1e-9);
        assert!((source_score("reddit") - 0.45).abs() < 1e-9);
        assert!((source_score("wikipedia") - DEFAULT_SOURCE).abs() < 1e-9);
    }

    #[test]
    fn clickbait_title_lowers_quality() {
        let calm = content_quality("New study on sleep", "Research data from the university.");
        let bait = content_quality("SHOCKING!!! You won't believe this", "rumor");
        assert!(calm > 0.7);
        assert!(bait < 0.2);
    }

    #[test]
    fn recency_buckets() {
        let now = Utc::now();
        assert!((recency_score(Some(now - Duration::hours(3)), now) - 0.95).abs() < 1e-9);
        assert!((recency_score(Some(now - Duration::days(20)), now) - 0.75).abs() < 1e-9);
        assert!((recency_score(Some(now - Duration::days(400)), now) - 0.45).abs() < 1e-9);
        assert!((recency_score(None, now) - NEUTRAL).abs() < 1e-9);
    }

    #[test]
    fn risk_factors_detected() {
        let long_uncited = "word ".repeat(150);
        let risks = risk_factors(
            "Doctors hate this one weird trick",
            &format!("{long_uncited} cover-up"),
            "https://fake-news.example.com",
        );
        assert!(risks.contains(&RiskFactor::ClickbaitTitle));
        assert!(risks.contains(&RiskFactor::ConspiracyLanguage));
        assert!(risks.contains(&RiskFactor::NoSourcesCited));
        assert!(risks.contains(&RiskFactor::SuspiciousDomain));
    }

    #[test]
    fn levels() {
        assert_eq!(CredibilityLevel::from_score(0.85), CredibilityLevel::VeryHigh);
        assert_eq!(CredibilityLevel::from_score(0.6), CredibilityLevel::High);
        assert_eq!(CredibilityLevel::from_score(0.1), CredibilityLevel::VeryLow);
    }
}
