//! Sentiment of a record's text.
//!
//! Blends a lexicon-based polarity/subjectivity estimate (70%) with a
//! count of strongly positive and negative keywords (30%).

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::text::{strip_links, words};

pub const STATISTICAL_WEIGHT: f64 = 0.7;
pub const KEYWORD_WEIGHT: f64 = 0.3;
pub const POSITIVE_THRESHOLD: f64 = 0.1;
pub const NEGATIVE_THRESHOLD: f64 = -0.1;
/// Confidence bonus per unit of objectivity.
pub const OBJECTIVITY_BONUS: f64 = 0.3;

const POSITIVE_KEYWORDS: &[&str] = &[
    "excellent", "amazing", "fantastic", "great", "wonderful", "outstanding", "brilliant",
    "superb", "magnificent", "perfect", "love", "awesome", "incredible", "remarkable",
    "exceptional", "marvelous", "terrific",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "terrible", "awful", "horrible", "disgusting", "hate", "worst", "pathetic", "useless",
    "disappointing", "frustrating", "annoying", "ridiculous", "stupid", "waste", "failure",
    "disaster", "nightmare",
];

/// `(word, polarity, subjectivity)` for common opinion-bearing English words.
const LEXICON_ENTRIES: &[(&str, f64, f64)] = &[
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("excellent", 1.0, 1.0),
    ("amazing", 0.6, 0.9),
    ("awesome", 1.0, 1.0),
    ("fantastic", 0.4, 0.9),
    ("wonderful", 1.0, 1.0),
    ("outstanding", 0.5, 0.7),
    ("brilliant", 0.9, 1.0),
    ("superb", 1.0, 1.0),
    ("perfect", 1.0, 1.0),
    ("incredible", 0.9, 0.9),
    ("remarkable", 0.75, 0.75),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("nice", 0.6, 1.0),
    ("beautiful", 0.85, 1.0),
    ("happy", 0.8, 1.0),
    ("love", 0.5, 0.6),
    ("like", 0.2, 0.3),
    ("enjoy", 0.4, 0.5),
    ("interesting", 0.5, 0.5),
    ("useful", 0.3, 0.1),
    ("helpful", 0.4, 0.3),
    ("easy", 0.43, 0.83),
    ("fine", 0.42, 0.5),
    ("strong", 0.43, 0.73),
    ("successful", 0.75, 0.95),
    ("impressive", 1.0, 1.0),
    ("positive", 0.23, 0.55),
    ("win", 0.8, 0.4),
    ("fun", 0.3, 0.2),
    ("bad", -0.7, 0.67),
    ("worse", -0.4, 0.6),
    ("worst", -1.0, 1.0),
    ("terrible", -1.0, 1.0),
    ("awful", -1.0, 1.0),
    ("horrible", -1.0, 1.0),
    ("disgusting", -1.0, 1.0),
    ("pathetic", -1.0, 1.0),
    ("poor", -0.4, 0.6),
    ("sad", -0.5, 1.0),
    ("angry", -0.5, 1.0),
    ("hate", -0.8, 0.9),
    ("boring", -1.0, 1.0),
    ("wrong", -0.5, 0.9),
    ("weak", -0.375, 0.625),
    ("difficult", -0.5, 1.0),
    ("hard", -0.29, 0.54),
    ("useless", -0.5, 0.2),
    ("stupid", -0.8, 1.0),
    ("ridiculous", -0.33, 0.67),
    ("annoying", -0.8, 0.9),
    ("disappointing", -0.6, 0.7),
    ("frustrating", -0.4, 0.7),
    ("negative", -0.3, 0.4),
    ("dangerous", -0.6, 0.9),
    ("broken", -0.4, 0.4),
    ("fail", -0.5, 0.3),
    ("failed", -0.5, 0.3),
    ("important", 0.4, 1.0),
    ("new", 0.14, 0.45),
    ("free", 0.4, 0.8),
    ("popular", 0.6, 0.8),
    ("slow", -0.3, 0.4),
    ("fast", 0.2, 0.6),
];

const NEGATIONS: &[&str] = &["not", "no", "never", "isn", "wasn", "aren", "don", "doesn", "didn", "cannot", "without"];
/// Negated words flip and dampen polarity by this factor.
const NEGATION_FACTOR: f64 = -0.5;

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.2),
    ("extremely", 1.5),
    ("incredibly", 1.4),
    ("so", 1.2),
    ("quite", 1.1),
    ("highly", 1.3),
];

static LEXICON: LazyLock<HashMap<&'static str, (f64, f64)>> = LazyLock::new(|| {
    LEXICON_ENTRIES
        .iter()
        .map(|(w, p, s)| (*w, (*p, *s)))
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > POSITIVE_THRESHOLD {
            Self::Positive
        } else if polarity < NEGATIVE_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentComponents {
    /// Lexicon polarity estimate in `[-1, 1]`.
    pub statistical: f64,
    /// Keyword balance `(p - n) / (p + n)` in `[-1, 1]`.
    pub keyword: f64,
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Blended polarity in `[-1, 1]`.
    pub score: f64,
    /// Subjectivity in `[0, 1]`.
    pub subjectivity: f64,
    pub label: SentimentLabel,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    pub explanation: String,
    pub components: SentimentComponents,
}

impl SentimentScore {
    fn neutral() -> Self {
        Self {
            score: 0.0,
            subjectivity: 0.0,
            label: SentimentLabel::Neutral,
            confidence: 0.0,
            explanation: "No text to analyse".into(),
            components: SentimentComponents::default(),
        }
    }
}

/// Score the sentiment of `text`.
pub fn score(text: &str) -> SentimentScore {
    let cleaned = strip_links(text);
    if cleaned.is_empty() {
        return SentimentScore::neutral();
    }
    let tokens = words(&cleaned);
    if tokens.is_empty() {
        return SentimentScore::neutral();
    }

    let (statistical, subjectivity) = lexicon_estimate(&tokens);
    let (keyword, positive, negative) = keyword_balance(&tokens);

    let polarity = (statistical * STATISTICAL_WEIGHT + keyword * KEYWORD_WEIGHT).clamp(-1.0, 1.0);
    let label = SentimentLabel::from_polarity(polarity);
    let confidence = (polarity.abs() + (1.0 - subjectivity) * OBJECTIVITY_BONUS).min(1.0);

    let explanation = match label {
        SentimentLabel::Positive => format!(
            "Positive tone (polarity {polarity:.2}, {} positive / {} negative keywords)",
            positive.len(),
            negative.len()
        ),
        SentimentLabel::Negative => format!(
            "Negative tone (polarity {polarity:.2}, {} positive / {} negative keywords)",
            positive.len(),
            negative.len()
        ),
        SentimentLabel::Neutral => format!("Neutral tone (polarity {polarity:.2})"),
    };

    SentimentScore {
        score: polarity,
        subjectivity,
        label,
        confidence,
        explanation,
        components: SentimentComponents {
            statistical,
            keyword,
            positive_keywords: positive,
            negative_keywords: negative,
        },
    }
}

/// Mean polarity and subjectivity over the opinion words found in
/// `tokens`, honouring a preceding intensifier and negation.
fn lexicon_estimate(tokens: &[String]) -> (f64, f64) {
    let mut polarity_sum = 0.0;
    let mut subjectivity_sum = 0.0;
    let mut hits = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        let Some(&(mut polarity, mut subjectivity)) = LEXICON.get(token.as_str()) else {
            continue;
        };
        let window = &tokens[i.saturating_sub(3)..i];

        if let Some(prev) = i.checked_sub(1).map(|j| tokens[j].as_str()) {
            if let Some((_, factor)) = INTENSIFIERS.iter().find(|(w, _)| *w == prev) {
                polarity *= factor;
                subjectivity *= factor;
            }
        }
        if window.iter().any(|w| NEGATIONS.contains(&w.as_str())) {
            polarity *= NEGATION_FACTOR;
        }

        polarity_sum += polarity.clamp(-1.0, 1.0);
        subjectivity_sum += subjectivity.clamp(0.0, 1.0);
        hits += 1;
    }

    if hits == 0 {
        return (0.0, 0.0);
    }
    (polarity_sum / hits as f64, subjectivity_sum / hits as f64)
}

fn keyword_balance(tokens: &[String]) -> (f64, Vec<String>, Vec<String>) {
    let set: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
    let positive: Vec<String> = set
        .iter()
        .filter(|w| POSITIVE_KEYWORDS.contains(*w))
        .map(|w| (*w).to_owned())
        .collect();
    let negative: Vec<String> = set
        .iter()
        .filter(|w| NEGATIVE_KEYWORDS.contains(*w))
        .map(|w| (*w).to_owned())
        .collect();

    let total = positive.len() + negative.len();
    let balance = if total == 0 {
        0.0
    } else {
        (positive.len() as f64 - negative.len() as f64) / total as f64
    };
    (balance, positive, negative)
}
