//! Lexical bias indicators.
//!
//! Four independent lexicon matches, each scored in `[0, 1]`, averaged into
//! one bias score: political leaning, emotional and loaded language,
//! subjective framing, and gendered language.

use serde::{Deserialize, Serialize};

use super::text::words;

/// Component scores above this value are reported as bias types.
pub const TYPE_THRESHOLD: f64 = 0.3;

const LEFT_TERMS: &[&str] = &[
    "progressive", "liberal", "democratic", "social justice", "equality", "climate change",
    "gun control", "healthcare reform", "immigration rights", "minimum wage",
    "wealth inequality", "systemic racism", "lgbtq rights",
];
const RIGHT_TERMS: &[&str] = &[
    "conservative", "republican", "traditional values", "free market", "second amendment",
    "border security", "law and order", "fiscal responsibility", "religious freedom",
    "family values", "small government", "patriotic",
];
const EMOTIONAL_TERMS: &[&str] = &[
    "outrageous", "shocking", "devastating", "explosive", "scandalous", "unbelievable",
    "horrific", "disgusting", "appalling", "catastrophic",
];
const LOADED_TERMS: &[&str] = &[
    "radical", "extremist", "terrorist", "criminal", "corrupt", "evil", "dangerous", "threat",
    "crisis", "disaster", "failure", "betrayal",
];
const OPINION_MARKERS: &[&str] = &[
    "i think", "i believe", "in my opinion", "personally", "i feel", "it seems to me",
    "from my perspective", "i would argue",
];
const CERTAINTY_MARKERS: &[&str] = &[
    "definitely", "certainly", "obviously", "clearly", "undoubtedly", "without question",
    "absolutely", "unquestionably",
];
const FIRST_PERSON: &[&str] = &["i", "me", "my", "mine", "myself"];
const GENDERED_TERMS: &[&str] = &[
    "bossy", "shrill", "emotional", "hysterical", "aggressive", "ambitious", "assertive",
    "confident", "strong-willed",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasLevel {
    Minimal,
    Low,
    Moderate,
    High,
}

impl BiasLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.7 {
            Self::High
        } else if score >= 0.4 {
            Self::Moderate
        } else if score >= 0.2 {
            Self::Low
        } else {
            Self::Minimal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoliticalDirection {
    Left,
    Right,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasType {
    PoliticalLeft,
    PoliticalRight,
    PoliticalLanguage,
    EmotionalBias,
    SubjectiveLanguage,
    GenderBias,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoliticalBias {
    pub score: f64,
    pub direction: PoliticalDirection,
    /// `|left - right| / total`, 0 when balanced or absent.
    pub strength: f64,
    pub left_count: usize,
    pub right_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalBias {
    pub score: f64,
    pub emotional_count: usize,
    pub loaded_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectiveBias {
    pub score: f64,
    pub opinion_count: usize,
    pub certainty_count: usize,
    pub first_person_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderBias {
    pub score: f64,
    pub gendered_count: usize,
    pub pronoun_imbalance: f64,
    pub he_count: usize,
    pub she_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasComponents {
    pub political: PoliticalBias,
    pub emotional: EmotionalBias,
    pub subjective: SubjectiveBias,
    pub gender: GenderBias,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasScore {
    /// Mean of the four component scores, in `[0, 1]`.
    pub score: f64,
    pub level: BiasLevel,
    pub explanation: String,
    pub bias_types: Vec<BiasType>,
    pub components: BiasComponents,
}

/// Score bias indicators in a record's title and content.
pub fn score(title: &str, content: &str) -> BiasScore {
    let text = format!("{title} {content}").to_lowercase();
    let tokens = words(&text);

    let political = political(&text);
    let emotional = emotional(&text);
    let subjective = subjective(&text, &tokens);
    let gender = gender(&text, &tokens);

    let score = ((political.score + emotional.score + subjective.score + gender.score) / 4.0)
        .clamp(0.0, 1.0);

    let mut bias_types = Vec::new();
    let mut notes = Vec::new();
    if political.score > TYPE_THRESHOLD {
        match political.direction {
            PoliticalDirection::Left => {
                bias_types.push(BiasType::PoliticalLeft);
                notes.push("left-leaning political language");
            }
            PoliticalDirection::Right => {
                bias_types.push(BiasType::PoliticalRight);
                notes.push("right-leaning political language");
            }
            PoliticalDirection::Neutral => {
                bias_types.push(BiasType::PoliticalLanguage);
                notes.push("political language detected");
            }
        }
    }
    if emotional.score > TYPE_THRESHOLD {
        bias_types.push(BiasType::EmotionalBias);
        notes.push("emotional or loaded language");
    }
    if subjective.score > TYPE_THRESHOLD {
        bias_types.push(BiasType::SubjectiveLanguage);
        notes.push("subjective or opinion-based language");
    }
    if gender.score > TYPE_THRESHOLD {
        bias_types.push(BiasType::GenderBias);
        notes.push("potential gender bias in language");
    }

    let explanation = if notes.is_empty() {
        "Minimal bias detected - relatively neutral language".to_owned()
    } else {
        format!("Bias indicators: {}", notes.join(", "))
    };

    BiasScore {
        score,
        level: BiasLevel::from_score(score),
        explanation,
        bias_types,
        components: BiasComponents {
            political,
            emotional,
            subjective,
            gender,
        },
    }
}

fn count_terms(text: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|t| text.contains(*t)).count()
}

fn count_words(tokens: &[String], targets: &[&str]) -> usize {
    tokens
        .iter()
        .filter(|t| targets.contains(&t.as_str()))
        .count()
}

fn political(text: &str) -> PoliticalBias {
    let left = count_terms(text, LEFT_TERMS);
    let right = count_terms(text, RIGHT_TERMS);
    let total = left + right;
    if total == 0 {
        return PoliticalBias {
            score: 0.0,
            direction: PoliticalDirection::Neutral,
            strength: 0.0,
            left_count: 0,
            right_count: 0,
        };
    }

    let (direction, strength) = match left.cmp(&right) {
        std::cmp::Ordering::Greater => (PoliticalDirection::Left, (left - right) as f64 / total as f64),
        std::cmp::Ordering::Less => (PoliticalDirection::Right, (right - left) as f64 / total as f64),
        std::cmp::Ordering::Equal => (PoliticalDirection::Neutral, 0.0),
    };
    PoliticalBias {
        score: ((total as f64 / 10.0) * (1.0 + strength)).min(1.0),
        direction,
        strength,
        left_count: left,
        right_count: right,
    }
}

fn emotional(text: &str) -> EmotionalBias {
    let emotional_count = count_terms(text, EMOTIONAL_TERMS);
    let loaded_count = count_terms(text, LOADED_TERMS);
    EmotionalBias {
        score: ((emotional_count + loaded_count) as f64 / 5.0).min(1.0),
        emotional_count,
        loaded_count,
    }
}

fn subjective(text: &str, tokens: &[String]) -> SubjectiveBias {
    let opinion_count = count_terms(text, OPINION_MARKERS);
    let certainty_count = count_terms(text, CERTAINTY_MARKERS);
    let first_person_count = count_words(tokens, FIRST_PERSON);
    let total = opinion_count as f64 + certainty_count as f64 + first_person_count as f64 / 5.0;
    SubjectiveBias {
        score: (total / 5.0).min(1.0),
        opinion_count,
        certainty_count,
        first_person_count,
    }
}

fn gender(text: &str, tokens: &[String]) -> GenderBias {
    let gendered_count = count_terms(text, GENDERED_TERMS);
    let he_count = count_words(tokens, &["he"]);
    let she_count = count_words(tokens, &["she"]);
    let pronouns = he_count + she_count;
    let pronoun_imbalance = if pronouns == 0 {
        0.0
    } else {
        he_count.abs_diff(she_count) as f64 / pronouns as f64
    };
    GenderBias {
        score: (gendered_count as f64 / 3.0 + pronoun_imbalance * 0.5).min(1.0),
        gendered_count,
        pronoun_imbalance,
        he_count,
        she_count,
    }
}
