//! Small table of well-known entities used by relevance scoring.
//!
//! A query naming one of these entities (by any alias) switches relevance
//! scoring into entity mode: records mentioning an alias, member name or
//! related term get a boost, and near-misses are penalised.

use super::text::{contains_phrase, words};

/// A known entity with its surface forms.
#[derive(Debug, Clone, Copy)]
pub struct Entity {
    /// Canonical lower-case name.
    pub name: &'static str,
    /// Broad kind, reported in explanations (e.g. `"k-pop"`).
    pub kind: &'static str,
    /// Exact names for the entity itself.
    pub aliases: &'static [&'static str],
    /// Names of members, for group entities.
    pub members: &'static [&'static str],
    /// Terms strongly associated with the entity.
    pub related: &'static [&'static str],
}

/// How a record matched the entity named by the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityMatch {
    /// The record names the entity itself.
    Alias,
    /// The record mentions a member or a related term only.
    Related,
    /// The record mentions nothing about the entity.
    None,
}

pub const ENTITIES: &[Entity] = &[
    Entity {
        name: "bts",
        kind: "k-pop",
        aliases: &["bts", "bangtan boys", "bangtan sonyeondan"],
        members: &["rm", "jin", "suga", "j-hope", "jimin", "jungkook", "kim taehyung"],
        related: &["k-pop", "kpop", "hybe", "big hit", "army"],
    },
    Entity {
        name: "blackpink",
        kind: "k-pop",
        aliases: &["blackpink", "black pink"],
        members: &["jisoo", "jennie", "rosé", "rose", "lisa"],
        related: &["k-pop", "kpop", "yg entertainment", "blinks"],
    },
    Entity {
        name: "openai",
        kind: "tech",
        aliases: &["openai", "open ai"],
        members: &["sam altman"],
        related: &["chatgpt", "gpt-4", "dall-e"],
    },
    Entity {
        name: "nasa",
        kind: "science",
        aliases: &["nasa"],
        members: &[],
        related: &["artemis", "jpl", "space agency"],
    },
];

/// The entity the query names by alias, if any.
pub fn detect(query: &str) -> Option<&'static Entity> {
    let query_words = words(query);
    ENTITIES
        .iter()
        .find(|e| e.aliases.iter().any(|a| contains_phrase(&query_words, a)))
}

/// Classify how `text` relates to `entity`.
pub fn match_text(entity: &Entity, text: &str) -> EntityMatch {
    let text_words = words(text);
    if entity.aliases.iter().any(|a| contains_phrase(&text_words, a)) {
        EntityMatch::Alias
    } else if entity
        .members
        .iter()
        .chain(entity.related)
        .any(|t| contains_phrase(&text_words, t))
    {
        EntityMatch::Related
    } else {
        EntityMatch::None
    }
}
