//! Shared text helpers for the scorers: tokenisation, stop words,
//! normalisation and phrase matching.

/// Words ignored by relevance scoring.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "must", "can", "this", "that", "these", "those",
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them", "my", "your",
    "his", "its", "our", "their",
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Every word (`[\w]+` run) in `text`, lower-cased.
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !is_word_char(c))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Content-bearing tokens: lower-cased words longer than two characters
/// that are not stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    words(text)
        .into_iter()
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Lower-case, replace punctuation with spaces and collapse whitespace.
///
/// Used for content identity and title similarity, so "Python  Release!"
/// and "python release" normalise to the same string.
pub fn normalize_text(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if is_word_char(c) { c } else { ' ' })
        .collect();
    replaced
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether `phrase` occurs in `haystack` as a contiguous run of words.
///
/// Both sides are split on non-word characters, so `"k-pop"` matches
/// "K-Pop", "k pop" and "(k-pop)" but not "kpop".
pub fn contains_phrase(haystack: &[String], phrase: &str) -> bool {
    let needle = words(phrase);
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_slice())
}

/// Number of non-overlapping occurrences of `needle` in `haystack`.
/// Both are expected to be lower-cased already.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

/// Remove URLs and e-mail addresses and collapse whitespace.
pub fn strip_links(text: &str) -> String {
    text.split_whitespace()
        .filter(|token| {
            let lower = token.to_ascii_lowercase();
            let is_url = lower.starts_with("http://") || lower.starts_with("https://");
            let is_email = token
                .find('@')
                .is_some_and(|at| at > 0 && at + 1 < token.len());
            !is_url && !is_email
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Jaccard similarity of two token sets; 0 when both are empty.
pub fn jaccard<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    use std::collections::HashSet;
    let a: HashSet<&str> = a.iter().map(AsRef::as_ref).collect();
    let b: HashSet<&str> = b.iter().map(AsRef::as_ref).collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_drops_stop_words_and_short_words() {
        let tokens = tokenize("The Rust book is on my desk, ok?");
        assert_eq!(tokens, vec!["rust", "book", "desk"]);
    }

    #[test]
    fn tokenize_empty_is_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn normalize_text_collapses_case_and_punctuation() {
        assert_eq!(normalize_text("Python  Release!"), "python release");
        assert_eq!(
            normalize_text("Python (programming language)"),
            "python programming language"
        );
    }

    #[test]
    fn phrase_matching_is_word_aligned() {
        let hay = words("Latest K-Pop chart news");
        assert!(contains_phrase(&hay, "k-pop"));
        assert!(contains_phrase(&hay, "chart news"));
        assert!(!contains_phrase(&hay, "kpop"));
        assert!(!contains_phrase(&hay, "pop chart music"));
        assert!(!contains_phrase(&hay, ""));
    }

    #[test]
    fn strip_links_removes_urls_and_emails() {
        let cleaned = strip_links("great read https://x.com/a mail me@example.com  now");
        assert_eq!(cleaned, "great read mail now");
    }

    #[test]
    fn jaccard_bounds() {
        let a = vec!["rust", "async"];
        let b = vec!["rust", "tokio"];
        assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
        let empty: Vec<&str> = Vec::new();
        assert_eq!(jaccard(&empty, &empty), 0.0);
        assert!((jaccard(&a, &a) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn count_occurrences_counts_substrings() {
        assert_eq!(count_occurrences("wow!!! really!", "!"), 4);
        assert_eq!(count_occurrences("abc", ""), 0);
    }
}
