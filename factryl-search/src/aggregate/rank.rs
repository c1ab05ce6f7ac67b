//! Composite rank key and final ordering.

use std::cmp::Ordering;

use crate::types::Record;

/// Relevance assumed for records that were never analysed.
pub const DEFAULT_RELEVANCE: f64 = 0.5;

/// Sort key for ranked output, compared in field order, all descending.
#[derive(Debug, Clone, Copy)]
pub struct RankKey {
    /// Relevance × credibility. Unanalysed records use the source's
    /// baseline credibility and [`DEFAULT_RELEVANCE`].
    pub primary: f64,
    /// Publication time as Unix seconds; `i64::MIN` when unknown.
    pub recency: i64,
    /// Source-declared baseline credibility.
    pub baseline: f64,
}

impl RankKey {
    /// Key for `record`, whose source declares `baseline` credibility.
    pub fn of(record: &Record, baseline: f64) -> Self {
        let credibility = record.credibility().unwrap_or(baseline);
        let relevance = record.relevance().unwrap_or(DEFAULT_RELEVANCE);
        Self {
            primary: relevance * credibility,
            recency: record.published.map_or(i64::MIN, |t| t.timestamp()),
            baseline,
        }
    }
}

impl PartialEq for RankKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankKey {}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.primary
            .total_cmp(&other.primary)
            .then_with(|| self.recency.cmp(&other.recency))
            .then_with(|| self.baseline.total_cmp(&other.baseline))
    }
}

/// Sort `records` best first.
///
/// `baseline` maps a source name to its declared credibility. Equal keys
/// are ordered by identity so the output never depends on arrival order.
pub fn rank<F>(records: &mut [Record], baseline: F)
where
    F: Fn(&str) -> f64,
{
    let mut keyed: Vec<(RankKey, String, Record)> = records
        .iter()
        .map(|r| (RankKey::of(r, baseline(&r.source)), r.identity(), r.clone()))
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    for (slot, (_, _, record)) in records.iter_mut().zip(keyed) {
        *slot = record;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_record;
    use chrono::{TimeZone, Utc};

    fn baseline(source: &str) -> f64 {
        if source == "wikipedia" {
            0.85
        } else {
            0.5
        }
    }

    fn scored(title: &str, content: &str, url: &str, source: &str) -> Record {
        let mut r = Record::new(title, content, url, source);
        r.scores = Some(analyze_record(&r, "rust compiler", Utc::now()));
        r
    }

    #[test]
    fn higher_primary_ranks_first() {
        let mut records = vec![
            scored("Gardening", "tomatoes", "https://garden.com", "reddit"),
            scored("Rust compiler", "rust compiler internals", "https://arxiv.org/x", "bing"),
        ];
        rank(&mut records, baseline);
        assert_eq!(records[0].title, "Rust compiler");
    }

    #[test]
    fn recency_breaks_primary_ties() {
        let mut old = Record::new("a", "x", "", "bing");
        old.published = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single();
        let mut new = Record::new("b", "x", "", "bing");
        new.published = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        let mut records = vec![old, new];
        rank(&mut records, baseline);
        assert_eq!(records[0].title, "b");
    }

    #[test]
    fn baseline_used_for_unscored_records() {
        let mut records = vec![
            Record::new("a", "x", "", "reddit"),
            Record::new("b", "x", "", "wikipedia"),
        ];
        rank(&mut records, baseline);
        assert_eq!(records[0].source, "wikipedia");
    }

    #[test]
    fn output_keys_are_non_increasing() {
        let mut records = vec![
            scored("Rust compiler", "rust compiler", "https://a.edu", "bing"),
            Record::new("Unscored", "x", "", "wikipedia"),
            scored("Compiler news", "compiler", "https://b.com", "reddit"),
            scored("Cooking", "pasta", "", "reddit"),
        ];
        rank(&mut records, baseline);
        let keys: Vec<RankKey> = records
            .iter()
            .map(|r| RankKey::of(r, baseline(&r.source)))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn ranking_is_order_independent() {
        let a = Record::new("a", "x", "https://a.com", "bing");
        let b = Record::new("b", "x", "https://b.com", "bing");
        let mut forward = vec![a.clone(), b.clone()];
        let mut backward = vec![b, a];
        rank(&mut forward, baseline);
        rank(&mut backward, baseline);
        assert_eq!(forward, backward);
    }
}
