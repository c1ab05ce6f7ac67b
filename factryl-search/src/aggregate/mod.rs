//! Aggregator: cluster near-duplicates, then rank the representatives.

pub mod cluster;
pub mod rank;
pub mod url_normalize;

use crate::types::Record;

pub use cluster::{cluster, Cluster};
pub use rank::{rank, RankKey};

/// Output of [`aggregate`].
#[derive(Debug, Clone, Default)]
pub struct Aggregated {
    /// Ranked representatives, best first.
    pub items: Vec<Record>,
    /// Records received before clustering.
    pub total: usize,
}

impl Aggregated {
    /// Records removed as near-duplicates.
    pub fn duplicates_removed(&self) -> usize {
        self.total - self.items.len()
    }
}

/// Collapse near-duplicates and rank what remains.
///
/// The result depends only on the set of input records, never on their
/// arrival order.
pub fn aggregate<F>(records: Vec<Record>, threshold: f64, baseline: F) -> Aggregated
where
    F: Fn(&str) -> f64,
{
    let total = records.len();
    let mut items: Vec<Record> = cluster(records, threshold)
        .into_iter()
        .map(|c| c.representative)
        .collect();
    rank(&mut items, baseline);
    tracing::debug!(total, unique = items.len(), "aggregated records");
    Aggregated { items, total }
}
