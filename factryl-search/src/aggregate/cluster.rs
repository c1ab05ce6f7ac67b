//! Near-duplicate clustering.
//!
//! Two records belong to the same cluster when they share a content
//! identity, share a non-empty normalised URL, or have titles whose token
//! sets are at least `threshold` similar. Clusters are the transitive
//! closure of that relation, computed with a union-find, so the result
//! does not depend on input order.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde_json::Value;

use crate::analysis::text::{jaccard, normalize_text};
use crate::types::{Record, SOURCES_KEY};

/// Metadata key holding the number of records merged into a representative.
pub const CLUSTER_SIZE_KEY: &str = "cluster_size";

/// A set of near-duplicate records collapsed to one representative.
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Best record of the cluster, with merged source names in its metadata.
    pub representative: Record,
    /// Sorted, de-duplicated names of every contributing source.
    pub sources: Vec<String>,
    /// Number of records in the cluster.
    pub size: usize,
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Smaller index wins so roots are stable.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

struct Fingerprint {
    identity: String,
    url: String,
    title_tokens: Vec<String>,
}

impl Fingerprint {
    fn of(record: &Record) -> Self {
        Self {
            identity: record.identity(),
            url: record.normalized_url(),
            title_tokens: normalize_text(&record.title)
                .split_whitespace()
                .map(str::to_owned)
                .collect(),
        }
    }

    fn is_duplicate(&self, other: &Self, threshold: f64) -> bool {
        if self.identity == other.identity {
            return true;
        }
        if !self.url.is_empty() && self.url == other.url {
            return true;
        }
        !self.title_tokens.is_empty()
            && !other.title_tokens.is_empty()
            && jaccard(&self.title_tokens, &other.title_tokens) >= threshold
    }
}

/// Group `records` into clusters of near-duplicates.
pub fn cluster(records: Vec<Record>, threshold: f64) -> Vec<Cluster> {
    let fingerprints: Vec<Fingerprint> = records.iter().map(Fingerprint::of).collect();
    let mut sets = DisjointSet::new(records.len());
    for i in 0..records.len() {
        for j in (i + 1)..records.len() {
            if fingerprints[i].is_duplicate(&fingerprints[j], threshold) {
                sets.union(i, j);
            }
        }
    }

    let mut groups: Vec<Vec<Record>> = Vec::new();
    let mut slot_of_root: Vec<Option<usize>> = vec![None; records.len()];
    for (i, record) in records.into_iter().enumerate() {
        let root = sets.find(i);
        let slot = *slot_of_root[root].get_or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(record);
    }

    groups.into_iter().filter_map(merge).collect()
}

/// Representative preference: higher credibility × relevance, then
/// higher credibility, then higher relevance; identity and source break
/// the remaining ties.
pub fn prefer(a: &Record, b: &Record) -> Ordering {
    let quality = |r: &Record| r.credibility().unwrap_or(0.0) * r.relevance().unwrap_or(0.0);
    quality(a)
        .total_cmp(&quality(b))
        .then_with(|| {
            a.credibility()
                .unwrap_or(0.0)
                .total_cmp(&b.credibility().unwrap_or(0.0))
        })
        .then_with(|| {
            a.relevance()
                .unwrap_or(0.0)
                .total_cmp(&b.relevance().unwrap_or(0.0))
        })
        .then_with(|| b.identity().cmp(&a.identity()))
        .then_with(|| b.source.cmp(&a.source))
}

fn merge(members: Vec<Record>) -> Option<Cluster> {
    let size = members.len();
    let sources: Vec<String> = members
        .iter()
        .flat_map(Record::contributing_sources)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut representative = members.into_iter().max_by(prefer)?;
    representative.metadata.insert(
        SOURCES_KEY.to_owned(),
        Value::Array(sources.iter().cloned().map(Value::String).collect()),
    );
    representative
        .metadata
        .insert(CLUSTER_SIZE_KEY.to_owned(), Value::from(size));

    Some(Cluster {
        representative,
        sources,
        size,
    })
}
