//! Search orchestrator: concurrent fan-out, analysis, aggregation, caching.
//!
//! [`gather`] dispatches one query to many sources at once and isolates
//! their failures; [`Engine`] wraps it with scoring, clustering, ranking
//! and the result cache.

pub mod gather;
pub mod search;

pub use gather::{gather, GatherOutcome};
pub use search::Engine;
