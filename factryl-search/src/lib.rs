//! # factryl-search
//!
//! Multi-source content aggregation core for Factryl.
//!
//! A query fans out concurrently to every registered collector (search
//! engines, encyclopedias, news feeds, forums). Each returned record is
//! scored for relevance, sentiment, credibility and bias, near-duplicates
//! are clustered, and the representatives are ranked by
//! relevance × credibility. Ranked lists are cached per query and source
//! selection.
//!
//! ## Design
//!
//! - Collectors implement [`Collector`] and are added through an explicit
//!   [`Registration`] list; failed validation excludes a source
//! - Every source is rate limited and wrapped in its own timeout
//! - One failing, hanging or panicking source never affects the others
//! - All scorers are pure functions of their input and a reference time
//! - The cache is best-effort: store failures degrade to a miss
//!
//! ## Security
//!
//! - API keys live only in [`SourceSettings`] and are never logged
//! - Query text is logged at trace level only
//! - No network listeners: this is a library
//!
//! # Examples
//!
//! ```no_run
//! # async fn example(registrations: Vec<factryl_search::Registration>) -> factryl_search::Result<()> {
//! let engine = factryl_search::Engine::new(Default::default(), registrations).await?;
//! let response = engine.search("rust programming", 10, None).await;
//! for item in &response.items {
//!     println!("{}: {}", item.title, item.url);
//! }
//! engine.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod analysis;
pub mod cache;
pub mod circuit_breaker;
pub mod collector;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod rate_limit;
pub mod registry;
pub mod types;

pub use analysis::{analyze_record, ScoreBag};
pub use cache::{CacheStore, MemoryStore, ResultCache};
pub use collector::Collector;
pub use config::{CacheConfig, EngineConfig, SourceSettings};
pub use error::{Result, SearchError};
pub use orchestrator::Engine;
pub use registry::{baseline_profile, Registration, Registry};
pub use types::{RawRecord, Record, SearchResponse, SearchStats, SourceClass, SourceProfile};
