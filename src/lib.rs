//! Factryl: multi-source content aggregation.
//!
//! This crate wires the aggregation core in [`factryl_search`] to the
//! outside world:
//!
//! - **Collectors**: HTTP-backed sources (DuckDuckGo, Bing, Wikipedia,
//!   Hacker News) and the default registration list
//! - **Configuration**: `config.toml` loading and saving
//! - **Logging**: `tracing` subscriber set-up for the binary
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> factryl::Result<()> {
//! let config = factryl::FactrylConfig::default();
//! let engine = factryl::build_engine(&config).await?;
//! let response = engine.search("rust async runtimes", 10, None).await;
//! println!("{} items", response.items.len());
//! engine.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod collectors;
pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use config::{FactrylConfig, LoggingConfig};
pub use error::{FactrylError, Result};
pub use factryl_search::{Engine, SearchResponse};

/// Build an [`Engine`] over every built-in collector.
///
/// # Errors
///
/// Returns [`FactrylError::Search`] if the engine configuration is invalid.
pub async fn build_engine(config: &FactrylConfig) -> Result<Engine> {
    let engine = Engine::new(config.engine.clone(), collectors::default_registrations()).await?;
    Ok(engine)
}
