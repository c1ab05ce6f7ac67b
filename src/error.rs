//! Error types for the factryl application crate.

use factryl_search::SearchError;

/// Top-level error type for configuration, I/O and engine start-up.
#[derive(Debug, thiserror::Error)]
pub enum FactrylError {
    /// Configuration file could not be parsed or serialised.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the aggregation core.
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, FactrylError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_display() {
        let err = FactrylError::Config("bad toml".into());
        assert_eq!(err.to_string(), "config error: bad toml");
    }

    #[test]
    fn search_error_is_transparent() {
        let err = FactrylError::from(SearchError::Config("max_results must be greater than 0".into()));
        assert_eq!(err.to_string(), "config error: max_results must be greater than 0");
    }

    #[test]
    fn io_error_converts() {
        let err: FactrylError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(err.to_string().starts_with("I/O error"));
    }
}
