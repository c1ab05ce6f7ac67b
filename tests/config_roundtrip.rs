//! Configuration persistence tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use factryl::{FactrylConfig, FactrylError};
use factryl_search::SourceSettings;

#[test]
fn save_then_load_preserves_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = FactrylConfig::default();
    config.engine.max_results = 12;
    config.engine.cache.ttl_override_secs = Some(300);
    config.engine.sources.insert(
        "wikipedia".into(),
        SourceSettings {
            rate_limit_per_sec: Some(2.5),
            max_results: Some(5),
            base_url: Some("http://localhost:8080".into()),
            ..Default::default()
        },
    );
    config.logging.level = "debug".into();
    config.logging.file_dir = Some(dir.path().join("logs"));

    config.save_to_file(&path).unwrap();
    let loaded = FactrylConfig::from_file(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = FactrylConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(loaded, FactrylConfig::default());
}

#[test]
fn malformed_toml_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[engine\nmax_results = ").unwrap();

    let err = FactrylConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, FactrylError::Config(_)));
}

#[test]
fn invalid_engine_settings_are_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[engine]\nmax_results = 0\n").unwrap();

    let err = FactrylConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, FactrylError::Search(_)));
    assert!(err.to_string().contains("max_results"));
}

#[test]
fn unreadable_path_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FactrylConfig::from_file(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, FactrylError::Io(_)));
}
