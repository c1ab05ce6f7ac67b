//! Application directory paths for Factryl.
//!
//! Uses the [`dirs`] crate for platform-appropriate resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Config | `~/Library/Application Support/factryl/` | `~/.config/factryl/` |
//! | Data (logs) | `~/Library/Application Support/factryl/` | `~/.local/share/factryl/` |
//!
//! `FACTRYL_CONFIG_DIR` and `FACTRYL_DATA_DIR` override the defaults.

use std::path::PathBuf;

/// Application config directory.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("FACTRYL_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("factryl"))
        .unwrap_or_else(|| PathBuf::from("/tmp/factryl-config"))
}

/// Application data directory; log files go under `logs/`.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("FACTRYL_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("factryl"))
        .unwrap_or_else(|| PathBuf::from("/tmp/factryl-data"))
}

/// Default log directory.
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}
