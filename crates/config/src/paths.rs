//! Path utilities

use std::path::PathBuf;

/// Client data directory (~/.agentos)
///
/// Falls back to the working directory when no home directory is known.
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".agentos")
}

pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}
