//! Data directory layout.
//!
//! ```text
//! {data_dir}/
//!   config.toml
//!   registry.json
//!   backups/registry-20260101T120000.000Z.json
//! ```

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PERSONA_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `PERSONA_DATA_DIR` environment variable
/// 2. `~/.persona`
/// 3. `.persona` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".persona");
    }

    PathBuf::from(".persona")
}

pub fn registry_path(data_dir: &Path) -> PathBuf {
    data_dir.join("registry.json")
}

/// Sibling of the registry file used for atomic replacement.
pub fn registry_tmp_path(data_dir: &Path) -> PathBuf {
    data_dir.join("registry.json.tmp")
}

pub fn backups_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("backups")
}
