//! Global configuration types for Persona.
//!
//! `GlobalConfig` represents the top-level `config.toml` in the data
//! directory. Every field has a default, so an empty file is valid.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub personality: PersonalityConfig,
}

/// Registry file and backup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Copy the previous registry file into `backups/` before every save.
    #[serde(default = "default_auto_backup")]
    pub auto_backup: bool,

    /// Number of backups kept; older ones are deleted after each save.
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,
}

fn default_auto_backup() -> bool {
    true
}

fn default_max_backups() -> usize {
    5
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            auto_backup: default_auto_backup(),
            max_backups: default_max_backups(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityConfig {
    /// Template used for `create bot` when none is given.
    #[serde(default = "default_template")]
    pub default_template: String,
}

fn default_template() -> String {
    "neutral".to_string()
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        Self {
            default_template: default_template(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert!(config.storage.auto_backup);
        assert_eq!(config.storage.max_backups, 5);
        assert_eq!(config.personality.default_template, "neutral");
    }

    #[test]
    fn test_global_config_deserialize_empty() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.storage.max_backups, 5);
        assert_eq!(config.personality.default_template, "neutral");
    }

    #[test]
    fn test_global_config_partial_section() {
        let toml_str = r#"
[storage]
max_backups = 12

[personality]
default_template = "creative"
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert!(config.storage.auto_backup);
        assert_eq!(config.storage.max_backups, 12);
        assert_eq!(config.personality.default_template, "creative");
    }
}
