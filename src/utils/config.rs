use crate::index::lookup::LookupPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "geotrie";
const CONFIG_FILE: &str = "config.json";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Index used when a command is given no `--index`
    #[serde(default)]
    pub default_index: Option<PathBuf>,

    /// Gate and key lengths for `lookup`
    #[serde(default)]
    pub lookup: LookupPolicy,

    /// Tracing filter used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_index: None,
            lookup: LookupPolicy::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    /// Load config from an explicit path, or return default if it does not exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
        config.lookup.validate()?;
        Ok(config)
    }

    /// Save config to `config_path`
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Index to use given an optional command-line override
    pub fn resolve_index(&self, cli_index: Option<PathBuf>) -> Result<PathBuf> {
        cli_index
            .or_else(|| self.default_index.clone())
            .context("No index given. Pass --index or set default_index in the config file.")
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_app_data_dir()?.join(CONFIG_FILE))
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    Ok(base.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = tempdir().unwrap();
        let config = AppConfig::load_from(&temp_dir.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.lookup, LookupPolicy::GEOHASH6);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{ "default_index": "/data/geohash_trie.bin" }"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_index, Some(PathBuf::from("/data/geohash_trie.bin")));
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.lookup, LookupPolicy::GEOHASH6);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        let config = AppConfig {
            default_index: Some(PathBuf::from("idx.bin")),
            lookup: LookupPolicy {
                gate_len: 2,
                key_len: 5,
            },
            log_filter: "debug".to_string(),
        };

        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{ "lookup": { "gate_len": 6, "key_len": 6 } }"#).unwrap();

        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_resolve_index() {
        let config = AppConfig {
            default_index: Some(PathBuf::from("default.bin")),
            ..AppConfig::default()
        };
        assert_eq!(
            config.resolve_index(Some(PathBuf::from("cli.bin"))).unwrap(),
            PathBuf::from("cli.bin")
        );
        assert_eq!(config.resolve_index(None).unwrap(), PathBuf::from("default.bin"));
        assert!(AppConfig::default().resolve_index(None).is_err());
    }
}
