//! Configuration loading and database path resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the database location
pub const DATABASE_ENV_VAR: &str = "ECMO_DATABASE";

/// Default bind address for the directory service
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5730";

/// Default folder holding the seed CSV exports
pub const DEFAULT_SEED_DATA_DIR: &str = "seed-data";

/// Optional settings read from `config.toml`
///
/// Every field is optional; a missing file is equivalent to an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// SQLite database file
    pub database_path: Option<PathBuf>,
    /// Default tracing filter directive (e.g. "info", "ecmo_seed=debug")
    pub log_level: Option<String>,
    /// Folder containing ecmo-centers.csv and ecmo-team-members.csv
    pub seed_data_dir: Option<PathBuf>,
    /// Listen address for ecmo-directory
    pub bind_address: Option<String>,
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from an explicit file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from an explicit path, or from the platform
    /// config file when none is given.
    ///
    /// A missing platform file yields defaults. An explicit path that cannot
    /// be read, or a file that fails to parse, is an error.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with_source(explicit).map(|(config, _)| config)
    }

    /// Like [`TomlConfig::load_or_default`], also reporting where the
    /// settings came from.
    ///
    /// Does not log; call [`ConfigSource::log`] once tracing is installed.
    pub fn load_with_source(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            let config = Self::load(path)?;
            return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
        }

        match find_config_file() {
            Some(path) => {
                let config = Self::load(&path)?;
                Ok((config, ConfigSource::Platform(path)))
            }
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    /// Tracing filter directive, falling back to "info"
    pub fn log_directive(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

/// Where a loaded [`TomlConfig`] came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` on the command line
    Explicit(PathBuf),
    /// Platform config file found by search
    Platform(PathBuf),
    /// No file; every setting is defaulted
    Defaults,
}

impl ConfigSource {
    /// Config file path, if one was read
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::Platform(path) => Some(path),
            ConfigSource::Defaults => None,
        }
    }

    /// Report the source; call after the tracing subscriber is installed
    pub fn log(&self) {
        match self.path() {
            Some(path) => info!("Configuration: {}", path.display()),
            None => warn!("No config file found, using defaults"),
        }
    }
}

/// Database path resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML config `database_path`
/// 4. OS-dependent compiled default
pub fn resolve_database_path(
    cli_arg: Option<&str>,
    env_var_name: &str,
    config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.database_path {
        return path.clone();
    }

    default_database_path()
}

/// Locate the platform config file, if one exists
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("ecmo").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/ecmo/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/ecmo/ecmo.db
        dirs::data_local_dir()
            .map(|d| d.join("ecmo"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/ecmo"))
            .join("ecmo.db")
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/ecmo/ecmo.db
        dirs::data_dir()
            .map(|d| d.join("ecmo"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/ecmo"))
            .join("ecmo.db")
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\ecmo\ecmo.db
        dirs::data_local_dir()
            .map(|d| d.join("ecmo"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\ecmo"))
            .join("ecmo.db")
    } else {
        PathBuf::from("./ecmo_data/ecmo.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_parses_to_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.log_directive(), "info");
    }

    #[test]
    fn test_full_config_parses() {
        let config = TomlConfig::from_toml_str(
            r#"
            database_path = "/srv/ecmo/directory.db"
            log_level = "debug"
            seed_data_dir = "/srv/ecmo/seed"
            bind_address = "0.0.0.0:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, Some(PathBuf::from("/srv/ecmo/directory.db")));
        assert_eq!(config.log_directive(), "debug");
        assert_eq!(config.seed_data_dir, Some(PathBuf::from("/srv/ecmo/seed")));
        assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0:8080"));
    }

    #[test]
    fn test_malformed_config_is_config_error() {
        let result = TomlConfig::from_toml_str("database_path = [1, 2");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_cli_argument_wins() {
        let config = TomlConfig {
            database_path: Some(PathBuf::from("/from/config.db")),
            ..Default::default()
        };
        let path = resolve_database_path(Some("/from/cli.db"), "ECMO_TEST_UNSET_VAR", &config);
        assert_eq!(path, PathBuf::from("/from/cli.db"));
    }

    #[test]
    fn test_default_path_ends_with_db_file() {
        let path = default_database_path();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("ecmo.db"));
    }
}
