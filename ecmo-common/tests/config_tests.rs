//! Integration tests for configuration loading and database path resolution
//!
//! Tests that manipulate ECMO_DATABASE are marked with #[serial] so they do
//! not race each other on the process environment.

use ecmo_common::config::{resolve_database_path, ConfigSource, TomlConfig, DATABASE_ENV_VAR};
use ecmo_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_explicit_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        "database_path = \"/srv/ecmo/ecmo.db\"\nbind_address = \"127.0.0.1:9000\"\n",
    )
    .unwrap();

    let config = TomlConfig::load_or_default(Some(&path)).unwrap();

    assert_eq!(config.database_path, Some(PathBuf::from("/srv/ecmo/ecmo.db")));
    assert_eq!(config.bind_address.as_deref(), Some("127.0.0.1:9000"));
    assert!(config.log_level.is_none());
}

#[test]
fn test_explicit_config_reports_its_source() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "log_level = \"debug\"\n").unwrap();

    let (config, source) = TomlConfig::load_with_source(Some(&path)).unwrap();

    assert_eq!(config.log_directive(), "debug");
    assert_eq!(source, ConfigSource::Explicit(path.clone()));
    assert_eq!(source.path(), Some(path.as_path()));
}

#[test]
fn test_defaults_source_has_no_path() {
    assert!(ConfigSource::Defaults.path().is_none());
}

#[test]
fn test_missing_explicit_config_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("does-not-exist.toml");

    let result = TomlConfig::load_or_default(Some(&path));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_unknown_keys_ignored() {
    let config = TomlConfig::from_toml_str("root_folder = \"/music\"\nlog_level = \"warn\"").unwrap();
    assert_eq!(config.log_directive(), "warn");
}

#[test]
#[serial]
fn test_env_var_beats_config() {
    env::set_var(DATABASE_ENV_VAR, "/tmp/ecmo-env.db");

    let config = TomlConfig {
        database_path: Some(PathBuf::from("/tmp/ecmo-config.db")),
        ..Default::default()
    };
    let path = resolve_database_path(None, DATABASE_ENV_VAR, &config);

    env::remove_var(DATABASE_ENV_VAR);
    assert_eq!(path, PathBuf::from("/tmp/ecmo-env.db"));
}

#[test]
#[serial]
fn test_cli_beats_env_var() {
    env::set_var(DATABASE_ENV_VAR, "/tmp/ecmo-env.db");

    let path = resolve_database_path(Some("/tmp/ecmo-cli.db"), DATABASE_ENV_VAR, &TomlConfig::default());

    env::remove_var(DATABASE_ENV_VAR);
    assert_eq!(path, PathBuf::from("/tmp/ecmo-cli.db"));
}

#[test]
#[serial]
fn test_config_beats_default() {
    env::remove_var(DATABASE_ENV_VAR);

    let config = TomlConfig {
        database_path: Some(PathBuf::from("/tmp/ecmo-config.db")),
        ..Default::default()
    };
    let path = resolve_database_path(None, DATABASE_ENV_VAR, &config);

    assert_eq!(path, PathBuf::from("/tmp/ecmo-config.db"));
}

#[test]
#[serial]
fn test_falls_back_to_default() {
    env::remove_var(DATABASE_ENV_VAR);

    let path = resolve_database_path(None, DATABASE_ENV_VAR, &TomlConfig::default());

    assert_eq!(path, ecmo_common::config::default_database_path());
}
