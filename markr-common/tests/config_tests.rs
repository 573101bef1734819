//! Tests for bootstrap configuration loading
//!
//! Covers the priority order (overrides > TOML file > compiled defaults) and the
//! rule that a missing config file is not fatal.

use markr_common::config::{
    default_database_path, load_toml_config, locate_config_file, ConfigOverrides, ServerConfig,
    DEFAULT_PORT,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_defaults_without_overrides_or_file() {
    let config = ServerConfig::resolve(ConfigOverrides::default(), None);

    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.database_path, default_database_path());
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_default_database_path_names_markr_db() {
    let path = default_database_path();
    assert_eq!(path.file_name().unwrap(), "markr.db");
}

#[test]
fn test_toml_file_values_are_used() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
port = 8080
database_path = "/tmp/markr-test.db"

[logging]
level = "debug"
"#,
    );

    let toml = load_toml_config(&path).unwrap();
    let config = ServerConfig::resolve(ConfigOverrides::default(), Some(toml));

    assert_eq!(config.port, 8080);
    assert_eq!(config.database_path, PathBuf::from("/tmp/markr-test.db"));
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_partial_toml_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "port = 9000\n");

    let toml = load_toml_config(&path).unwrap();
    let config = ServerConfig::resolve(ConfigOverrides::default(), Some(toml));

    assert_eq!(config.port, 9000);
    assert_eq!(config.database_path, default_database_path());
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_overrides_take_precedence_over_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "port = 8080\n[logging]\nlevel = \"debug\"\n");

    let toml = load_toml_config(&path).unwrap();
    let overrides = ConfigOverrides {
        port: Some(5000),
        database_path: Some(PathBuf::from("override.db")),
        log_level: Some("warn".to_string()),
    };
    let config = ServerConfig::resolve(overrides, Some(toml));

    assert_eq!(config.port, 5000);
    assert_eq!(config.database_path, PathBuf::from("override.db"));
    assert_eq!(config.log_level, "warn");
}

#[test]
fn test_invalid_toml_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "port = \"not a number\"\n");

    let err = load_toml_config(&path).unwrap_err();
    assert!(
        matches!(err, markr_common::Error::Config(_)),
        "Expected config error, got {:?}",
        err
    );
}

#[test]
fn test_explicit_missing_config_file_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    assert!(locate_config_file(Some(&missing)).is_err());
}

#[test]
fn test_explicit_config_file_is_located() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    assert_eq!(locate_config_file(Some(&path)).unwrap(), Some(path));
}
