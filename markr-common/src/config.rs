//! Bootstrap configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument or environment variable (highest priority)
//! 2. TOML config file
//! 3. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default HTTP port for the results service
pub const DEFAULT_PORT: u16 = 4567;

/// Default database file name inside the data folder
pub const DEFAULT_DATABASE_FILE: &str = "markr.db";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional so a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Path to SQLite database file (relative or absolute)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Fully resolved server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub database_path: PathBuf,
    pub log_level: String,
}

impl ServerConfig {
    /// Merge overrides, the optional TOML file and compiled defaults
    pub fn resolve(overrides: ConfigOverrides, toml: Option<TomlConfig>) -> Self {
        let toml = toml.unwrap_or_default();

        Self {
            port: overrides.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            database_path: overrides
                .database_path
                .or(toml.database_path)
                .unwrap_or_else(default_database_path),
            log_level: overrides
                .log_level
                .or(toml.logging.level)
                .unwrap_or_else(|| "info".to_string()),
        }
    }
}

/// Parse a TOML bootstrap file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}

/// Locate the TOML config file
///
/// An explicit path must exist. Without one, the user config directory is tried
/// first, then `/etc/markr/config.toml` on Linux. Returns `Ok(None)` when no file
/// is present; a missing config file is not fatal.
pub fn locate_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(Some(path.to_path_buf()));
        }
        return Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let user_config = dirs::config_dir().map(|d| d.join("markr").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/markr/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }
    }

    Ok(None)
}

/// Get OS-dependent default database path
pub fn default_database_path() -> PathBuf {
    let data_dir = if cfg!(target_os = "linux") {
        // ~/.local/share/markr (or /var/lib/markr for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("markr"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/markr"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("markr"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/markr"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("markr"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\markr"))
    } else {
        PathBuf::from("./markr_data")
    };

    data_dir.join(DEFAULT_DATABASE_FILE)
}
