//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! stackrunner has two configuration scopes:
//! - **Global**: User-level settings
//! - **Project**: Overrides for the directory the tool runs in
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$STACKRUNNER_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/stackrunner/config.toml`
//! 3. `~/.stackrunner/config.toml`
//!
//! # Project Config Location
//!
//! `.stackrunner/config.toml` in the working directory.
//!
//! # Example
//!
//! ```no_run
//! use stackrunner::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("."))).unwrap();
//! println!("Poll interval: {:?}", config.poll_interval());
//! ```

pub mod schema;

pub use schema::{FileConfig, InvokeConfig, PackageConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Default seconds between two status queries.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Capability acknowledged on create and update unless configured otherwise.
pub const DEFAULT_CAPABILITY: &str = "CAPABILITY_NAMED_IAM";

/// Default invocation type.
pub const DEFAULT_INVOCATION_TYPE: &str = "RequestResponse";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default)]
pub struct Config {
    file: FileConfig,
    /// Files that contributed, global first
    sources: Vec<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `project_dir` is provided, also loads the project config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(project_dir: Option<&Path>) -> Result<Config, ConfigError> {
        let mut sources = Vec::new();

        let global = match Self::global_path() {
            Some(path) => {
                let config = Self::read(&path)?;
                sources.push(path);
                config
            }
            None => FileConfig::default(),
        };

        let project = match project_dir.map(Self::project_path) {
            Some(path) if path.exists() => {
                let config = Self::read(&path)?;
                sources.push(path);
                config
            }
            _ => FileConfig::default(),
        };

        let file = global.merged_with(project);
        file.validate()?;

        Ok(Config { file, sources })
    }

    /// Build a configuration directly from file contents.
    pub fn from_file(file: FileConfig) -> Result<Config, ConfigError> {
        file.validate()?;
        Ok(Config {
            file,
            sources: Vec::new(),
        })
    }

    /// Locate the global config file, if any exists.
    fn global_path() -> Option<PathBuf> {
        // 1. Check $STACKRUNNER_CONFIG
        if let Ok(path) = std::env::var("STACKRUNNER_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/stackrunner/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("stackrunner/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.stackrunner/config.toml
        dirs::home_dir()
            .map(|home| home.join(".stackrunner/config.toml"))
            .filter(|path| path.exists())
    }

    /// Path of the project config below `dir`.
    pub fn project_path(dir: &Path) -> PathBuf {
        dir.join(".stackrunner/config.toml")
    }

    /// Read and parse one config file.
    fn read(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Files that contributed to this configuration.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Region used when `-region` is not given.
    pub fn region(&self) -> Option<&str> {
        self.file.region.as_deref()
    }

    /// Delay between two status queries.
    ///
    /// Defaults to 5 seconds.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.file
                .poll_interval_secs
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        )
    }

    /// Capabilities acknowledged on create and update.
    ///
    /// Defaults to `CAPABILITY_NAMED_IAM`.
    pub fn capabilities(&self) -> Vec<String> {
        self.file
            .capabilities
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_CAPABILITY.to_string()])
    }

    /// Whether `.zip` files are left out of directory archives.
    ///
    /// Defaults to `false`.
    pub fn skip_archives(&self) -> bool {
        self.file
            .package
            .as_ref()
            .and_then(|p| p.skip_archives)
            .unwrap_or(false)
    }

    /// Invocation type used when `-type` is not given.
    ///
    /// Defaults to `RequestResponse`.
    pub fn invocation_type(&self) -> &str {
        self.file
            .invoke
            .as_ref()
            .and_then(|i| i.invocation_type.as_deref())
            .unwrap_or(DEFAULT_INVOCATION_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.region(), None);
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.capabilities(), vec!["CAPABILITY_NAMED_IAM"]);
        assert!(!config.skip_archives());
        assert_eq!(config.invocation_type(), "RequestResponse");
    }

    #[test]
    fn project_file_is_read() {
        let dir = TempDir::new().unwrap();
        let path = Config::project_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "poll_interval_secs = 1\n[package]\nskip_archives = true\n").unwrap();

        let config = Config::load(Some(dir.path())).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert!(config.skip_archives());
        assert!(config.sources().contains(&path));
    }

    #[test]
    fn unparsable_project_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = Config::project_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "poll_interval_secs = \"soon\"").unwrap();

        let err = Config::load(Some(dir.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn from_file_validates() {
        let file = FileConfig {
            poll_interval_secs: Some(0),
            ..Default::default()
        };
        assert!(Config::from_file(file).is_err());
    }
}
