//! core::config
//!
//! Configuration loading.
//!
//! # Locations
//!
//! The first file found wins; nothing is merged across files:
//! 1. `--config <path>` (must exist)
//! 2. `$GUILD_PUBLISH_CONFIG` if set (must exist)
//! 3. `<cwd>/guild-publish.toml`
//! 4. `$XDG_CONFIG_HOME/guild-publish/config.toml` (or the platform config dir)
//!
//! With no file, built-in defaults are used. Relative template and allow-list
//! paths are resolved against the working directory, not the config file.
//!
//! # Example
//!
//! ```no_run
//! use guild_publish::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Path::new("/srv/guild"), None).unwrap();
//! for warning in &result.warnings {
//!     eprintln!("warning: {}", warning.message);
//! }
//! println!("Template: {}", result.config.settings.template.display());
//! ```

pub mod schema;

pub use schema::{PublisherConfig, ReadinessConfig, DEFAULT_API_BASE};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "GUILD_PUBLISH_CONFIG";

/// Config file name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "guild-publish.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file '{0}' does not exist")]
    NotFound(PathBuf),

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

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning, if any.
    pub path: Option<PathBuf>,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Effective configuration and where it came from.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Validated settings with local paths resolved
    pub settings: PublisherConfig,
    /// File the settings were read from (`None` for defaults)
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Wrap already-built settings (used by tests and embedding callers).
    pub fn from_settings(settings: PublisherConfig) -> Self {
        Self {
            settings,
            loaded_from: None,
        }
    }

    /// Load configuration for a working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named config file is missing, or if
    /// any found file cannot be read, parsed, or validated.
    pub fn load(cwd: &Path, explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::load_with_env(cwd, explicit, from_env)
    }

    fn load_with_env(
        cwd: &Path,
        explicit: Option<&Path>,
        from_env: Option<PathBuf>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let path = Self::locate(cwd, explicit, from_env)?;
        let mut settings = match &path {
            Some(p) => Self::read_config(p)?,
            None => PublisherConfig::default(),
        };

        settings.validate()?;
        settings.resolve_paths(cwd);

        if !settings.enforce_allowlist {
            warnings.push(ConfigWarning {
                message: "allow-list enforcement is disabled; any city name will be published"
                    .to_string(),
                path: path.clone(),
            });
        }

        Ok(ConfigLoadResult {
            config: Config {
                settings,
                loaded_from: path,
            },
            warnings,
        })
    }

    /// Find the config file to use, if any.
    fn locate(
        cwd: &Path,
        explicit: Option<&Path>,
        from_env: Option<PathBuf>,
    ) -> Result<Option<PathBuf>, ConfigError> {
        // 1. --config
        if let Some(path) = explicit {
            let path = absolutize(cwd, path);
            if !path.exists() {
                return Err(ConfigError::NotFound(path));
            }
            return Ok(Some(path));
        }

        // 2. $GUILD_PUBLISH_CONFIG
        if let Some(path) = from_env.filter(|p| !p.as_os_str().is_empty()) {
            let path = absolutize(cwd, &path);
            if !path.exists() {
                return Err(ConfigError::NotFound(path));
            }
            return Ok(Some(path));
        }

        // 3. <cwd>/guild-publish.toml
        let local = cwd.join(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Ok(Some(local));
        }

        // 4. user config directory
        if let Some(dir) = dirs::config_dir() {
            let path = dir.join("guild-publish/config.toml");
            if path.exists() {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<PublisherConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Path of the file the settings came from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(&self.settings).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        cwd.join(path)
    } else {
        path.to_path_buf()
    }
}
