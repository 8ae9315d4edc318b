//! core::config::schema
//!
//! Configuration schema types.
//!
//! Every key is optional in the file; anything omitted takes the built-in
//! default, so an empty file is a valid configuration.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., branch must be a valid branch name, file paths
//! inside the repository must be relative).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::BranchName;

/// Default GitHub REST API base.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Publisher configuration.
///
/// # Example
///
/// ```toml
/// template = "index.html"
/// allowlist = "valid_cities.txt"
/// enforce_allowlist = true
/// placeholder = "Oklahoma City"
/// repo_prefix = "The-"
/// repo_suffix = "-Software-Guild"
/// branch = "main"
///
/// [readiness]
/// initial_interval_ms = 500
/// max_interval_ms = 4000
/// max_wait_ms = 30000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PublisherConfig {
    /// Local HTML template to render
    pub template: PathBuf,

    /// Newline-delimited list of permitted cities
    pub allowlist: PathBuf,

    /// Reject cities missing from the allow-list
    pub enforce_allowlist: bool,

    /// Literal text in the template replaced by the city
    pub placeholder: String,

    /// Repository name prefix (also the leading title words)
    pub repo_prefix: String,

    /// Repository name suffix (also the trailing title words)
    pub repo_suffix: String,

    /// Branch the site is committed to and served from
    pub branch: BranchName,

    /// Marker file committed next to the document
    pub marker_path: String,

    /// Path of the rendered document inside the repository
    pub document_path: String,

    /// Ask the platform to create an initial commit for new repositories
    pub auto_init: bool,

    /// REST API base URL
    pub api_base: String,

    /// Polling after repository creation
    pub readiness: ReadinessConfig,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from("index.html"),
            allowlist: PathBuf::from("valid_cities.txt"),
            enforce_allowlist: true,
            placeholder: "Oklahoma City".to_string(),
            repo_prefix: "The-".to_string(),
            repo_suffix: "-Software-Guild".to_string(),
            branch: BranchName::new("main").expect("default branch is valid"),
            marker_path: ".nojekyll".to_string(),
            document_path: "index.html".to_string(),
            auto_init: true,
            api_base: DEFAULT_API_BASE.to_string(),
            readiness: ReadinessConfig::default(),
        }
    }
}

impl PublisherConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.placeholder.is_empty() {
            return Err(ConfigError::InvalidValue(
                "placeholder cannot be empty".to_string(),
            ));
        }

        validate_repo_path("marker_path", &self.marker_path)?;
        validate_repo_path("document_path", &self.document_path)?;
        if self.marker_path == self.document_path {
            return Err(ConfigError::InvalidValue(
                "marker_path and document_path must differ".to_string(),
            ));
        }

        if !(self.api_base.starts_with("https://") || self.api_base.starts_with("http://")) {
            return Err(ConfigError::InvalidValue(format!(
                "api_base '{}' must be an http(s) URL",
                self.api_base
            )));
        }

        self.readiness.validate()
    }

    /// Make local file paths absolute against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.template.is_relative() {
            self.template = base.join(&self.template);
        }
        if self.allowlist.is_relative() {
            self.allowlist = base.join(&self.allowlist);
        }
    }

    /// API base without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }
}

/// Bounded exponential backoff used while a new repository settles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ReadinessConfig {
    /// First wait between readiness checks
    pub initial_interval_ms: u64,

    /// Upper bound for a single wait
    pub max_interval_ms: u64,

    /// Total time to wait before giving up
    pub max_wait_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: 500,
            max_interval_ms: 4_000,
            max_wait_ms: 30_000,
        }
    }
}

impl ReadinessConfig {
    /// Longest total wait accepted from configuration (one hour).
    pub const MAX_WAIT_MS: u64 = 3_600_000;

    /// Validate interval ordering and bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_wait_ms > Self::MAX_WAIT_MS {
            return Err(ConfigError::InvalidValue(format!(
                "readiness.max_wait_ms ({}) exceeds {}",
                self.max_wait_ms,
                Self::MAX_WAIT_MS
            )));
        }
        if self.initial_interval_ms == 0 && self.max_wait_ms > 0 {
            return Err(ConfigError::InvalidValue(
                "readiness.initial_interval_ms must be positive when readiness.max_wait_ms is set"
                    .to_string(),
            ));
        }
        if self.initial_interval_ms > self.max_interval_ms {
            return Err(ConfigError::InvalidValue(format!(
                "readiness.initial_interval_ms ({}) exceeds readiness.max_interval_ms ({})",
                self.initial_interval_ms, self.max_interval_ms
            )));
        }
        Ok(())
    }

    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

/// Paths inside the remote repository must be relative and non-empty.
fn validate_repo_path(key: &str, path: &str) -> Result<(), ConfigError> {
    if path.is_empty() {
        return Err(ConfigError::InvalidValue(format!("{key} cannot be empty")));
    }
    if path.starts_with('/') || path.split('/').any(|c| c.is_empty() || c == "..") {
        return Err(ConfigError::InvalidValue(format!(
            "{key} '{path}' must be a relative path inside the repository"
        )));
    }
    Ok(())
}
