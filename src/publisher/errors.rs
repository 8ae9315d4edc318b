//! publisher::errors
//!
//! Error type for a publish run.
//!
//! # Design
//!
//! Local failures (`Configuration`, `Validation`) are always raised before
//! the first remote call. Remote failures carry the underlying
//! [`ForgeError`] and say which step they interrupted. Error messages never
//! contain the credential.
//!
//! # Example
//!
//! ```
//! use guild_publish::forge::ForgeError;
//! use guild_publish::publisher::PublishError;
//!
//! let err = PublishError::lookup("repository octocat/site", ForgeError::RateLimited);
//! assert!(err.is_remote());
//! assert_eq!(err.to_string(), "failed to look up repository octocat/site: rate limited");
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::core::allowlist::AllowlistError;
use crate::core::template::TemplateError;
use crate::forge::ForgeError;

/// Errors from publishing a site.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A required input, file, or setting is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The city or a name derived from it is not acceptable.
    #[error("validation error: {0}")]
    Validation(String),

    /// A remote lookup failed for a reason other than "not found".
    #[error("failed to look up {what}: {source}")]
    RemoteLookup { what: String, source: ForgeError },

    /// A remote create or update failed.
    #[error("failed to {action}: {source}")]
    RemoteWrite { action: String, source: ForgeError },

    /// A newly created repository never became ready.
    #[error("repository {repo} was not ready after {waited:?}")]
    ReadinessTimeout { repo: String, waited: Duration },

    /// The branch cannot be created because the repository has no commits.
    #[error("repository {repo} has no commits to create branch '{branch}' from")]
    EmptyRepository { repo: String, branch: String },
}

impl PublishError {
    /// Wrap a failed lookup.
    pub fn lookup(what: impl Into<String>, source: ForgeError) -> Self {
        PublishError::RemoteLookup {
            what: what.into(),
            source,
        }
    }

    /// Wrap a failed write.
    pub fn write(action: impl Into<String>, source: ForgeError) -> Self {
        PublishError::RemoteWrite {
            action: action.into(),
            source,
        }
    }

    /// Whether the failure happened after remote calls started.
    pub fn is_remote(&self) -> bool {
        !matches!(
            self,
            PublishError::Configuration(_) | PublishError::Validation(_)
        )
    }
}

impl From<AllowlistError> for PublishError {
    fn from(err: AllowlistError) -> Self {
        PublishError::Configuration(err.to_string())
    }
}

impl From<TemplateError> for PublishError {
    fn from(err: TemplateError) -> Self {
        PublishError::Configuration(err.to_string())
    }
}
