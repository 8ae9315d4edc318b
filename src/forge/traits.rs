//! forge::traits
//!
//! Forge trait definition for the remote hosting service.
//!
//! # Design
//!
//! The `Forge` trait is async because forge operations involve network I/O.
//! All methods return `Result` to handle API errors gracefully.
//!
//! Lookups return `Ok(None)` only when the service says the object does not
//! exist. Every other failure is an `Err`, so a flaky network is never
//! mistaken for a missing repository or file.
//!
//! # Example
//!
//! ```ignore
//! use guild_publish::forge::{Forge, RepoRef};
//!
//! async fn show(forge: &dyn Forge, repo: &RepoRef) -> Result<(), ForgeError> {
//!     match forge.get_repo(repo).await? {
//!         Some(found) => println!("exists: {}", found.html_url),
//!         None => println!("{} does not exist yet", repo),
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{BranchName, RepoName};

/// Errors from forge operations.
///
/// These error types map to common failure modes when interacting
/// with remote hosting services like GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForgeError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The resource is in a conflicting state (already exists, stale sha).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ForgeError {
    /// Whether this is the service's "does not exist" answer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ForgeError::NotFound(_))
    }

    /// Whether this is a conflict with existing remote state.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ForgeError::Conflict(_))
    }
}

/// Identifies a repository on the forge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    /// Owning user login
    pub owner: String,
    /// Repository name
    pub name: RepoName,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: RepoName) -> Self {
        Self {
            owner: owner.into(),
            name,
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Repository information returned from the forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Owner login
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Web URL for viewing the repository
    pub html_url: String,
    /// Default branch (may not exist yet on a freshly created repository)
    pub default_branch: String,
}

/// Request to create a repository under the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRepoRequest {
    /// Repository name
    pub name: RepoName,
    /// One-line description
    pub description: String,
    /// Create as private
    pub private: bool,
    /// Enable issues
    pub has_issues: bool,
    /// Enable projects
    pub has_projects: bool,
    /// Enable wiki
    pub has_wiki: bool,
    /// Let the forge create an initial commit
    pub auto_init: bool,
}

/// A branch and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Branch name
    pub name: String,
    /// Head commit sha
    pub commit_sha: String,
}

/// Current contents of a file on a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContents {
    /// Path inside the repository
    pub path: String,
    /// Blob sha, required to update the file
    pub sha: String,
    /// Decoded file bytes
    pub content: Vec<u8>,
}

/// A single-file commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommit {
    /// Path inside the repository
    pub path: String,
    /// Commit message
    pub message: String,
    /// New file contents
    pub content: String,
    /// Branch to commit to
    pub branch: BranchName,
}

/// Which branch and directory a Pages site is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagesSource {
    /// Branch name
    pub branch: String,
    /// Directory, `/` or `/docs`
    pub path: String,
}

impl PagesSource {
    /// Serve the root of `branch`.
    pub fn root(branch: &BranchName) -> Self {
        Self {
            branch: branch.as_str().to_string(),
            path: "/".to_string(),
        }
    }
}

impl std::fmt::Display for PagesSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.branch, self.path)
    }
}

/// Pages hosting configuration of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagesSite {
    /// Public URL of the site, once assigned
    pub html_url: Option<String>,
    /// Build status reported by the forge (`built`, `building`, ...)
    pub status: Option<String>,
    /// Configured source, if any
    pub source: Option<PagesSource>,
}

/// The Forge trait for the remote hosting service.
///
/// Covers exactly the surface the publisher reconciles against:
/// repositories, branches, single files, and Pages hosting.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ForgeError>`. Lookup methods return
/// `Ok(None)` for a missing object and reserve `Err` for everything else.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Login of the user the credential belongs to.
    async fn authenticated_user(&self) -> Result<String, ForgeError>;

    /// Look up a repository.
    async fn get_repo(&self, repo: &RepoRef) -> Result<Option<Repository>, ForgeError>;

    /// Create a repository owned by the authenticated user.
    ///
    /// # Errors
    ///
    /// - `ApiError` with status 422 if the name is already taken
    async fn create_repo(&self, request: CreateRepoRequest) -> Result<Repository, ForgeError>;

    /// Look up a branch.
    async fn get_branch(
        &self,
        repo: &RepoRef,
        branch: &BranchName,
    ) -> Result<Option<Branch>, ForgeError>;

    /// Sha of the most recent commit on the default branch.
    ///
    /// Returns `None` for a repository with no commits. A missing
    /// repository is `NotFound`, not `None`.
    async fn latest_commit(&self, repo: &RepoRef) -> Result<Option<String>, ForgeError>;

    /// Create `branch` pointing at `sha`.
    async fn create_branch(
        &self,
        repo: &RepoRef,
        branch: &BranchName,
        sha: &str,
    ) -> Result<(), ForgeError>;

    /// Fetch a file from a branch.
    async fn get_file(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &BranchName,
    ) -> Result<Option<FileContents>, ForgeError>;

    /// Commit a new file.
    ///
    /// # Errors
    ///
    /// - `ApiError` with status 422 if the file already exists
    async fn create_file(&self, repo: &RepoRef, commit: FileCommit) -> Result<(), ForgeError>;

    /// Commit new contents for an existing file.
    ///
    /// `sha` must be the blob sha last read for the file.
    ///
    /// # Errors
    ///
    /// - `Conflict` if `sha` is stale
    async fn update_file(
        &self,
        repo: &RepoRef,
        commit: FileCommit,
        sha: &str,
    ) -> Result<(), ForgeError>;

    /// Read Pages hosting configuration.
    async fn get_pages(&self, repo: &RepoRef) -> Result<Option<PagesSite>, ForgeError>;

    /// Enable Pages hosting.
    ///
    /// # Errors
    ///
    /// - `Conflict` if Pages is already enabled
    async fn create_pages(
        &self,
        repo: &RepoRef,
        source: &PagesSource,
    ) -> Result<PagesSite, ForgeError>;

    /// Change the source of an existing Pages site.
    async fn update_pages(&self, repo: &RepoRef, source: &PagesSource) -> Result<(), ForgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_ref_display() {
        let repo = RepoRef::new("octocat", RepoName::new("hello-world").unwrap());
        assert_eq!(repo.to_string(), "octocat/hello-world");
    }

    #[test]
    fn pages_source_root() {
        let source = PagesSource::root(&BranchName::new("main").unwrap());
        assert_eq!(source.branch, "main");
        assert_eq!(source.path, "/");
        assert_eq!(source.to_string(), "main:/");
    }

    #[test]
    fn error_classification() {
        assert!(ForgeError::NotFound("x".into()).is_not_found());
        assert!(!ForgeError::NetworkError("x".into()).is_not_found());
        assert!(ForgeError::Conflict("x".into()).is_conflict());
        assert!(!ForgeError::RateLimited.is_conflict());
    }

    #[test]
    fn forge_error_display() {
        assert_eq!(
            format!("{}", ForgeError::AuthRequired),
            "authentication required"
        );
        assert_eq!(
            format!("{}", ForgeError::AuthFailed("expired token".into())),
            "authentication failed: expired token"
        );
        assert_eq!(
            format!("{}", ForgeError::NotFound("repo".into())),
            "not found: repo"
        );
        assert_eq!(
            format!("{}", ForgeError::Conflict("sha mismatch".into())),
            "conflict: sha mismatch"
        );
        assert_eq!(format!("{}", ForgeError::RateLimited), "rate limited");
        assert_eq!(
            format!(
                "{}",
                ForgeError::ApiError {
                    status: 422,
                    message: "Validation failed".into()
                }
            ),
            "API error: 422 - Validation failed"
        );
        assert_eq!(
            format!("{}", ForgeError::NetworkError("connection refused".into())),
            "network error: connection refused"
        );
    }
}
