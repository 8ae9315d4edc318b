//! forge::github
//!
//! GitHub forge implementation using the REST API.
//!
//! # Design
//!
//! Implements the `Forge` trait against GitHub REST v3. Each trait method is
//! one HTTP request, except that lookups fold a 404 into `Ok(None)`.
//!
//! # Authentication
//!
//! A static bearer token ([`Credential`]) is sent with every request. The
//! header value is marked sensitive and the token never appears in `Debug`
//! output or traces.
//!
//! # Rate Limiting
//!
//! GitHub has rate limits. This implementation:
//! - Returns `ForgeError::RateLimited` when limits are hit (429, or 403 with
//!   an exhausted `X-RateLimit-Remaining`)
//! - Does not implement automatic retry for rate limits (caller's responsibility)
//!
//! # Example
//!
//! ```ignore
//! use guild_publish::core::types::Credential;
//! use guild_publish::forge::github::GitHubForge;
//! use guild_publish::forge::Forge;
//!
//! let forge = GitHubForge::new(Credential::new(token)?);
//! let login = forge.authenticated_user().await?;
//! ```

use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{
    Branch, CreateRepoRequest, FileCommit, FileContents, Forge, ForgeError, PagesSite,
    PagesSource, RepoRef, Repository,
};
use crate::core::config::DEFAULT_API_BASE;
use crate::core::types::{BranchName, Credential};

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = concat!("guild-publish/", env!("CARGO_PKG_VERSION"));

/// REST API version pinned for every request.
const API_VERSION: &str = "2022-11-28";

/// GitHub forge implementation.
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// Bearer token
    token: Credential,
    /// API base URL (configurable for GitHub Enterprise and tests)
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("has_token", &true)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubForge {
    /// Create a forge talking to `api.github.com`.
    pub fn new(token: Credential) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Create a forge with a custom API base URL.
    ///
    /// Use this for GitHub Enterprise (`https://github.example.com/api/v3`)
    /// or a local mock server.
    pub fn with_api_base(token: Credential, api_base: impl Into<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            client: Client::new(),
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.token.expose()))
            .map_err(|_| ForgeError::AuthFailed("token is not a valid header value".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    /// Build a URL from path segments below the API base.
    ///
    /// Segments are percent-encoded individually.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ForgeError> {
        let invalid = || ForgeError::NetworkError(format!("invalid API base '{}'", self.api_base));
        let mut url = Url::parse(&self.api_base).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build a URL for a repository endpoint.
    fn repo_endpoint(&self, repo: &RepoRef, rest: &[&str]) -> Result<Url, ForgeError> {
        let mut segments = vec!["repos", repo.owner.as_str(), repo.name.as_str()];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    /// Send a request with auth headers attached.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ForgeError> {
        let request = request
            .headers(self.headers()?)
            .build()
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        debug!(%method, %path, status = response.status().as_u16(), "github request");
        Ok(response)
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Handle a response whose body is ignored on success.
    async fn handle_empty(&self, response: Response) -> Result<(), ForgeError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        &self,
        response: Response,
        status: StatusCode,
    ) -> Result<T, ForgeError> {
        // Extract headers before consuming the body.
        let headers = response.headers();
        let rate_limit_exhausted = headers
            .get("X-RateLimit-Remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0");
        let required_permissions = headers
            .get("X-Accepted-GitHub-Permissions")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let required_scopes = headers
            .get("X-Accepted-OAuth-Scopes")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN if rate_limit_exhausted => ForgeError::RateLimited,
            StatusCode::FORBIDDEN => {
                let mut err_msg = format!("Permission denied: {}", message);
                if let Some(perms) = required_permissions.filter(|p| !p.is_empty()) {
                    err_msg.push_str(&format!(" [required: {}]", perms));
                } else if let Some(scopes) = required_scopes.filter(|s| !s.is_empty()) {
                    err_msg.push_str(&format!(" [required scopes: {}]", scopes));
                }
                ForgeError::AuthFailed(err_msg)
            }
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::CONFLICT => ForgeError::Conflict(message),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn put_contents(
        &self,
        repo: &RepoRef,
        commit: FileCommit,
        sha: Option<&str>,
    ) -> Result<(), ForgeError> {
        let mut rest = vec!["contents"];
        rest.extend(commit.path.split('/'));
        let url = self.repo_endpoint(repo, &rest)?;

        let body = PutContentBody {
            message: &commit.message,
            content: base64::engine::general_purpose::STANDARD.encode(commit.content.as_bytes()),
            branch: commit.branch.as_str(),
            sha,
        };

        let response = self.send(self.client.put(url).json(&body)).await?;
        self.handle_empty(response).await
    }
}

/// Fold a not-found error into `None`.
fn optional<T>(result: Result<T, ForgeError>) -> Result<Option<T>, ForgeError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ForgeError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn authenticated_user(&self) -> Result<String, ForgeError> {
        let url = self.endpoint(&["user"])?;
        let response = self.send(self.client.get(url)).await?;
        let user: GitHubUser = self.handle_response(response).await?;
        Ok(user.login)
    }

    async fn get_repo(&self, repo: &RepoRef) -> Result<Option<Repository>, ForgeError> {
        let url = self.repo_endpoint(repo, &[])?;
        let response = self.send(self.client.get(url)).await?;
        let found: Option<GitHubRepo> = optional(self.handle_response(response).await)?;
        Ok(found.map(Into::into))
    }

    async fn create_repo(&self, request: CreateRepoRequest) -> Result<Repository, ForgeError> {
        let url = self.endpoint(&["user", "repos"])?;

        let body = CreateRepoBody {
            name: request.name.as_str(),
            description: &request.description,
            private: request.private,
            has_issues: request.has_issues,
            has_projects: request.has_projects,
            has_wiki: request.has_wiki,
            auto_init: request.auto_init,
        };

        let response = self.send(self.client.post(url).json(&body)).await?;
        let created: GitHubRepo = self.handle_response(response).await?;
        Ok(created.into())
    }

    async fn get_branch(
        &self,
        repo: &RepoRef,
        branch: &BranchName,
    ) -> Result<Option<Branch>, ForgeError> {
        let mut rest = vec!["branches"];
        rest.extend(branch.as_str().split('/'));
        let url = self.repo_endpoint(repo, &rest)?;

        let response = self.send(self.client.get(url)).await?;
        let found: Option<GitHubBranch> = optional(self.handle_response(response).await)?;
        Ok(found.map(|b| Branch {
            name: b.name,
            commit_sha: b.commit.sha,
        }))
    }

    async fn latest_commit(&self, repo: &RepoRef) -> Result<Option<String>, ForgeError> {
        let mut url = self.repo_endpoint(repo, &["commits"])?;
        url.query_pairs_mut().append_pair("per_page", "1");

        let response = self.send(self.client.get(url)).await?;
        let result: Result<Vec<GitHubCommit>, ForgeError> = self.handle_response(response).await;

        match result {
            Ok(commits) => Ok(commits.into_iter().next().map(|c| c.sha)),
            // 409 "Git Repository is empty."
            Err(ForgeError::Conflict(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_branch(
        &self,
        repo: &RepoRef,
        branch: &BranchName,
        sha: &str,
    ) -> Result<(), ForgeError> {
        let url = self.repo_endpoint(repo, &["git", "refs"])?;
        let ref_name = branch.as_ref_name();
        let body = CreateRefBody {
            ref_name: &ref_name,
            sha,
        };

        let response = self.send(self.client.post(url).json(&body)).await?;
        self.handle_empty(response).await
    }

    async fn get_file(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &BranchName,
    ) -> Result<Option<FileContents>, ForgeError> {
        let mut rest = vec!["contents"];
        rest.extend(path.split('/'));
        let mut url = self.repo_endpoint(repo, &rest)?;
        url.query_pairs_mut().append_pair("ref", branch.as_str());

        let response = self.send(self.client.get(url)).await?;
        let found: Option<GitHubContent> = optional(self.handle_response(response).await)?;

        found
            .map(|item| {
                let content = decode_content(&item)?;
                Ok(FileContents {
                    path: item.path,
                    sha: item.sha,
                    content,
                })
            })
            .transpose()
    }

    async fn create_file(&self, repo: &RepoRef, commit: FileCommit) -> Result<(), ForgeError> {
        self.put_contents(repo, commit, None).await
    }

    async fn update_file(
        &self,
        repo: &RepoRef,
        commit: FileCommit,
        sha: &str,
    ) -> Result<(), ForgeError> {
        self.put_contents(repo, commit, Some(sha)).await
    }

    async fn get_pages(&self, repo: &RepoRef) -> Result<Option<PagesSite>, ForgeError> {
        let url = self.repo_endpoint(repo, &["pages"])?;
        let response = self.send(self.client.get(url)).await?;
        let found: Option<GitHubPages> = optional(self.handle_response(response).await)?;
        Ok(found.map(Into::into))
    }

    async fn create_pages(
        &self,
        repo: &RepoRef,
        source: &PagesSource,
    ) -> Result<PagesSite, ForgeError> {
        let url = self.repo_endpoint(repo, &["pages"])?;
        let body = PagesBody::from(source);

        let response = self.send(self.client.post(url).json(&body)).await?;
        let site: GitHubPages = self.handle_response(response).await?;
        Ok(site.into())
    }

    async fn update_pages(&self, repo: &RepoRef, source: &PagesSource) -> Result<(), ForgeError> {
        let url = self.repo_endpoint(repo, &["pages"])?;
        let body = PagesBody::from(source);

        let response = self.send(self.client.put(url).json(&body)).await?;
        self.handle_empty(response).await
    }
}

/// Decode the body of a contents API item.
///
/// GitHub wraps base64 content at 60 columns, so whitespace is stripped first.
fn decode_content(item: &GitHubContent) -> Result<Vec<u8>, ForgeError> {
    let raw = item.content.as_deref().unwrap_or_default();
    match item.encoding.as_deref() {
        Some("base64") | None => {
            let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
            base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| ForgeError::ApiError {
                    status: 200,
                    message: format!("invalid base64 content for '{}': {}", item.path, e),
                })
        }
        Some("none") | Some("") => Ok(raw.as_bytes().to_vec()),
        Some(other) => Err(ForgeError::ApiError {
            status: 200,
            message: format!("unsupported content encoding '{}' for '{}'", other, item.path),
        }),
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for creating a repository.
#[derive(Serialize)]
struct CreateRepoBody<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
    has_issues: bool,
    has_projects: bool,
    has_wiki: bool,
    auto_init: bool,
}

/// Request body for creating a ref.
#[derive(Serialize)]
struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    ref_name: &'a str,
    sha: &'a str,
}

/// Request body for creating or updating a file.
#[derive(Serialize)]
struct PutContentBody<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// Request body for enabling or updating Pages.
#[derive(Serialize)]
struct PagesBody<'a> {
    source: PagesSourceBody<'a>,
}

#[derive(Serialize)]
struct PagesSourceBody<'a> {
    branch: &'a str,
    path: &'a str,
}

impl<'a> From<&'a PagesSource> for PagesBody<'a> {
    fn from(source: &'a PagesSource) -> Self {
        PagesBody {
            source: PagesSourceBody {
                branch: &source.branch,
                path: &source.path,
            },
        }
    }
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

#[derive(Deserialize)]
struct GitHubUser {
    login: String,
}

#[derive(Deserialize)]
struct GitHubOwner {
    login: String,
}

#[derive(Deserialize)]
struct GitHubRepo {
    name: String,
    html_url: String,
    owner: GitHubOwner,
    #[serde(default)]
    default_branch: Option<String>,
}

impl From<GitHubRepo> for Repository {
    fn from(repo: GitHubRepo) -> Self {
        Repository {
            owner: repo.owner.login,
            name: repo.name,
            html_url: repo.html_url,
            default_branch: repo.default_branch.unwrap_or_else(|| "main".to_string()),
        }
    }
}

#[derive(Deserialize)]
struct GitHubBranch {
    name: String,
    commit: GitHubCommit,
}

#[derive(Deserialize)]
struct GitHubCommit {
    sha: String,
}

#[derive(Deserialize)]
struct GitHubContent {
    path: String,
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Deserialize)]
struct GitHubPages {
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    source: Option<GitHubPagesSource>,
}

#[derive(Deserialize)]
struct GitHubPagesSource {
    branch: String,
    path: String,
}

impl From<GitHubPages> for PagesSite {
    fn from(pages: GitHubPages) -> Self {
        PagesSite {
            html_url: pages.html_url,
            status: pages.status,
            source: pages.source.map(|s| PagesSource {
                branch: s.branch,
                path: s.path,
            }),
        }
    }
}
