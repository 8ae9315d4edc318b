//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge provides a deterministic implementation of the `Forge` trait
//! for use in tests. It keeps repositories, branches, files, and Pages state
//! in memory, records every call, and allows configuring failure scenarios.
//!
//! It imitates the GitHub behaviours the publisher depends on:
//! - creating a file that exists is a 422, updating with a stale sha is a 409
//! - enabling Pages twice is a 409
//! - a new auto-initialised repository can stay invisible for a few lookups
//!
//! # Example
//!
//! ```
//! use guild_publish::core::types::{BranchName, RepoName};
//! use guild_publish::forge::mock::MockForge;
//! use guild_publish::forge::{Forge, RepoRef};
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new().with_repo("The-Tulsa-Software-Guild");
//! let repo = RepoRef::new("octocat", RepoName::new("The-Tulsa-Software-Guild").unwrap());
//!
//! assert!(forge.get_repo(&repo).await.unwrap().is_some());
//! let main = BranchName::new("main").unwrap();
//! assert!(forge.get_branch(&repo, &main).await.unwrap().is_some());
//! # });
//! ```

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::traits::{
    Branch, CreateRepoRequest, FileCommit, FileContents, Forge, ForgeError, PagesSite,
    PagesSource, RepoRef, Repository,
};
use crate::core::types::BranchName;

/// Login reported by a fresh mock.
pub const DEFAULT_LOGIN: &str = "octocat";

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping. Clones share state,
/// so a test can hand one clone to the publisher and inspect the other.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockForgeInner {
    /// Login of the authenticated user.
    login: String,
    /// Repositories keyed by `owner/name`.
    repos: BTreeMap<String, MockRepo>,
    /// Default branch given to repositories created through the trait.
    default_branch: String,
    /// Lookups a newly created repository stays invisible for.
    provisioning_polls: u32,
    /// Counter for generated shas.
    next_sha: u64,
    /// Pages configuration another client applies just before our create.
    concurrent_pages: Option<(String, PagesSource)>,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Matching calls to let through before failing.
    fail_skip: usize,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

#[derive(Debug, Clone)]
struct MockRepo {
    owner: String,
    name: String,
    default_branch: String,
    /// Branch name to head commit.
    branches: BTreeMap<String, String>,
    /// Every commit in creation order.
    commits: Vec<String>,
    /// `(branch, path)` to file.
    files: BTreeMap<(String, String), MockFile>,
    pages: Option<PagesSite>,
    /// Remaining lookups that still report the repository as missing.
    provisioning: u32,
}

#[derive(Debug, Clone)]
struct MockFile {
    content: Vec<u8>,
    sha: String,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    AuthenticatedUser(ForgeError),
    GetRepo(ForgeError),
    CreateRepo(ForgeError),
    GetBranch(ForgeError),
    LatestCommit(ForgeError),
    CreateBranch(ForgeError),
    GetFile(ForgeError),
    CreateFile(ForgeError),
    UpdateFile(ForgeError),
    GetPages(ForgeError),
    CreatePages(ForgeError),
    UpdatePages(ForgeError),
}

impl FailOn {
    fn operation(&self) -> &'static str {
        match self {
            FailOn::AuthenticatedUser(_) => "authenticated_user",
            FailOn::GetRepo(_) => "get_repo",
            FailOn::CreateRepo(_) => "create_repo",
            FailOn::GetBranch(_) => "get_branch",
            FailOn::LatestCommit(_) => "latest_commit",
            FailOn::CreateBranch(_) => "create_branch",
            FailOn::GetFile(_) => "get_file",
            FailOn::CreateFile(_) => "create_file",
            FailOn::UpdateFile(_) => "update_file",
            FailOn::GetPages(_) => "get_pages",
            FailOn::CreatePages(_) => "create_pages",
            FailOn::UpdatePages(_) => "update_pages",
        }
    }

    fn error(&self) -> &ForgeError {
        match self {
            FailOn::AuthenticatedUser(e)
            | FailOn::GetRepo(e)
            | FailOn::CreateRepo(e)
            | FailOn::GetBranch(e)
            | FailOn::LatestCommit(e)
            | FailOn::CreateBranch(e)
            | FailOn::GetFile(e)
            | FailOn::CreateFile(e)
            | FailOn::UpdateFile(e)
            | FailOn::GetPages(e)
            | FailOn::CreatePages(e)
            | FailOn::UpdatePages(e) => e,
        }
    }
}

/// Recorded operation for test verification.
///
/// Repositories are recorded as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    AuthenticatedUser,
    GetRepo {
        repo: String,
    },
    CreateRepo {
        name: String,
        description: String,
        auto_init: bool,
    },
    GetBranch {
        repo: String,
        branch: String,
    },
    LatestCommit {
        repo: String,
    },
    CreateBranch {
        repo: String,
        branch: String,
        sha: String,
    },
    GetFile {
        repo: String,
        path: String,
        branch: String,
    },
    CreateFile {
        repo: String,
        path: String,
        message: String,
    },
    UpdateFile {
        repo: String,
        path: String,
        message: String,
        sha: String,
    },
    GetPages {
        repo: String,
    },
    CreatePages {
        repo: String,
        source: PagesSource,
    },
    UpdatePages {
        repo: String,
        source: PagesSource,
    },
}

impl MockOperation {
    /// Whether the operation changes remote state.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            MockOperation::CreateRepo { .. }
                | MockOperation::CreateBranch { .. }
                | MockOperation::CreateFile { .. }
                | MockOperation::UpdateFile { .. }
                | MockOperation::CreatePages { .. }
                | MockOperation::UpdatePages { .. }
        )
    }
}

impl MockForge {
    /// Create a new empty mock forge.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockForgeInner {
                login: DEFAULT_LOGIN.to_string(),
                repos: BTreeMap::new(),
                default_branch: "main".to_string(),
                provisioning_polls: 0,
                next_sha: 1,
                concurrent_pages: None,
                fail_on: None,
                fail_skip: 0,
                operations: Vec::new(),
            })),
        }
    }

    /// Set the authenticated user's login.
    pub fn with_login(self, login: &str) -> Self {
        self.inner.lock().unwrap().login = login.to_string();
        self
    }

    /// Set the default branch for repositories created later.
    pub fn with_default_branch(self, branch: &str) -> Self {
        self.inner.lock().unwrap().default_branch = branch.to_string();
        self
    }

    /// Keep newly created repositories invisible for `polls` lookups.
    pub fn with_provisioning_polls(self, polls: u32) -> Self {
        self.inner.lock().unwrap().provisioning_polls = polls;
        self
    }

    /// Add an existing repository with one commit on the default branch.
    pub fn with_repo(self, name: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let login = inner.login.clone();
            let branch = inner.default_branch.clone();
            let repo = inner.new_repo(&login, name, &branch, true);
            inner.repos.insert(key(&login, name), repo);
        }
        self
    }

    /// Add an existing repository with no commits.
    pub fn with_empty_repo(self, name: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let login = inner.login.clone();
            let branch = inner.default_branch.clone();
            let repo = inner.new_repo(&login, name, &branch, false);
            inner.repos.insert(key(&login, name), repo);
        }
        self
    }

    /// Add a file to an existing repository and branch.
    ///
    /// # Panics
    ///
    /// Panics if the repository or branch does not exist.
    pub fn with_file(self, repo: &str, branch: &str, path: &str, content: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let login = inner.login.clone();
            let sha = inner.sha();
            let commit = inner.sha();
            let repo = inner
                .repos
                .get_mut(&key(&login, repo))
                .expect("with_file: unknown repository");
            assert!(
                repo.branches.contains_key(branch),
                "with_file: unknown branch"
            );
            repo.files.insert(
                (branch.to_string(), path.to_string()),
                MockFile {
                    content: content.as_bytes().to_vec(),
                    sha,
                },
            );
            repo.commit(branch, commit);
        }
        self
    }

    /// Configure Pages on an existing repository.
    ///
    /// # Panics
    ///
    /// Panics if the repository does not exist.
    pub fn with_pages(self, repo: &str, branch: &str, path: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let login = inner.login.clone();
            let site = pages_site(
                &login,
                repo,
                PagesSource {
                    branch: branch.to_string(),
                    path: path.to_string(),
                },
            );
            inner
                .repos
                .get_mut(&key(&login, repo))
                .expect("with_pages: unknown repository")
                .pages = Some(site);
        }
        self
    }

    /// Have another client enable Pages on `repo` just before our create call.
    pub fn with_concurrent_pages(self, repo: &str, branch: &str, path: &str) -> Self {
        self.inner.lock().unwrap().concurrent_pages = Some((
            repo.to_string(),
            PagesSource {
                branch: branch.to_string(),
                path: path.to_string(),
            },
        ));
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use guild_publish::forge::mock::{MockForge, FailOn};
    /// use guild_publish::forge::ForgeError;
    ///
    /// let forge = MockForge::new()
    ///     .fail_on(FailOn::CreateRepo(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.fail_on_after(fail_on, 0)
    }

    /// Fail on a specific operation after `skip` matching calls succeed.
    pub fn fail_on_after(self, fail_on: FailOn, skip: usize) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
            inner.fail_skip = skip;
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
        inner.fail_skip = 0;
    }

    /// Get all recorded operations.
    ///
    /// Useful for verifying the mock was called correctly.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.clear();
    }

    /// Number of recorded operations that change remote state.
    pub fn write_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.operations.iter().filter(|op| op.is_write()).count()
    }

    /// Whether the authenticated user owns a repository named `name`.
    pub fn has_repo(&self, name: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.repos.contains_key(&key(&inner.login, name))
    }

    /// Head commit of a branch (for test verification).
    pub fn branch_head(&self, repo: &str, branch: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .repos
            .get(&key(&inner.login, repo))
            .and_then(|r| r.branches.get(branch).cloned())
    }

    /// Stored content of a file (for test verification).
    pub fn file_content(&self, repo: &str, branch: &str, path: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner
            .repos
            .get(&key(&inner.login, repo))
            .and_then(|r| r.files.get(&(branch.to_string(), path.to_string())))
            .map(|f| f.content.clone())
    }

    /// Pages configuration (for test verification).
    pub fn pages(&self, repo: &str) -> Option<PagesSite> {
        let inner = self.inner.lock().unwrap();
        inner
            .repos
            .get(&key(&inner.login, repo))
            .and_then(|r| r.pages.clone())
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, operation: &str) -> Result<(), ForgeError> {
        let mut inner = self.inner.lock().unwrap();
        let error = inner
            .fail_on
            .as_ref()
            .filter(|f| f.operation() == operation)
            .map(|f| f.error().clone());

        match error {
            Some(_) if inner.fail_skip > 0 => {
                inner.fail_skip -= 1;
                Ok(())
            }
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

impl MockForgeInner {
    /// Generate the next commit or blob sha.
    fn sha(&mut self) -> String {
        let sha = format!("{:040x}", self.next_sha);
        self.next_sha += 1;
        sha
    }

    fn new_repo(&mut self, owner: &str, name: &str, branch: &str, initialised: bool) -> MockRepo {
        let mut repo = MockRepo {
            owner: owner.to_string(),
            name: name.to_string(),
            default_branch: branch.to_string(),
            branches: BTreeMap::new(),
            commits: Vec::new(),
            files: BTreeMap::new(),
            pages: None,
            provisioning: 0,
        };
        if initialised {
            let blob = self.sha();
            let commit = self.sha();
            repo.files.insert(
                (branch.to_string(), "README.md".to_string()),
                MockFile {
                    content: format!("# {}\n", name).into_bytes(),
                    sha: blob,
                },
            );
            repo.commit(branch, commit);
        }
        repo
    }

    /// Resolve a repository, honouring the provisioning delay.
    fn visible_repo(&mut self, repo: &RepoRef) -> Option<&mut MockRepo> {
        let found = self.repos.get_mut(&repo.to_string())?;
        if found.provisioning > 0 {
            found.provisioning -= 1;
            return None;
        }
        Some(found)
    }

    fn repo_mut(&mut self, repo: &RepoRef) -> Result<&mut MockRepo, ForgeError> {
        self.repos
            .get_mut(&repo.to_string())
            .ok_or_else(|| ForgeError::NotFound(format!("repository {} not found", repo)))
    }
}

impl MockRepo {
    /// Advance `branch` to a new commit.
    fn commit(&mut self, branch: &str, sha: String) {
        self.branches.insert(branch.to_string(), sha.clone());
        self.commits.push(sha);
    }

    fn to_repository(&self) -> Repository {
        Repository {
            owner: self.owner.clone(),
            name: self.name.clone(),
            html_url: format!("https://github.com/{}/{}", self.owner, self.name),
            default_branch: self.default_branch.clone(),
        }
    }

    fn require_branch(&self, branch: &BranchName) -> Result<(), ForgeError> {
        if self.branches.contains_key(branch.as_str()) {
            Ok(())
        } else {
            Err(ForgeError::NotFound(format!("Branch {} not found", branch)))
        }
    }
}

fn key(owner: &str, name: &str) -> String {
    format!("{}/{}", owner, name)
}

fn pages_site(owner: &str, repo: &str, source: PagesSource) -> PagesSite {
    PagesSite {
        html_url: Some(format!(
            "https://{}.github.io/{}/",
            owner.to_lowercase(),
            repo
        )),
        status: Some("built".to_string()),
        source: Some(source),
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn authenticated_user(&self) -> Result<String, ForgeError> {
        self.record(MockOperation::AuthenticatedUser);
        self.check_fail("authenticated_user")?;

        let inner = self.inner.lock().unwrap();
        Ok(inner.login.clone())
    }

    async fn get_repo(&self, repo: &RepoRef) -> Result<Option<Repository>, ForgeError> {
        self.record(MockOperation::GetRepo {
            repo: repo.to_string(),
        });
        self.check_fail("get_repo")?;

        let mut inner = self.inner.lock().unwrap();
        Ok(inner.visible_repo(repo).map(|r| r.to_repository()))
    }

    async fn create_repo(&self, request: CreateRepoRequest) -> Result<Repository, ForgeError> {
        self.record(MockOperation::CreateRepo {
            name: request.name.to_string(),
            description: request.description.clone(),
            auto_init: request.auto_init,
        });
        self.check_fail("create_repo")?;

        let mut inner = self.inner.lock().unwrap();
        let login = inner.login.clone();
        let repo_key = key(&login, request.name.as_str());
        if inner.repos.contains_key(&repo_key) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "Repository creation failed.: name already exists on this account"
                    .to_string(),
            });
        }

        let branch = inner.default_branch.clone();
        let mut repo = inner.new_repo(&login, request.name.as_str(), &branch, request.auto_init);
        repo.provisioning = inner.provisioning_polls;
        let created = repo.to_repository();
        inner.repos.insert(repo_key, repo);
        Ok(created)
    }

    async fn get_branch(
        &self,
        repo: &RepoRef,
        branch: &BranchName,
    ) -> Result<Option<Branch>, ForgeError> {
        self.record(MockOperation::GetBranch {
            repo: repo.to_string(),
            branch: branch.to_string(),
        });
        self.check_fail("get_branch")?;

        let mut inner = self.inner.lock().unwrap();
        let found = inner.repo_mut(repo)?;
        Ok(found.branches.get(branch.as_str()).map(|sha| Branch {
            name: branch.to_string(),
            commit_sha: sha.clone(),
        }))
    }

    async fn latest_commit(&self, repo: &RepoRef) -> Result<Option<String>, ForgeError> {
        self.record(MockOperation::LatestCommit {
            repo: repo.to_string(),
        });
        self.check_fail("latest_commit")?;

        let mut inner = self.inner.lock().unwrap();
        let found = inner.repo_mut(repo)?;
        if found.provisioning > 0 {
            return Ok(None);
        }
        let head = found
            .branches
            .get(&found.default_branch)
            .or_else(|| found.commits.last())
            .cloned();
        Ok(head)
    }

    async fn create_branch(
        &self,
        repo: &RepoRef,
        branch: &BranchName,
        sha: &str,
    ) -> Result<(), ForgeError> {
        self.record(MockOperation::CreateBranch {
            repo: repo.to_string(),
            branch: branch.to_string(),
            sha: sha.to_string(),
        });
        self.check_fail("create_branch")?;

        let mut inner = self.inner.lock().unwrap();
        let found = inner.repo_mut(repo)?;
        if found.branches.contains_key(branch.as_str()) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "Reference already exists".to_string(),
            });
        }
        if !found.commits.iter().any(|c| c == sha) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "Object does not exist".to_string(),
            });
        }

        // New branch sees the files of the branch whose head it starts from.
        let source = found
            .branches
            .iter()
            .find(|(_, head)| head.as_str() == sha)
            .map(|(name, _)| name.clone());
        if let Some(source) = source {
            let copied: Vec<_> = found
                .files
                .iter()
                .filter(|((b, _), _)| *b == source)
                .map(|((_, path), file)| ((branch.to_string(), path.clone()), file.clone()))
                .collect();
            found.files.extend(copied);
        }
        found
            .branches
            .insert(branch.to_string(), sha.to_string());
        Ok(())
    }

    async fn get_file(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &BranchName,
    ) -> Result<Option<FileContents>, ForgeError> {
        self.record(MockOperation::GetFile {
            repo: repo.to_string(),
            path: path.to_string(),
            branch: branch.to_string(),
        });
        self.check_fail("get_file")?;

        let mut inner = self.inner.lock().unwrap();
        let found = inner.repo_mut(repo)?;
        Ok(found
            .files
            .get(&(branch.to_string(), path.to_string()))
            .map(|file| FileContents {
                path: path.to_string(),
                sha: file.sha.clone(),
                content: file.content.clone(),
            }))
    }

    async fn create_file(&self, repo: &RepoRef, commit: FileCommit) -> Result<(), ForgeError> {
        self.record(MockOperation::CreateFile {
            repo: repo.to_string(),
            path: commit.path.clone(),
            message: commit.message.clone(),
        });
        self.check_fail("create_file")?;

        let mut inner = self.inner.lock().unwrap();
        let blob = inner.sha();
        let head = inner.sha();
        let found = inner.repo_mut(repo)?;
        found.require_branch(&commit.branch)?;

        let file_key = (commit.branch.to_string(), commit.path.clone());
        if found.files.contains_key(&file_key) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "Invalid request.\n\n\"sha\" wasn't supplied.".to_string(),
            });
        }

        found.files.insert(
            file_key,
            MockFile {
                content: commit.content.into_bytes(),
                sha: blob,
            },
        );
        found.commit(commit.branch.as_str(), head);
        Ok(())
    }

    async fn update_file(
        &self,
        repo: &RepoRef,
        commit: FileCommit,
        sha: &str,
    ) -> Result<(), ForgeError> {
        self.record(MockOperation::UpdateFile {
            repo: repo.to_string(),
            path: commit.path.clone(),
            message: commit.message.clone(),
            sha: sha.to_string(),
        });
        self.check_fail("update_file")?;

        let mut inner = self.inner.lock().unwrap();
        let blob = inner.sha();
        let head = inner.sha();
        let found = inner.repo_mut(repo)?;
        found.require_branch(&commit.branch)?;

        let file_key = (commit.branch.to_string(), commit.path.clone());
        let Some(existing) = found.files.get_mut(&file_key) else {
            return Err(ForgeError::NotFound(format!("{} not found", commit.path)));
        };
        if existing.sha != sha {
            return Err(ForgeError::Conflict(format!(
                "{} does not match {}",
                commit.path, sha
            )));
        }

        existing.content = commit.content.into_bytes();
        existing.sha = blob;
        found.commit(commit.branch.as_str(), head);
        Ok(())
    }

    async fn get_pages(&self, repo: &RepoRef) -> Result<Option<PagesSite>, ForgeError> {
        self.record(MockOperation::GetPages {
            repo: repo.to_string(),
        });
        self.check_fail("get_pages")?;

        let mut inner = self.inner.lock().unwrap();
        Ok(inner.repo_mut(repo)?.pages.clone())
    }

    async fn create_pages(
        &self,
        repo: &RepoRef,
        source: &PagesSource,
    ) -> Result<PagesSite, ForgeError> {
        self.record(MockOperation::CreatePages {
            repo: repo.to_string(),
            source: source.clone(),
        });
        self.check_fail("create_pages")?;

        let mut inner = self.inner.lock().unwrap();
        let racing = inner
            .concurrent_pages
            .take_if(|(name, _)| name.as_str() == repo.name.as_str());
        let found = inner.repo_mut(repo)?;
        if let Some((_, other)) = racing {
            found.pages = Some(pages_site(&found.owner, &found.name, other));
        }

        if found.pages.is_some() {
            return Err(ForgeError::Conflict(
                "GitHub Pages is already enabled.".to_string(),
            ));
        }
        if !found.branches.contains_key(&source.branch) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: format!("The {} branch must exist", source.branch),
            });
        }

        let site = pages_site(&found.owner, &found.name, source.clone());
        found.pages = Some(site.clone());
        Ok(site)
    }

    async fn update_pages(&self, repo: &RepoRef, source: &PagesSource) -> Result<(), ForgeError> {
        self.record(MockOperation::UpdatePages {
            repo: repo.to_string(),
            source: source.clone(),
        });
        self.check_fail("update_pages")?;

        let mut inner = self.inner.lock().unwrap();
        let found = inner.repo_mut(repo)?;
        match found.pages.as_mut() {
            Some(site) => {
                site.source = Some(source.clone());
                Ok(())
            }
            None => Err(ForgeError::NotFound("Pages site not found".to_string())),
        }
    }
}
