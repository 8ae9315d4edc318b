//! publisher
//!
//! Reconciles a city's guild site into a published state.
//!
//! # Stages
//!
//! 1. Allow-list validation (local)
//! 2. Template rendering (local)
//! 3. Repository lookup, or creation followed by readiness polling
//! 4. Branch assurance
//! 5. Marker file reconciliation
//! 6. Document reconciliation
//! 7. Pages enablement
//! 8. Site URL read-back
//!
//! Stages 1-2 run in [`prepare`] and never touch the network, so a
//! validation failure makes zero remote calls. Every remote stage accepts an
//! already-satisfied precondition, so a second run against unchanged inputs
//! makes no writes at all.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use guild_publish::publisher::Publisher;
//!
//! let publisher = Publisher::new(settings, Arc::new(forge));
//! let report = publisher.publish(&city).await?;
//! println!("{}", report.site_url);
//! ```

mod errors;
pub mod inputs;
pub mod readiness;
mod report;

pub use errors::PublishError;
pub use report::{
    BranchOutcome, FileOutcome, HostingOutcome, PreparedSite, PublishReport, RepoOutcome,
};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::allowlist::Allowlist;
use crate::core::config::PublisherConfig;
use crate::core::naming;
use crate::core::template::Template;
use crate::core::types::CityName;
use crate::forge::{CreateRepoRequest, FileCommit, Forge, ForgeError, PagesSource, RepoRef, Repository};
use readiness::{poll_until, PollOutcome};

/// Run the local stages: allow-list check, name derivation, rendering.
///
/// # Errors
///
/// - `Configuration` if the allow-list or template cannot be read
/// - `Validation` if the city is not allow-listed or yields an unusable
///   repository name
pub fn prepare(settings: &PublisherConfig, city: &CityName) -> Result<PreparedSite, PublishError> {
    if settings.enforce_allowlist {
        let allowlist = Allowlist::load(&settings.allowlist)?;
        if !allowlist.contains(city) {
            return Err(PublishError::Validation(format!(
                "'{}' is not listed in '{}'",
                city,
                settings.allowlist.display()
            )));
        }
    }

    let repo_name = naming::repo_name(city, &settings.repo_prefix, &settings.repo_suffix)
        .map_err(|e| PublishError::Validation(e.to_string()))?;
    let title = naming::site_title(city, &settings.repo_prefix, &settings.repo_suffix);
    let description = naming::repo_description(city, &settings.repo_suffix);

    let template = Template::load(&settings.template)?;
    let rendered = template.render(&settings.placeholder, city.as_str(), &title);

    let mut warnings = Vec::new();
    if rendered.placeholder_hits == 0 {
        warnings.push(format!(
            "template '{}' does not contain the placeholder '{}'; the body was not customised",
            settings.template.display(),
            settings.placeholder
        ));
    }
    if !rendered.title_replaced {
        warnings.push(format!(
            "template '{}' has no <title> element; the title was not set",
            settings.template.display()
        ));
    }

    Ok(PreparedSite {
        city: city.clone(),
        repo_name,
        title,
        description,
        document: rendered.document,
        placeholder_hits: rendered.placeholder_hits,
        warnings,
    })
}

/// Publishes sites through a [`Forge`].
pub struct Publisher {
    settings: PublisherConfig,
    forge: Arc<dyn Forge>,
}

impl Publisher {
    pub fn new(settings: PublisherConfig, forge: Arc<dyn Forge>) -> Self {
        Self { settings, forge }
    }

    pub fn settings(&self) -> &PublisherConfig {
        &self.settings
    }

    /// Run the local stages only.
    pub fn prepare(&self, city: &CityName) -> Result<PreparedSite, PublishError> {
        prepare(&self.settings, city)
    }

    /// Publish the site for `city`.
    ///
    /// # Errors
    ///
    /// Local failures are returned before any remote call. Remote failures
    /// abort at the stage they happen in; whatever was already reconciled
    /// stays in place for the next run.
    pub async fn publish(&self, city: &CityName) -> Result<PublishReport, PublishError> {
        let site = self.prepare(city)?;
        let mut warnings = site.warnings.clone();

        let owner = self
            .forge
            .authenticated_user()
            .await
            .map_err(|e| PublishError::lookup("authenticated user", e))?;
        let repo = RepoRef::new(owner, site.repo_name.clone());
        info!(%repo, forge = self.forge.name(), "publishing");

        let (remote, repo_outcome) = self.ensure_repo(&repo, &site).await?;
        let branch_outcome = self.ensure_branch(&repo).await?;

        let marker_path = self.settings.marker_path.clone();
        let marker_message = naming::marker_commit_message(&marker_path);
        let marker = self
            .reconcile_file(&repo, &marker_path, "", &marker_message, &marker_message)
            .await?;

        let document_path = self.settings.document_path.clone();
        let document = self
            .reconcile_file(
                &repo,
                &document_path,
                &site.document,
                &naming::initial_deploy_message(city),
                &naming::update_deploy_message(city),
            )
            .await?;

        let hosting = self.ensure_pages(&repo).await?;
        let site_url = self.read_back_url(&repo, &mut warnings).await;

        Ok(PublishReport {
            city: city.clone(),
            repo,
            repo_url: remote.html_url,
            repo_outcome,
            branch: self.settings.branch.clone(),
            branch_outcome,
            marker: (marker_path, marker),
            document: (document_path, document),
            hosting,
            site_url,
            warnings,
        })
    }

    /// Find the repository or create it and wait until it is usable.
    async fn ensure_repo(
        &self,
        repo: &RepoRef,
        site: &PreparedSite,
    ) -> Result<(Repository, RepoOutcome), PublishError> {
        let found = self
            .forge
            .get_repo(repo)
            .await
            .map_err(|e| PublishError::lookup(format!("repository {}", repo), e))?;
        if let Some(existing) = found {
            debug!(%repo, "repository exists");
            return Ok((existing, RepoOutcome::Found));
        }

        let created = self
            .forge
            .create_repo(CreateRepoRequest {
                name: repo.name.clone(),
                description: site.description.clone(),
                private: false,
                has_issues: false,
                has_projects: false,
                has_wiki: false,
                auto_init: self.settings.auto_init,
            })
            .await
            .map_err(|e| PublishError::write(format!("create repository {}", repo), e))?;
        info!(%repo, "repository created");

        self.wait_until_ready(repo).await?;
        Ok((created, RepoOutcome::Created))
    }

    /// Poll a new repository until it is readable and, when the platform
    /// initialises it, has a first commit.
    async fn wait_until_ready(&self, repo: &RepoRef) -> Result<(), PublishError> {
        let forge = self.forge.as_ref();
        let auto_init = self.settings.auto_init;

        let outcome = poll_until(&self.settings.readiness, move || async move {
            if forge.get_repo(repo).await?.is_none() {
                return Ok(false);
            }
            if !auto_init {
                return Ok(true);
            }
            // The commits endpoint can lag behind the repository itself.
            match forge.latest_commit(repo).await {
                Ok(head) => Ok(head.is_some()),
                Err(e) if e.is_not_found() => Ok(false),
                Err(e) => Err::<bool, ForgeError>(e),
            }
        })
        .await
        .map_err(|e| PublishError::lookup(format!("repository {}", repo), e))?;

        match outcome {
            PollOutcome::Ready { attempts } => {
                debug!(%repo, attempts, "repository ready");
                Ok(())
            }
            PollOutcome::TimedOut { waited, .. } => Err(PublishError::ReadinessTimeout {
                repo: repo.to_string(),
                waited,
            }),
        }
    }

    /// Make sure the configured branch exists.
    async fn ensure_branch(&self, repo: &RepoRef) -> Result<BranchOutcome, PublishError> {
        let branch = &self.settings.branch;
        let found = self
            .forge
            .get_branch(repo, branch)
            .await
            .map_err(|e| PublishError::lookup(format!("branch {} of {}", branch, repo), e))?;
        if found.is_some() {
            return Ok(BranchOutcome::Present);
        }

        let head = self
            .forge
            .latest_commit(repo)
            .await
            .map_err(|e| PublishError::lookup(format!("latest commit of {}", repo), e))?
            .ok_or_else(|| PublishError::EmptyRepository {
                repo: repo.to_string(),
                branch: branch.to_string(),
            })?;

        self.forge
            .create_branch(repo, branch, &head)
            .await
            .map_err(|e| PublishError::write(format!("create branch {} in {}", branch, repo), e))?;
        info!(%repo, %branch, sha = %head, "branch created");
        Ok(BranchOutcome::Created)
    }

    /// Create, update, or leave alone one file on the branch.
    async fn reconcile_file(
        &self,
        repo: &RepoRef,
        path: &str,
        content: &str,
        create_message: &str,
        update_message: &str,
    ) -> Result<FileOutcome, PublishError> {
        let branch = &self.settings.branch;
        let existing = self
            .forge
            .get_file(repo, path, branch)
            .await
            .map_err(|e| PublishError::lookup(format!("{} in {}", path, repo), e))?;

        let commit = |message: &str| FileCommit {
            path: path.to_string(),
            message: message.to_string(),
            content: content.to_string(),
            branch: branch.clone(),
        };

        match existing {
            Some(file) if file.content == content.as_bytes() => {
                debug!(%repo, path, "file up to date");
                Ok(FileOutcome::UpToDate)
            }
            Some(file) => {
                self.forge
                    .update_file(repo, commit(update_message), &file.sha)
                    .await
                    .map_err(|e| PublishError::write(format!("update {} in {}", path, repo), e))?;
                info!(%repo, path, "file updated");
                Ok(FileOutcome::Updated)
            }
            None => {
                self.forge
                    .create_file(repo, commit(create_message))
                    .await
                    .map_err(|e| PublishError::write(format!("create {} in {}", path, repo), e))?;
                info!(%repo, path, "file created");
                Ok(FileOutcome::Created)
            }
        }
    }

    /// Serve the branch root with Pages.
    async fn ensure_pages(&self, repo: &RepoRef) -> Result<HostingOutcome, PublishError> {
        let desired = PagesSource::root(&self.settings.branch);
        let current = self
            .forge
            .get_pages(repo)
            .await
            .map_err(|e| PublishError::lookup(format!("Pages configuration of {}", repo), e))?;

        match current {
            Some(site) if site.source.as_ref() == Some(&desired) => {
                debug!(%repo, source = %desired, "Pages already configured");
                Ok(HostingOutcome::AlreadyConfigured)
            }
            Some(_) => {
                self.update_pages(repo, &desired).await?;
                Ok(HostingOutcome::Updated)
            }
            None => match self.forge.create_pages(repo, &desired).await {
                Ok(_) => {
                    info!(%repo, source = %desired, "Pages enabled");
                    Ok(HostingOutcome::Enabled)
                }
                Err(e) if e.is_conflict() => {
                    debug!(%repo, "Pages enabled concurrently, updating instead");
                    self.update_pages(repo, &desired).await?;
                    Ok(HostingOutcome::Updated)
                }
                Err(e) => Err(PublishError::write(format!("enable Pages for {}", repo), e)),
            },
        }
    }

    async fn update_pages(&self, repo: &RepoRef, source: &PagesSource) -> Result<(), PublishError> {
        self.forge
            .update_pages(repo, source)
            .await
            .map_err(|e| PublishError::write(format!("update Pages for {}", repo), e))?;
        info!(%repo, %source, "Pages source updated");
        Ok(())
    }

    /// Read the public URL back, falling back to the conventional one.
    async fn read_back_url(&self, repo: &RepoRef, warnings: &mut Vec<String>) -> String {
        let fallback = naming::derived_site_url(&repo.owner, &repo.name);
        let problem = match self.forge.get_pages(repo).await {
            Ok(Some(site)) => match site.html_url {
                Some(url) if !url.is_empty() => return url,
                _ => "no site URL was reported".to_string(),
            },
            Ok(None) => "Pages is not reported as enabled yet".to_string(),
            Err(e) => e.to_string(),
        };

        warn!(%repo, %problem, "could not read back site URL");
        warnings.push(format!(
            "could not read back the site URL ({}); using {}",
            problem, fallback
        ));
        fallback
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("settings", &self.settings)
            .field("forge", &self.forge.name())
            .finish()
    }
}
