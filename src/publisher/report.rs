//! publisher::report
//!
//! Results of the local and remote publishing stages.

use std::fmt;

use crate::core::types::{BranchName, CityName, RepoName};
use crate::forge::RepoRef;

/// What happened to the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoOutcome {
    /// Already existed and was reused.
    Found,
    /// Created by this run.
    Created,
}

/// What happened to the branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOutcome {
    Present,
    /// Created from the most recent commit.
    Created,
}

/// What happened to a tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Created,
    Updated,
    /// Remote content already matched; nothing was committed.
    UpToDate,
}

/// What happened to the Pages configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostingOutcome {
    /// Pages was enabled by this run.
    Enabled,
    /// An existing Pages site was pointed at the branch.
    Updated,
    /// Already served from the branch root; untouched.
    AlreadyConfigured,
}

impl fmt::Display for RepoOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RepoOutcome::Found => "found",
            RepoOutcome::Created => "created",
        })
    }
}

impl fmt::Display for BranchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BranchOutcome::Present => "present",
            BranchOutcome::Created => "created",
        })
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileOutcome::Created => "created",
            FileOutcome::Updated => "updated",
            FileOutcome::UpToDate => "up to date",
        })
    }
}

impl fmt::Display for HostingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HostingOutcome::Enabled => "enabled",
            HostingOutcome::Updated => "updated",
            HostingOutcome::AlreadyConfigured => "already configured",
        })
    }
}

/// Output of the local stages: validated city, derived names, rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSite {
    pub city: CityName,
    pub repo_name: RepoName,
    pub title: String,
    pub description: String,
    /// Rendered document to commit.
    pub document: String,
    /// Placeholder occurrences replaced in the template.
    pub placeholder_hits: usize,
    /// Non-fatal problems found while rendering.
    pub warnings: Vec<String>,
}

/// Summary of a completed publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub city: CityName,
    pub repo: RepoRef,
    /// Web URL of the repository.
    pub repo_url: String,
    pub repo_outcome: RepoOutcome,
    pub branch: BranchName,
    pub branch_outcome: BranchOutcome,
    /// Marker file path and outcome.
    pub marker: (String, FileOutcome),
    /// Document path and outcome.
    pub document: (String, FileOutcome),
    pub hosting: HostingOutcome,
    /// Public URL of the site.
    pub site_url: String,
    /// Non-fatal problems, in the order they were found.
    pub warnings: Vec<String>,
}

impl PublishReport {
    /// Whether the run found everything already in place.
    pub fn is_noop(&self) -> bool {
        self.repo_outcome == RepoOutcome::Found
            && self.branch_outcome == BranchOutcome::Present
            && self.marker.1 == FileOutcome::UpToDate
            && self.document.1 == FileOutcome::UpToDate
            && self.hosting == HostingOutcome::AlreadyConfigured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_display() {
        assert_eq!(RepoOutcome::Created.to_string(), "created");
        assert_eq!(BranchOutcome::Present.to_string(), "present");
        assert_eq!(FileOutcome::UpToDate.to_string(), "up to date");
        assert_eq!(
            HostingOutcome::AlreadyConfigured.to_string(),
            "already configured"
        );
    }

    #[test]
    fn noop_requires_every_stage_satisfied() {
        let mut report = PublishReport {
            city: CityName::new("Tulsa").unwrap(),
            repo: RepoRef::new("octocat", RepoName::new("The-Tulsa-Software-Guild").unwrap()),
            repo_url: "https://github.com/octocat/The-Tulsa-Software-Guild".into(),
            repo_outcome: RepoOutcome::Found,
            branch: BranchName::new("main").unwrap(),
            branch_outcome: BranchOutcome::Present,
            marker: (".nojekyll".into(), FileOutcome::UpToDate),
            document: ("index.html".into(), FileOutcome::UpToDate),
            hosting: HostingOutcome::AlreadyConfigured,
            site_url: "https://octocat.github.io/The-Tulsa-Software-Guild/".into(),
            warnings: Vec::new(),
        };
        assert!(report.is_noop());

        report.document.1 = FileOutcome::Updated;
        assert!(!report.is_noop());
    }
}
