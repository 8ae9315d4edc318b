//! core::naming
//!
//! Derived names for a published site.
//!
//! Every function here is a pure function of the city name and the
//! configured affixes, so repeated runs always target the same remote
//! repository.
//!
//! # Example
//!
//! ```
//! use guild_publish::core::naming::{repo_name, site_title};
//! use guild_publish::core::types::CityName;
//!
//! let city = CityName::new("Oklahoma City").unwrap();
//! assert_eq!(
//!     repo_name(&city, "The-", "-Software-Guild").unwrap().as_str(),
//!     "The-OklahomaCity-Software-Guild"
//! );
//! assert_eq!(
//!     site_title(&city, "The-", "-Software-Guild"),
//!     "The Oklahoma City Software Guild"
//! );
//! ```

use crate::core::types::{CityName, RepoName, TypeError};

/// Repository name: `{prefix}{city without spaces}{suffix}`.
///
/// # Errors
///
/// Returns `TypeError::InvalidRepoName` if the result contains characters the
/// remote platform would rewrite.
pub fn repo_name(city: &CityName, prefix: &str, suffix: &str) -> Result<RepoName, TypeError> {
    RepoName::new(format!("{}{}{}", prefix, city.compact(), suffix))
}

/// Human-readable site title: prefix words, city, suffix words.
pub fn site_title(city: &CityName, prefix: &str, suffix: &str) -> String {
    [affix_words(prefix), city.to_string(), affix_words(suffix)]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Repository description used when the repository is created.
pub fn repo_description(city: &CityName, suffix: &str) -> String {
    let suffix = affix_words(suffix);
    if suffix.is_empty() {
        format!("GitHub Pages site for {}", city)
    } else {
        format!("GitHub Pages site for {} {}", city, suffix)
    }
}

/// Commit message for creating or updating the marker file.
pub fn marker_commit_message(marker_path: &str) -> String {
    format!("Add {} to enable direct HTML serving", marker_path)
}

/// Commit message for the first deployment of the rendered document.
pub fn initial_deploy_message(city: &CityName) -> String {
    format!("Initial site deployment for {}", city)
}

/// Commit message for updating the rendered document.
pub fn update_deploy_message(city: &CityName) -> String {
    format!("Update site content for {}", city)
}

/// Conventional Pages URL for a user-owned repository.
///
/// Used only when the hosting configuration cannot be read back.
pub fn derived_site_url(owner: &str, repo: &RepoName) -> String {
    format!("https://{}.github.io/{}/", owner.to_ascii_lowercase(), repo)
}

/// Split a hyphenated affix into space-separated words.
fn affix_words(affix: &str) -> String {
    affix
        .split('-')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "The-";
    const SUFFIX: &str = "-Software-Guild";

    fn city(name: &str) -> CityName {
        CityName::new(name).unwrap()
    }

    #[test]
    fn repo_name_removes_spaces() {
        let name = repo_name(&city("Tulsa"), PREFIX, SUFFIX).unwrap();
        assert_eq!(name.as_str(), "The-Tulsa-Software-Guild");

        let name = repo_name(&city("Oklahoma City"), PREFIX, SUFFIX).unwrap();
        assert_eq!(name.as_str(), "The-OklahomaCity-Software-Guild");
    }

    #[test]
    fn repo_name_rejects_unsupported_characters() {
        assert!(repo_name(&city("Coeur d'Alene"), PREFIX, SUFFIX).is_err());
    }

    #[test]
    fn title_joins_words() {
        assert_eq!(
            site_title(&city("Tulsa"), PREFIX, SUFFIX),
            "The Tulsa Software Guild"
        );
        assert_eq!(
            site_title(&city("Oklahoma City"), PREFIX, SUFFIX),
            "The Oklahoma City Software Guild"
        );
    }

    #[test]
    fn title_with_empty_affixes() {
        assert_eq!(site_title(&city("Tulsa"), "", ""), "Tulsa");
        assert_eq!(site_title(&city("Tulsa"), "-", "--"), "Tulsa");
    }

    #[test]
    fn description_uses_suffix_words() {
        assert_eq!(
            repo_description(&city("Tulsa"), SUFFIX),
            "GitHub Pages site for Tulsa Software Guild"
        );
        assert_eq!(
            repo_description(&city("Tulsa"), ""),
            "GitHub Pages site for Tulsa"
        );
    }

    #[test]
    fn commit_messages() {
        assert_eq!(
            marker_commit_message(".nojekyll"),
            "Add .nojekyll to enable direct HTML serving"
        );
        assert_eq!(
            initial_deploy_message(&city("Tulsa")),
            "Initial site deployment for Tulsa"
        );
        assert_eq!(
            update_deploy_message(&city("Tulsa")),
            "Update site content for Tulsa"
        );
    }

    #[test]
    fn derived_url_lowercases_owner() {
        let repo = RepoName::new("The-Tulsa-Software-Guild").unwrap();
        assert_eq!(
            derived_site_url("OctoCat", &repo),
            "https://octocat.github.io/The-Tulsa-Software-Guild/"
        );
    }
}
