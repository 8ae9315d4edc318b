//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`CityName`] - Target identifier driving a publish run
//! - [`RepoName`] - Validated remote repository name
//! - [`BranchName`] - Validated branch name for the served branch
//! - [`Credential`] - Access token with redacted formatting
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use guild_publish::core::types::{BranchName, CityName, RepoName};
//!
//! let city = CityName::new("  Tulsa ").unwrap();
//! assert_eq!(city.as_str(), "Tulsa");
//!
//! let repo = RepoName::new("The-Tulsa-Software-Guild").unwrap();
//! assert_eq!(repo.as_str(), "The-Tulsa-Software-Guild");
//!
//! assert!(CityName::new("   ").is_err());
//! assert!(RepoName::new("The-Coeur-d'Alene-Guild").is_err());
//! assert!(BranchName::new("bad..branch").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid city name: {0}")]
    InvalidCityName(String),

    #[error("invalid repository name: {0}")]
    InvalidRepoName(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid credential: {0}")]
    InvalidCredential(String),
}

/// The place name a site is published for.
///
/// Surrounding whitespace is trimmed; inner whitespace is preserved
/// because it is significant for the rendered page and title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CityName(String);

impl CityName {
    /// Create a new city name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCityName` if the name is empty after trimming
    /// or contains control characters.
    pub fn new(name: impl AsRef<str>) -> Result<Self, TypeError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(TypeError::InvalidCityName(
                "city name cannot be empty".into(),
            ));
        }
        if name.chars().any(|c| c.is_control()) {
            return Err(TypeError::InvalidCityName(
                "city name cannot contain control characters".into(),
            ));
        }
        Ok(Self(name.to_string()))
    }

    /// Get the city name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The city name with every space removed, as used in repository names.
    pub fn compact(&self) -> String {
        self.0.replace(' ', "")
    }
}

impl TryFrom<String> for CityName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CityName> for String {
    fn from(name: CityName) -> Self {
        name.0
    }
}

impl AsRef<str> for CityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CityName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated remote repository name.
///
/// GitHub silently rewrites any character outside `[A-Za-z0-9._-]` to `-`
/// on creation. A name that would be rewritten could never be found again by
/// its derived form, so such names are rejected up front.
///
/// # Example
///
/// ```
/// use guild_publish::core::types::RepoName;
///
/// assert!(RepoName::new("The-St.Louis-Software-Guild").is_ok());
/// assert!(RepoName::new("").is_err());
/// assert!(RepoName::new("..").is_err());
/// assert!(RepoName::new("has/slash").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoName(String);

impl RepoName {
    /// Longest repository name GitHub accepts.
    pub const MAX_LEN: usize = 100;

    /// Create a new validated repository name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRepoName` if the name is empty, too long,
    /// reserved, or contains characters the platform would rewrite.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidRepoName(
                "repository name cannot be empty".into(),
            ));
        }
        if name.len() > Self::MAX_LEN {
            return Err(TypeError::InvalidRepoName(format!(
                "repository name cannot exceed {} characters",
                Self::MAX_LEN
            )));
        }
        if name == "." || name == ".." {
            return Err(TypeError::InvalidRepoName(format!(
                "'{name}' is reserved"
            )));
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(TypeError::InvalidRepoName(format!(
                "'{name}' contains unsupported character {c:?}"
            )));
        }
        Ok(())
    }

    /// Get the repository name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RepoName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RepoName> for String {
    fn from(name: RepoName) -> Self {
        name.0
    }
}

impl AsRef<str> for RepoName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RepoName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated branch name.
///
/// Applies the subset of Git's refname rules that matter for a branch the
/// publisher creates and serves from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be empty".into(),
            ));
        }
        if name == "@" {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be '@' (reserved)".into(),
            ));
        }
        if name.starts_with('.') || name.starts_with('-') || name.starts_with('/') {
            return Err(TypeError::InvalidBranchName(format!(
                "branch name cannot start with '{}'",
                &name[..1]
            )));
        }
        if name.ends_with(".lock") || name.ends_with('/') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot end with '.lock' or '/'".into(),
            ));
        }
        for seq in ["..", "@{", "//"] {
            if name.contains(seq) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{seq}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name
            .chars()
            .find(|c| INVALID_CHARS.contains(c) || c.is_ascii_control())
        {
            return Err(TypeError::InvalidBranchName(format!(
                "branch name cannot contain {c:?}"
            )));
        }

        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully qualified ref for this branch (`refs/heads/<name>`).
    pub fn as_ref_name(&self) -> String {
        format!("refs/heads/{}", self.0)
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque access token.
///
/// Never printed: both `Debug` and `Display` are redacted. Use
/// [`Credential::expose`] only when building an authorization header.
///
/// ```
/// use guild_publish::core::types::Credential;
///
/// let token = Credential::new("ghp_secret").unwrap();
/// assert!(!format!("{token:?}").contains("ghp_secret"));
/// assert!(!format!("{token}").contains("ghp_secret"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Create a credential from a raw token.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCredential` if the token is empty after
    /// trimming or contains whitespace.
    pub fn new(token: impl AsRef<str>) -> Result<Self, TypeError> {
        let token = token.as_ref().trim();
        if token.is_empty() {
            return Err(TypeError::InvalidCredential("token cannot be empty".into()));
        }
        if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidCredential(
                "token cannot contain whitespace".into(),
            ));
        }
        Ok(Self(token.to_string()))
    }

    /// The raw token value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod city_name {
        use super::*;

        #[test]
        fn trims_surrounding_whitespace() {
            let city = CityName::new("  Oklahoma City\n").unwrap();
            assert_eq!(city.as_str(), "Oklahoma City");
        }

        #[test]
        fn rejects_empty() {
            assert!(CityName::new("").is_err());
            assert!(CityName::new(" \t ").is_err());
        }

        #[test]
        fn rejects_control_characters() {
            assert!(CityName::new("Tul\u{7}sa").is_err());
        }

        #[test]
        fn compact_removes_spaces_only() {
            let city = CityName::new("St. Louis Park").unwrap();
            assert_eq!(city.compact(), "St.LouisPark");
        }

        #[test]
        fn serde_roundtrip() {
            let city = CityName::new("Tulsa").unwrap();
            let json = serde_json::to_string(&city).unwrap();
            assert_eq!(json, "\"Tulsa\"");
            let parsed: CityName = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, city);
        }
    }

    mod repo_name {
        use super::*;

        #[test]
        fn accepts_platform_safe_names() {
            assert!(RepoName::new("The-Tulsa-Software-Guild").is_ok());
            assert!(RepoName::new("a_b.c-d").is_ok());
        }

        #[test]
        fn rejects_rewritten_characters() {
            assert!(RepoName::new("The-Coeur d'Alene").is_err());
            assert!(RepoName::new("The-São-Paulo").is_err());
            assert!(RepoName::new("x/y").is_err());
        }

        #[test]
        fn rejects_reserved_and_long() {
            assert!(RepoName::new(".").is_err());
            assert!(RepoName::new("..").is_err());
            assert!(RepoName::new("a".repeat(RepoName::MAX_LEN + 1)).is_err());
            assert!(RepoName::new("a".repeat(RepoName::MAX_LEN)).is_ok());
        }
    }

    mod branch_name {
        use super::*;

        #[test]
        fn valid_names() {
            assert!(BranchName::new("main").is_ok());
            assert!(BranchName::new("gh-pages").is_ok());
            assert!(BranchName::new("site/live").is_ok());
        }

        #[test]
        fn invalid_names() {
            assert!(BranchName::new("").is_err());
            assert!(BranchName::new("@").is_err());
            assert!(BranchName::new(".hidden").is_err());
            assert!(BranchName::new("-dash").is_err());
            assert!(BranchName::new("a..b").is_err());
            assert!(BranchName::new("has space").is_err());
            assert!(BranchName::new("main.lock").is_err());
        }

        #[test]
        fn ref_name() {
            let branch = BranchName::new("main").unwrap();
            assert_eq!(branch.as_ref_name(), "refs/heads/main");
        }
    }

    mod credential {
        use super::*;

        #[test]
        fn redacts_formatting() {
            let token = Credential::new("ghp_abc123").unwrap();
            assert_eq!(format!("{token:?}"), "Credential(<redacted>)");
            assert_eq!(format!("{token}"), "<redacted>");
            assert_eq!(token.expose(), "ghp_abc123");
        }

        #[test]
        fn rejects_blank_and_spaced() {
            assert!(Credential::new("").is_err());
            assert!(Credential::new("   ").is_err());
            assert!(Credential::new("ghp abc").is_err());
        }

        #[test]
        fn trims_trailing_newline() {
            let token = Credential::new("ghp_abc\n").unwrap();
            assert_eq!(token.expose(), "ghp_abc");
        }
    }
}
