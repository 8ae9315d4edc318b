//! core::allowlist
//!
//! Newline-delimited list of cities a site may be published for.
//!
//! Entries are trimmed and blank lines are ignored. Matching is exact and
//! case-sensitive against the trimmed city name.
//!
//! # Example
//!
//! ```
//! use guild_publish::core::allowlist::Allowlist;
//! use guild_publish::core::types::CityName;
//!
//! let list = Allowlist::parse("Tulsa\n  Oklahoma City  \n\n");
//! assert!(list.contains(&CityName::new("Oklahoma City").unwrap()));
//! assert!(!list.contains(&CityName::new("tulsa").unwrap()));
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::CityName;

/// Errors from loading an allow-list.
#[derive(Debug, Error)]
pub enum AllowlistError {
    #[error("allow-list file not found: '{0}'")]
    Missing(PathBuf),

    #[error("failed to read allow-list '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Set of permitted city names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
    entries: BTreeSet<String>,
}

impl Allowlist {
    /// Load an allow-list from a file.
    ///
    /// # Errors
    ///
    /// Returns `AllowlistError::Missing` if the file does not exist and
    /// `AllowlistError::ReadError` for any other I/O or encoding failure.
    pub fn load(path: &Path) -> Result<Self, AllowlistError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AllowlistError::Missing(path.to_path_buf())
            } else {
                AllowlistError::ReadError {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Ok(Self::parse(&contents))
    }

    /// Parse allow-list contents.
    pub fn parse(contents: &str) -> Self {
        let entries = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { entries }
    }

    /// Check whether a city is permitted.
    pub fn contains(&self, city: &CityName) -> bool {
        self.entries.contains(city.as_str())
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn city(name: &str) -> CityName {
        CityName::new(name).unwrap()
    }

    #[test]
    fn parse_trims_and_skips_blank_lines() {
        let list = Allowlist::parse("  Tulsa\r\n\n\tNorman \n   \n");
        assert_eq!(list.len(), 2);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["Norman", "Tulsa"]);
    }

    #[test]
    fn contains_is_exact() {
        let list = Allowlist::parse("Oklahoma City\nTulsa\n");
        assert!(list.contains(&city("Tulsa")));
        assert!(list.contains(&city("  Tulsa  ")));
        assert!(!list.contains(&city("TULSA")));
        assert!(!list.contains(&city("Oklahoma")));
        assert!(!list.contains(&city("OklahomaCity")));
    }

    #[test]
    fn duplicates_collapse() {
        let list = Allowlist::parse("Tulsa\nTulsa\n Tulsa");
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn empty_contents() {
        let list = Allowlist::parse("");
        assert!(list.is_empty());
        assert!(!list.contains(&city("Tulsa")));
    }

    #[test]
    fn load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = Allowlist::load(&temp.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, AllowlistError::Missing(_)));
        assert!(err.to_string().contains("nope.txt"));
    }

    #[test]
    fn load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cities.txt");
        fs::write(&path, "Tulsa\nNorman\n").unwrap();

        let list = Allowlist::load(&path).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&city("Norman")));
    }
}
