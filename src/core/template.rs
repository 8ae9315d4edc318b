//! core::template
//!
//! HTML template substitution.
//!
//! # Rules
//!
//! - Every literal occurrence of the placeholder is replaced with the city.
//! - The first `<title>...</title>` element (tag matched case-insensitively,
//!   content on a single line) has its inner text replaced with the site
//!   title.
//! - A template without the placeholder still renders; the caller is told
//!   how many substitutions happened so it can warn.
//!
//! # Example
//!
//! ```
//! use guild_publish::core::template::Template;
//!
//! let template = Template::new("<TITLE>Old</TITLE><p>Oklahoma City</p>");
//! let rendered = template.render("Oklahoma City", "Tulsa", "The Tulsa Software Guild");
//!
//! assert_eq!(
//!     rendered.document,
//!     "<title>The Tulsa Software Guild</title><p>Tulsa</p>"
//! );
//! assert_eq!(rendered.placeholder_hits, 1);
//! assert!(rendered.title_replaced);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use thiserror::Error;

static TITLE_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title>.*?</title>").expect("title pattern is valid"));

/// Errors from loading a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template file not found: '{0}'")]
    Missing(PathBuf),

    #[error("template '{0}' is not valid UTF-8")]
    NotUtf8(PathBuf),

    #[error("failed to read template '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// An unrendered HTML template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
}

/// Output of [`Template::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The rendered document.
    pub document: String,
    /// How many placeholder occurrences were replaced.
    pub placeholder_hits: usize,
    /// Whether a title element was found and replaced.
    pub title_replaced: bool,
}

impl Template {
    /// Wrap template text.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Read a template from disk.
    ///
    /// # Errors
    ///
    /// - `TemplateError::Missing` if the file does not exist
    /// - `TemplateError::NotUtf8` if the contents are not UTF-8
    /// - `TemplateError::ReadError` for other I/O failures
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        match fs::read_to_string(path) {
            Ok(source) => Ok(Self::new(source)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TemplateError::Missing(path.to_path_buf()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                Err(TemplateError::NotUtf8(path.to_path_buf()))
            }
            Err(e) => Err(TemplateError::ReadError {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// The raw template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute the placeholder and the title.
    pub fn render(&self, placeholder: &str, city: &str, title: &str) -> Rendered {
        let (body, placeholder_hits) = if placeholder.is_empty() {
            (self.source.clone(), 0)
        } else {
            (
                self.source.replace(placeholder, city),
                self.source.matches(placeholder).count(),
            )
        };

        let title_replaced = TITLE_ELEMENT.is_match(&body);
        let replacement = format!("<title>{}</title>", title);
        let document = TITLE_ELEMENT
            .replace(&body, NoExpand(&replacement))
            .into_owned();

        Rendered {
            document,
            placeholder_hits,
            title_replaced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PLACEHOLDER: &str = "Oklahoma City";

    #[test]
    fn replaces_every_placeholder() {
        let template = Template::new(
            "<html><head><title>x</title></head>\
             <body>Oklahoma City devs meet in Oklahoma City.</body></html>",
        );
        let rendered = template.render(PLACEHOLDER, "Tulsa", "The Tulsa Software Guild");

        assert_eq!(rendered.placeholder_hits, 2);
        assert!(!rendered.document.contains(PLACEHOLDER));
        assert!(rendered
            .document
            .contains("<body>Tulsa devs meet in Tulsa.</body>"));
    }

    #[test]
    fn replaces_only_first_title() {
        let template = Template::new("<title>a</title><svg><title>b</title></svg>");
        let rendered = template.render(PLACEHOLDER, "Tulsa", "T");
        assert_eq!(rendered.document, "<title>T</title><svg><title>b</title></svg>");
    }

    #[test]
    fn title_match_is_case_insensitive() {
        let template = Template::new("<Title>Oklahoma City Guild</tItLe>");
        let rendered = template.render(PLACEHOLDER, "Norman", "The Norman Software Guild");
        assert_eq!(rendered.document, "<title>The Norman Software Guild</title>");
    }

    #[test]
    fn missing_placeholder_is_a_silent_noop() {
        let template = Template::new("<title>Old</title><p>Welcome!</p>");
        let rendered = template.render(PLACEHOLDER, "Tulsa", "The Tulsa Software Guild");

        assert_eq!(rendered.placeholder_hits, 0);
        assert!(rendered.title_replaced);
        assert_eq!(
            rendered.document,
            "<title>The Tulsa Software Guild</title><p>Welcome!</p>"
        );
    }

    #[test]
    fn missing_title_leaves_document() {
        let template = Template::new("<p>Oklahoma City</p>");
        let rendered = template.render(PLACEHOLDER, "Tulsa", "The Tulsa Software Guild");
        assert!(!rendered.title_replaced);
        assert_eq!(rendered.document, "<p>Tulsa</p>");
    }

    #[test]
    fn dollar_signs_are_not_expanded() {
        let template = Template::new("<title>x</title>");
        let rendered = template.render(PLACEHOLDER, "Tulsa", "Guild $1 ${name}");
        assert_eq!(rendered.document, "<title>Guild $1 ${name}</title>");
    }

    #[test]
    fn empty_placeholder_replaces_nothing() {
        let template = Template::new("<p>abc</p>");
        let rendered = template.render("", "Tulsa", "T");
        assert_eq!(rendered.placeholder_hits, 0);
        assert_eq!(rendered.document, "<p>abc</p>");
    }

    #[test]
    fn load_missing() {
        let temp = TempDir::new().unwrap();
        let err = Template::load(&temp.path().join("index.html")).unwrap_err();
        assert!(matches!(err, TemplateError::Missing(_)));
    }

    #[test]
    fn load_not_utf8() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.html");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let err = Template::load(&path).unwrap_err();
        assert!(matches!(err, TemplateError::NotUtf8(_)));
    }

    #[test]
    fn load_reads_contents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.html");
        fs::write(&path, "<title>hi</title>").unwrap();
        let template = Template::load(&path).unwrap();
        assert_eq!(template.source(), "<title>hi</title>");
    }
}
