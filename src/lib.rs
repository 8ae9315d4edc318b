//! guild-publish - Publish a city's software guild site to GitHub Pages
//!
//! Renders an HTML template for a city and reconciles it into a GitHub
//! repository served by GitHub Pages: the repository, its branch, a
//! `.nojekyll` marker, the rendered `index.html`, and the Pages
//! configuration are each created when missing and left alone when already
//! correct.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to the publisher)
//! - [`publisher`] - Staged reconciliation of one city's site
//! - [`core`] - Domain types, configuration, naming, allow-list, and templating
//! - [`forge`] - Abstraction for the remote hosting service (GitHub v1)
//! - [`ui`] - Operator-facing output
//!
//! # Invariants
//!
//! 1. Nothing remote is touched until the city passes every local check
//! 2. A second run with unchanged inputs performs no writes
//! 3. A lookup failure is never mistaken for absence
//! 4. The access token never appears in output, errors, or traces

pub mod cli;
pub mod core;
pub mod forge;
pub mod publisher;
pub mod ui;
