//! core
//!
//! Core domain types and the purely local publishing steps.
//!
//! # Modules
//!
//! - [`types`] - Strong types: CityName, RepoName, BranchName, Credential
//! - [`naming`] - Derived repository name, title, and commit messages
//! - [`allowlist`] - Permitted city names
//! - [`template`] - Placeholder and title substitution
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Nothing in this module touches the network
//! - All derivations are deterministic

pub mod allowlist;
pub mod config;
pub mod naming;
pub mod template;
pub mod types;
