//! forge
//!
//! Abstraction for the remote hosting service.
//!
//! # Architecture
//!
//! The `Forge` trait defines the narrow surface the publisher reconciles
//! against: the authenticated user, repositories, branches, single files,
//! and Pages hosting. The publisher only ever holds an `Arc<dyn Forge>`, so
//! tests swap in [`mock::MockForge`] without touching the network.
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait and request/response types
//! - [`github`]: GitHub implementation using the REST API
//! - [`mock`]: Mock implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use guild_publish::forge::{github::GitHubForge, Forge};
//!
//! let forge: Arc<dyn Forge> = Arc::new(GitHubForge::with_api_base(token, api_base));
//! let login = forge.authenticated_user().await?;
//! ```

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
