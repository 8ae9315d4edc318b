//! cli
//!
//! Command-line interface layer for guild-publish.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and acquire inputs
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! handlers in [`commands`], which call into [`crate::publisher`] for all
//! reconciliation work.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::config::{Config, ConfigLoadResult};
use crate::ui::output::{self, Verbosity};

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Explicit config file.
    pub config_path: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    /// Directory local files are resolved against.
    pub fn working_dir(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to determine current directory"),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Load configuration and print any load warnings.
    pub fn load_config(&self) -> Result<Config> {
        let cwd = self.working_dir()?;
        let ConfigLoadResult { config, warnings } =
            Config::load(&cwd, self.config_path.as_deref()).context("Failed to load config")?;

        for warning in warnings {
            match warning.path {
                Some(path) => output::warn(
                    format!("{} ({})", warning.message, path.display()),
                    self.verbosity(),
                ),
                None => output::warn(warning.message, self.verbosity()),
            }
        }
        if let Some(path) = config.loaded_from() {
            output::debug(
                format!("using config {}", path.display()),
                self.verbosity(),
            );
        }
        Ok(config)
    }
}

/// Run an already-parsed command line.
///
/// `main.rs` parses first so it can set up tracing from `--debug`.
pub fn run_with(cli: Cli) -> Result<()> {
    let ctx = Context {
        cwd: cli.cwd.clone(),
        config_path: cli.config.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    // Dispatch to command handler
    commands::dispatch(cli.command, &ctx)
}
