//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads configuration and acquires inputs
//! 2. Calls the publisher to do the work
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! `publish` talks to GitHub, so it builds a current-thread tokio runtime
//! and blocks on the publisher. Every other command is synchronous.

mod completion;
mod config_cmd;
mod publish;
mod render;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::config;
pub use publish::publish;
pub use render::render;

use super::Context;
use crate::cli::args::Command;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Publish { city, dry_run } => publish(ctx, city.as_deref(), dry_run),
        Command::Render { city, output } => render(ctx, city.as_deref(), output.as_deref()),
        Command::Config => config(ctx),
        Command::Completion { shell } => completion(shell, &mut std::io::stdout()),
    }
}
