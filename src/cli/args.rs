//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Resolve local files as if started in that directory
//! - `--config <file>`: Use this config file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// guild-publish - Publish a city's software guild site to GitHub Pages
#[derive(Parser, Debug)]
#[command(name = "guild-publish")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Resolve local files as if guild-publish was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Configuration file (overrides GUILD_PUBLISH_CONFIG and the default locations)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the site for a city and publish it to GitHub Pages
    #[command(
        name = "publish",
        long_about = "Render the site for a city and publish it to GitHub Pages.\n\n\
            Creates the repository if it does not exist, makes sure the branch exists, \
            commits the marker file and the rendered page, and enables Pages. Every step \
            accepts an already-satisfied state, so running publish twice is safe.\n\n\
            The access token is read from GH_TOKEN.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Publish Tulsa's site
    GH_TOKEN=... guild-publish publish --city Tulsa

    # City from the environment, as in CI
    CITY_INPUT='Oklahoma City' GH_TOKEN=... guild-publish publish

    # Check the allow-list and render without touching GitHub
    guild-publish publish --city Tulsa --dry-run"
    )]
    Publish {
        /// City to publish (defaults to CITY_INPUT)
        #[arg(long)]
        city: Option<String>,

        /// Run the local steps only and show what would be published
        #[arg(long)]
        dry_run: bool,
    },

    /// Render the page for a city without publishing it
    #[command(
        name = "render",
        after_help = "\
WORKFLOW EXAMPLES:
    # Preview in the terminal
    guild-publish render --city Tulsa

    # Write to a file
    guild-publish render --city Tulsa --output preview.html"
    )]
    Render {
        /// City to render (defaults to CITY_INPUT)
        #[arg(long)]
        city: Option<String>,

        /// Write the page here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config,

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    guild-publish completion bash >> ~/.bashrc

    # Zsh
    guild-publish completion zsh > ~/.zfunc/_guild-publish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}
