//! cli::commands::publish
//!
//! Publish a city's guild site to GitHub Pages.
//!
//! # Design
//!
//! The handler acquires both inputs before anything else, so a missing city
//! or token fails without reading files or calling GitHub. `--dry-run` stops
//! after the local stages and never needs a token.
//!
//! # Example
//!
//! ```bash
//! GH_TOKEN=ghp_... guild-publish publish --city Tulsa
//! ```

use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::core::config::PublisherConfig;
use crate::core::types::CityName;
use crate::forge::github::GitHubForge;
use crate::publisher::{inputs, prepare, PublishReport, Publisher};
use crate::ui::output::{self, Verbosity};

/// Publish the site for `city` (or `CITY_INPUT`).
pub fn publish(ctx: &Context, city: Option<&str>, dry_run: bool) -> Result<()> {
    let city = inputs::resolve_city(city)?;
    if dry_run {
        let config = ctx.load_config()?;
        return dry_run_summary(&config.settings, &city, ctx.verbosity());
    }

    let token = inputs::resolve_credential()?;
    let config = ctx.load_config()?;
    let forge = GitHubForge::with_api_base(token, config.settings.api_base());
    let publisher = Publisher::new(config.settings, Arc::new(forge));

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let report = rt.block_on(publisher.publish(&city))?;

    print_report(&report, ctx.verbosity());
    Ok(())
}

fn dry_run_summary(settings: &PublisherConfig, city: &CityName, verbosity: Verbosity) -> Result<()> {
    let site = prepare(settings, city)?;

    output::heading(format!("Dry run for {}", site.city), verbosity);
    output::stage("repository", &site.repo_name, verbosity);
    output::stage("title", &site.title, verbosity);
    output::stage("branch", &settings.branch, verbosity);
    output::stage(
        "document",
        format!(
            "{} ({} bytes, {} placeholder replacements)",
            settings.document_path,
            site.document.len(),
            site.placeholder_hits
        ),
        verbosity,
    );
    output::warnings(&site.warnings, verbosity);
    output::success("No changes made.", verbosity);
    Ok(())
}

fn print_report(report: &PublishReport, verbosity: Verbosity) {
    output::heading(format!("Published {}", report.city), verbosity);
    output::stage(
        "repository",
        format!("{} ({})", report.repo, report.repo_outcome),
        verbosity,
    );
    output::stage(
        "branch",
        format!("{} ({})", report.branch, report.branch_outcome),
        verbosity,
    );
    output::stage(
        "marker",
        format!("{} ({})", report.marker.0, report.marker.1),
        verbosity,
    );
    output::stage(
        "document",
        format!("{} ({})", report.document.0, report.document.1),
        verbosity,
    );
    output::stage("pages", report.hosting, verbosity);
    output::stage("repo url", &report.repo_url, verbosity);

    output::warnings(&report.warnings, verbosity);

    if report.is_noop() {
        output::debug("everything was already up to date", verbosity);
    }

    output::result(&report.site_url);
}
