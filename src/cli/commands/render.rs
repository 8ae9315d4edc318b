//! cli::commands::render
//!
//! Render the page for a city without publishing it.
//!
//! Runs the same allow-list check and substitution as `publish`, then writes
//! the document to a file or stdout. No token is needed.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::publisher::{inputs, prepare};
use crate::ui::output;

/// Render the document for `city` (or `CITY_INPUT`).
pub fn render(ctx: &Context, city: Option<&str>, out: Option<&Path>) -> Result<()> {
    let verbosity = ctx.verbosity();
    let config = ctx.load_config()?;
    let city = inputs::resolve_city(city)?;

    let site = prepare(&config.settings, &city)?;
    output::warnings(&site.warnings, verbosity);

    match out {
        Some(path) => {
            let path = if path.is_relative() {
                ctx.working_dir()?.join(path)
            } else {
                path.to_path_buf()
            };
            fs::write(&path, &site.document)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            output::success(
                format!("Rendered {} to {}", site.title, path.display()),
                verbosity,
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(site.document.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
