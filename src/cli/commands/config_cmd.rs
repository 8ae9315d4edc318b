//! config command - Show the effective configuration

use crate::cli::Context;
use anyhow::{Context as _, Result};

/// Print where the configuration came from followed by the settings as TOML.
pub fn config(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    let text = config.to_toml().context("Failed to render config")?;

    match config.loaded_from() {
        Some(path) => println!("# loaded from {}", path.display()),
        None => println!("# built-in defaults"),
    }
    print!("{}", text);
    Ok(())
}
