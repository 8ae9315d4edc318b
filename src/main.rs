//! guild-publish binary entry point.

use guild_publish::cli::{self, Cli};
use guild_publish::ui::output;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    if let Err(e) = cli::run_with(cli) {
        output::error(format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Send diagnostic traces to stderr.
///
/// `RUST_LOG` takes precedence over `--debug`.
fn init_tracing(debug: bool) {
    let default = if debug { "guild_publish=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
