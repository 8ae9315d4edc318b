//! ui::output
//!
//! Operator-facing messages.
//!
//! # Streams
//!
//! - stdout: headings, stage lines, and the command's result
//! - stderr: warnings, errors, and `[debug]` notes
//!
//! Only [`result`] and [`error`] ignore `--quiet`. Structured traces are a
//! separate channel and go through `tracing`.

use std::fmt::Display;

/// How much the operator asked to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// `--quiet`: the result and errors only
    Quiet,
    /// Headings, stage lines, and warnings
    Normal,
    /// Everything, including `[debug]` notes
    Debug,
}

impl Verbosity {
    /// `--quiet` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        match (quiet, debug) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Debug,
            (false, false) => Verbosity::Normal,
        }
    }

    fn shows_status(self) -> bool {
        self != Verbosity::Quiet
    }
}

/// A line that introduces a group of stage lines.
pub fn heading(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows_status() {
        println!("{}", message);
    }
}

/// One aligned `label: detail` line.
pub fn stage(label: &str, detail: impl Display, verbosity: Verbosity) {
    if verbosity.shows_status() {
        println!("{}", format_stage(label, detail));
    }
}

/// Closing confirmation of a command.
pub fn success(message: impl Display, verbosity: Verbosity) {
    heading(message, verbosity);
}

pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows_status() {
        eprintln!("warning: {}", message);
    }
}

/// Print every warning collected by a run.
pub fn warnings<T: Display>(items: &[T], verbosity: Verbosity) {
    for item in items {
        warn(item, verbosity);
    }
}

pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print the value a command exists to produce. Shown even with `--quiet`.
pub fn result(value: impl Display) {
    println!("{}", value);
}

/// Print a fatal error.
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Format a stage line with the label padded to a fixed column.
pub fn format_stage(label: &str, detail: impl Display) -> String {
    format!("  {:<12} {}", format!("{}:", label), detail)
}
