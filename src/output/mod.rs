//! User-facing output for the sws CLI.
//!
//! Routine messages are dimmed, warnings and errors bold, and everything
//! goes to stderr so stdout stays free for machine-readable output such as
//! shell completions. Diagnostics belong to `tracing`, not here.

mod progress;

use crate::session::ChangeKind;
use colored::Colorize;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};

pub use progress::Progress;

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Only warnings and errors.
    Quiet = 0,
    /// Standard messages.
    Normal = 1,
    /// Standard messages plus per-file detail.
    Verbose = 2,
}

/// Global verbosity setting (default: Normal).
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity level for all output functions.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Gets the current global verbosity level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

fn is_quiet() -> bool {
    get_verbosity() == Verbosity::Quiet
}

/// Prints a success message in green (respects quiet mode).
pub fn success(message: &str) {
    if is_quiet() {
        return;
    }
    eprintln!("{}", message.green());
}

/// Prints an error message in bold red (always shown).
pub fn error(message: &str) {
    eprintln!("{}", message.red().bold());
}

/// Prints a warning message in bold yellow (always shown).
pub fn warning(message: &str) {
    eprintln!("{}", message.yellow().bold());
}

/// Prints an informational message in dimmed color (respects quiet mode).
pub fn info(message: &str) {
    if is_quiet() {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Prints a verbose detail message (only in verbose mode).
pub fn verbose(message: &str) {
    if get_verbosity() != Verbosity::Verbose {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Prints an action line with a dimmed verb, e.g. `Removed 3 new files`.
pub fn action(verb: &str, message: &str) {
    if is_quiet() {
        return;
    }
    eprintln!("{} {}", verb.dimmed().bold(), message);
}

/// Prints one changed path, marked and colored by its category (only in
/// verbose mode).
pub fn change(kind: ChangeKind, path: &Path) {
    if get_verbosity() != Verbosity::Verbose {
        return;
    }
    let line = format!("  {} {}", kind.symbol(), path.display());
    let styled = match kind {
        ChangeKind::New => line.green(),
        ChangeKind::Modified => line.yellow(),
        ChangeKind::Deleted => line.red(),
    };
    eprintln!("{styled}");
}

/// Prints a path the user chose to keep.
pub fn preserved(path: &Path) {
    if is_quiet() {
        return;
    }
    eprintln!("  {} {}", "+".green().bold(), path.display());
}

/// `1 file` / `2 files`.
#[must_use]
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Starts a progress bar; it stays hidden in quiet mode or off a TTY.
#[must_use]
pub fn start_progress(title: &str, total: usize) -> Progress {
    if is_quiet() {
        Progress::hidden(title, total)
    } else {
        Progress::new(title, total)
    }
}
