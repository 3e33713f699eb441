//! Command-line interface definitions for sws.
//!
//! The CLI definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes, so we
//! allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for sws.
#[derive(Parser)]
#[command(
    name = "sws",
    version = crate::VERSION,
    about = "Snapshot your home directory and roll back what a session changed",
    long_about = "Records every tracked file under the watched root on start, and on stop \
                  reverts modifications, restores deletions and removes new files, except \
                  the changes you choose to keep"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Directory to protect (default: home directory)
    #[arg(long, global = true, env = "SWS_ROOT", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Where the session record is kept
    #[arg(long, global = true, env = "SWS_STATE_PATH", value_name = "FILE")]
    pub state: Option<PathBuf>,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Snapshot the watched root and start a session
    Start,

    /// End the session, undoing changes you do not keep
    Stop {
        /// Keep these paths without prompting (absolute, ~/, or relative to the root)
        #[arg(short, long, value_name = "PATH", num_args = 1.., conflicts_with = "discard_all")]
        preserve: Vec<PathBuf>,

        /// Undo every change without prompting
        #[arg(long)]
        discard_all: bool,
    },

    /// Show what changed in the active session without touching anything
    Status {
        /// Print only the number of changes per category
        #[arg(short, long)]
        short: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
