#![warn(missing_docs)]
// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Simple counters cannot overflow
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # Secure Workspace - Snapshot and Restore for a Home Directory
//!
//! `sws start` records the content of every tracked file under a watched root
//! and keeps byte copies on the side. `sws stop` finds what changed since,
//! asks which changes to keep, and puts everything else back: new files are
//! deleted, modified files reverted, and deleted files restored.
//!
//! ## Architecture
//!
//! - [`filter`]: which paths under the root are tracked
//! - [`fingerprint`]: SHA-256 content fingerprints
//! - [`storage`]: backup copies and the persisted session record
//! - [`scanner`]: listing files under the root
//! - [`session`]: the begin / reconcile lifecycle
//! - [`prompt`]: deciding which changes to keep
//! - [`config`]: configuration parsing and validation
//! - [`commands`]: CLI command implementations
//! - [`output`]: user-facing messages and progress display
//! - [`utils`]: path helpers
//!
//! ## Example Usage
//!
//! ```no_run
//! use secure_workspace::prompt::PreserveNone;
//! use secure_workspace::session::Workspace;
//! use secure_workspace::storage::FileStateStore;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let store = FileStateStore::new("/var/tmp/sws-state.json");
//! let workspace = Workspace::new(Path::new("/home/me"), store)?;
//!
//! let started = workspace.begin()?;
//! println!("tracking {} files", started.tracked);
//!
//! // ... the user works ...
//!
//! let report = workspace.reconcile(&mut PreserveNone)?;
//! println!("{} reverted, {} removed", report.reverted, report.removed);
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Path filtering for tracked files.
pub mod filter;

/// Content fingerprinting.
pub mod fingerprint;

/// Output formatting and progress display.
pub mod output;

/// Preservation decisions, interactive and otherwise.
pub mod prompt;

/// Filesystem enumeration under the watched root.
pub mod scanner;

/// Session orchestration: begin, classify, reconcile.
pub mod session;

/// Backup store and session state persistence.
pub mod storage;

/// Utility functions and helpers.
pub mod utils;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Current version of the sws binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file path relative to home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/secure-workspace/config.toml";

/// File name of the session record in the default state location.
pub const STATE_FILE_NAME: &str = ".secure_workspace_state";

/// Central context for CLI operations.
///
/// Resolves where the config lives, which root is watched, and where the
/// session record is kept, applying environment and flag overrides.
///
/// # Examples
///
/// ```no_run
/// use secure_workspace::WorkspaceContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Root and state from config, environment, or defaults
/// let ctx = WorkspaceContext::new(None, None)?;
///
/// // Explicit paths (for testing)
/// let ctx = WorkspaceContext::new_explicit(
///     "/tmp/test_home".into(),
///     "/tmp/test_state.json".into(),
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,

    /// Root whose files are protected.
    pub watched_root: PathBuf,

    /// Location of the session record.
    pub state_path: PathBuf,

    /// Whether to run in non-interactive mode (no prompts).
    /// Used primarily for testing to prevent stdin reads.
    pub non_interactive: bool,
}

impl WorkspaceContext {
    /// Creates a context from the config file, environment, and overrides.
    ///
    /// Precedence, highest first: the override arguments (the CLI passes
    /// `--root` / `--state`, which clap also fills from `SWS_ROOT` /
    /// `SWS_STATE_PATH`), the config file, then defaults (home directory and
    /// `<tmp>/.secure_workspace_state`).
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined or if the
    /// configuration file exists but cannot be parsed.
    pub fn new(root_override: Option<PathBuf>, state_override: Option<PathBuf>) -> Result<Self> {
        // Check environment variable for config path first
        let config_path = if let Ok(path) = std::env::var("SWS_CONFIG_PATH") {
            PathBuf::from(path)
        } else {
            let home = dirs::home_dir().context("Could not find home directory")?;
            home.join(DEFAULT_CONFIG_PATH)
        };

        let config = config::Config::load(&config_path)?;

        if config_path.exists() {
            let validator = config::validator::ConfigValidator::new();
            if let Err(e) = validator.validate_config_file(&config_path) {
                output::warning(&format!("Configuration validation failed: {e}"));
            }
        }

        let watched_root = match root_override.or_else(|| config.core.watched_root.clone()) {
            Some(root) => utils::paths::expand_tilde(&root)?,
            None => dirs::home_dir().context("Could not find home directory")?,
        };

        let state_path = match state_override {
            Some(path) => utils::paths::expand_tilde(&path)?,
            None => utils::paths::expand_tilde(&config.core.state_path)?,
        };

        Ok(Self {
            config_path,
            config,
            watched_root,
            state_path,
            non_interactive: false,
        })
    }

    /// Creates a context with explicit paths and default configuration.
    /// This avoids the need for environment variable manipulation.
    #[must_use]
    pub fn new_explicit(watched_root: PathBuf, state_path: PathBuf) -> Self {
        Self {
            config_path: PathBuf::new(),
            config: config::Config::default(),
            watched_root,
            state_path,
            non_interactive: true,
        }
    }

    /// Builds the session engine for this context.
    ///
    /// # Errors
    /// Returns [`session::SessionError::RootUnavailable`] if the watched root
    /// does not exist.
    pub fn workspace(&self) -> Result<session::Workspace<storage::FileStateStore>> {
        let store = storage::FileStateStore::new(&self.state_path);
        let workspace = session::Workspace::new(&self.watched_root, store)?
            .with_filter(self.config.filter_config(&self.state_path))
            .with_fingerprinter(fingerprint::Fingerprinter::new(
                self.config.core.mmap_threshold,
            ))
            .with_backup_parent(self.config.backup_parent())
            .with_progress(!self.non_interactive);
        Ok(workspace)
    }
}
