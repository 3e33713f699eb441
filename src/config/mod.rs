//! Configuration file handling.

/// TOML parsing and validation
pub mod parser;
/// Unknown-key warnings
pub mod validator;

use crate::STATE_FILE_NAME;
use crate::filter::{DEFAULT_EXCLUDE_PATTERNS, DEFAULT_SYSTEM_ROOTS, FilterConfig};
use crate::fingerprint::DEFAULT_MMAP_THRESHOLD;
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration file contents.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// `[core]` section
    #[serde(default)]
    pub core: CoreConfig,

    /// `[filter]` section
    #[serde(default)]
    pub filter: FilterSettings,
}

/// Where things live and how files are read.
#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
    /// Directory to protect; the invoking user's home when unset
    #[serde(default)]
    pub watched_root: Option<PathBuf>,
    /// Fixed location of the persisted session record
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
    /// Where backup scratch directories are created; system temp when unset
    #[serde(default)]
    pub backup_parent: Option<PathBuf>,
    /// Files at least this many bytes are hashed through a memory map
    #[serde(default = "default_mmap_threshold")]
    pub mmap_threshold: u64,
}

/// Which paths are never tracked.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterSettings {
    /// System and ephemeral roots that are never tracked
    #[serde(default = "default_system_roots")]
    pub system_roots: Vec<PathBuf>,
    /// Exclusion patterns replacing the built-in list
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
    /// Extra patterns appended to `exclude_patterns`
    #[serde(default)]
    pub extra_patterns: Vec<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            watched_root: None,
            state_path: default_state_path(),
            backup_parent: None,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            system_roots: default_system_roots(),
            exclude_patterns: default_exclude_patterns(),
            extra_patterns: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a file, falling back to defaults when it is absent.
    ///
    /// The default file is not written out: it would live inside the watched
    /// root and show up as a new file in the first session.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, is not valid
    /// TOML, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        parser::parse_config_file(path)
    }

    /// Directory under which backup scratch directories are created.
    #[must_use]
    pub fn backup_parent(&self) -> PathBuf {
        self.core
            .backup_parent
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Builds the path filter configuration.
    ///
    /// The engine's own state record is always excluded. A backup parent
    /// inside the watched root is excluded by the workspace itself.
    #[must_use]
    pub fn filter_config(&self, state_path: &Path) -> FilterConfig {
        let mut exclude_patterns = self.filter.exclude_patterns.clone();
        exclude_patterns.extend(self.filter.extra_patterns.iter().cloned());

        FilterConfig {
            system_roots: self.filter.system_roots.clone(),
            exclude_patterns,
            excluded_paths: vec![state_path.to_path_buf()],
        }
    }
}

// Default functions for serde
fn default_state_path() -> PathBuf {
    std::env::temp_dir().join(STATE_FILE_NAME)
}

const fn default_mmap_threshold() -> u64 {
    DEFAULT_MMAP_THRESHOLD
}

fn default_system_roots() -> Vec<PathBuf> {
    DEFAULT_SYSTEM_ROOTS.iter().map(PathBuf::from).collect()
}

fn default_exclude_patterns() -> Vec<String> {
    DEFAULT_EXCLUDE_PATTERNS
        .iter()
        .map(|p| (*p).to_string())
        .collect()
}
