//! Path eligibility filtering.
//!
//! [`PathFilter::is_tracked`] decides whether a path is user content worth
//! protecting. Evaluation order:
//! 1. Resolve to the canonical absolute form (best effort for missing paths)
//! 2. Reject anything under a system or ephemeral root
//! 3. Reject the engine's own state and backup locations
//! 4. Reject paths matching an exclusion pattern
//! 5. Reject paths outside the watched root
//! 6. Accept only regular files
//!
//! Pattern matching is deliberately permissive. A plain pattern matches any
//! path component exactly (case-insensitive); a dotted pattern additionally
//! matches as a substring anywhere in the root-relative path, so `.git` also
//! covers `.github` and `.gitconfig`. Patterns containing `*` are globs.

use crate::utils::paths;
use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Roots that never hold user content worth protecting.
pub const DEFAULT_SYSTEM_ROOTS: &[&str] = &["/proc", "/sys", "/dev", "/run", "/tmp", "/var/log"];

/// Built-in exclusion list: VCS metadata, caches, build output, editor state.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    // Version control
    ".git",
    ".svn",
    ".hg",
    // Python
    "__pycache__",
    ".pyc",
    ".pyo",
    ".pyd",
    ".pytest_cache",
    ".coverage",
    ".eggs",
    // Node.js
    "node_modules",
    "npm-debug.log",
    "yarn-debug.log",
    "yarn-error.log",
    // IDE and editor files
    ".idea",
    ".vscode",
    ".vs",
    "*.swp",
    "*.swo",
    ".DS_Store",
    "Thumbs.db",
    // Build and dist
    "build",
    "dist",
    "*.egg-info",
    // Our own files
    crate::STATE_FILE_NAME,
    // Desktop session files
    "SingletonSocket",
    ".Xauthority",
    ".X11-unix",
    ".cache",
    ".local/share/Trash",
    ".mozilla/firefox/*.default/Cache",
    // Package manager caches
    ".npm",
    ".yarn",
    ".pip",
    ".gradle",
    ".m2",
    // Browser caches
    "Cache",
    "CacheStorage",
    ".config/google-chrome/Default/Cache",
    ".config/chromium/Default/Cache",
    ".mozilla/firefox/*.default/cache2",
];

/// Inputs for building a [`PathFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Absolute roots whose contents are never tracked
    pub system_roots: Vec<PathBuf>,
    /// Exclusion patterns (component, dotted-substring, or glob)
    pub exclude_patterns: Vec<String>,
    /// Exact locations to exclude along with everything beneath them
    pub excluded_paths: Vec<PathBuf>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            system_roots: DEFAULT_SYSTEM_ROOTS.iter().map(PathBuf::from).collect(),
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            excluded_paths: Vec::new(),
        }
    }
}

/// Decides which paths under the watched root are tracked.
#[derive(Debug, Clone)]
pub struct PathFilter {
    root: PathBuf,
    system_roots: Vec<PathBuf>,
    excluded_paths: Vec<PathBuf>,
    /// Lowercased exact-component patterns
    components: Vec<String>,
    /// Lowercased dotted patterns, matched as substrings
    dotted: Vec<String>,
    globs: Vec<Pattern>,
}

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl PathFilter {
    /// Builds a filter for `root`.
    ///
    /// System roots that contain the watched root itself are dropped: the
    /// caller explicitly chose to watch something beneath them. Glob patterns
    /// that fail to compile are skipped with a warning.
    #[must_use]
    pub fn new(config: FilterConfig, root: &Path) -> Self {
        let root = paths::normalize(root);

        let system_roots = config
            .system_roots
            .iter()
            .map(|r| paths::normalize(r))
            .filter(|r| {
                let contains_root = root.starts_with(r);
                if contains_root {
                    tracing::debug!(
                        "system root {} contains watched root, ignoring it",
                        r.display()
                    );
                }
                !contains_root
            })
            .collect();

        let excluded_paths = config
            .excluded_paths
            .iter()
            .map(|p| paths::normalize(p))
            .collect();

        let mut components = Vec::new();
        let mut dotted = Vec::new();
        let mut globs = Vec::new();
        for pattern in &config.exclude_patterns {
            if pattern.contains('*') {
                match Pattern::new(pattern) {
                    Ok(p) => globs.push(p),
                    Err(e) => tracing::warn!("Ignoring invalid glob pattern '{pattern}': {e}"),
                }
                continue;
            }
            let lower = pattern.to_lowercase();
            if lower.starts_with('.') {
                dotted.push(lower.clone());
            }
            if !lower.contains('/') {
                components.push(lower);
            } else if !lower.starts_with('.') {
                // Multi-component, non-dotted: substring match like dotted ones
                dotted.push(lower);
            }
        }

        Self {
            root,
            system_roots,
            excluded_paths,
            components,
            dotted,
            globs,
        }
    }

    /// The canonical watched root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` is a tracked file. Never fails: anything that cannot be
    /// inspected is simply not tracked.
    #[must_use]
    pub fn is_tracked(&self, path: &Path) -> bool {
        let normalized = paths::normalize(path);

        if self.system_roots.iter().any(|r| normalized.starts_with(r)) {
            return false;
        }

        if self.excluded_paths.iter().any(|p| normalized.starts_with(p)) {
            return false;
        }

        let Ok(relative) = normalized.strip_prefix(&self.root) else {
            return false;
        };
        if relative.as_os_str().is_empty() || self.is_excluded(relative) {
            return false;
        }

        fs::metadata(&normalized).is_ok_and(|m| m.is_file())
    }

    /// Whether a root-relative path matches an exclusion pattern.
    #[must_use]
    pub fn is_excluded(&self, relative: &Path) -> bool {
        let names: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().to_lowercase()),
                _ => None,
            })
            .collect();

        if names.iter().any(|n| self.components.contains(n)) {
            return true;
        }

        let joined = names.join("/");
        if self.dotted.iter().any(|d| joined.contains(d.as_str())) {
            return true;
        }

        if !self.globs.is_empty() {
            // Dot-directories named like caches are excluded along with globs
            if names.iter().any(|n| n.starts_with('.') && n.ends_with("cache")) {
                return true;
            }
            if self.matches_globs(&names) {
                return true;
            }
        }

        false
    }

    /// Single-component globs test each name; multi-component globs test
    /// every ancestor prefix of the relative path.
    fn matches_globs(&self, names: &[String]) -> bool {
        self.globs.iter().any(|glob| {
            if glob.as_str().contains('/') {
                (1..=names.len()).any(|n| {
                    glob.matches_with(&names[..n].join("/"), GLOB_OPTIONS)
                })
            } else {
                names.iter().any(|name| glob.matches_with(name, GLOB_OPTIONS))
            }
        })
    }
}
