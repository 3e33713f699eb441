//! File enumeration under the watched root.
//!
//! The session engine never walks the filesystem itself: it asks a
//! [`FileEnumerator`] for every regular file under the root and filters the
//! result. [`WalkEnumerator`] is the production implementation; tests can
//! substitute a failing or fixed listing.

/// Walkdir-backed enumerator.
pub mod walk;

pub use walk::WalkEnumerator;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Lists all regular files under a root.
pub trait FileEnumerator {
    /// Returns every regular file beneath `root` (symlinks are not followed).
    ///
    /// # Errors
    ///
    /// Returns an error only when enumeration cannot run at all, e.g. the
    /// root itself is unreadable. Unreadable subdirectories are skipped.
    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>>;
}

impl<F> FileEnumerator for F
where
    F: Fn(&Path) -> Result<Vec<PathBuf>>,
{
    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        self(root)
    }
}
