use super::FileEnumerator;
use crate::session::SessionError;
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Enumerates files with `walkdir`, like `find <root> -type f`.
///
/// Symlinks are never followed, so a link to a directory outside the root
/// cannot pull foreign files into a session.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkEnumerator;

impl WalkEnumerator {
    /// Creates an enumerator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FileEnumerator for WalkEnumerator {
    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut unreadable = 0usize;

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(SessionError::Enumeration(format!(
                        "cannot read {}: {e}",
                        root.display()
                    ))
                    .into());
                }
                Err(e) => {
                    unreadable += 1;
                    tracing::debug!("skipping unreadable entry: {e}");
                    continue;
                }
            };

            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        if unreadable > 0 {
            tracing::warn!(
                "{unreadable} entries under {} could not be read",
                root.display()
            );
        }

        Ok(files)
    }
}
