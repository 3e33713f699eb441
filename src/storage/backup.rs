use crate::utils::paths::ensure_parent_dirs;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of backup scratch directory names.
pub const BACKUP_DIR_PREFIX: &str = "secure-workspace-";

/// Byte-for-byte copies of tracked files, mirroring the watched root's layout
/// under a scratch directory.
///
/// The scratch directory is created lazily on the first [`put`](Self::put),
/// with a fresh unique name under the configured parent.
#[derive(Debug)]
pub struct BackupStore {
    watched_root: PathBuf,
    parent: PathBuf,
    location: Option<PathBuf>,
}

impl BackupStore {
    /// A new, empty store that will create its scratch directory under `parent`.
    #[must_use]
    pub fn create(watched_root: &Path, parent: &Path) -> Self {
        Self {
            watched_root: watched_root.to_path_buf(),
            parent: parent.to_path_buf(),
            location: None,
        }
    }

    /// Reopens an existing store at `location`.
    #[must_use]
    pub fn open(watched_root: &Path, location: &Path) -> Self {
        Self {
            watched_root: watched_root.to_path_buf(),
            parent: location
                .parent()
                .map_or_else(|| location.to_path_buf(), Path::to_path_buf),
            location: Some(location.to_path_buf()),
        }
    }

    /// The scratch directory, if it exists yet.
    #[must_use]
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Returns the scratch directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_location(&mut self) -> Result<&Path> {
        if self.location.is_none() {
            fs::create_dir_all(&self.parent).with_context(|| {
                format!("Failed to create backup parent {}", self.parent.display())
            })?;
            let dir = tempfile::Builder::new()
                .prefix(BACKUP_DIR_PREFIX)
                .tempdir_in(&self.parent)
                .with_context(|| {
                    format!("Failed to create backup directory in {}", self.parent.display())
                })?;
            let kept = dir.keep();
            tracing::debug!("created backup store at {}", kept.display());
            self.location = Some(kept);
        }

        self.location
            .as_deref()
            .context("backup store location missing after creation")
    }

    /// Location of the entry for `tracked`, whether or not it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store has no directory yet or `tracked` lies
    /// outside the watched root.
    pub fn entry_path(&self, tracked: &Path) -> Result<PathBuf> {
        let location = self
            .location
            .as_deref()
            .context("backup store has not been created")?;
        let relative = tracked.strip_prefix(&self.watched_root).with_context(|| {
            format!(
                "{} is not under watched root {}",
                tracked.display(),
                self.watched_root.display()
            )
        })?;
        Ok(location.join(relative))
    }

    /// Copies the current content of `tracked` into the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be created or the copy fails.
    pub fn put(&mut self, tracked: &Path) -> Result<()> {
        self.ensure_location()?;
        let entry = self.entry_path(tracked)?;
        ensure_parent_dirs(&entry)?;
        fs::copy(tracked, &entry)
            .with_context(|| format!("Failed to back up {}", tracked.display()))?;
        Ok(())
    }

    /// Reads the stored content for `tracked`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no entry for `tracked`.
    pub fn get(&self, tracked: &Path) -> Result<Vec<u8>> {
        let entry = self.entry_path(tracked)?;
        fs::read(&entry).with_context(|| format!("No backup entry for {}", tracked.display()))
    }

    /// Writes the stored content back to `tracked`, recreating missing
    /// parent directories.
    ///
    /// Whatever now occupies `tracked` without being a regular file (a
    /// symlink, a directory) is removed first, so the copy never writes
    /// through a link.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no entry, the occupant cannot be removed,
    /// or the copy fails.
    pub fn restore(&self, tracked: &Path) -> Result<()> {
        let entry = self.entry_path(tracked)?;
        if !entry.is_file() {
            anyhow::bail!("No backup entry for {}", tracked.display());
        }
        if let Ok(meta) = fs::symlink_metadata(tracked) {
            let file_type = meta.file_type();
            let cleared = if file_type.is_dir() {
                fs::remove_dir_all(tracked)
            } else if file_type.is_file() {
                Ok(())
            } else {
                fs::remove_file(tracked)
            };
            cleared.with_context(|| format!("Failed to clear {}", tracked.display()))?;
        }
        ensure_parent_dirs(tracked)?;
        fs::copy(&entry, tracked)
            .with_context(|| format!("Failed to restore {}", tracked.display()))?;
        Ok(())
    }

    /// Deletes the scratch directory and everything in it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be removed.
    pub fn destroy(self) -> Result<()> {
        if let Some(location) = self.location
            && location.exists()
        {
            fs::remove_dir_all(&location).with_context(|| {
                format!("Failed to remove backup directory {}", location.display())
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_location_is_created_lazily() -> Result<()> {
        let root = tempdir()?;
        let scratch = tempdir()?;

        let mut store = BackupStore::create(root.path(), scratch.path());
        assert!(store.location().is_none());

        let file = root.path().join("notes.txt");
        fs::write(&file, "A")?;
        store.put(&file)?;

        let location = store.location().expect("created on put");
        assert!(location.starts_with(scratch.path()));
        assert!(
            location
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(BACKUP_DIR_PREFIX))
        );
        Ok(())
    }

    #[test]
    fn test_layout_mirrors_watched_root() -> Result<()> {
        let root = tempdir()?;
        let scratch = tempdir()?;
        let file = root.path().join("a/b/deep.txt");
        fs::create_dir_all(file.parent().expect("parent"))?;
        fs::write(&file, "deep")?;

        let mut store = BackupStore::create(root.path(), scratch.path());
        store.put(&file)?;

        let location = store.location().expect("location").to_path_buf();
        assert_eq!(fs::read_to_string(location.join("a/b/deep.txt"))?, "deep");
        assert_eq!(store.get(&file)?, b"deep");
        Ok(())
    }

    #[test]
    fn test_restore_recreates_parent_dirs() -> Result<()> {
        let root = tempdir()?;
        let scratch = tempdir()?;
        let file = root.path().join("docs/report.txt");
        fs::create_dir_all(file.parent().expect("parent"))?;
        fs::write(&file, "original")?;

        let mut store = BackupStore::create(root.path(), scratch.path());
        store.put(&file)?;
        fs::remove_dir_all(root.path().join("docs"))?;

        let reopened = BackupStore::open(root.path(), store.location().expect("location"));
        reopened.restore(&file)?;
        assert_eq!(fs::read_to_string(&file)?, "original");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_restore_replaces_symlink_without_touching_target() -> Result<()> {
        let root = tempdir()?;
        let scratch = tempdir()?;
        let file = root.path().join("notes.txt");
        let other = root.path().join("other.txt");
        fs::write(&file, "A")?;
        fs::write(&other, "O")?;

        let mut store = BackupStore::create(root.path(), scratch.path());
        store.put(&file)?;
        fs::remove_file(&file)?;
        std::os::unix::fs::symlink(&other, &file)?;

        store.restore(&file)?;
        assert!(fs::symlink_metadata(&file)?.file_type().is_file());
        assert_eq!(fs::read_to_string(&file)?, "A");
        assert_eq!(fs::read_to_string(&other)?, "O");
        Ok(())
    }

    #[test]
    fn test_restore_replaces_directory() -> Result<()> {
        let root = tempdir()?;
        let scratch = tempdir()?;
        let file = root.path().join("notes.txt");
        fs::write(&file, "A")?;

        let mut store = BackupStore::create(root.path(), scratch.path());
        store.put(&file)?;
        fs::remove_file(&file)?;
        fs::create_dir(&file)?;
        fs::write(file.join("inner.txt"), "x")?;

        store.restore(&file)?;
        assert_eq!(fs::read_to_string(&file)?, "A");
        Ok(())
    }

    #[test]
    fn test_restore_without_entry_fails() -> Result<()> {
        let root = tempdir()?;
        let scratch = tempdir()?;
        let mut store = BackupStore::create(root.path(), scratch.path());
        store.ensure_location()?;

        assert!(store.restore(&root.path().join("never-backed-up.txt")).is_err());
        Ok(())
    }

    #[test]
    fn test_path_outside_root_rejected() -> Result<()> {
        let root = tempdir()?;
        let scratch = tempdir()?;
        let mut store = BackupStore::create(root.path(), scratch.path());
        store.ensure_location()?;

        assert!(store.entry_path(Path::new("/etc/hosts")).is_err());
        Ok(())
    }

    #[test]
    fn test_destroy_removes_everything() -> Result<()> {
        let root = tempdir()?;
        let scratch = tempdir()?;
        let file = root.path().join("notes.txt");
        fs::write(&file, "A")?;

        let mut store = BackupStore::create(root.path(), scratch.path());
        store.put(&file)?;
        let location = store.location().expect("location").to_path_buf();

        store.destroy()?;
        assert!(!location.exists());
        assert!(file.exists());
        Ok(())
    }
}
