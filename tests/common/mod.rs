#![allow(dead_code)]

use anyhow::Result;
use secure_workspace::WorkspaceContext;
use secure_workspace::session::Workspace;
use secure_workspace::storage::FileStateStore;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Watched root, state record, and backup parent in one throwaway directory.
///
/// Layout: `<tmp>/home` is watched, `<tmp>/state.json` holds the record and
/// backups go under `<tmp>/backups`, both outside the root.
pub struct TestWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub state_path: PathBuf,
    pub backup_parent: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base = temp_dir.path().canonicalize()?;
        let root = base.join("home");
        fs::create_dir_all(&root)?;

        Ok(Self {
            root,
            state_path: base.join("state.json"),
            backup_parent: base.join("backups"),
            temp_dir,
        })
    }

    /// Engine wired to this fixture's paths.
    pub fn workspace(&self) -> Result<Workspace<FileStateStore>> {
        Ok(
            Workspace::new(&self.root, FileStateStore::new(&self.state_path))?
                .with_backup_parent(&self.backup_parent),
        )
    }

    /// CLI context wired to this fixture's paths.
    pub fn context(&self) -> WorkspaceContext {
        let mut ctx = WorkspaceContext::new_explicit(self.root.clone(), self.state_path.clone());
        ctx.config.core.backup_parent = Some(self.backup_parent.clone());
        ctx
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn read(&self, relative: &str) -> Result<String> {
        Ok(fs::read_to_string(self.path(relative))?)
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    pub fn remove(&self, relative: &str) -> Result<()> {
        fs::remove_file(self.path(relative))?;
        Ok(())
    }

    /// Number of backup scratch directories left behind.
    pub fn backup_dirs(&self) -> Result<usize> {
        if !self.backup_parent.exists() {
            return Ok(0);
        }
        Ok(fs::read_dir(&self.backup_parent)?.count())
    }
}
