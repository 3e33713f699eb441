use super::changes::{ChangeSet, Preservation};
use std::fmt;
use std::path::{Path, PathBuf};

/// Step during which a file had to be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipAction {
    /// Adding a path to the session record
    Record,
    /// Reading content for the snapshot
    Fingerprint,
    /// Copying into the backup store
    Backup,
    /// Deleting a new file
    Remove,
    /// Copying a backup over a modified file
    Revert,
    /// Copying a backup back into place for a deleted file
    Restore,
    /// Discarding the state record or backup store
    Cleanup,
}

impl fmt::Display for SkipAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Record => "record",
            Self::Fingerprint => "fingerprint",
            Self::Backup => "back up",
            Self::Remove => "remove",
            Self::Revert => "revert",
            Self::Restore => "restore",
            Self::Cleanup => "clean up",
        };
        f.write_str(s)
    }
}

/// A file the engine could not handle; the operation continued without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    /// Affected path
    pub path: PathBuf,
    /// What was being attempted
    pub action: SkipAction,
    /// Underlying error, rendered
    pub reason: String,
}

impl Skip {
    pub(crate) fn new(path: &Path, action: SkipAction, err: &anyhow::Error) -> Self {
        tracing::warn!("could not {action} {}: {err:#}", path.display());
        Self {
            path: path.to_path_buf(),
            action,
            reason: format!("{err:#}"),
        }
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not {} {}: {}",
            self.action,
            self.path.display(),
            self.reason
        )
    }
}

/// Identity of a started session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    /// Session identifier
    pub id: String,
    /// RFC 3339 start time
    pub started: String,
    /// Canonical watched root
    pub watched_root: PathBuf,
    /// Backup scratch directory
    pub backup_root: PathBuf,
}

/// Outcome of starting a session.
#[derive(Debug, Clone)]
pub struct BeginReport {
    /// The new session
    pub handle: SessionHandle,
    /// Number of files in the snapshot
    pub tracked: usize,
    /// Files that could not be read or backed up
    pub skipped: Vec<Skip>,
    /// Id of an earlier session whose record was overwritten
    pub replaced: Option<String>,
}

/// Outcome of ending a session.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Id of the session that ended
    pub session_id: String,
    /// Everything detected, before preservation
    pub changes: ChangeSet,
    /// What the user chose to keep
    pub preserved: Preservation,
    /// New files deleted
    pub removed: usize,
    /// Modified files reverted to their snapshot content
    pub reverted: usize,
    /// Deleted files put back
    pub restored: usize,
    /// Files that could not be handled
    pub skipped: Vec<Skip>,
}

impl ReconcileReport {
    /// Whether the session ended with nothing to undo.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.changes.is_empty()
    }

    /// Whether every non-preserved change was undone.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped
            .iter()
            .all(|skip| skip.action == SkipAction::Cleanup)
    }
}
