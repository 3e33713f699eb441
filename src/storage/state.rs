use crate::fingerprint::Fingerprint;
use crate::session::SessionError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Persisted record of an active session.
///
/// Serialized as JSON:
/// `{"id", "started", "watchedRoot", "backupRoot", "snapshot": {path: hex}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SessionState {
    /// Session identifier, unique per start
    pub id: String,
    /// RFC 3339 start time
    pub started: String,
    /// Canonical watched root the snapshot was taken under
    pub watched_root: PathBuf,
    /// Backup store scratch directory
    pub backup_root: PathBuf,
    /// Tracked path to fingerprint at start
    pub snapshot: BTreeMap<PathBuf, Fingerprint>,
}

impl SessionState {
    /// Parses a state record from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a valid state record.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Malformed session state")
    }

    /// Serializes the record to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize session state")
    }
}

/// Durable home of the single [`SessionState`] a store holds.
///
/// `load` failing with [`SessionError::NoActiveSession`] is how callers learn
/// that no session was started.
pub trait StateStore {
    /// Persists `state`, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn save(&self, state: &SessionState) -> Result<()>;

    /// Reads the current record.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveSession`] if there is no record or it
    /// cannot be parsed.
    fn load(&self) -> Result<SessionState>;

    /// Removes the record. Removing an absent record succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing record cannot be removed.
    fn clear(&self) -> Result<()>;

    /// Human-readable location, for messages.
    fn describe(&self) -> String;

    /// Filesystem location of the record, if it lives on disk.
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Stores the record as a JSON file at a fixed path.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// A store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The record's location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    fn save(&self, state: &SessionState) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create state directory {}", parent.display()))?;

        // Write to a sibling and rename so a crash never leaves half a record
        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
        tmp.write_all(state.to_json()?.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to write session state {}", self.path.display()))?;
        Ok(())
    }

    fn load(&self) -> Result<SessionState> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            tracing::debug!("cannot read {}: {e}", self.path.display());
            SessionError::NoActiveSession(self.describe())
        })?;
        SessionState::from_json(&content).map_err(|e| {
            tracing::warn!("ignoring unreadable session state {}: {e:#}", self.path.display());
            SessionError::NoActiveSession(self.describe()).into()
        })
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to remove session state {}", self.path.display())
            }),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Keeps the serialized record in memory; for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStateStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored text verbatim, valid or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the store's lock is poisoned.
    pub fn set_raw(&self, content: impl Into<String>) -> Result<()> {
        *self.lock()? = Some(content.into());
        Ok(())
    }

    /// Whether a record is present.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.slot.lock().map(|s| s.is_some()).unwrap_or(false)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.slot
            .lock()
            .map_err(|_| anyhow::anyhow!("memory state store lock poisoned"))
    }
}

impl StateStore for MemoryStateStore {
    fn save(&self, state: &SessionState) -> Result<()> {
        let json = state.to_json()?;
        *self.lock()? = Some(json);
        Ok(())
    }

    fn load(&self) -> Result<SessionState> {
        let content = self
            .lock()?
            .clone()
            .ok_or_else(|| SessionError::NoActiveSession(self.describe()))?;
        SessionState::from_json(&content)
            .map_err(|_| SessionError::NoActiveSession(self.describe()).into())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory state".to_string()
    }
}

impl<S: StateStore + ?Sized> StateStore for &S {
    fn save(&self, state: &SessionState) -> Result<()> {
        (**self).save(state)
    }

    fn load(&self) -> Result<SessionState> {
        (**self).load()
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }

    fn location(&self) -> Option<&Path> {
        (**self).location()
    }
}
