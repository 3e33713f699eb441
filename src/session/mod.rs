//! Session lifecycle: snapshot at start, reconcile at stop.
//!
//! [`Workspace::begin`] fingerprints and backs up every tracked file under the
//! watched root and persists a [`SessionState`]. [`Workspace::reconcile`]
//! compares the root against that record, lets a [`PreservationPrompt`] pick
//! which changes to keep, undoes the rest, and discards the session.
//!
//! Per-file trouble never aborts either operation; it is recorded as a
//! [`Skip`] in the returned report.

pub mod changes;
pub mod error;
pub mod report;

pub use changes::{ChangeKind, ChangeSet, Preservation};
pub use error::SessionError;
pub use report::{BeginReport, ReconcileReport, SessionHandle, Skip, SkipAction};

use crate::filter::{FilterConfig, PathFilter};
use crate::fingerprint::{Fingerprint, Fingerprinter};
use crate::output;
use crate::prompt::PreservationPrompt;
use crate::scanner::{FileEnumerator, WalkEnumerator};
use crate::storage::{BackupStore, SessionState, StateStore};
use crate::utils::{current_timestamp, paths};
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, info, span, warn};

/// A watched root together with everything needed to run sessions on it.
pub struct Workspace<S, E = WalkEnumerator> {
    root: PathBuf,
    filter_config: FilterConfig,
    filter: PathFilter,
    fingerprinter: Fingerprinter,
    enumerator: E,
    store: S,
    backup_parent: PathBuf,
    show_progress: bool,
}

impl<S: StateStore> Workspace<S, WalkEnumerator> {
    /// Opens `root` with the default filter, walking enumerator, and backups
    /// under the system temp dir.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::RootUnavailable`] if `root` is not an existing
    /// directory.
    pub fn new(root: &Path, store: S) -> Result<Self> {
        let canonical = root
            .canonicalize()
            .map_err(|e| SessionError::RootUnavailable(format!("{}: {e}", root.display())))?;
        if !canonical.is_dir() {
            return Err(SessionError::RootUnavailable(format!(
                "{} is not a directory",
                canonical.display()
            ))
            .into());
        }

        let filter_config = FilterConfig::default();
        let mut workspace = Self {
            filter: PathFilter::new(filter_config.clone(), &canonical),
            root: canonical,
            filter_config,
            fingerprinter: Fingerprinter::default(),
            enumerator: WalkEnumerator::new(),
            store,
            backup_parent: std::env::temp_dir(),
            show_progress: false,
        };
        workspace.rebuild_filter();
        Ok(workspace)
    }
}

impl<S: StateStore, E: FileEnumerator> Workspace<S, E> {
    /// Replaces the filter rules.
    #[must_use]
    pub fn with_filter(mut self, config: FilterConfig) -> Self {
        self.filter_config = config;
        self.rebuild_filter();
        self
    }

    /// Replaces how the root is listed.
    pub fn with_enumerator<E2: FileEnumerator>(self, enumerator: E2) -> Workspace<S, E2> {
        Workspace {
            root: self.root,
            filter_config: self.filter_config,
            filter: self.filter,
            fingerprinter: self.fingerprinter,
            enumerator,
            store: self.store,
            backup_parent: self.backup_parent,
            show_progress: self.show_progress,
        }
    }

    /// Replaces the fingerprinter.
    #[must_use]
    pub const fn with_fingerprinter(mut self, fingerprinter: Fingerprinter) -> Self {
        self.fingerprinter = fingerprinter;
        self
    }

    /// Creates backup scratch directories under `parent`.
    #[must_use]
    pub fn with_backup_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.backup_parent = parent.into();
        self.rebuild_filter();
        self
    }

    /// Shows a progress bar while snapshotting.
    #[must_use]
    pub const fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// The canonical watched root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The state store sessions are persisted to.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The active path filter.
    #[must_use]
    pub const fn filter(&self) -> &PathFilter {
        &self.filter
    }

    // The state record and backup parent must never be tracked, or undoing
    // changes would delete the session's own bookkeeping.
    fn rebuild_filter(&mut self) {
        let mut config = self.filter_config.clone();
        if let Some(location) = self.store.location() {
            config.excluded_paths.push(location.to_path_buf());
        }
        if paths::normalize(&self.backup_parent).starts_with(&self.root) {
            config.excluded_paths.push(self.backup_parent.clone());
        }
        self.filter = PathFilter::new(config, &self.root);
    }

    /// Lists the root and keeps the files the filter tracks, keyed by their
    /// normalized path. Paths without a UTF-8 form cannot be recorded and
    /// are returned separately.
    fn tracked_files(&self) -> Result<Listing> {
        let listed = self.enumerator.list_files(&self.root)?;
        let mut seen = BTreeSet::new();
        let mut listing = Listing::default();
        for path in listed.iter().filter(|path| self.filter.is_tracked(path)) {
            let path = paths::normalize(path);
            if !seen.insert(path.clone()) {
                continue;
            }
            if path.to_str().is_some() {
                listing.files.push(path);
            } else {
                listing.unrecordable.push(path);
            }
        }
        debug!(
            "{} of {} listed files tracked, {} unrecordable",
            listing.files.len(),
            listed.len(),
            listing.unrecordable.len()
        );
        Ok(listing)
    }

    /// Starts a session: snapshots and backs up every tracked file, then
    /// persists the session record.
    ///
    /// An active session's record is overwritten; its backup directory is
    /// left in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be listed, the backup directory
    /// cannot be created, or the record cannot be saved. Nothing is persisted
    /// in that case.
    pub fn begin(&self) -> Result<BeginReport> {
        let span = span!(Level::INFO, "begin", root = %self.root.display());
        let _guard = span.enter();

        let replaced = self.store.load().ok().map(|previous| {
            warn!(
                "replacing active session {} (backups left at {})",
                previous.id,
                previous.backup_root.display()
            );
            previous.id
        });

        let Listing {
            files,
            unrecordable,
        } = self.tracked_files()?;
        let mut backup = BackupStore::create(&self.root, &self.backup_parent);
        let mut snapshot = BTreeMap::new();
        let mut skipped: Vec<Skip> = unrecordable
            .iter()
            .map(|path| {
                let reason = anyhow::anyhow!("file name is not valid UTF-8");
                Skip::new(path, SkipAction::Record, &reason)
            })
            .collect();

        let mut progress = self
            .show_progress
            .then(|| output::start_progress("Snapshotting files", files.len()));

        for (i, path) in files.into_iter().enumerate() {
            let fingerprint = match self.fingerprinter.try_fingerprint(&path) {
                Ok(fp) => fp,
                Err(e) => {
                    skipped.push(Skip::new(&path, SkipAction::Fingerprint, &e));
                    Fingerprint::Empty
                }
            };
            if let Err(e) = backup.put(&path) {
                skipped.push(Skip::new(&path, SkipAction::Backup, &e));
            }
            snapshot.insert(path, fingerprint);

            if let Some(progress) = progress.as_mut() {
                progress.update(i + 1);
            }
        }
        if let Some(progress) = progress {
            progress.finish();
        }

        let backup_root = backup.ensure_location()?.to_path_buf();
        let started = current_timestamp();
        let state = SessionState {
            id: session_id(&started),
            started,
            watched_root: self.root.clone(),
            backup_root: backup_root.clone(),
            snapshot,
        };

        if let Err(e) = self.store.save(&state) {
            if let Err(cleanup) = backup.destroy() {
                warn!("could not remove {}: {cleanup:#}", backup_root.display());
            }
            return Err(e);
        }

        info!(
            "session {} started with {} tracked files",
            state.id,
            state.snapshot.len()
        );

        Ok(BeginReport {
            tracked: state.snapshot.len(),
            handle: SessionHandle {
                id: state.id,
                started: state.started,
                watched_root: state.watched_root,
                backup_root,
            },
            skipped,
            replaced,
        })
    }

    /// Loads the active session and checks it belongs to this root.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveSession`] if there is none, or
    /// [`SessionError::RootMismatch`] if it watches another root.
    pub fn active_session(&self) -> Result<SessionState> {
        let state = self.store.load()?;
        if state.watched_root != self.root {
            return Err(SessionError::RootMismatch {
                recorded: state.watched_root,
                current: self.root.clone(),
            }
            .into());
        }
        Ok(state)
    }

    /// Classifies every change under the root relative to `state`.
    ///
    /// New files come from the current listing. Snapshot paths are judged on
    /// their own, whatever the filter says now: gone means deleted, and
    /// anything other than a regular file with matching content means
    /// modified. A file unreadable now or at start is always modified.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be listed.
    pub fn classify(&self, state: &SessionState) -> Result<ChangeSet> {
        let mut changes = ChangeSet::default();

        for path in self.tracked_files()?.files {
            if !state.snapshot.contains_key(&path) {
                changes.push(ChangeKind::New, path);
            }
        }

        for (path, original) in &state.snapshot {
            let kind = match fs::symlink_metadata(path) {
                Err(_) => Some(ChangeKind::Deleted),
                Ok(meta) if !meta.file_type().is_file() => Some(ChangeKind::Modified),
                Ok(_) => {
                    let current = self.fingerprinter.fingerprint(path);
                    (!current.matches(original)).then_some(ChangeKind::Modified)
                }
            };
            if let Some(kind) = kind {
                changes.push(kind, path.clone());
            }
        }

        changes.sort();
        Ok(changes)
    }

    /// Changes in the active session so far, without touching anything.
    ///
    /// # Errors
    ///
    /// Same as [`active_session`](Self::active_session) and
    /// [`classify`](Self::classify).
    pub fn inspect(&self) -> Result<(SessionState, ChangeSet)> {
        let state = self.active_session()?;
        let changes = self.classify(&state)?;
        Ok((state, changes))
    }

    /// Ends the active session.
    ///
    /// Each non-empty change category is offered to `prompt`; everything it
    /// does not keep is undone: new files are deleted, modified files get
    /// their snapshot content back, and deleted files are restored. The
    /// record and backups are then discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no active session, the root cannot be
    /// listed, or the prompt fails. The session is left intact in each case.
    pub fn reconcile<P>(&self, prompt: &mut P) -> Result<ReconcileReport>
    where
        P: PreservationPrompt + ?Sized,
    {
        let state = self.active_session()?;
        let span = span!(Level::INFO, "reconcile", session = %state.id);
        let _guard = span.enter();

        let changes = self.classify(&state)?;
        info!(
            "{} changes: {} new, {} modified, {} deleted",
            changes.len(),
            changes.new.len(),
            changes.modified.len(),
            changes.deleted.len()
        );

        let preserved = decide(&changes, prompt)?;
        let backup = BackupStore::open(&self.root, &state.backup_root);

        let mut report = ReconcileReport {
            session_id: state.id.clone(),
            ..ReconcileReport::default()
        };
        apply(&changes, &preserved, &backup, &mut report);

        if let Err(e) = self.store.clear() {
            let location = PathBuf::from(self.store.describe());
            report
                .skipped
                .push(Skip::new(&location, SkipAction::Cleanup, &e));
        }
        if let Err(e) = backup.destroy() {
            report
                .skipped
                .push(Skip::new(&state.backup_root, SkipAction::Cleanup, &e));
        }

        report.changes = changes;
        report.preserved = preserved;
        info!(
            "session {} ended: {} removed, {} reverted, {} restored",
            report.session_id, report.removed, report.reverted, report.restored
        );
        Ok(report)
    }
}

/// Tracked files under the root, split by whether the session record can
/// hold their path.
#[derive(Default)]
struct Listing {
    files: Vec<PathBuf>,
    unrecordable: Vec<PathBuf>,
}

/// Asks about each non-empty category in turn. Paths the prompt returns that
/// were not offered are dropped.
fn decide<P>(changes: &ChangeSet, prompt: &mut P) -> Result<Preservation>
where
    P: PreservationPrompt + ?Sized,
{
    let mut preservation = Preservation::default();
    for kind in ChangeKind::ALL {
        let candidates = changes.paths(kind);
        if candidates.is_empty() {
            continue;
        }
        let chosen = prompt.decide(kind, candidates)?;
        preservation.keep(
            kind,
            chosen.into_iter().filter(|path| candidates.contains(path)),
        );
    }
    Ok(preservation)
}

fn pending<'a>(
    changes: &'a ChangeSet,
    preserved: &'a Preservation,
    kind: ChangeKind,
) -> impl Iterator<Item = &'a PathBuf> {
    changes
        .paths(kind)
        .iter()
        .filter(move |path| !preserved.is_kept(kind, path))
}

fn apply(
    changes: &ChangeSet,
    preserved: &Preservation,
    backup: &BackupStore,
    report: &mut ReconcileReport,
) {
    for path in pending(changes, preserved, ChangeKind::Deleted) {
        match backup.restore(path) {
            Ok(()) => report.restored += 1,
            Err(e) => report.skipped.push(Skip::new(path, SkipAction::Restore, &e)),
        }
    }

    for path in pending(changes, preserved, ChangeKind::New) {
        match fs::remove_file(path) {
            Ok(()) => report.removed += 1,
            Err(e) => report.skipped.push(Skip::new(
                path,
                SkipAction::Remove,
                &anyhow::Error::from(e),
            )),
        }
    }

    for path in pending(changes, preserved, ChangeKind::Modified) {
        match backup.restore(path) {
            Ok(()) => report.reverted += 1,
            Err(e) => report.skipped.push(Skip::new(path, SkipAction::Revert, &e)),
        }
    }
}

/// `2026-10-19T08:30:00Z` becomes `20261019T083000Z-<pid>`.
fn session_id(started: &str) -> String {
    let compact: String = started.chars().filter(|c| !matches!(c, '-' | ':')).collect();
    format!("{compact}-{}", std::process::id())
}
