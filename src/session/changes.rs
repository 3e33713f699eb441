use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Category of a detected change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeKind {
    /// Present now, absent from the snapshot
    New,
    /// Present in both, content differs
    Modified,
    /// In the snapshot, gone now
    Deleted,
}

impl ChangeKind {
    /// Every kind, in the order the user is asked about them.
    pub const ALL: [Self; 3] = [Self::New, Self::Modified, Self::Deleted];

    /// Lowercase label shown to the user.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }

    /// One-character marker for compact listings.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::New => '+',
            Self::Modified => '~',
            Self::Deleted => '-',
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Changes detected since the session began. The three lists are disjoint
/// and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Files created during the session
    pub new: Vec<PathBuf>,
    /// Tracked files whose content changed
    pub modified: Vec<PathBuf>,
    /// Tracked files that no longer exist
    pub deleted: Vec<PathBuf>,
}

impl ChangeSet {
    /// Paths of one category.
    #[must_use]
    pub fn paths(&self, kind: ChangeKind) -> &[PathBuf] {
        match kind {
            ChangeKind::New => &self.new,
            ChangeKind::Modified => &self.modified,
            ChangeKind::Deleted => &self.deleted,
        }
    }

    pub(crate) fn push(&mut self, kind: ChangeKind, path: PathBuf) {
        match kind {
            ChangeKind::New => self.new.push(path),
            ChangeKind::Modified => self.modified.push(path),
            ChangeKind::Deleted => self.deleted.push(path),
        }
    }

    pub(crate) fn sort(&mut self) {
        self.new.sort();
        self.modified.sort();
        self.deleted.sort();
    }

    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Total number of changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.new.len() + self.modified.len() + self.deleted.len()
    }

    /// Every change with its category, in prompt order.
    pub fn iter(&self) -> impl Iterator<Item = (ChangeKind, &Path)> {
        ChangeKind::ALL
            .into_iter()
            .flat_map(move |kind| self.paths(kind).iter().map(move |p| (kind, p.as_path())))
    }
}

/// The user's keep decisions, recorded per category.
///
/// A path kept in one category says nothing about the same path in another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preservation {
    new: BTreeSet<PathBuf>,
    modified: BTreeSet<PathBuf>,
    deleted: BTreeSet<PathBuf>,
}

impl Preservation {
    fn set_mut(&mut self, kind: ChangeKind) -> &mut BTreeSet<PathBuf> {
        match kind {
            ChangeKind::New => &mut self.new,
            ChangeKind::Modified => &mut self.modified,
            ChangeKind::Deleted => &mut self.deleted,
        }
    }

    fn set(&self, kind: ChangeKind) -> &BTreeSet<PathBuf> {
        match kind {
            ChangeKind::New => &self.new,
            ChangeKind::Modified => &self.modified,
            ChangeKind::Deleted => &self.deleted,
        }
    }

    /// Records paths the user keeps for `kind`.
    pub fn keep(&mut self, kind: ChangeKind, paths: impl IntoIterator<Item = PathBuf>) {
        self.set_mut(kind).extend(paths);
    }

    /// Whether `path` was kept as a change of `kind`.
    #[must_use]
    pub fn is_kept(&self, kind: ChangeKind, path: &Path) -> bool {
        self.set(kind).contains(path)
    }

    /// Every kept path, across categories.
    #[must_use]
    pub fn all(&self) -> BTreeSet<PathBuf> {
        self.new
            .iter()
            .chain(&self.modified)
            .chain(&self.deleted)
            .cloned()
            .collect()
    }

    /// Whether nothing was kept.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }
}
