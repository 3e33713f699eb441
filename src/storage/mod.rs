//! Durable session data: byte copies of tracked files and the state record.

/// Backup copies of tracked files
pub mod backup;
/// Session state record and where it is kept
pub mod state;

pub use backup::{BACKUP_DIR_PREFIX, BackupStore};
pub use state::{FileStateStore, MemoryStateStore, SessionState, StateStore};
