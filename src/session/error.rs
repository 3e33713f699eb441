use std::fmt;
use std::path::PathBuf;

/// Session failures callers are expected to tell apart.
///
/// Everything else surfaces as a plain [`anyhow::Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No readable state record at the given location
    NoActiveSession(String),
    /// The watched root does not exist or cannot be resolved
    RootUnavailable(String),
    /// The watched root could not be listed
    Enumeration(String),
    /// The active session was started for a different root
    RootMismatch {
        /// Root recorded in the session state
        recorded: PathBuf,
        /// Root this workspace was opened on
        current: PathBuf,
    },
}

impl SessionError {
    /// Message with a hint on what to do next.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NoActiveSession(location) => format!(
                "No active session (no valid state at {location})\n\n\
                 Run 'sws start' to begin a session."
            ),
            Self::RootUnavailable(msg) => format!(
                "Watched root unavailable: {msg}\n\n\
                 Check that the directory exists, or pass --root."
            ),
            Self::Enumeration(msg) => format!("Cannot list watched root: {msg}"),
            Self::RootMismatch { recorded, current } => format!(
                "Active session watches {}, not {}\n\n\
                 Pass --root {} to end it.",
                recorded.display(),
                current.display(),
                recorded.display()
            ),
        }
    }

}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for SessionError {}
