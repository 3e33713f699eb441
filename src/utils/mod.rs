//! Utility functions and helpers.
//!
//! - [`paths`]: path normalization, tilde expansion, relative display
//!
//! # Examples
//!
//! ```
//! use secure_workspace::utils::paths::normalize_to_relative;
//! use std::path::Path;
//!
//! let rel = normalize_to_relative(Path::new("/home/me/notes.txt"), Path::new("/home/me"));
//! assert_eq!(rel, Path::new("notes.txt"));
//! ```

/// Path manipulation and resolution utilities
pub mod paths;

/// Returns the current time formatted as an RFC 3339 timestamp (second precision).
#[must_use]
pub fn current_timestamp() -> String {
    humantime::format_rfc3339_seconds(std::time::SystemTime::now()).to_string()
}
