//! CLI command implementations, one `execute` per subcommand.

pub mod start;
pub mod status;
pub mod stop;

use crate::output;
use crate::session::Skip;
use crate::utils::paths::normalize_to_relative;
use std::path::Path;

/// Lists operations that were skipped, relative to `root`.
pub(crate) fn print_skipped(skipped: &[Skip], root: &Path) {
    if skipped.is_empty() {
        return;
    }
    output::warning(&format!(
        "{} could not be handled:",
        output::plural(skipped.len(), "file")
    ));
    for skip in skipped {
        eprintln!(
            "  could not {} {}: {}",
            skip.action,
            normalize_to_relative(&skip.path, root).display(),
            skip.reason
        );
    }
}
