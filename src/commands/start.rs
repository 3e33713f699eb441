use crate::output;
use crate::WorkspaceContext;
use anyhow::Result;

/// Starts a session on the context's watched root.
///
/// # Errors
///
/// Returns an error if the root is unavailable or cannot be listed, or the
/// session record cannot be written.
pub fn execute(ctx: &WorkspaceContext) -> Result<()> {
    let workspace = ctx.workspace()?;
    output::verbose(&format!("Watching {}", workspace.root().display()));

    let report = workspace.begin()?;

    if let Some(previous) = &report.replaced {
        output::warning(&format!(
            "Replaced active session {previous}; its changes can no longer be undone"
        ));
    }

    output::success(&format!(
        "Secure workspace started - tracking {}",
        output::plural(report.tracked, "file")
    ));
    output::verbose(&format!("Session {}", report.handle.id));
    output::verbose(&format!(
        "Backups in {}",
        report.handle.backup_root.display()
    ));

    super::print_skipped(&report.skipped, workspace.root());
    Ok(())
}
