use crate::WorkspaceContext;
use crate::output;
use crate::prompt::{PreservationPrompt, PreserveList, PreserveNone, TerminalPrompt};
use crate::session::{ChangeKind, ReconcileReport};
use crate::utils::paths::normalize_to_relative;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// How `stop` decides what to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopMode {
    /// Ask on the terminal, one category at a time
    Interactive,
    /// Keep exactly these paths, no prompting
    Preserve(Vec<PathBuf>),
    /// Keep nothing, no prompting
    DiscardAll,
}

/// Ends the active session.
///
/// # Errors
///
/// Returns an error if there is no active session, the root cannot be
/// listed, or prompting fails. Nothing is changed on disk in those cases.
pub fn execute(ctx: &WorkspaceContext, mode: StopMode) -> Result<()> {
    let workspace = ctx.workspace()?;
    let root = workspace.root().to_path_buf();

    let mut prompt: Box<dyn PreservationPrompt> = match mode {
        StopMode::Interactive => Box::new(TerminalPrompt::stdio(&root)),
        StopMode::Preserve(paths) => {
            let list = PreserveList::resolve(&paths, &root)?;
            for path in list.paths() {
                output::verbose(&format!(
                    "Keeping {}",
                    normalize_to_relative(path, &root).display()
                ));
            }
            Box::new(list)
        }
        StopMode::DiscardAll => Box::new(PreserveNone),
    };

    let report = workspace.reconcile(prompt.as_mut())?;
    print_summary(&report, &root);
    Ok(())
}

fn print_summary(report: &ReconcileReport, root: &Path) {
    if report.is_clean() {
        output::success("No changes detected - workspace is clean");
    } else {
        for (kind, path) in report.changes.iter() {
            if !report.preserved.is_kept(kind, path) {
                output::change(kind, &normalize_to_relative(path, root));
            }
        }

        let kept = report.preserved.all();
        if !kept.is_empty() {
            output::info(&format!("Preserved {}:", output::plural(kept.len(), "file")));
            for path in &kept {
                output::preserved(&normalize_to_relative(path, root));
            }
        }

        let counts = [
            (report.removed, ChangeKind::New, "Removed"),
            (report.reverted, ChangeKind::Modified, "Reverted"),
            (report.restored, ChangeKind::Deleted, "Restored"),
        ];
        for (count, kind, verb) in counts {
            if count > 0 {
                output::action(verb, &output::plural(count, &format!("{kind} file")));
            }
        }
    }

    super::print_skipped(&report.skipped, root);
    output::success("Secure workspace stopped successfully");
}
