use crate::WorkspaceContext;
use crate::output;
use crate::session::ChangeKind;
use crate::utils::paths::normalize_to_relative;
use anyhow::Result;
use colored::Colorize;

/// Shows the active session's changes without applying anything.
///
/// # Errors
///
/// Returns an error if there is no active session or the root cannot be
/// listed.
pub fn execute(ctx: &WorkspaceContext, short: bool) -> Result<()> {
    let workspace = ctx.workspace()?;
    let (state, changes) = workspace.inspect()?;
    let root = workspace.root();

    if short {
        for kind in ChangeKind::ALL {
            println!("{} {}", changes.paths(kind).len(), kind);
        }
        return Ok(());
    }

    output::info(&format!(
        "Session {} started {} ({})",
        state.id,
        state.started,
        output::plural(state.snapshot.len(), "tracked file")
    ));

    if changes.is_empty() {
        println!("No changes detected - workspace is clean");
        return Ok(());
    }

    for kind in ChangeKind::ALL {
        let paths = changes.paths(kind);
        if paths.is_empty() {
            continue;
        }
        println!("{}", format!("{} ({}):", capitalize(kind.label()), paths.len()).bold());
        for path in paths {
            let line = format!("  {} {}", kind.symbol(), normalize_to_relative(path, root).display());
            let styled = match kind {
                ChangeKind::New => line.green(),
                ChangeKind::Modified => line.yellow(),
                ChangeKind::Deleted => line.red(),
            };
            println!("{styled}");
        }
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
