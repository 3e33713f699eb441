//! Deciding which detected changes survive the end of a session.
//!
//! The session engine only sees the [`PreservationPrompt`] trait. The CLI
//! plugs in [`TerminalPrompt`] for interactive use, or [`PreserveList`] /
//! [`PreserveNone`] when the answer is known up front. Any
//! `FnMut(ChangeKind, &[PathBuf]) -> Result<BTreeSet<PathBuf>>` works too.

use crate::session::ChangeKind;
use crate::utils::paths;
use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeSet;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Chooses which paths of one change category to keep.
pub trait PreservationPrompt {
    /// Returns the subset of `candidates` to keep. Only called with a
    /// non-empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the decision cannot be obtained; the session is
    /// then left untouched.
    fn decide(&mut self, kind: ChangeKind, candidates: &[PathBuf]) -> Result<BTreeSet<PathBuf>>;
}

impl<F> PreservationPrompt for F
where
    F: FnMut(ChangeKind, &[PathBuf]) -> Result<BTreeSet<PathBuf>>,
{
    fn decide(&mut self, kind: ChangeKind, candidates: &[PathBuf]) -> Result<BTreeSet<PathBuf>> {
        self(kind, candidates)
    }
}

/// Keeps nothing: every change is undone.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreserveNone;

impl PreservationPrompt for PreserveNone {
    fn decide(&mut self, _kind: ChangeKind, _candidates: &[PathBuf]) -> Result<BTreeSet<PathBuf>> {
        Ok(BTreeSet::new())
    }
}

/// Keeps a fixed list of paths in whichever category they turn up.
#[derive(Debug, Clone, Default)]
pub struct PreserveList {
    paths: BTreeSet<PathBuf>,
}

impl PreserveList {
    /// Resolves each input against `root`. Inputs may be absolute,
    /// `~/`-prefixed, or relative to the root.
    ///
    /// # Errors
    ///
    /// Returns an error if a `~/` path is given and the home directory is
    /// unknown.
    pub fn resolve<I, P>(inputs: I, root: &Path) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let paths = inputs
            .into_iter()
            .map(|input| paths::resolve_against_root(input.as_ref(), root))
            .collect::<Result<_>>()?;
        Ok(Self { paths })
    }

    /// The resolved paths.
    #[must_use]
    pub const fn paths(&self) -> &BTreeSet<PathBuf> {
        &self.paths
    }
}

impl PreservationPrompt for PreserveList {
    fn decide(&mut self, _kind: ChangeKind, candidates: &[PathBuf]) -> Result<BTreeSet<PathBuf>> {
        Ok(candidates
            .iter()
            .filter(|path| self.paths.contains(*path))
            .cloned()
            .collect())
    }
}

/// One parsed line of prompt input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Zero-based indices to add; `out_of_range` holds the rejected numbers
    /// as typed
    Indices {
        /// Valid zero-based indices
        picked: Vec<usize>,
        /// Numbers outside `1..=count`, including ones too large to parse
        out_of_range: Vec<String>,
    },
    /// Keep every candidate
    All,
    /// Stop asking without adding anything
    Nothing,
    /// Stop asking, keeping what was picked so far
    Quit,
}

/// Input that is neither a keyword nor a list of numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// A list entry was not a non-negative integer
    NotANumber(String),
    /// Only separators were given
    NoEntries,
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber(token) => write!(f, "'{token}' is not a file number"),
            Self::NoEntries => write!(f, "no file numbers given"),
        }
    }
}

impl std::error::Error for SelectionError {}

/// Parses one line of prompt input for a list of `count` candidates.
///
/// Input is trimmed and compared case-insensitively. An empty line means
/// `none`, which like `q` ends the call keeping earlier picks.
///
/// # Errors
///
/// Returns [`SelectionError`] for malformed input.
pub fn parse_selection(input: &str, count: usize) -> Result<Selection, SelectionError> {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "" | "none" => return Ok(Selection::Nothing),
        "all" => return Ok(Selection::All),
        "q" | "quit" => return Ok(Selection::Quit),
        _ => {}
    }

    let mut picked = Vec::new();
    let mut out_of_range = Vec::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SelectionError::NotANumber(token.to_string()));
        }
        // All digits: anything that does not fit a usize is out of range too
        match token.parse::<usize>() {
            Ok(number) if (1..=count).contains(&number) => picked.push(number - 1),
            _ => out_of_range.push(token.to_string()),
        }
    }

    if picked.is_empty() && out_of_range.is_empty() {
        return Err(SelectionError::NoEntries);
    }
    Ok(Selection::Indices {
        picked,
        out_of_range,
    })
}

/// Interactive prompt over a line reader and a writer.
///
/// Lists the candidates 1-indexed, relative to the watched root, and reads
/// selections until a terminating answer. End of input counts as `q`.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
    root: PathBuf,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompt reading stdin and writing to stderr.
    #[must_use]
    pub fn stdio(root: &Path) -> Self {
        Self::new(io::stdin().lock(), io::stderr(), root)
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    /// Prompt over arbitrary streams; paths are shown relative to `root`.
    pub fn new(input: R, output: W, root: &Path) -> Self {
        Self {
            input,
            output,
            root: root.to_path_buf(),
        }
    }

    /// Consumes the prompt, returning its streams.
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }

    fn list(&mut self, kind: ChangeKind, candidates: &[PathBuf]) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(
            self.output,
            "{}",
            format!("The following {kind} files were detected:").bold()
        )?;
        for (i, path) in candidates.iter().enumerate() {
            let shown = paths::normalize_to_relative(path, &self.root);
            writeln!(self.output, "  {:>3}. {}", i + 1, shown.display())?;
        }
        Ok(())
    }

    /// Reads one line; `None` at end of input.
    fn read_answer(&mut self) -> io::Result<Option<String>> {
        write!(
            self.output,
            "Enter file numbers to preserve (comma-separated) or 'all'/'none' or 'q' to finish [none]: "
        )?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line))
    }
}

impl<R: BufRead, W: Write> PreservationPrompt for TerminalPrompt<R, W> {
    fn decide(&mut self, kind: ChangeKind, candidates: &[PathBuf]) -> Result<BTreeSet<PathBuf>> {
        self.list(kind, candidates)?;
        let mut selected = BTreeSet::new();

        loop {
            let Some(line) = self.read_answer()? else {
                return Ok(selected);
            };

            match parse_selection(&line, candidates.len()) {
                Ok(Selection::Quit) => return Ok(selected),
                Ok(Selection::All) => return Ok(candidates.iter().cloned().collect()),
                Ok(Selection::Nothing) => return Ok(selected),
                Ok(Selection::Indices {
                    picked,
                    out_of_range,
                }) => {
                    for number in out_of_range {
                        writeln!(
                            self.output,
                            "{}",
                            format!("Ignoring {number}: choose 1-{}", candidates.len()).yellow()
                        )?;
                    }
                    for index in picked {
                        selected.insert(candidates[index].clone());
                    }
                    writeln!(
                        self.output,
                        "{}",
                        format!("{} of {} selected", selected.len(), candidates.len()).dimmed()
                    )?;
                }
                Err(e) => {
                    writeln!(self.output, "{}", format!("Invalid input: {e}").red())?;
                }
            }
        }
    }
}
