//! Inline progress display for snapshotting large trees.

use colored::Colorize;
use std::io::{self, IsTerminal, Write};

/// A progress line that redraws in place on a TTY:
/// `Snapshotting files: 42% (420/1000)` and finally `..., done.`
///
/// Off a TTY, or when hidden, it prints nothing.
pub struct Progress {
    title: String,
    total: usize,
    current: usize,
    visible: bool,
    last_percent: u8,
    finished: bool,
}

impl Progress {
    /// A progress line shown only when stderr is a terminal.
    #[must_use]
    pub fn new(title: &str, total: usize) -> Self {
        let visible = io::stderr().is_terminal() && total > 0;
        let progress = Self {
            title: title.to_string(),
            total,
            current: 0,
            visible,
            last_percent: 0,
            finished: false,
        };
        progress.draw();
        progress
    }

    /// A progress line that never prints.
    #[must_use]
    pub fn hidden(title: &str, total: usize) -> Self {
        Self {
            title: title.to_string(),
            total,
            current: 0,
            visible: false,
            last_percent: 0,
            finished: false,
        }
    }

    /// Whether anything is drawn.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Moves to `current` items done, redrawing when the percentage changes.
    pub fn update(&mut self, current: usize) {
        self.current = current.min(self.total);
        let percent = self.percent();
        if percent != self.last_percent {
            self.last_percent = percent;
            self.draw();
        }
    }

    /// Completes the line with `, done.`
    pub fn finish(mut self) {
        self.current = self.total;
        self.last_percent = 100;
        self.finished = true;
        if self.visible {
            eprintln!(
                "\r{}: 100% ({}/{}), done.",
                self.title.dimmed(),
                self.total,
                self.total
            );
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.current as f64 / self.total as f64) * 100.0) as u8
    }

    fn draw(&self) {
        if !self.visible {
            return;
        }
        eprint!(
            "\r{}: {}% ({}/{})",
            self.title.dimmed(),
            self.percent().to_string().dimmed(),
            self.current,
            self.total
        );
        let _ = io::stderr().flush();
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        // Leave the cursor on a fresh line if we stopped early
        if self.visible && !self.finished {
            eprintln!();
        }
    }
}
