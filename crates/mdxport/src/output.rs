//! Colored terminal reporting for the conversion commands.
//!
//! All human-facing progress goes to stderr through [`Output`] so that
//! stdout stays free for shell composition. Write failures are ignored;
//! a broken pipe on a status line is not worth aborting a conversion.

use console::{style, Term};

/// Terminal reporter shared by the subcommands.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    /// Plain progress line.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Final summary line (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&style(msg).green().to_string());
    }

    /// Degraded-input notice (yellow). The run continues.
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&style(msg).yellow().to_string());
    }

    /// Fatal error (red), printed just before a non-zero exit.
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&style(msg).red().to_string());
    }

    /// Section header (cyan bold).
    pub(crate) fn highlight(&self, msg: &str) {
        let _ = self.term.write_line(&style(msg).cyan().bold().to_string());
    }
}
