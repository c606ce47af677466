//! Terminal output utilities.

use console::{Style, Term};

/// Terminal output formatter.
///
/// Results go to stdout; diagnostics go to stderr.
pub(crate) struct Output {
    out: Term,
    err: Term,
    red: Style,
    dim: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            red: Style::new().red(),
            dim: Style::new().dim(),
        }
    }

    /// Write command output to stdout.
    pub(crate) fn result(&self, text: &str) -> std::io::Result<()> {
        self.out.write_line(text)
    }

    /// Print a secondary note (dim) to stderr.
    pub(crate) fn note(&self, msg: &str) {
        let _ = self.err.write_line(&self.dim.apply_to(msg).to_string());
    }

    /// Print an error message (red) to stderr.
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.err.write_line(&self.red.apply_to(msg).to_string());
    }
}
