//! Diagnostic reporting infrastructure.
//!
//! Diagnostics are printed the moment they are emitted so that a run with
//! several semantic errors surfaces all of them in source order, matching the
//! accumulate-then-fail error model: emission never unwinds, the caller checks
//! [`Handler::has_errors`] once the stage is done.

use std::cell::RefCell;
use std::fmt;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// An error that suppresses IR emission (or aborts, for fatal stages).
    Error,
    /// A warning; compilation proceeds.
    Warning,
    /// Informational output.
    Info,
}

impl Level {
    /// Returns true if this level represents an error.
    #[inline]
    pub const fn is_error(&self) -> bool {
        matches!(self, Level::Error)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "ERROR"),
            Level::Warning => write!(f, "WARN "),
            Level::Info => write!(f, "INFO "),
        }
    }
}

/// The pipeline stage a diagnostic originates from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Lex,
    Yacc,
    Analyzer,
    Ir,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Lex => write!(f, "LEX"),
            Stage::Yacc => write!(f, "YACC"),
            Stage::Analyzer => write!(f, "ANALYZER"),
            Stage::Ir => write!(f, "IR"),
        }
    }
}

/// A single diagnostic message with severity, origin stage, and source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub stage: Stage,
    pub line: u32,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}] [{}]: {}",
            self.level, self.stage, self.line, self.message
        )
    }
}

/// Collects diagnostics for one compilation.
///
/// The handler is shared by reference across the pipeline stages, so the
/// collected list lives behind a `RefCell`. Printing happens eagerly; the
/// stored list exists for tests and for the driver's exit-code decision.
#[derive(Debug, Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
    /// Suppress printing (tests assert on the collected list instead).
    quiet: bool,
}

impl Handler {
    /// Create a new handler that prints diagnostics to standard output.
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            quiet: false,
        }
    }

    /// Create a handler that collects without printing, for tests.
    pub fn new_quiet() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            quiet: true,
        }
    }

    /// Report an error-level diagnostic.
    pub fn error(&self, stage: Stage, line: u32, message: impl Into<String>) {
        self.emit(Diagnostic {
            level: Level::Error,
            stage,
            line,
            message: message.into(),
        });
    }

    /// Report a warning-level diagnostic.
    pub fn warn(&self, stage: Stage, line: u32, message: impl Into<String>) {
        self.emit(Diagnostic {
            level: Level::Warning,
            stage,
            line,
            message: message.into(),
        });
    }

    fn emit(&self, diagnostic: Diagnostic) {
        if !self.quiet {
            println!("{diagnostic}");
        }
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Whether any error-level diagnostic has been emitted.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level.is_error())
    }

    /// Number of error-level diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level.is_error())
            .count()
    }

    /// Snapshot of every diagnostic emitted so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_matches_driver_surface() {
        let d = Diagnostic {
            level: Level::Error,
            stage: Stage::Analyzer,
            line: 3,
            message: "Undefined variable x".into(),
        };
        assert_eq!(d.to_string(), "[ERROR] [ANALYZER] [3]: Undefined variable x");
    }

    #[test]
    fn handler_tracks_errors_only() {
        let h = Handler::new_quiet();
        h.warn(Stage::Yacc, 1, "suspicious");
        assert!(!h.has_errors());
        h.error(Stage::Analyzer, 2, "bad");
        h.error(Stage::Analyzer, 4, "worse");
        assert!(h.has_errors());
        assert_eq!(h.error_count(), 2);
        assert_eq!(h.diagnostics().len(), 3);
    }
}
