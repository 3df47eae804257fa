//! minicc-util - Shared diagnostics plumbing.
//!
//! Every compiler stage reports through the same [`Handler`], which prints
//! diagnostics to standard output in the `[LEVEL] [STAGE] [LINE]: message`
//! format the driver's consumers expect, and remembers whether any error-level
//! diagnostic was seen. Stages never abort on a semantic diagnostic; the
//! driver inspects [`Handler::has_errors`] between phases.

mod diagnostic;

pub use diagnostic::{Diagnostic, Handler, Level, Stage};
