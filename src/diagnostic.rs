//! Diagnostics: the values every stage reports instead of panicking.
//!
//! Each of [`crate::scanner::Scanner`], [`crate::parser::Parser`], and
//! [`crate::resolver::Resolver`] owns an ordered list of `Diagnostic`s,
//! accumulated in discovery order. No stage re-reports a diagnostic raised
//! by an earlier stage.

use crate::position::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single diagnostic message anchored to a byte span in a named file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Name of the file the diagnostic was raised against.
    pub file: String,
    /// Human-readable message.
    pub message: String,
    /// Byte span the diagnostic refers to.
    pub span: Span,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(file: impl Into<String>, message: impl Into<String>, span: Span) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span.start_offset == self.span.end_offset {
            write!(f, "{}:{}: {}", self.file, self.span.start_offset, self.message)
        } else {
            write!(
                f,
                "{}:{}-{}: {}",
                self.file, self.span.start_offset, self.span.end_offset, self.message
            )
        }
    }
}

/// Signature for the eager error-handler callback consumers may supply to
/// the scanner and parser.
///
/// Called synchronously as each lex/parse error is discovered, in addition
/// to (not instead of) the error being appended to `diagnostics()`.
pub type ErrorHandler<'a> = dyn FnMut(&Diagnostic) + 'a;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_span_formats_single_offset() {
        let d = Diagnostic::new("a.http", "oops", Span::at(4));
        assert_eq!(d.to_string(), "a.http:4: oops");
    }

    #[test]
    fn ranged_span_formats_start_end() {
        let d = Diagnostic::new("a.http", "oops", Span::new(4, 9));
        assert_eq!(d.to_string(), "a.http:4-9: oops");
    }
}
