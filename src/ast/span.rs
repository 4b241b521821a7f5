//! Defining spans, which are markers for sections of code.
//!
//! Really handy to relate some error/AST node to the actual, original
//! source code.

use std::fmt;

use codespan_reporting::diagnostic::Label;
use codespan_reporting::files::Files;

/// A span of source code.
///
/// Note: influenced by `codespan`.
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct Span(codespan::Span);

impl Span {
    /// Gives an empty span at the start of a source.
    pub const fn initial() -> Self {
        Self(codespan::Span::initial())
    }

    /// Creates a span from byte offsets into the source.
    pub fn new(start: usize, end: usize) -> Self {
        let start = u32::try_from(start).expect("Code position is out of bounds");
        let end = u32::try_from(end).expect("Code position is out of bounds");
        Self(codespan::Span::new(start, end))
    }

    /// Start offset of this span, in bytes.
    pub fn start(&self) -> usize {
        self.0.start().to_usize()
    }

    /// End offset of this span, in bytes.
    pub fn end(&self) -> usize {
        self.0.end().to_usize()
    }

    /// Returns the `codespan_reporting` label for this span.
    pub fn as_label(&self) -> Label<()> {
        Label::primary((), self.start()..self.end())
    }

    /// Returns the `codespan_reporting` (secondary) label for this span.
    pub fn as_secondary_label(&self) -> Label<()> {
        Label::secondary((), self.start()..self.end())
    }

    /// Combine two spans by taking the start of the earlier span and the end of
    /// the later span.
    ///
    /// Note: this will work even if the two spans are disjoint.
    pub fn merge(self, other: Self) -> Self {
        Self(self.0.merge(other.0))
    }

    /// Returns the line, col of this span start.
    pub fn line_col<'a>(
        &self,
        files: &'a impl Files<'a, FileId = ()>,
    ) -> (usize, usize) {
        let location = files.location((), self.start()).unwrap();
        (location.line_number, location.column_number)
    }
}

impl From<Span> for Label<()> {
    fn from(span: Span) -> Self {
        span.as_label()
    }
}

impl Default for Span {
    fn default() -> Self {
        Span::initial()
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.start(), self.end())
    }
}
