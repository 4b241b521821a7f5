//! Structured interpreter errors.
//!
//! Every fault in the runtime is one [`SofError`]: a category, a message,
//! optionally a source span and some extra notes. Value-level code raises
//! *incomplete* errors (no span); the engine completes them with the span of
//! the node it was dispatching when the fault surfaced, so that every error
//! that reaches the user points at the offending source position.

use std::fmt;

use codespan_reporting::diagnostic::Diagnostic;

use crate::ast::Span;
use crate::codes;

/// Result type for everything that can fault inside the runtime.
pub type Result<T> = std::result::Result<T, SofError>;

/// The category of a runtime fault.
///
/// One category per user-visible error family, so that diagnostics can be
/// formatted (and tested against) uniformly instead of through an exception
/// hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed literal/token or unbalanced delimiter.
    Syntax,
    /// Operation applied to incompatible value variants.
    Type,
    /// Division or modulus by zero.
    Arithmetic,
    /// Unresolvable identifier.
    Reference,
    /// Illegal stack manipulation across a nametable boundary.
    StackAccess,
    /// Pop or peek on an empty stack.
    StackUnderflow,
    /// Unresolvable import.
    Module,
    /// Failed `assert`.
    Assertion,
    /// Host function invocation failure.
    Native,
}

impl ErrorKind {
    /// User-facing name of the category.
    pub fn name(&self) -> &'static str {
        use ErrorKind::*;
        match self {
            Syntax => "SyntaxError",
            Type => "TypeError",
            Arithmetic => "ArithmeticError",
            Reference => "ReferenceError",
            StackAccess => "StackAccessError",
            StackUnderflow => "StackUnderflowError",
            Module => "ModuleError",
            Assertion => "AssertionError",
            Native => "NativeError",
        }
    }

    /// Diagnostic code of the category.
    pub fn code(&self) -> &'static str {
        use ErrorKind::*;
        match self {
            Syntax => codes::SYNTAX_ERROR,
            Type => codes::TYPE_ERROR,
            Arithmetic => codes::ARITHMETIC_ERROR,
            Reference => codes::REFERENCE_ERROR,
            StackAccess => codes::STACK_ACCESS_ERROR,
            StackUnderflow => codes::STACK_UNDERFLOW_ERROR,
            Module => codes::MODULE_ERROR,
            Assertion => codes::ASSERTION_ERROR,
            Native => codes::NATIVE_ERROR,
        }
    }
}

/// A runtime fault.
#[derive(Debug, Clone)]
pub struct SofError {
    /// Category of the fault.
    pub kind: ErrorKind,
    /// Human-readable reason.
    pub message: String,
    /// Source position, if already known.
    ///
    /// `None` for errors freshly raised by the value/operator layers; the
    /// engine fills it in at the dispatch boundary.
    pub span: Option<Span>,
    /// Additional notes shown below the source excerpt.
    pub notes: Vec<String>,
}

impl SofError {
    /// Creates a new, incomplete (position-less) error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
            notes: vec![],
        }
    }

    /// Shortcut for a [`ErrorKind::Syntax`] error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, message)
    }

    /// Shortcut for a [`ErrorKind::Type`] error.
    pub fn typing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, message)
    }

    /// Shortcut for a [`ErrorKind::Arithmetic`] error.
    pub fn arithmetic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Arithmetic, message)
    }

    /// Shortcut for a [`ErrorKind::Reference`] error.
    pub fn reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Reference, message)
    }

    /// Shortcut for a [`ErrorKind::StackAccess`] error.
    pub fn stack_access(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StackAccess, message)
    }

    /// Shortcut for a [`ErrorKind::StackUnderflow`] error.
    pub fn stack_underflow(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StackUnderflow, message)
    }

    /// Shortcut for a [`ErrorKind::Module`] error.
    pub fn module(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Module, message)
    }

    /// Shortcut for a [`ErrorKind::Assertion`] error.
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Assertion, message)
    }

    /// Shortcut for a [`ErrorKind::Native`] error.
    pub fn native(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Native, message)
    }

    /// Positions this error at `span`.
    ///
    /// First span wins: an error that already carries a position keeps it, so
    /// completion at an outer dispatch boundary never clobbers the more
    /// precise inner position.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }

    /// Appends a note to this error.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Renders this error as a diagnostic, ready for terminal emission.
    pub fn diagnostic(&self) -> Diagnostic<()> {
        let mut diagnostic = Diagnostic::error()
            .with_code(self.kind.code())
            .with_message(format!("{}: {}", self.kind.name(), self.message));
        if let Some(span) = self.span {
            diagnostic = diagnostic.with_labels(vec![span.as_label()]);
        }
        if !self.notes.is_empty() {
            diagnostic = diagnostic.with_notes(self.notes.clone());
        }
        diagnostic
    }
}

impl fmt::Display for SofError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

impl std::error::Error for SofError {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn completion_is_first_wins() {
        let err = SofError::arithmetic("division by zero")
            .with_span(Span::new(4, 5))
            .with_span(Span::new(10, 11));
        assert_eq!(err.span, Some(Span::new(4, 5)));
    }

    #[test]
    fn diagnostic_carries_code() {
        let err = SofError::reference("unknown identifier `x`");
        let diagnostic = err.diagnostic();
        assert_eq!(diagnostic.code.as_deref(), Some(codes::REFERENCE_ERROR));
        assert!(diagnostic.message.starts_with("ReferenceError"));
    }
}
