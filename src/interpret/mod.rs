//! Execution: the data stack, the I/O surface, the engine and the REPL.

pub mod interpreter;
pub mod io;
pub mod stack;

pub use interpreter::{Flow, Interpreter};
pub use io::{BufferedIo, OutputHandle, SofIo, StdIo};
pub use stack::Stack;

use crate::errors::Result;
use crate::preprocess::clean;
use crate::tokenize::Tokenizer;

/// What feeding one line to the REPL did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplOutcome {
    /// The line completed a program fragment and it ran.
    Executed,
    /// An open code block is still waiting for its closing delimiter.
    Incomplete,
}

/// A read-eval loop over one persistent interpreter.
///
/// Each fed line goes through the interpreter's append/step interface, so
/// spans keep indexing the full accumulated source. A line that opens more
/// code blocks than it closes is held back until the delimiters balance.
pub struct Repl {
    /// The persistent engine: stack and definitions survive across lines.
    interpreter: Interpreter,
    /// Lines held back while code blocks are still open.
    held: String,
    /// Net count of unclosed `{` in the held lines.
    depth: i64,
}

impl Repl {
    /// Creates a REPL around a fresh interpreter.
    pub fn new(io: Box<dyn SofIo>) -> Self {
        Self {
            interpreter: Interpreter::new(io),
            held: String::new(),
            depth: 0,
        }
    }

    /// The accumulated raw source, for rendering diagnostics.
    pub fn source(&self) -> &str {
        self.interpreter.source()
    }

    /// Feeds one input line.
    ///
    /// Definitions and stack contents persist into the next line. A failed
    /// line leaves the interpreter alive; only the failing fragment is lost.
    pub fn feed_line(&mut self, line: &str) -> Result<ReplOutcome> {
        // Comments are stripped per line, so they can never span lines.
        let cleaned = clean(line)?;

        // Defer execution while code blocks are still open.
        let mut scan = Tokenizer::new(cleaned.as_str());
        while let Some(token) = scan.next_token() {
            match token.text.as_str() {
                "{" => self.depth += 1,
                "}" => self.depth -= 1,
                _ => (),
            }
        }

        if !self.held.is_empty() {
            self.held.push('\n');
        }
        self.held.push_str(line);

        if self.depth > 0 {
            return Ok(ReplOutcome::Incomplete);
        }
        self.depth = 0;

        let fragment = std::mem::take(&mut self.held);
        self.interpreter.append_line(&fragment)?;
        while self.interpreter.can_execute() {
            self.interpreter.execute_once()?;
        }
        Ok(ReplOutcome::Executed)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::ErrorKind;

    fn repl() -> (Repl, OutputHandle) {
        let io = BufferedIo::new([], false);
        let out = io.output();
        (Repl::new(Box::new(io)), out)
    }

    #[test]
    fn definitions_persist_across_lines() {
        let (mut repl, out) = repl();
        assert_eq!(repl.feed_line("5 x def").unwrap(), ReplOutcome::Executed);
        assert_eq!(repl.feed_line("x . write").unwrap(), ReplOutcome::Executed);
        assert_eq!(out.take_string(), "5");
    }

    #[test]
    fn the_stack_persists_across_lines() {
        let (mut repl, out) = repl();
        repl.feed_line("3 4").unwrap();
        repl.feed_line("+ write").unwrap();
        assert_eq!(out.take_string(), "7");
    }

    #[test]
    fn open_blocks_defer_execution() {
        let (mut repl, out) = repl();
        assert_eq!(
            repl.feed_line("{ 2 3 *").unwrap(),
            ReplOutcome::Incomplete
        );
        assert_eq!(out.take_string(), "");
        assert_eq!(
            repl.feed_line("} 0 function f def f : write").unwrap(),
            ReplOutcome::Executed
        );
        assert_eq!(out.take_string(), "6");
    }

    #[test]
    fn a_failed_line_does_not_kill_the_session() {
        let (mut repl, out) = repl();
        let err = repl.feed_line("1 0 / write").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Arithmetic);
        repl.feed_line("2 2 + write").unwrap();
        assert_eq!(out.take_string(), "4");
    }

    #[test]
    fn spans_index_the_accumulated_source() {
        let (mut repl, _) = repl();
        repl.feed_line("1 1 + pop").unwrap();
        let err = repl.feed_line("oops .").unwrap_err();
        // "1 1 + pop\n" is 10 bytes; the failing `.` sits at offset 15.
        assert_eq!(err.span.unwrap().start(), 15);
    }
}
