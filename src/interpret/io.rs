//! The I/O abstraction the engine's `write`/`input` primitives go through.
//!
//! The engine never touches the host streams directly: batch and REPL runs
//! wire in [`StdIo`], while [`BufferedIo`] captures output in a growable
//! string (and replays scripted input), which is what `execute` and the test
//! suites use to assert on program output.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::rc::Rc;

use string_builder::Builder as StringBuilder;

/// The engine-facing I/O surface.
pub trait SofIo {
    /// Writes `text` to the output channel.
    fn print(&mut self, text: &str);

    /// Writes `text` and a newline to the output channel.
    fn println(&mut self, text: &str) {
        self.print(text);
        self.print("\n");
    }

    /// Next whitespace-delimited input token, or `None` at end of input.
    fn next_token(&mut self) -> Option<String>;

    /// Next input line (without its newline), or `None` at end of input.
    fn next_line(&mut self) -> Option<String>;

    /// Writes `text` to the debug channel. No-op unless debugging is enabled.
    fn debug(&mut self, text: &str);
}

/// Real standard streams.
pub struct StdIo {
    /// Whether the debug channel is live.
    debug: bool,
    /// Tokens split off the last line read but not yet consumed.
    pending_tokens: VecDeque<String>,
}

impl StdIo {
    /// Creates a standard-stream I/O surface.
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            pending_tokens: VecDeque::new(),
        }
    }

    /// Reads one line from stdin.
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                while line.ends_with(['\n', '\r']) {
                    line.pop();
                }
                Some(line)
            }
        }
    }
}

impl SofIo for StdIo {
    fn print(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    fn next_token(&mut self) -> Option<String> {
        loop {
            if let Some(token) = self.pending_tokens.pop_front() {
                return Some(token);
            }
            let line = self.read_line()?;
            self.pending_tokens
                .extend(line.split_whitespace().map(str::to_string));
        }
    }

    fn next_line(&mut self) -> Option<String> {
        self.pending_tokens.clear();
        self.read_line()
    }

    fn debug(&mut self, text: &str) {
        if self.debug {
            eprintln!("[debug] {text}");
        }
    }
}

/// Shared handle on a captured output buffer.
#[derive(Clone, Default)]
pub struct OutputHandle(Rc<RefCell<StringBuilder>>);

impl OutputHandle {
    /// Takes the output captured so far, leaving the buffer empty.
    pub fn take_string(&self) -> String {
        let builder = std::mem::take(&mut *self.0.borrow_mut());
        builder.string().unwrap_or_default()
    }
}

/// Captured I/O: output to a growable string, input from scripted lines.
pub struct BufferedIo {
    /// Captured output, as a growable string.
    out: OutputHandle,
    /// Captured debug output.
    debug_out: OutputHandle,
    /// Scripted input lines, consumed front to back.
    input: VecDeque<String>,
    /// Tokens split off the last consumed line.
    pending_tokens: VecDeque<String>,
    /// Whether the debug channel is live.
    debug: bool,
}

impl BufferedIo {
    /// Creates a captured I/O surface with scripted input.
    pub fn new(input: impl IntoIterator<Item = String>, debug: bool) -> Self {
        Self {
            out: OutputHandle::default(),
            debug_out: OutputHandle::default(),
            input: input.into_iter().collect(),
            pending_tokens: VecDeque::new(),
            debug,
        }
    }

    /// A shared handle on the captured output.
    pub fn output(&self) -> OutputHandle {
        self.out.clone()
    }

    /// A shared handle on the captured debug output.
    pub fn debug_output(&self) -> OutputHandle {
        self.debug_out.clone()
    }
}

impl SofIo for BufferedIo {
    fn print(&mut self, text: &str) {
        self.out.0.borrow_mut().append(text);
    }

    fn next_token(&mut self) -> Option<String> {
        loop {
            if let Some(token) = self.pending_tokens.pop_front() {
                return Some(token);
            }
            let line = self.input.pop_front()?;
            self.pending_tokens
                .extend(line.split_whitespace().map(str::to_string));
        }
    }

    fn next_line(&mut self) -> Option<String> {
        self.pending_tokens.clear();
        self.input.pop_front()
    }

    fn debug(&mut self, text: &str) {
        if self.debug {
            self.debug_out.0.borrow_mut().append(text);
            self.debug_out.0.borrow_mut().append("\n");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn buffered_output_capture() {
        let mut io = BufferedIo::new([], false);
        let handle = io.output();
        io.print("3");
        io.println(" 4");
        assert_eq!(handle.take_string(), "3 4\n");
        assert_eq!(handle.take_string(), "");
    }

    #[test]
    fn scripted_input_tokens_and_lines() {
        let mut io = BufferedIo::new(["a b".to_string(), "c".to_string()], false);
        assert_eq!(io.next_token().as_deref(), Some("a"));
        assert_eq!(io.next_token().as_deref(), Some("b"));
        assert_eq!(io.next_line().as_deref(), Some("c"));
        assert_eq!(io.next_line(), None);
    }

    #[test]
    fn debug_channel_is_gated() {
        let mut io = BufferedIo::new([], false);
        let debug = io.debug_output();
        io.debug("hidden");
        assert_eq!(debug.take_string(), "");

        let mut io = BufferedIo::new([], true);
        let debug = io.debug_output();
        io.debug("shown");
        assert_eq!(debug.take_string(), "shown\n");
    }
}
