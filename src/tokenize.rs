//! Splitting cleaned SOF source into raw tokens.
//!
//! A token is a maximal run of non-whitespace characters, or one complete
//! quoted string literal. The tokenizer is lazy and restartable: it exposes
//! its current scan offset, a push/pop stack of saved scan states so that a
//! nested code block can be tokenized as a bounded sub-region of the same
//! source string (rather than a copy), and incremental append so that a REPL
//! can grow the source line by line without losing its position.

use crate::ast::Span;

/// A raw token: its text and its position in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Text of the token, exactly as written.
    pub text: String,
    /// Position of the token in the source.
    pub span: Span,
}

/// Tokenizer over a cleaned source string.
pub struct Tokenizer {
    /// The full (cleaned) source.
    source: String,
    /// Current scan offset, in bytes.
    pos: usize,
    /// Exclusive end of the current scan region; `None` means end of source,
    /// which keeps growing under [`Tokenizer::append`].
    end: Option<usize>,
    /// Saved scan states (offset and region end), innermost last.
    saved: Vec<(usize, Option<usize>)>,
}

impl Tokenizer {
    /// Creates a tokenizer over a whole source string.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            pos: 0,
            end: None,
            saved: vec![],
        }
    }

    /// The current scan offset, in bytes.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Exclusive end of the current scan region.
    pub fn region_end(&self) -> usize {
        self.end.unwrap_or(self.source.len())
    }

    /// The source under scan.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Saves the current scan state and restricts scanning to
    /// `start..end`.
    ///
    /// Used to tokenize the interior of a code block: the parser may not scan
    /// past the block's matching closing delimiter.
    pub fn push_region(&mut self, start: usize, end: usize) {
        self.saved.push((self.pos, self.end));
        self.pos = start;
        self.end = Some(end);
    }

    /// Restores the scan state saved by the matching
    /// [`Tokenizer::push_region`].
    pub fn pop_region(&mut self) {
        if let Some((pos, end)) = self.saved.pop() {
            self.pos = pos;
            self.end = end;
        }
    }

    /// Appends new text to the source, preserving the current offset.
    pub fn append(&mut self, text: &str) {
        self.source.push_str(text);
    }

    /// Is there another token before the end of the current region?
    pub fn has_next(&mut self) -> bool {
        self.skip_whitespace();
        self.pos < self.region_end()
    }

    /// Returns the next token, advancing the scan position, or `None` at the
    /// end of the current region.
    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();
        let end = self.region_end();
        if self.pos >= end {
            return None;
        }
        let start = self.pos;
        let rest = &self.source[start..end];
        let len = if rest.starts_with('"') {
            string_run(rest)
        } else {
            rest.find(char::is_whitespace).unwrap_or(rest.len())
        };
        self.pos = start + len;
        Some(Token {
            text: rest[..len].to_string(),
            span: Span::new(start, start + len),
        })
    }

    /// Advances the scan position past any whitespace.
    fn skip_whitespace(&mut self) {
        let end = self.region_end();
        let rest = &self.source[self.pos..end];
        let skipped = rest.len() - rest.trim_start().len();
        self.pos += skipped;
    }
}

/// Length in bytes of the complete string-literal run opening `rest`.
///
/// Scans to the matching unescaped closing quote, inclusive; the preprocessor
/// guarantees one exists before end of input, but a bounded region may still
/// cut it short, in which case the run extends to the region end and the
/// parser reports the malformed literal.
fn string_run(rest: &str) -> usize {
    let mut escaped = false;
    for (i, c) in rest.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return i + 1;
        }
    }
    rest.len()
}
