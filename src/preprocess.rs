//! Preprocessing SOF source code.
//!
//! The preprocessor strips comments and validates string/comment delimiter
//! balance before anything else looks at the source. Comments are overwritten
//! with blank filler of the same length instead of being deleted, so every
//! byte offset reported by later stages still points into the *original*
//! source text.
//!
//! SOF comments are `#` up to end of line, or `#* ... *#` blocks. Strings are
//! left completely untouched here (escape decoding happens in the parser, on
//! matched string-literal tokens only); a backslash inside a string escapes
//! exactly the next character, so an escaped quote cannot end the string.

use crate::ast::Span;
use crate::errors::{Result, SofError};

/// State of the comment-stripping scan.
#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    /// Ordinary code.
    Code,
    /// Inside a `#` line comment.
    LineComment,
    /// Just saw a `#`; the next character decides line vs. block comment.
    BlockCommentStart,
    /// Inside a `#* ... *#` block comment.
    BlockComment,
    /// Inside a block comment, just saw a `*`.
    ExpectingBlockCommentEnd,
    /// Inside a string literal.
    InString,
}

use State::*;

/// Pushes blank filler covering one comment character: the newline itself,
/// or one space per byte, so byte offsets into the original source stay
/// valid even for multi-byte characters.
fn blank(out: &mut String, c: char) {
    if c == '\n' {
        out.push('\n');
    } else {
        for _ in 0..c.len_utf8() {
            out.push(' ');
        }
    }
}

/// Strips comments from `source`, replacing them with blanks of equal length.
///
/// Newlines inside comments are preserved, so line and column numbers of all
/// remaining code are unchanged.
///
/// # Errors
/// Fails with a `SyntaxError` if a string literal or a block comment is left
/// unterminated at the end of input.
pub fn clean(source: &str) -> Result<String> {
    let mut out = String::with_capacity(source.len());
    let mut state = Code;
    // Offset of the delimiter that opened the current string/comment, for
    // error reporting.
    let mut opened_at = 0;
    // True when the next string character is escaped by a backslash.
    let mut escaped = false;

    for (i, c) in source.char_indices() {
        match state {
            Code => match c {
                '#' => {
                    state = BlockCommentStart;
                    opened_at = i;
                    out.push(' ');
                }
                '"' => {
                    state = InString;
                    opened_at = i;
                    escaped = false;
                    out.push(c);
                }
                _ => out.push(c),
            },
            BlockCommentStart => {
                if c == '*' {
                    state = BlockComment;
                } else {
                    state = if c == '\n' { Code } else { LineComment };
                }
                blank(&mut out, c);
            }
            LineComment => {
                if c == '\n' {
                    state = Code;
                }
                blank(&mut out, c);
            }
            BlockComment => {
                if c == '*' {
                    state = ExpectingBlockCommentEnd;
                }
                blank(&mut out, c);
            }
            ExpectingBlockCommentEnd => {
                match c {
                    '#' => state = Code,
                    '*' => (),
                    _ => state = BlockComment,
                }
                blank(&mut out, c);
            }
            InString => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    state = Code;
                }
                out.push(c);
            }
        }
    }

    match state {
        InString => Err(SofError::syntax("unterminated string literal")
            .with_span(Span::new(opened_at, opened_at + 1))),
        BlockComment | ExpectingBlockCommentEnd => {
            Err(SofError::syntax("unterminated block comment")
                .with_span(Span::new(opened_at, opened_at + 2)))
        }
        // A line comment (or a bare trailing `#`) may run to end of input.
        _ => Ok(out),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn line_comment_is_blanked() {
        let cleaned = clean("a #comment\nb").unwrap();
        assert_eq!(cleaned, "a         \nb");
        // Same length, same line structure as the original.
        assert_eq!(cleaned.len(), "a #comment\nb".len());
        assert_eq!(cleaned.lines().count(), 2);
    }

    #[test]
    fn block_comment_keeps_newlines() {
        let cleaned = clean("a #* multi\nline *# b").unwrap();
        assert_eq!(cleaned, "a         \n        b");
    }

    #[test]
    fn multibyte_comment_characters_are_blanked_per_byte() {
        let source = "#é ß\nb";
        let cleaned = clean(source).unwrap();
        assert_eq!(cleaned.len(), source.len());
        // Code after the comment sits at its original byte offset.
        let offset = source.find('b').unwrap();
        assert_eq!(&cleaned[offset..], "b");
    }

    #[test]
    fn hash_inside_string_is_kept() {
        let cleaned = clean("\"a # b\" x").unwrap();
        assert_eq!(cleaned, "\"a # b\" x");
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        let cleaned = clean(r#""a \" # b" x"#).unwrap();
        assert_eq!(cleaned, r#""a \" # b" x"#);
    }

    #[test]
    fn unterminated_string_fails() {
        let err = clean("abc \"def").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.span.unwrap().start(), 4);
    }

    #[test]
    fn unterminated_block_comment_fails() {
        let err = clean("a #* never closed").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn stars_inside_block_comment() {
        let cleaned = clean("#* ** * *# x").unwrap();
        assert_eq!(cleaned, "           x");
    }

    #[test]
    fn trailing_line_comment_is_fine() {
        assert!(clean("a # trailing").is_ok());
        assert!(clean("a #").is_ok());
    }
}
