//! Parsing token streams into the AST.
//!
//! The parser walks the tokenizer's current region and recognizes, in order:
//! the fixed table of primitive-operation keywords, code-block delimiters
//! (matched by nesting depth and parsed recursively as a bounded sub-region),
//! integer, float, boolean and string literals, and finally identifiers.
//! First match wins; a token matching none of the grammars is a syntax error
//! naming the token.

pub mod literals;

use std::sync::Arc;

use crate::ast::{Node, PrimOp, Span};
use crate::errors::{Result, SofError};
use crate::modules::SofFile;
use crate::tokenize::{Token, Tokenizer};
use crate::value::{CodeBlock, Identifier, Value};

use literals::{decode_string, parse_boolean, parse_float, parse_integer};

/// Parses the tokenizer's current region into a token-list node.
///
/// `file` is the file the source belongs to; code-block literals keep a
/// handle on it so their diagnostics point back into the right source.
pub fn parse(file: &Arc<SofFile>, tokenizer: &mut Tokenizer) -> Result<Node> {
    let start = tokenizer.offset();
    let mut children = vec![];
    while let Some(token) = tokenizer.next_token() {
        children.push(parse_token(file, tokenizer, token)?);
    }
    let span = Span::new(start, tokenizer.offset());
    Ok(Node::List(children, span))
}

/// Parses one raw token (recursing into the block interior for `{`).
fn parse_token(file: &Arc<SofFile>, tokenizer: &mut Tokenizer, token: Token) -> Result<Node> {
    // (a) Exact match against the primitive-operation table.
    if let Some(op) = PrimOp::from_keyword(&token.text) {
        return Ok(Node::PrimOp(op, token.span));
    }
    // (b) Code-block delimiters.
    if token.text == "{" {
        return parse_block(file, tokenizer, token.span);
    }
    if token.text == "}" {
        return Err(SofError::syntax("unmatched `}`").with_span(token.span));
    }
    // (c)–(f) Literal grammars, first match wins.
    if let Some(int) = parse_integer(&token.text) {
        let int = int.map_err(|err| err.with_span(token.span))?;
        return Ok(Node::Literal(Value::IntV(int), token.span));
    }
    if let Some(float) = parse_float(&token.text) {
        let float = float.map_err(|err| err.with_span(token.span))?;
        return Ok(Node::Literal(Value::FloatV(float), token.span));
    }
    if let Some(b) = parse_boolean(&token.text) {
        return Ok(Node::Literal(Value::BoolV(b), token.span));
    }
    if token.text.starts_with('"') {
        let string = decode_string(&token.text).map_err(|err| err.with_span(token.span))?;
        return Ok(Node::Literal(Value::StrV(string), token.span));
    }
    // (g) Identifier grammar.
    match Identifier::new(&token.text) {
        Ok(ident) => Ok(Node::Literal(Value::IdentV(ident), token.span)),
        Err(_) => Err(
            SofError::syntax(format!("unrecognized token `{}`", token.text))
                .with_span(token.span),
        ),
    }
}

/// Parses a `{ ... }` code block whose opening delimiter spans `open`.
///
/// Locates the matching closing delimiter by nesting depth, then re-enters
/// the parser over the bounded interior region.
fn parse_block(file: &Arc<SofFile>, tokenizer: &mut Tokenizer, open: Span) -> Result<Node> {
    let inner_start = open.end();
    let mut depth = 1usize;
    let (inner_end, close) = loop {
        let Some(token) = tokenizer.next_token() else {
            return Err(SofError::syntax("unmatched `{`: code block is never closed")
                .with_span(open));
        };
        match token.text.as_str() {
            "{" => depth += 1,
            "}" => {
                depth -= 1;
                if depth == 0 {
                    break (token.span.start(), token.span);
                }
            }
            _ => (),
        }
    };

    // Recursively parse the interior as a bounded sub-region; the outer scan
    // resumes after the matched close.
    tokenizer.push_region(inner_start, inner_end);
    let body = parse(file, tokenizer);
    tokenizer.pop_region();

    let span = open.merge(close);
    let block = CodeBlock {
        file: file.clone(),
        ast: Arc::new(body?),
        span,
    };
    Ok(Node::Literal(Value::BlockV(block), span))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::preprocess::clean;

    /// Parses a source snippet, panicking on failure.
    fn parse_str(source: &str) -> Node {
        try_parse(source).expect("failed to parse")
    }

    /// Parses a source snippet.
    fn try_parse(source: &str) -> Result<Node> {
        let file = Arc::new(SofFile::new("<test>", source));
        let mut tokenizer = Tokenizer::new(clean(source)?);
        parse(&file, &mut tokenizer)
    }

    #[test]
    fn simple_program() {
        let node = parse_str("3 4 + write");
        let children = node.children();
        assert_eq!(children.len(), 4);
        assert!(matches!(children[0], Node::Literal(Value::IntV(3), _)));
        assert!(matches!(children[1], Node::Literal(Value::IntV(4), _)));
        assert!(matches!(children[2], Node::PrimOp(PrimOp::Add, _)));
        assert!(matches!(children[3], Node::PrimOp(PrimOp::Write, _)));
    }

    #[test]
    fn literal_kinds() {
        let node = parse_str(r#"-12 2.5 true "hi" name"#);
        let children = node.children();
        assert!(matches!(children[0], Node::Literal(Value::IntV(-12), _)));
        assert!(matches!(children[1], Node::Literal(Value::FloatV(f), _) if f == 2.5));
        assert!(matches!(children[2], Node::Literal(Value::BoolV(true), _)));
        assert!(matches!(children[3], Node::Literal(Value::StrV(_), _)));
        assert!(matches!(children[4], Node::Literal(Value::IdentV(_), _)));
    }

    #[test]
    fn nested_blocks() {
        let node = parse_str("{ 1 { 2 } } x");
        let children = node.children();
        assert_eq!(children.len(), 2);
        let Node::Literal(Value::BlockV(outer), _) = &children[0] else {
            panic!("expected a code block");
        };
        let body = outer.ast.children();
        assert_eq!(body.len(), 2);
        assert!(matches!(body[0], Node::Literal(Value::IntV(1), _)));
        assert!(matches!(&body[1], Node::Literal(Value::BlockV(_), _)));
    }

    #[test]
    fn block_spans_include_braces() {
        let source = "  { 1 } ";
        let node = parse_str(source);
        let Node::Literal(Value::BlockV(block), _) = &node.children()[0] else {
            panic!("expected a code block");
        };
        assert_eq!(&source[block.span.start()..block.span.end()], "{ 1 }");
    }

    #[test]
    fn unmatched_delimiters() {
        let err = try_parse("{ 1 2").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.span.unwrap(), Span::new(0, 1));
        let err = try_parse("1 }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn malformed_literal_is_a_positioned_error() {
        let err = try_parse("1 0b123").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.span.unwrap(), Span::new(2, 7));
    }

    #[test]
    fn unrecognized_token_names_itself() {
        let err = try_parse("3 4 §§").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert!(err.message.contains("§§"));
    }

    #[test]
    fn comments_do_not_shift_positions() {
        // The token after a comment keeps its original source column.
        let source = "#c\nb";
        let node = parse_str(source);
        let span = node.children()[0].span();
        assert_eq!(&source[span.start()..span.end()], "b");
    }

    #[test]
    fn keywords_win_over_identifiers() {
        let node = parse_str("dup describe");
        assert!(matches!(node.children()[0], Node::PrimOp(PrimOp::Dup, _)));
        assert!(matches!(node.children()[1], Node::PrimOp(PrimOp::Describe, _)));
    }
}
