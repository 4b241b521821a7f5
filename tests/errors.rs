//! Fault behavior through the whole pipeline: error categories, diagnostic
//! codes and source positions.

use sof_lib::steps::execute_captured;
use sof_lib::{Config, Context, ErrorKind, SofError};
use unindent::unindent;

/// Runs a program expected to fail, returning the error.
fn fail(source: &str) -> SofError {
    let ctx = Context::new(Config {
        input: source.to_string(),
        ..Default::default()
    });
    match execute_captured(&ctx, &[]) {
        Ok(produced) => panic!("program should fail, printed {produced:?}"),
        Err(err) => err,
    }
}

#[test]
fn unterminated_string_is_a_syntax_error() {
    let err = fail(r#"3 4 + "oops"#);
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.diagnostic().code.as_deref(), Some("E0001"));
    // The span points at the opening quote.
    assert_eq!(err.span.unwrap().start(), 6);
}

#[test]
fn unterminated_block_comment_is_a_syntax_error() {
    let err = fail("1 2 + #* never closed");
    assert_eq!(err.kind, ErrorKind::Syntax);
}

#[test]
fn unmatched_braces() {
    let err = fail("{ 1 2");
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.span.unwrap().start(), 0);

    let err = fail("1 }");
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.span.unwrap().start(), 2);
}

#[test]
fn out_of_radix_digit_is_positioned() {
    let err = fail("1 0b12 +");
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert!(err.message.contains("base 2"));
    assert_eq!(err.span.unwrap().start(), 2);
}

#[test]
fn division_by_zero() {
    let err = fail("1 0 / write");
    assert_eq!(err.kind, ErrorKind::Arithmetic);
    assert_eq!(err.diagnostic().code.as_deref(), Some("E0003"));
    assert_eq!(err.span.unwrap().start(), 4);
}

#[test]
fn type_mismatch_names_both_operands_and_the_operator() {
    let err = fail(r#"true "x" - write"#);
    assert_eq!(err.kind, ErrorKind::Type);
    assert!(err.message.contains("Boolean"));
    assert!(err.message.contains("String"));
    assert!(err.message.contains('-'));
}

#[test]
fn unknown_identifier() {
    let err = fail("missing . write");
    assert_eq!(err.kind, ErrorKind::Reference);
    assert_eq!(err.diagnostic().code.as_deref(), Some("E0004"));
    assert!(err.message.contains("missing"));
}

#[test]
fn popping_an_empty_stack_underflows() {
    let err = fail("pop");
    assert_eq!(err.kind, ErrorKind::StackUnderflow);
    assert_eq!(err.diagnostic().code.as_deref(), Some("E0006"));
}

#[test]
fn return_outside_a_function_is_a_stack_access_error() {
    let err = fail("1 return");
    assert_eq!(err.kind, ErrorKind::StackAccess);
    assert_eq!(err.diagnostic().code.as_deref(), Some("E0005"));
}

#[test]
fn failed_assertion() {
    let err = fail("1 2 = assert");
    assert_eq!(err.kind, ErrorKind::Assertion);
    assert_eq!(err.diagnostic().code.as_deref(), Some("E0008"));
}

#[test]
fn unknown_native_descriptor() {
    let err = fail(r#""no.such.Lib#fn()" nativecall"#);
    assert_eq!(err.kind, ErrorKind::Native);
    assert!(err.message.contains("no.such.Lib#fn()"));
}

#[test]
fn unresolvable_module() {
    let err = fail("no:such:module use");
    assert_eq!(err.kind, ErrorKind::Module);
    assert_eq!(err.diagnostic().code.as_deref(), Some("E0007"));
}

#[test]
fn spans_stay_aligned_past_multibyte_comments() {
    let source = "#é\nb .";
    let err = fail(source);
    assert_eq!(err.kind, ErrorKind::Reference);
    // The comment's non-ASCII character must not shift later offsets.
    let span = err.span.unwrap();
    assert_eq!(&source[span.start()..span.end()], ".");
}

#[test]
fn inner_spans_win_over_outer_completion() {
    // The fault comes from the `/` inside the block; the span must point
    // there, not at the call site.
    let source = "{ 1 0 / } 0 function f def f :";
    let err = fail(source);
    assert_eq!(err.kind, ErrorKind::Arithmetic);
    let span = err.span.unwrap();
    assert_eq!(&source[span.start()..span.end()], "/");
}

#[test]
fn no_output_is_produced_past_a_fault() {
    let ctx = Context::new(Config {
        input: r#""before" write 1 0 / "after" write"#.to_string(),
        ..Default::default()
    });
    let err = execute_captured(&ctx, &[]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Arithmetic);
}

#[test]
fn errors_render_as_diagnostics() {
    let source = unindent(
        r#"
        1 x def
        x . 0 / write
        "#,
    );
    let err = fail(&source);
    let diagnostic = err.diagnostic();
    assert!(diagnostic.message.contains("ArithmeticError"));
    assert_eq!(diagnostic.labels.len(), 1);
}
