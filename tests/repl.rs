//! Interactive-session behavior: persistence across lines, deferred
//! execution of open blocks, and error recovery.

use sof_lib::interpret::{BufferedIo, OutputHandle, Repl, ReplOutcome};
use sof_lib::ErrorKind;

/// A REPL with captured output and scripted input.
fn session(input: &[&str]) -> (Repl, OutputHandle) {
    let io = BufferedIo::new(input.iter().map(|s| s.to_string()), false);
    let out = io.output();
    (Repl::new(Box::new(io)), out)
}

#[test]
fn a_session_is_one_growing_program() {
    let (mut repl, out) = session(&[]);
    repl.feed_line("3 4 +").unwrap();
    repl.feed_line("write").unwrap();
    assert_eq!(out.take_string(), "7");
}

#[test]
fn definitions_survive_lines() {
    let (mut repl, out) = session(&[]);
    repl.feed_line("{ dup * } 1 function square def").unwrap();
    repl.feed_line("9 square : write").unwrap();
    assert_eq!(out.take_string(), "81");
}

#[test]
fn multi_line_blocks_are_held_until_closed() {
    let (mut repl, out) = session(&[]);
    assert_eq!(
        repl.feed_line("{ n def").unwrap(),
        ReplOutcome::Incomplete
    );
    // Closing the block completes the fragment; the block value lands on
    // the stack, ready for the next line.
    assert_eq!(
        repl.feed_line("  n . n . * }").unwrap(),
        ReplOutcome::Executed
    );
    assert_eq!(
        repl.feed_line("1 function sq def { 1 +").unwrap(),
        ReplOutcome::Incomplete
    );
    assert_eq!(out.take_string(), "");
    assert_eq!(
        repl.feed_line("} 1 function incr def 4 sq : incr : write")
            .unwrap(),
        ReplOutcome::Executed
    );
    assert_eq!(out.take_string(), "17");
}

#[test]
fn errors_do_not_reset_definitions() {
    let (mut repl, out) = session(&[]);
    repl.feed_line("21 x def").unwrap();
    let err = repl.feed_line("x . unknown . +").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Reference);
    repl.feed_line("x . 2 * write").unwrap();
    assert_eq!(out.take_string(), "42");
}

#[test]
fn syntax_errors_are_reported_per_line() {
    let (mut repl, _) = session(&[]);
    let err = repl.feed_line(r#""never closed"#).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    // The session still accepts new lines.
    repl.feed_line("1 pop").unwrap();
}

#[test]
fn line_comments_are_fine_in_a_session() {
    let (mut repl, out) = session(&[]);
    repl.feed_line("1 2 + # adds them").unwrap();
    repl.feed_line("write").unwrap();
    assert_eq!(out.take_string(), "3");
}

#[test]
fn scripted_input_reaches_the_session() {
    let (mut repl, out) = session(&["40 2"]);
    repl.feed_line("input writeln input writeln").unwrap();
    assert_eq!(out.take_string(), "40\n2\n");
}
