//! The interpretation pipeline, one step per function.
//!
//! Each step times itself when the context is verbose. `execute` chains them
//! over the standard streams; `execute_captured` runs the same pipeline with
//! captured output and scripted input, which is what the integration tests
//! drive.

use std::sync::Arc;
use std::time::Instant;

use crate::context::Context;
use crate::errors::Result;
use crate::interpret::{BufferedIo, Interpreter, SofIo, StdIo};
use crate::modules::SofFile;
use crate::preprocess;
use crate::tokenize::Tokenizer;

/// Strips comments from the context's input, preserving positions.
pub fn clean(ctx: &Context) -> Result<String> {
    verbose_print!(ctx, "Preprocessing...");
    let start = Instant::now();
    let cleaned = preprocess::clean(&ctx.config.input)?;
    verbose_println!(ctx, " done in {:?}", start.elapsed());
    Ok(cleaned)
}

/// Parses the cleaned source into a file handle carrying its AST.
pub fn parse(ctx: &Context, cleaned: String) -> Result<Arc<SofFile>> {
    verbose_print!(ctx, "Parsing...");
    let start = Instant::now();
    let name = ctx
        .config
        .filename
        .clone()
        .unwrap_or_else(|| "<string>".to_string());
    let file = Arc::new(SofFile::new(name, ctx.config.input.clone()));
    let mut tokenizer = Tokenizer::new(cleaned);
    let ast = crate::parse::parse(&file, &mut tokenizer)?;
    file.set_ast(Arc::new(ast));
    verbose_println!(ctx, " done in {:?}", start.elapsed());
    Ok(file)
}

/// Runs a parsed file on the given I/O surface.
pub fn interpret(ctx: &Context, file: &Arc<SofFile>, io: Box<dyn SofIo>) -> Result<()> {
    verbose_print!(ctx, "Interpreting...");
    let start = Instant::now();
    let mut interpreter = Interpreter::new(io);
    let outcome = interpreter.run(file);
    verbose_println!(ctx, " done in {:?}", start.elapsed());
    outcome
}

/// The full pipeline over the standard streams.
pub fn execute(ctx: &Context) -> Result<()> {
    let cleaned = clean(ctx)?;
    let file = parse(ctx, cleaned)?;
    interpret(ctx, &file, Box::new(StdIo::new(ctx.config.debug)))
}

/// The full pipeline with captured output and scripted input lines.
///
/// Returns everything the program printed.
pub fn execute_captured(ctx: &Context, input: &[&str]) -> Result<String> {
    let cleaned = clean(ctx)?;
    let file = parse(ctx, cleaned)?;
    let io = BufferedIo::new(input.iter().map(|s| s.to_string()), ctx.config.debug);
    let out = io.output();
    interpret(ctx, &file, Box::new(io))?;
    Ok(out.take_string())
}
