//! The `sof` command line: batch runs, one-liners and an interactive prompt.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

use sof_lib::interpret::{Repl, ReplOutcome, StdIo};
use sof_lib::{steps, Config, Context, SofError};

/// Interpreter for the SOF programming language.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Script to run. Starts an interactive prompt when omitted.
    filename: Option<PathBuf>,

    /// Run this source string instead of a file.
    #[arg(short = 'c', long = "command", conflicts_with = "filename")]
    command: Option<String>,

    /// Print the timing of each pipeline step.
    #[arg(short, long)]
    verbose: bool,

    /// Enable the `describe`/`describes` debug channel.
    #[arg(short, long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    match (&args.filename, &args.command) {
        (Some(path), _) => {
            let input = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read `{}`", path.display()))?;
            run_batch(Config {
                input,
                filename: Some(path.display().to_string()),
                debug: args.debug,
                verbose: args.verbose,
            })
        }
        (None, Some(command)) => run_batch(Config {
            input: command.clone(),
            filename: None,
            debug: args.debug,
            verbose: args.verbose,
        }),
        (None, None) => run_repl(args.debug),
    }
}

/// Runs one whole program, rendering any fault as a diagnostic.
fn run_batch(config: Config) -> anyhow::Result<()> {
    let ctx = Context::new(config);
    match steps::execute(&ctx) {
        Ok(()) => Ok(()),
        Err(err) => report(&ctx, err),
    }
}

/// Emits a diagnostic against the context's source and exits nonzero.
fn report(ctx: &Context, err: SofError) -> anyhow::Result<()> {
    ctx.emit(err.diagnostic());
    ctx.reporter.display()?;
    std::process::exit(1);
}

/// The interactive prompt: one persistent interpreter, fed line by line.
///
/// An erroring line prints its diagnostic and the session continues.
fn run_repl(debug: bool) -> anyhow::Result<()> {
    println!("sof {}", env!("CARGO_PKG_VERSION"));
    let mut repl = Repl::new(Box::new(StdIo::new(debug)));
    let stdin = std::io::stdin();
    let mut prompt = ">>> ";
    loop {
        print!("{prompt}");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }
        let line = line.trim_end_matches(['\n', '\r']);
        prompt = match repl.feed_line(line) {
            Ok(ReplOutcome::Executed) => ">>> ",
            Ok(ReplOutcome::Incomplete) => "... ",
            Err(err) => {
                let ctx = Context::new(Config {
                    input: repl.source().to_string(),
                    filename: Some("<repl>".to_string()),
                    debug,
                    verbose: false,
                });
                report_and_continue(&ctx, err)?;
                ">>> "
            }
        };
    }
}

/// Emits a diagnostic without ending the session.
fn report_and_continue(ctx: &Context, err: SofError) -> anyhow::Result<()> {
    ctx.emit(err.diagnostic());
    ctx.reporter.display()
}
