//! Defining the interpreter context.

use std::rc::Rc;

use codespan_reporting::files::SimpleFile;

use crate::config::Config;
use crate::reporter::{Diagnostic, Reporter};

/// Prints to stdout only if the context is in verbose mode.
macro_rules! verbose_print {
    ($ctx:expr, $($arg:tt)*) => {
        if $ctx.config.verbose {
            print!($($arg)*);
        }
    };
}

/// Prints (with newline) to stdout only if the context is in verbose mode.
macro_rules! verbose_println {
    ($ctx:expr, $($arg:tt)*) => {
        if $ctx.config.verbose {
            println!($($arg)*);
        }
    };
}

/// Interpreter context.
pub struct Context {
    /// Interpreter configuration.
    pub config: Config,
    /// Error reporter.
    pub reporter: Reporter,
    /// File representation, in part for diagnostic reporting.
    pub files: Rc<SimpleFile<String, String>>,
}

impl Context {
    /// Creates a new interpreter context.
    pub fn new(config: Config) -> Self {
        let files = Rc::new(SimpleFile::new(
            config
                .filename
                .clone()
                .unwrap_or_else(|| "unknown file".to_string()),
            config.input.clone(),
        ));
        Self {
            reporter: Reporter::new(files.clone()),
            config,
            files,
        }
    }

    /// Create a new error diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        self.reporter.emit(diagnostic);
    }

    /// Was there any errors so far?
    pub fn has_errors(&self) -> bool {
        self.reporter.has_errors()
    }
}
