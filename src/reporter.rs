//! User-facing error reporting facility.

use std::io::Write;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use codespan_reporting::diagnostic::Severity;
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use crossbeam_queue::SegQueue;

/// An interpreter diagnostic.
pub type Diagnostic = codespan_reporting::diagnostic::Diagnostic<()>;

lazy_static! {
    /// Terminal configuration.
    static ref TERM_CONFIG: term::Config = term::Config::default();
    /// Standard stream handle.
    static ref STD_STREAM: StandardStream = StandardStream::stderr(ColorChoice::Always);
}

/// Dummy file descriptor for internal interpreter errors.
fn dummy_file() -> Rc<SimpleFile<String, String>> {
    Rc::new(SimpleFile::new("internal error".to_string(), String::new()))
}

/// Collection of interpreter diagnostics, ready to be displayed.
pub struct Diagnostics {
    /// Stream to which we will display the diagnostics.
    writer: &'static StandardStream,
    /// Terminal configuration.
    ///
    /// Needed to display the diagnostics to the terminal.
    config: &'static term::Config,
    /// Reference into the original file/source code.
    ///
    /// Needed to display the diagnostics to the terminal.
    files: Rc<SimpleFile<String, String>>,
    /// The actual list of diagnostics.
    diagnostics: SegQueue<Diagnostic>,
    /// True iff `self.diagnostics` contains at least one error diagnostic.
    is_error: AtomicBool,
}

impl From<anyhow::Error> for Diagnostics {
    fn from(err: anyhow::Error) -> Self {
        let diagnostics = SegQueue::default();
        let mut chain = err.chain().rev();
        if let Some(final_error) = chain.next() {
            let caused_by: Vec<_> = chain.map(|x| format!("Caused by: {x}")).collect();
            diagnostics.push(
                Diagnostic::error()
                    .with_message(final_error.to_string())
                    .with_notes(caused_by),
            );
        } else {
            diagnostics.push(Diagnostic::error().with_message("internal interpreter error"));
        }
        Self {
            config: &TERM_CONFIG,
            writer: &STD_STREAM,
            files: dummy_file(),
            diagnostics,
            is_error: AtomicBool::new(true),
        }
    }
}

impl From<std::io::Error> for Diagnostics {
    fn from(err: std::io::Error) -> Self {
        let diagnostics = SegQueue::default();
        diagnostics.push(
            Diagnostic::error()
                .with_message("I/O error")
                .with_notes(vec![err.to_string()]),
        );
        Self {
            config: &TERM_CONFIG,
            writer: &STD_STREAM,
            files: dummy_file(),
            diagnostics,
            is_error: AtomicBool::new(true),
        }
    }
}

impl Diagnostics {
    /// Displays all the diagnostics with nice colors and formatting to the
    /// standard error output.
    ///
    /// # Warning
    /// WILL FLUSH/TRASH the diagnostics that are displayed.
    pub fn display(&self) -> anyhow::Result<()> {
        let mut writer = self.writer.lock();
        write!(&mut writer, "\r")?; // Flush anything on our line
        while let Some(diagnostic) = self.diagnostics.pop() {
            term::emit(&mut writer, self.config, &*self.files, &diagnostic)?;
        }
        Ok(())
    }

    /// Pushes a new diagnostic to the list.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.is_error.fetch_or(
            matches!(diagnostic.severity, Severity::Error | Severity::Bug),
            Ordering::Relaxed,
        );
        self.diagnostics.push(diagnostic);
    }

    /// Flushes all diagnostics and returns them, leaving self's own diagnostic
    /// list empty and ready to receive messages.
    fn flush(&mut self) -> Diagnostics {
        Diagnostics {
            writer: self.writer,
            config: self.config,
            files: self.files.clone(),
            diagnostics: std::mem::take(&mut self.diagnostics),
            // Revert error flag and get it back
            is_error: AtomicBool::new(self.is_error.swap(false, Ordering::SeqCst)),
        }
    }
}

impl IntoIterator for Diagnostics {
    type IntoIter = ::std::vec::IntoIter<Diagnostic>;
    type Item = Diagnostic;

    fn into_iter(self) -> Self::IntoIter {
        let mut res = vec![];
        while let Some(diagnostic) = self.diagnostics.pop() {
            res.push(diagnostic);
        }
        res.into_iter()
    }
}

/// Interpreter reporter.
///
/// Collects and reports any diagnostics emitted during the lifetime of an
/// interpreter.
pub struct Reporter {
    /// The actual diagnostics.
    diagnostics: Diagnostics,
}

impl Reporter {
    /// Create a new `Reporter`.
    pub fn new(files: Rc<SimpleFile<String, String>>) -> Self {
        Self {
            diagnostics: Diagnostics {
                config: &TERM_CONFIG,
                writer: &STD_STREAM,
                files,
                diagnostics: SegQueue::default(),
                is_error: AtomicBool::new(false),
            },
        }
    }

    /// Create a new error diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Flushes all diagnostics and returns them.
    pub fn flush(&mut self) -> Diagnostics {
        self.diagnostics.flush()
    }

    /// Displays all the diagnostics to the `stderr` output.
    pub fn display(&self) -> anyhow::Result<()> {
        self.diagnostics.display()
    }

    /// Was there any errors so far?
    pub fn has_errors(&self) -> bool {
        self.diagnostics.is_error.load(Ordering::SeqCst)
    }
}
