//! Defining the interpreter config options.

/// Interpreter configuration.
#[derive(Default, Clone)]
pub struct Config {
    /// Interpreter input string.
    pub input: String,
    /// Interpreter input filename.
    pub filename: Option<String>,
    /// Debug mode: enables the `debug` I/O channel and stack dumps.
    pub debug: bool,
    /// Verbose mode.
    pub verbose: bool,
}
