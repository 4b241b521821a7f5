//! Source files and the module registry.
//!
//! A [`SofFile`] ties together a file identity, its raw source text and its
//! lazily-assigned AST. The AST slot is write-once: the file handle must
//! exist before parsing (code blocks keep a handle on the file they came
//! from), so the tree is attached after the fact and never replaced.
//!
//! The [`ModuleRegistry`] resolves import specifiers to files and caches
//! parsed modules by canonical path, so importing the same module twice
//! re-executes nothing and re-parses nothing.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::ast::Node;
use crate::errors::{Result, SofError};
use crate::preprocess::clean;
use crate::tokenize::Tokenizer;

/// Environment variable holding extra standard-library search directories.
const SEARCH_PATH_VAR: &str = "SOF_PATH";

/// An SOF source file: identity, raw source text and (eventually) its AST.
pub struct SofFile {
    /// Display name of the file (path, or `<repl>`/`<string>`).
    name: String,
    /// The raw, uncleaned source text.
    source: String,
    /// The parsed tree, assigned exactly once after parsing.
    ast: OnceLock<Arc<Node>>,
}

impl SofFile {
    /// Creates a file handle with no AST yet.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            ast: OnceLock::new(),
        }
    }

    /// Display name of the file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Attaches the parsed AST.
    ///
    /// Write-once: a second call is ignored, preserving the tree every
    /// existing code block already shares.
    pub fn set_ast(&self, ast: Arc<Node>) {
        let _ = self.ast.set(ast);
    }

    /// The parsed AST, if already attached.
    pub fn ast(&self) -> Option<Arc<Node>> {
        self.ast.get().cloned()
    }
}

impl fmt::Debug for SofFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SofFile")
            .field("name", &self.name)
            .field("parsed", &self.ast.get().is_some())
            .finish()
    }
}

/// Resolves import specifiers to parsed files, with caching.
pub struct ModuleRegistry {
    /// Parsed modules, keyed by canonical path.
    cache: HashMap<PathBuf, Arc<SofFile>>,
    /// Standard-library search path for absolute specifiers.
    search_path: Vec<PathBuf>,
}

impl ModuleRegistry {
    /// Creates a registry with the default search path: `lib` under the
    /// current directory, plus any `SOF_PATH` entries.
    pub fn new() -> Self {
        let mut search_path = vec![PathBuf::from("lib")];
        if let Ok(var) = std::env::var(SEARCH_PATH_VAR) {
            search_path.extend(std::env::split_paths(&var));
        }
        Self {
            cache: HashMap::new(),
            search_path,
        }
    }

    /// Resolves `specifier`, requested from `requesting_file`, to a parsed
    /// module.
    ///
    /// A `.`-prefixed specifier resolves relative to the requesting file's
    /// directory; any other specifier is searched for along the
    /// standard-library path. `:`-separated segments map to path components
    /// and the `.sof` extension is appended.
    ///
    /// # Errors
    /// Fails with a `ModuleError` if the specifier is malformed, no candidate
    /// file exists, or the module fails to preprocess/parse.
    pub fn get_module(
        &mut self,
        requesting_file: Option<&Path>,
        specifier: &str,
    ) -> Result<Arc<SofFile>> {
        let path = self.resolve(requesting_file, specifier)?;
        let canonical = path
            .canonicalize()
            .map_err(|err| SofError::module(format!("cannot access module `{specifier}`: {err}")))?;
        if let Some(module) = self.cache.get(&canonical) {
            return Ok(module.clone());
        }

        let source = std::fs::read_to_string(&canonical).map_err(|err| {
            SofError::module(format!("cannot read module `{specifier}`: {err}"))
        })?;
        let module = Arc::new(SofFile::new(canonical.display().to_string(), source));
        let cleaned = clean(module.source())
            .map_err(|err| err.with_note(format!("while loading module `{specifier}`")))?;
        let mut tokenizer = Tokenizer::new(cleaned);
        let ast = crate::parse::parse(&module, &mut tokenizer)
            .map_err(|err| err.with_note(format!("while loading module `{specifier}`")))?;
        module.set_ast(Arc::new(ast));

        self.cache.insert(canonical, module.clone());
        Ok(module)
    }

    /// Maps a specifier to the path of an existing candidate file.
    fn resolve(&self, requesting_file: Option<&Path>, specifier: &str) -> Result<PathBuf> {
        let (relative, rest) = match specifier.strip_prefix('.') {
            Some(rest) => (true, rest.trim_start_matches(':')),
            None => (false, specifier),
        };
        if rest.is_empty() || rest.split(':').any(str::is_empty) {
            return Err(SofError::module(format!(
                "`{specifier}` is not a valid module specifier"
            )));
        }
        let mut file: PathBuf = rest.split(':').collect();
        file.set_extension("sof");

        if relative {
            let base = requesting_file
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let candidate = base.join(&file);
            if candidate.is_file() {
                return Ok(candidate);
            }
        } else {
            for dir in &self.search_path {
                let candidate = dir.join(&file);
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }
        Err(SofError::module(format!(
            "cannot resolve module `{specifier}`"
        )))
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
