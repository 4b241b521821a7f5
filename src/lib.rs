//! An interpreter for SOF, a stack-based language in which nametables are
//! themselves stack elements.
//!
//! A program is a flat list of tokens. Literals push themselves; primitive
//! operations pop their operands and push their results; code blocks are
//! first-class values that re-execute their parsed body on demand. Scoping
//! needs no environment tree: binding tables (nametables) sit on the data
//! stack between values, and lexical lookup simply walks the stack downward.
//!
//! The pipeline is preprocess ([`preprocess`]), tokenize ([`tokenize`]),
//! parse ([`parse`]) and interpret ([`interpret`]); [`steps`] chains them and
//! [`interpret::Repl`] drives them incrementally, line by line.

#[macro_use]
extern crate lazy_static;

#[macro_use]
pub mod context;

pub mod ast;
pub mod codes;
pub mod config;
pub mod errors;
pub mod interpret;
pub mod modules;
pub mod native;
pub mod parse;
pub mod preprocess;
pub mod reporter;
pub mod steps;
pub mod tokenize;
pub mod value;

pub use ast::{Node, PrimOp, Span};
pub use config::Config;
pub use context::Context;
pub use errors::{ErrorKind, Result, SofError};
pub use interpret::{Interpreter, Repl};
pub use value::Value;
