//! Callable values: code blocks, functions and curried functions.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::ast::{Node, Span};
use crate::modules::SofFile;

use super::nametable::TableRef;
use super::Value;

/// A parsed, re-executable code block.
///
/// Holds the source range it was parsed from (for diagnostics) and a shared
/// handle on its parsed body, so that every invocation re-executes the same
/// tree without re-parsing.
#[derive(Clone)]
pub struct CodeBlock {
    /// The file this block was parsed from.
    pub file: Arc<SofFile>,
    /// The parsed body: a token-list node.
    pub ast: Arc<Node>,
    /// Source range of the block, including its braces.
    pub span: Span,
}

impl CodeBlock {
    /// Are these two handles on the same block?
    pub fn same_block(&self, other: &CodeBlock) -> bool {
        Arc::ptr_eq(&self.ast, &other.ast)
            || (Arc::ptr_eq(&self.file, &other.file) && self.span == other.span)
    }
}

impl fmt::Debug for CodeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ block {:?} in {} }}", self.span, self.file.name())
    }
}

/// What invoking a function produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// An ordinary function: the body's return value.
    Plain,
    /// A constructor: a fresh object whose attributes are the body's
    /// definitions.
    Constructor,
}

/// A scoped callable requiring an exact argument count.
#[derive(Debug, Clone)]
pub struct Function {
    /// The function body.
    pub block: CodeBlock,
    /// Number of arguments popped from the caller's stack.
    pub arity: u64,
    /// Ordinary function or constructor.
    pub kind: FunctionKind,
    /// The global nametable the function was defined under.
    ///
    /// Shared, not cloned: all functions of one module must observe the same
    /// global bindings.
    pub global: TableRef,
}

/// A function with some leading arguments pre-bound.
#[derive(Debug, Clone)]
pub struct CurriedFunction {
    /// The underlying function.
    pub function: Rc<Function>,
    /// Pre-bound leading arguments, in declaration order.
    pub bound: Vec<Value>,
}

impl CurriedFunction {
    /// Residual arity: the declared arity minus the pre-bound count.
    pub fn arity(&self) -> u64 {
        self.function.arity.saturating_sub(self.bound.len() as u64)
    }
}
