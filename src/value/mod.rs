//! The runtime value model.
//!
//! All SOF values live in one closed tagged union, [`Value`]. Every stack
//! element is a `Value`, including the nametables that delimit scopes, so the
//! union covers primitives, callables, binding tables, objects and the
//! transparent markers. Each operation over values pattern-matches
//! exhaustively on the variants it supports; adding a variant means updating
//! every match site, enforced by the compiler.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use itertools::Itertools;

pub mod callable;
pub mod ident;
pub mod nametable;
pub mod ops;

pub use callable::{CodeBlock, CurriedFunction, Function, FunctionKind};
pub use ident::Identifier;
pub use nametable::{Nametable, TableKind, TableRef};

/// A string value with its character length cached at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Str {
    /// The text itself. Immutable once constructed.
    text: String,
    /// Number of characters (not bytes) in `text`.
    length: usize,
}

impl Str {
    /// Creates a new string value.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let length = text.chars().count();
        Self { text, length }
    }

    /// The cached character length.
    pub fn char_len(&self) -> usize {
        self.length
    }
}

impl Deref for Str {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl From<&str> for Str {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Str {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Transparent stack markers.
///
/// Markers are data to the scoping rules (they can be popped), but the
/// engine's inspection primitives treat them as non-discardable delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Delimits a curried-argument group on the stack.
    CurryPipe,
}

/// Values in SOF.
///
/// Rule: all variants end with a capital `V`.
#[derive(Debug, Clone)]
pub enum Value {
    /// Integer value.
    IntV(i64),
    /// Floating-point value.
    FloatV(f64),
    /// Boolean value.
    BoolV(bool),
    /// String value.
    StrV(Str),
    /// Identifier value: a name, resolved lazily on call/dereference.
    IdentV(Identifier),
    /// Mutable ordered list of values.
    ListV(Rc<RefCell<Vec<Value>>>),
    /// A code block callable.
    BlockV(CodeBlock),
    /// A function (or constructor) callable.
    FunV(Rc<Function>),
    /// A function with pre-bound leading arguments.
    CurriedV(Rc<CurriedFunction>),
    /// A nametable stack element (scope, namespace or call delimiter).
    TableV(TableRef),
    /// An object: a shared handle on its attribute table.
    ObjectV(TableRef),
    /// A transparent marker.
    MarkerV(Marker),
}

use Value::*;

/// Decimal precision to which floats are rounded before comparing, to absorb
/// binary-float noise.
const FLOAT_EQ_PRECISION: f64 = 1e10;

/// Rounds a float to the comparison precision.
pub(crate) fn round_for_eq(f: f64) -> f64 {
    (f * FLOAT_EQ_PRECISION).round() / FLOAT_EQ_PRECISION
}

impl Value {
    /// User-facing name of this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            IntV(_) => "Integer",
            FloatV(_) => "Float",
            BoolV(_) => "Boolean",
            StrV(_) => "String",
            IdentV(_) => "Identifier",
            ListV(_) => "List",
            BlockV(_) => "CodeBlock",
            FunV(f) => match f.kind {
                FunctionKind::Plain => "Function",
                FunctionKind::Constructor => "ConstructorFunction",
            },
            CurriedV(_) => "CurriedFunction",
            TableV(_) => "Nametable",
            ObjectV(_) => "Object",
            MarkerV(_) => "Marker",
        }
    }

    /// Truthiness of the value.
    ///
    /// `false`, `0`, `0.0` and the empty string are false; everything else is
    /// true.
    pub fn truth(&self) -> bool {
        match self {
            BoolV(b) => *b,
            IntV(i) => *i != 0,
            FloatV(f) => *f != 0.0,
            StrV(s) => s.char_len() != 0,
            _ => true,
        }
    }

    /// Negated [`Value::truth`].
    pub fn is_false(&self) -> bool {
        !self.truth()
    }

    /// Is this value a nametable stack element?
    pub fn is_nametable(&self) -> bool {
        matches!(self, TableV(_))
    }

    /// Is this value invocable by the call operators?
    pub fn is_callable(&self) -> bool {
        matches!(self, BlockV(_) | FunV(_) | CurriedV(_))
    }

    /// Type-agnostic equality. Never fails: incompatible variants are simply
    /// unequal.
    ///
    /// Mixed integer/float comparison promotes the integer; float comparison
    /// rounds both sides to a fixed decimal precision first. Objects compare
    /// by deep equality of their attributes, nametables by identity.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (IntV(x), IntV(y)) => x == y,
            (FloatV(x), FloatV(y)) => round_for_eq(*x) == round_for_eq(*y),
            (IntV(x), FloatV(y)) | (FloatV(y), IntV(x)) => {
                round_for_eq(*x as f64) == round_for_eq(*y)
            }
            (BoolV(x), BoolV(y)) => x == y,
            (StrV(x), StrV(y)) => **x == **y,
            (IdentV(x), IdentV(y)) => x == y,
            (ListV(x), ListV(y)) => {
                Rc::ptr_eq(x, y) || {
                    let (x, y) = (x.borrow(), y.borrow());
                    x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| a.equals(b))
                }
            }
            (BlockV(x), BlockV(y)) => x.same_block(y),
            (FunV(x), FunV(y)) => {
                Rc::ptr_eq(x, y)
                    || (x.block.same_block(&y.block) && x.arity == y.arity && x.kind == y.kind)
            }
            (CurriedV(x), CurriedV(y)) => {
                Rc::ptr_eq(x, y)
                    || (FunV(x.function.clone()).equals(&FunV(y.function.clone()))
                        && x.bound.len() == y.bound.len()
                        && x.bound.iter().zip(y.bound.iter()).all(|(a, b)| a.equals(b)))
            }
            (TableV(x), TableV(y)) => Rc::ptr_eq(x, y),
            (ObjectV(x), ObjectV(y)) => {
                Rc::ptr_eq(x, y) || x.borrow().deep_eq(&y.borrow())
            }
            (MarkerV(x), MarkerV(y)) => x == y,
            _ => false,
        }
    }

    /// The print representation: what `write` outputs.
    ///
    /// Strings print as their bare text; everything else prints like its
    /// debug representation, except without quoting.
    pub fn display_string(&self) -> String {
        match self {
            StrV(s) => s.to_string(),
            _ => self.debug_string(),
        }
    }

    /// The debug representation: what `describe` outputs.
    pub fn debug_string(&self) -> String {
        match self {
            IntV(i) => i.to_string(),
            FloatV(f) => f.to_string(),
            BoolV(b) => b.to_string(),
            StrV(s) => format!("\"{}\"", s.escape_debug()),
            IdentV(id) => id.to_string(),
            ListV(items) => {
                let items = items.borrow().iter().map(|v| v.debug_string()).join(", ");
                format!("[{items}]")
            }
            BlockV(block) => format!("{block:?}"),
            FunV(f) => match f.kind {
                FunctionKind::Plain => format!("Function/{}", f.arity),
                FunctionKind::Constructor => format!("Constructor/{}", f.arity),
            },
            CurriedV(c) => format!("Function/{}'{}", c.function.arity, c.bound.len()),
            TableV(table) => {
                let table = table.borrow();
                format!("Nametable[{:?}] {}", table.kind(), table.describe())
            }
            ObjectV(attributes) => format!("Object {}", attributes.borrow().describe()),
            MarkerV(Marker::CurryPipe) => "|".to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(Value::BoolV(true).truth());
        assert!(!Value::BoolV(false).truth());
        assert!(!Value::IntV(0).truth());
        assert!(Value::IntV(-3).truth());
        assert!(!Value::FloatV(0.0).truth());
        assert!(!Value::StrV("".into()).truth());
        assert!(Value::StrV("x".into()).truth());
        assert!(Value::IdentV(Identifier::new("x").unwrap()).truth());
    }

    #[test]
    fn cross_type_equality_is_false_not_an_error() {
        assert!(!Value::IntV(1).equals(&Value::BoolV(true)));
        assert!(!Value::StrV("1".into()).equals(&Value::IntV(1)));
    }

    #[test]
    fn numeric_promotion_in_equality() {
        assert!(Value::IntV(2).equals(&Value::FloatV(2.0)));
        assert!(Value::FloatV(2.0).equals(&Value::IntV(2)));
        assert!(!Value::IntV(2).equals(&Value::FloatV(2.5)));
    }

    #[test]
    fn float_equality_rounds_out_noise() {
        // 0.1 + 0.2 != 0.3 in raw binary floats.
        assert!(Value::FloatV(0.1 + 0.2).equals(&Value::FloatV(0.3)));
    }

    #[test]
    fn string_cached_length_is_in_chars() {
        let s = Str::new("héllo");
        assert_eq!(s.char_len(), 5);
        assert_eq!(s.len(), 6); // bytes, via Deref<Target = str>
    }

    #[test]
    fn display_vs_debug_of_strings() {
        let s = Value::StrV("hi\n".into());
        assert_eq!(s.display_string(), "hi\n");
        assert_eq!(s.debug_string(), "\"hi\\n\"");
    }

    #[test]
    fn float_display_drops_integral_suffix() {
        assert_eq!(Value::FloatV(6.0).display_string(), "6");
        assert_eq!(Value::FloatV(6.5).display_string(), "6.5");
    }
}
