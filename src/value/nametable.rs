//! Nametables: identifier→value binding tables living on the stack.
//!
//! A nametable is both a scope's binding table and a stack element: its
//! position *between* data values is what delimits scopes. The plain variant
//! is a namespace or the global table; the scope variant marks a lexical
//! block boundary; the function and method variants mark call-frame
//! boundaries and additionally hold the frame's return value.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use itertools::Itertools;

use super::ident::Identifier;
use super::Value;

/// A shared, mutable handle on a nametable.
///
/// Tables are shared between stack frames (a function value keeps a handle on
/// its captured global table; an object *is* a handle on its attribute
/// table), so they are reference-counted rather than cloned by value.
pub type TableRef = Rc<RefCell<Nametable>>;

/// The role a nametable plays on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Namespace or global scope.
    Plain,
    /// Lexical block boundary.
    Scope,
    /// Function call boundary.
    Function,
    /// Function call boundary for an object method or constructor body.
    Method,
}

/// A scope's identifier→value binding table.
#[derive(Debug, Clone)]
pub struct Nametable {
    /// Role of this table.
    kind: TableKind,
    /// The actual bindings. Insertion order is irrelevant.
    entries: HashMap<Identifier, Value>,
    /// Return value recorded by `return`, for function/method delimiters.
    ret: Option<Value>,
    /// Global nametable of the invoked function, for function delimiters of
    /// functions defined in another module.
    captured_global: Option<TableRef>,
}

impl Nametable {
    /// Creates an empty table of the given kind.
    pub fn new(kind: TableKind) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
            ret: None,
            captured_global: None,
        }
    }

    /// Creates an empty function delimiter capturing `global`.
    pub fn function_delimiter(global: TableRef) -> Self {
        Self {
            captured_global: Some(global),
            ..Self::new(TableKind::Function)
        }
    }

    /// Creates an empty method/constructor delimiter capturing `global`.
    pub fn method_delimiter(global: TableRef) -> Self {
        Self {
            captured_global: Some(global),
            ..Self::new(TableKind::Method)
        }
    }

    /// Wraps a fresh table of the given kind into a shared handle.
    pub fn shared(kind: TableKind) -> TableRef {
        Rc::new(RefCell::new(Self::new(kind)))
    }

    /// Role of this table.
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Is this table a call-frame boundary?
    pub fn is_call_delimiter(&self) -> bool {
        matches!(self.kind, TableKind::Function | TableKind::Method)
    }

    /// Looks up a binding in this table only.
    pub fn get(&self, name: &Identifier) -> Option<Value> {
        self.entries.get(name).cloned()
    }

    /// Binds `name` to `value` in this table, replacing any previous binding.
    pub fn define(&mut self, name: Identifier, value: Value) {
        self.entries.insert(name, value);
    }

    /// Number of bindings in this table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is this table empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records the return value of this call frame.
    pub fn set_return(&mut self, value: Option<Value>) {
        self.ret = value;
    }

    /// Takes the recorded return value of this call frame, if any.
    pub fn take_return(&mut self) -> Option<Value> {
        self.ret.take()
    }

    /// Has a return value been recorded on this frame?
    pub fn has_return(&self) -> bool {
        self.ret.is_some()
    }

    /// The global table captured by the function this frame belongs to.
    pub fn captured_global(&self) -> Option<&TableRef> {
        self.captured_global.as_ref()
    }

    /// Deep equality: same bindings, with values compared structurally.
    ///
    /// This is the equality of `Object` values.
    pub fn deep_eq(&self, other: &Nametable) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(name, value)| {
                other
                    .entries
                    .get(name)
                    .is_some_and(|theirs| value.equals(theirs))
            })
    }

    /// Debug rendering of the bindings, sorted by name for stable output.
    pub fn describe(&self) -> String {
        let entries = self
            .entries
            .iter()
            .sorted_by_key(|(name, _)| name.name().to_string())
            .map(|(name, value)| format!("{name}: {}", value.debug_string()))
            .join(", ");
        format!("{{{entries}}}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Shortcut for an identifier in tests.
    fn id(name: &str) -> Identifier {
        Identifier::new(name).unwrap()
    }

    #[test]
    fn define_and_get() {
        let mut table = Nametable::new(TableKind::Plain);
        table.define(id("x"), Value::IntV(1));
        assert!(table.get(&id("x")).unwrap().equals(&Value::IntV(1)));
        assert!(table.get(&id("y")).is_none());
    }

    #[test]
    fn redefinition_shadows() {
        let mut table = Nametable::new(TableKind::Plain);
        table.define(id("x"), Value::IntV(1));
        table.define(id("x"), Value::IntV(2));
        assert!(table.get(&id("x")).unwrap().equals(&Value::IntV(2)));
    }

    #[test]
    fn deep_equality() {
        let mut a = Nametable::new(TableKind::Method);
        let mut b = Nametable::new(TableKind::Method);
        a.define(id("x"), Value::IntV(1));
        b.define(id("x"), Value::IntV(1));
        assert!(a.deep_eq(&b));
        b.define(id("y"), Value::BoolV(true));
        assert!(!a.deep_eq(&b));
    }
}
