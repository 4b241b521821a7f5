//! The data stack and scope machine.
//!
//! One stack per interpreter. Nametables live on the stack as ordinary
//! elements: the global table sits at the bottom for the whole run, function
//! calls push delimiter tables above it, and lexical lookup walks the stack
//! from the top down through whatever tables it passes. The access rules are
//! asymmetric on purpose: `push` always succeeds, while `pop` and `peek`
//! refuse to move or expose a nametable.

use crate::errors::{Result, SofError};
use crate::value::{Nametable, TableKind, TableRef, Value};

/// The interpreter's data stack.
pub struct Stack {
    /// Bottom-to-top elements. `elems[0]` is always the global nametable.
    elems: Vec<Value>,
}

impl Stack {
    /// Creates a stack holding only `global` at the bottom.
    pub fn new(global: TableRef) -> Self {
        Self {
            elems: vec![Value::TableV(global)],
        }
    }

    /// Pushes a value. Never fails.
    pub fn push(&mut self, value: Value) {
        self.elems.push(value);
    }

    /// Pops the topmost value.
    ///
    /// # Errors
    /// Fails with a `StackUnderflowError` when no data is left, and with a
    /// `StackAccessError` when the topmost element is a nametable. Either
    /// way the stack is left untouched.
    pub fn pop(&mut self) -> Result<Value> {
        self.check_top()?;
        Ok(self.elems.pop().unwrap())
    }

    /// Copies the topmost value without removing it.
    ///
    /// Same access rules as [`Stack::pop`].
    pub fn peek(&self) -> Result<Value> {
        self.check_top()?;
        Ok(self.elems.last().unwrap().clone())
    }

    /// Applies the nametable access rules to the topmost element.
    fn check_top(&self) -> Result<()> {
        match self.elems.last() {
            // Only the global table left, so no data was ever pushed here.
            Some(Value::TableV(_)) if self.elems.len() == 1 => {
                Err(SofError::stack_underflow("the stack is empty"))
            }
            Some(Value::TableV(table)) if table.borrow().is_call_delimiter() => Err(
                SofError::stack_underflow("no value left in the current function frame"),
            ),
            Some(Value::TableV(_)) => Err(SofError::stack_access(
                "a nametable cannot be popped or inspected",
            )),
            Some(_) => Ok(()),
            None => Err(SofError::stack_underflow("the stack is empty")),
        }
    }

    /// The topmost element, nametable or not. Engine-internal inspection
    /// that never consumes anything.
    pub fn top(&self) -> Option<&Value> {
        self.elems.last()
    }

    /// Number of elements, the global table included.
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Whether any data sits above the global table.
    pub fn is_empty(&self) -> bool {
        self.elems.len() <= 1
    }

    /// The global nametable at the bottom of the stack.
    pub fn global(&self) -> TableRef {
        match &self.elems[0] {
            Value::TableV(table) => table.clone(),
            _ => unreachable!("the bottom of the stack is always the global nametable"),
        }
    }

    /// The local scope: the nearest nametable from the top down.
    ///
    /// Definitions and lookups start here. Falls back to the global table
    /// when no other table is on the stack.
    pub fn local_scope(&self) -> TableRef {
        for elem in self.elems.iter().rev() {
            if let Value::TableV(table) = elem {
                return table.clone();
            }
        }
        unreachable!("the bottom of the stack is always the global nametable")
    }

    /// The naming scope `globaldef` targets: the lowest nametable above the
    /// global one, provided it is a plain namespace table; otherwise the
    /// global table itself.
    pub fn naming_scope(&self) -> TableRef {
        for elem in &self.elems[1..] {
            if let Value::TableV(table) = elem {
                if table.borrow().kind() == TableKind::Plain {
                    return table.clone();
                }
                break;
            }
        }
        self.global()
    }

    /// Resolves `name` against the scope chain, from the top of the stack
    /// down to the global table.
    ///
    /// A function delimiter additionally exposes the global table of the
    /// module its function was defined in, so a function imported from
    /// another module still sees its own globals.
    pub fn lookup(&self, name: &crate::value::Identifier) -> Option<Value> {
        for elem in self.elems.iter().rev() {
            let Value::TableV(table) = elem else {
                continue;
            };
            let table = table.borrow();
            if let Some(value) = table.get(name) {
                return Some(value);
            }
            if let Some(global) = table.captured_global() {
                if let Some(value) = global.borrow().get(name) {
                    return Some(value);
                }
            }
        }
        None
    }

    /// Pushes a fresh function delimiter and returns its stack index.
    pub fn push_frame(&mut self, global: TableRef) -> (usize, TableRef) {
        let delimiter = std::rc::Rc::new(std::cell::RefCell::new(
            Nametable::function_delimiter(global),
        ));
        let index = self.elems.len();
        self.push(Value::TableV(delimiter.clone()));
        (index, delimiter)
    }

    /// Pushes an existing nametable as a call delimiter and returns its
    /// stack index. Used for method calls, which run on the receiver's own
    /// attribute table.
    pub fn push_table_frame(&mut self, table: TableRef) -> usize {
        let index = self.elems.len();
        self.push(Value::TableV(table));
        index
    }

    /// The topmost data value strictly above stack index `frame`, if any.
    ///
    /// This is the frame's result candidate when a function falls off its
    /// end without an explicit `return`.
    pub fn frame_result(&self, frame: usize) -> Option<Value> {
        self.elems[frame + 1..]
            .iter()
            .rev()
            .find(|elem| !matches!(elem, Value::TableV(_)))
            .cloned()
    }

    /// Discards everything at and above stack index `frame`.
    pub fn drop_frame(&mut self, frame: usize) {
        self.elems.truncate(frame);
    }

    /// The nearest call delimiter from the top down, as a stack index and
    /// table. `None` outside any function frame.
    pub fn current_frame(&self) -> Option<(usize, TableRef)> {
        for (index, elem) in self.elems.iter().enumerate().rev() {
            if let Value::TableV(table) = elem {
                if table.borrow().is_call_delimiter() {
                    return Some((index, table.clone()));
                }
            }
        }
        None
    }

    /// Formatted stack description, top element first, for `describes`.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for elem in self.elems.iter().rev() {
            let line = match elem {
                Value::TableV(table) => table.borrow().describe(),
                other => other.debug_string(),
            };
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::value::Identifier;
    use Value::*;

    fn fresh() -> Stack {
        Stack::new(Nametable::shared(TableKind::Plain))
    }

    fn ident(name: &str) -> Identifier {
        Identifier::new(name).unwrap()
    }

    #[test]
    fn push_pop_is_lifo() {
        let mut stack = fresh();
        stack.push(IntV(1));
        stack.push(IntV(2));
        assert!(stack.pop().unwrap().equals(&IntV(2)));
        assert!(stack.pop().unwrap().equals(&IntV(1)));
    }

    #[test]
    fn pop_on_the_empty_stack_underflows() {
        let mut stack = fresh();
        let err = stack.pop().unwrap_err();
        assert_eq!(err.kind, ErrorKind::StackUnderflow);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn nametables_cannot_be_popped_and_stay_put() {
        let mut stack = fresh();
        stack.push(TableV(Nametable::shared(TableKind::Plain)));
        let err = stack.pop().unwrap_err();
        assert_eq!(err.kind, ErrorKind::StackAccess);
        // The table is still there.
        assert_eq!(stack.len(), 2);
        assert!(matches!(stack.top(), Some(TableV(_))));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut stack = fresh();
        stack.push(IntV(5));
        assert!(stack.peek().unwrap().equals(&IntV(5)));
        assert!(stack.peek().unwrap().equals(&IntV(5)));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn lookup_falls_back_through_the_scope_chain() {
        let mut stack = fresh();
        let x = ident("x");
        let y = ident("y");
        stack.global().borrow_mut().define(x.clone(), IntV(1));
        stack.global().borrow_mut().define(y.clone(), IntV(2));

        let (_, frame) = stack.push_frame(stack.global());
        frame.borrow_mut().define(x.clone(), IntV(10));

        // The inner definition shadows, the outer one is still reachable.
        assert!(stack.lookup(&x).unwrap().equals(&IntV(10)));
        assert!(stack.lookup(&y).unwrap().equals(&IntV(2)));
        assert!(stack.lookup(&ident("z")).is_none());
    }

    #[test]
    fn delimiters_expose_their_captured_global() {
        let mut stack = fresh();
        let other_global = Nametable::shared(TableKind::Plain);
        let name = ident("imported");
        other_global
            .borrow_mut()
            .define(name.clone(), IntV(99));

        stack.push_frame(other_global);
        assert!(stack.lookup(&name).unwrap().equals(&IntV(99)));
    }

    #[test]
    fn popping_across_a_frame_underflows() {
        let mut stack = fresh();
        stack.push(IntV(1));
        stack.push_frame(stack.global());
        let err = stack.pop().unwrap_err();
        assert_eq!(err.kind, ErrorKind::StackUnderflow);
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn frame_result_and_drop() {
        let mut stack = fresh();
        stack.push(IntV(1));
        let (frame, _) = stack.push_frame(stack.global());
        assert!(stack.frame_result(frame).is_none());
        stack.push(IntV(2));
        stack.push(IntV(6));
        assert!(stack.frame_result(frame).unwrap().equals(&IntV(6)));

        stack.drop_frame(frame);
        assert!(stack.pop().unwrap().equals(&IntV(1)));
    }

    #[test]
    fn naming_scope_prefers_a_plain_table_above_global() {
        let mut stack = fresh();
        assert!(std::rc::Rc::ptr_eq(&stack.naming_scope(), &stack.global()));

        // A function delimiter directly above global does not qualify.
        stack.push_frame(stack.global());
        assert!(std::rc::Rc::ptr_eq(&stack.naming_scope(), &stack.global()));
    }

    #[test]
    fn scope_tables_delimit_definitions_but_not_calls() {
        let mut stack = fresh();
        stack.global().borrow_mut().define(ident("x"), IntV(1));
        let scope = Nametable::shared(TableKind::Scope);
        stack.push(TableV(scope.clone()));

        // Definitions land in the scope table, lookups reach through it.
        assert!(std::rc::Rc::ptr_eq(&stack.local_scope(), &scope));
        assert!(stack.lookup(&ident("x")).unwrap().equals(&IntV(1)));
        // It is neither a call frame nor a `globaldef` target.
        assert!(stack.current_frame().is_none());
        assert!(std::rc::Rc::ptr_eq(&stack.naming_scope(), &stack.global()));
    }

    #[test]
    fn local_scope_is_the_nearest_table() {
        let mut stack = fresh();
        assert!(std::rc::Rc::ptr_eq(&stack.local_scope(), &stack.global()));
        let (_, frame) = stack.push_frame(stack.global());
        stack.push(IntV(3));
        assert!(std::rc::Rc::ptr_eq(&stack.local_scope(), &frame));
    }
}
