//! The tree-walking execution engine.
//!
//! The engine dispatches over AST nodes: literals push themselves, token
//! lists run in order, and each primitive operation manipulates the stack.
//! Control flow needs no exceptions and no jumps; the only non-local signal
//! is [`Flow::Return`], which unwinds node lists up to the nearest call
//! delimiter, where the invocation protocol turns it back into a value.
//!
//! Errors raised below this layer are position-less; the engine completes
//! them with the span of the node it was dispatching, so every fault that
//! escapes points at the offending token.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use crate::ast::{Node, PrimOp, Span};
use crate::errors::{Result, SofError};
use crate::modules::{ModuleRegistry, SofFile};
use crate::tokenize::Tokenizer;
use crate::native::{default_registry, NativeRegistry};
use crate::value::{
    ops, CodeBlock, CurriedFunction, FunctionKind, Identifier, Marker, Nametable, TableKind,
    TableRef, Value,
};

use super::io::SofIo;
use super::stack::Stack;

/// How a node list finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Ran to its end.
    Normal,
    /// A `return` fired; unwind to the nearest call delimiter.
    Return,
}

/// One interpreter: a stack, an I/O surface and the module machinery.
pub struct Interpreter {
    /// The data stack, global nametable at the bottom.
    stack: Stack,
    /// Where `write`, `input` and `describe` go.
    io: Box<dyn SofIo>,
    /// Registered host functions.
    natives: Arc<NativeRegistry>,
    /// Import resolution and parse cache.
    modules: ModuleRegistry,
    /// The file whose code is currently executing; imports resolve relative
    /// to it.
    file: Arc<SofFile>,
    /// Global tables of modules that already ran, keyed by resolved file
    /// name. A module's top level executes at most once per interpreter.
    loaded: HashMap<String, TableRef>,
    /// Raw source fed through [`Interpreter::set_code`] and
    /// [`Interpreter::append_line`], for diagnostics.
    source: String,
    /// Tokenizer over the cleaned accumulated source.
    tokenizer: Tokenizer,
    /// Parsed top-level nodes not yet executed, oldest first, each paired
    /// with the file it was parsed from.
    pending: VecDeque<(Arc<SofFile>, Node)>,
}

impl Interpreter {
    /// Creates an interpreter with an empty stack and the standard native
    /// library.
    pub fn new(io: Box<dyn SofIo>) -> Self {
        Self::with_natives(io, default_registry())
    }

    /// Creates an interpreter with a custom native registry.
    pub fn with_natives(io: Box<dyn SofIo>, natives: Arc<NativeRegistry>) -> Self {
        Self {
            stack: Stack::new(Nametable::shared(TableKind::Plain)),
            io,
            natives,
            modules: ModuleRegistry::new(),
            file: Arc::new(SofFile::new("<empty>", "")),
            loaded: HashMap::new(),
            source: String::new(),
            tokenizer: Tokenizer::new(String::new()),
            pending: VecDeque::new(),
        }
    }

    /// Runs a parsed file's top level on this interpreter's stack.
    pub fn run(&mut self, file: &Arc<SofFile>) -> Result<()> {
        self.enqueue_file(file)?;
        self.run_pending()
    }

    /// Queues every top-level node of a parsed file as an execution step.
    pub fn enqueue_file(&mut self, file: &Arc<SofFile>) -> Result<()> {
        let ast = file
            .ast()
            .ok_or_else(|| SofError::module(format!("`{}` has not been parsed", file.name())))?;
        for child in ast.children() {
            self.pending.push_back((file.clone(), child.clone()));
        }
        Ok(())
    }

    /// Replaces the queued program with `source`.
    ///
    /// The stack, all definitions and loaded modules stay in place; only the
    /// not-yet-executed steps of the previous program are dropped. Use
    /// [`Interpreter::reset`] for a full wipe.
    pub fn set_code(&mut self, source: &str) -> Result<()> {
        self.pending.clear();
        self.source.clear();
        self.tokenizer = Tokenizer::new(String::new());
        self.append_line(source)
    }

    /// Appends more source to the queued program.
    ///
    /// The new text is cleaned, parsed and its top-level nodes queued behind
    /// any steps already waiting. Spans of the new nodes index the full
    /// accumulated source, so diagnostics can render against it.
    pub fn append_line(&mut self, line: &str) -> Result<()> {
        let cleaned = crate::preprocess::clean(line)?;
        if !self.source.is_empty() {
            self.source.push('\n');
            self.tokenizer.append("\n");
        }
        self.source.push_str(line);
        self.tokenizer.append(&cleaned);

        let file = Arc::new(SofFile::new("<repl>", self.source.clone()));
        let ast = match crate::parse::parse(&file, &mut self.tokenizer) {
            Ok(ast) => ast,
            Err(err) => {
                // Drop the rest of the failed fragment so its leftover
                // tokens cannot leak into the next one.
                while self.tokenizer.next_token().is_some() {}
                return Err(err);
            }
        };
        file.set_ast(Arc::new(ast));
        self.enqueue_file(&file)
    }

    /// Is a queued step waiting to run?
    pub fn can_execute(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Runs exactly one queued top-level node. Does nothing when the queue
    /// is empty.
    ///
    /// A faulting step drops the rest of its queued program.
    pub fn execute_once(&mut self) -> Result<()> {
        let Some((file, node)) = self.pending.pop_front() else {
            return Ok(());
        };
        self.file = file;
        match self.exec_node(&node) {
            Ok(_) => Ok(()),
            Err(err) => {
                self.pending.clear();
                Err(err)
            }
        }
    }

    /// Runs queued steps until none are left.
    pub fn run_pending(&mut self) -> Result<()> {
        while self.can_execute() {
            self.execute_once()?;
        }
        Ok(())
    }

    /// Discards the stack, every definition, loaded modules and all queued
    /// steps, returning the interpreter to its freshly-created state.
    pub fn reset(&mut self) {
        self.stack = Stack::new(Nametable::shared(TableKind::Plain));
        self.loaded.clear();
        self.file = Arc::new(SofFile::new("<empty>", ""));
        self.source.clear();
        self.tokenizer = Tokenizer::new(String::new());
        self.pending.clear();
    }

    /// The accumulated source behind the queued program, for diagnostics.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The stack, for inspection after a run.
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Runs every node of a token list, in order.
    fn exec_list(&mut self, node: &Node) -> Result<Flow> {
        for child in node.children() {
            if let Flow::Return = self.exec_node(child)? {
                return Ok(Flow::Return);
            }
        }
        Ok(Flow::Normal)
    }

    /// Runs one node.
    fn exec_node(&mut self, node: &Node) -> Result<Flow> {
        match node {
            Node::Literal(value, _) => {
                self.stack.push(value.clone());
                Ok(Flow::Normal)
            }
            Node::List(..) => self.exec_list(node),
            Node::PrimOp(op, span) => self
                .exec_op(*op, *span)
                .map_err(|err| err.with_span(*span)),
        }
    }

    /// Runs one primitive operation.
    fn exec_op(&mut self, op: PrimOp, span: Span) -> Result<Flow> {
        use PrimOp::*;
        match op {
            Add => self.binary(ops::add)?,
            Sub => self.binary(ops::subtract)?,
            Mul => self.binary(ops::multiply)?,
            Div => self.binary(ops::divide)?,
            Mod => self.binary(ops::modulus)?,
            Less => self.binary(ops::less)?,
            Greater => self.binary(ops::greater)?,
            LessEq => self.binary(ops::less_eq)?,
            GreaterEq => self.binary(ops::greater_eq)?,
            Equal => {
                let rhs = self.stack.pop()?;
                let lhs = self.stack.pop()?;
                self.stack.push(Value::BoolV(lhs.equals(&rhs)));
            }
            NotEqual => {
                let rhs = self.stack.pop()?;
                let lhs = self.stack.pop()?;
                self.stack.push(Value::BoolV(!lhs.equals(&rhs)));
            }
            And => {
                let rhs = self.stack.pop()?;
                let lhs = self.stack.pop()?;
                self.stack.push(ops::and(lhs, rhs));
            }
            Or => {
                let rhs = self.stack.pop()?;
                let lhs = self.stack.pop()?;
                self.stack.push(ops::or(lhs, rhs));
            }
            Xor => {
                let rhs = self.stack.pop()?;
                let lhs = self.stack.pop()?;
                self.stack.push(ops::xor(&lhs, &rhs));
            }

            Dup => {
                let top = self.stack.peek()?;
                self.stack.push(top);
            }
            Pop => {
                self.stack.pop()?;
            }
            Swap => {
                let top = self.stack.pop()?;
                let below = match self.stack.pop() {
                    Ok(below) => below,
                    Err(err) => {
                        self.stack.push(top);
                        return Err(err);
                    }
                };
                self.stack.push(top);
                self.stack.push(below);
            }

            Def => {
                let name = self.pop_identifier("def")?;
                let value = self.stack.pop()?;
                self.stack.local_scope().borrow_mut().define(name, value);
            }
            GlobalDef => {
                let name = self.pop_identifier("globaldef")?;
                let value = self.stack.pop()?;
                self.stack.naming_scope().borrow_mut().define(name, value);
            }

            If => {
                let body = self.stack.pop()?;
                let condition = self.stack.pop()?;
                if condition.truth() {
                    return self.call_value(body, span);
                }
            }
            IfElse => {
                let else_body = self.stack.pop()?;
                let then_body = self.stack.pop()?;
                let condition = self.stack.pop()?;
                let chosen = if condition.truth() { then_body } else { else_body };
                return self.call_value(chosen, span);
            }
            While => {
                let body = self.stack.pop()?;
                let condition = self.stack.pop()?;
                loop {
                    if let Flow::Return = self.call_value(condition.clone(), span)? {
                        return Ok(Flow::Return);
                    }
                    if self.stack.pop()?.is_false() {
                        break;
                    }
                    if let Flow::Return = self.call_value(body.clone(), span)? {
                        return Ok(Flow::Return);
                    }
                }
            }
            Switch => return self.exec_switch(span),

            Call => {
                let value = self.stack.pop()?;
                return self.call_value(value, span);
            }
            DoubleCall => {
                let value = self.stack.pop()?;
                if let Flow::Return = self.call_value(value, span)? {
                    return Ok(Flow::Return);
                }
                let value = self.stack.pop()?;
                return self.call_value(value, span);
            }
            Field => {
                let name = self.pop_identifier(",")?;
                let attributes = match self.stack.pop()? {
                    Value::ObjectV(attributes) => attributes,
                    other => {
                        return Err(SofError::typing(format!(
                            "`,` expects an object, found {}",
                            other.type_name()
                        )))
                    }
                };
                let value = attributes.borrow().get(&name).ok_or_else(|| {
                    SofError::reference(format!("object has no attribute `{name}`"))
                })?;
                self.stack.push(value);
            }
            Method => {
                let name = self.pop_identifier(";")?;
                let attributes = match self.stack.pop()? {
                    Value::ObjectV(attributes) => attributes,
                    other => {
                        return Err(SofError::typing(format!(
                            "`;` expects an object, found {}",
                            other.type_name()
                        )))
                    }
                };
                let method = attributes.borrow().get(&name).ok_or_else(|| {
                    SofError::reference(format!("object has no attribute `{name}`"))
                })?;
                match method {
                    Value::FunV(fun) => self.invoke_method(fun, &[], attributes)?,
                    Value::CurriedV(curried) => self.invoke_method(
                        curried.function.clone(),
                        &curried.bound,
                        attributes,
                    )?,
                    other => {
                        return Err(SofError::typing(format!(
                            "attribute `{name}` is a {}, not a callable method",
                            other.type_name()
                        )))
                    }
                }
            }

            Function => {
                let fun = self.make_function(FunctionKind::Plain, "function")?;
                self.stack.push(Value::FunV(Rc::new(fun)));
            }
            Constructor => {
                let fun = self.make_function(FunctionKind::Constructor, "constructor")?;
                self.stack.push(Value::FunV(Rc::new(fun)));
            }

            Return => {
                let value = self.stack.pop()?;
                let (_, frame) = self.require_frame()?;
                frame.borrow_mut().set_return(Some(value));
                return Ok(Flow::Return);
            }
            ReturnNothing => {
                let (_, frame) = self.require_frame()?;
                frame.borrow_mut().set_return(None);
                return Ok(Flow::Return);
            }

            CurryPipe => self.stack.push(Value::MarkerV(Marker::CurryPipe)),
            Curry => self.exec_curry()?,

            Write => {
                let value = self.stack.pop()?;
                self.io.print(&value.display_string());
            }
            WriteLn => {
                let value = self.stack.pop()?;
                self.io.println(&value.display_string());
            }
            Input => {
                let token = self.io.next_token().unwrap_or_default();
                self.stack.push(Value::StrV(token.into()));
            }
            InputLn => {
                let line = self.io.next_line().unwrap_or_default();
                self.stack.push(Value::StrV(line.into()));
            }
            Describe => {
                let value = self.stack.pop()?;
                self.io.println(&value.debug_string());
            }
            DescribeS => {
                let text = self.stack.describe();
                self.io.debug(&text);
            }

            Assert => {
                let value = self.stack.pop()?;
                if value.is_false() {
                    return Err(SofError::assertion(format!(
                        "assertion failed on {}",
                        value.debug_string()
                    )));
                }
            }
            NativeCall => self.exec_nativecall()?,
            Use => self.exec_use()?,
        }
        Ok(Flow::Normal)
    }

    /// Pops both operands of a binary operator (right operand on top) and
    /// pushes the result.
    fn binary(&mut self, op: fn(&Value, &Value) -> Result<Value>) -> Result<()> {
        let rhs = self.stack.pop()?;
        let lhs = self.stack.pop()?;
        let result = op(&lhs, &rhs)?;
        self.stack.push(result);
        Ok(())
    }

    /// Pops a value that must be an identifier.
    fn pop_identifier(&mut self, op: &str) -> Result<Identifier> {
        match self.stack.pop()? {
            Value::IdentV(id) => Ok(id),
            other => Err(SofError::typing(format!(
                "`{op}` expects an identifier, found {}",
                other.type_name()
            ))),
        }
    }

    /// The nearest enclosing call delimiter, or a fault outside any function.
    fn require_frame(&self) -> Result<(usize, TableRef)> {
        self.stack
            .current_frame()
            .ok_or_else(|| SofError::stack_access("`return` outside of a function"))
    }

    /// Calls one value: identifiers dereference, code blocks run on the
    /// caller's stack, functions run the invocation protocol, and anything
    /// else pushes itself back.
    fn call_value(&mut self, value: Value, span: Span) -> Result<Flow> {
        match value {
            Value::IdentV(id) => {
                let resolved = self.resolve(&id).map_err(|err| err.with_span(span))?;
                self.stack.push(resolved);
                Ok(Flow::Normal)
            }
            Value::BlockV(block) => self.run_block(&block),
            Value::FunV(fun) => {
                self.invoke_function(fun, &[])?;
                Ok(Flow::Normal)
            }
            Value::CurriedV(curried) => {
                self.invoke_function(curried.function.clone(), &curried.bound)?;
                Ok(Flow::Normal)
            }
            other => {
                self.stack.push(other);
                Ok(Flow::Normal)
            }
        }
    }

    /// Resolves an identifier against the scope chain, walking `:`-separated
    /// segments through namespaces and objects.
    fn resolve(&self, id: &Identifier) -> Result<Value> {
        let mut segments = id.segments();
        let first = segments.next().unwrap_or_default();
        let first_id = Identifier::new(first)?;
        let mut current = self.stack.lookup(&first_id).ok_or_else(|| {
            SofError::reference(format!("identifier `{first}` is not defined"))
        })?;
        for segment in segments {
            let segment_id = Identifier::new(segment)?;
            let table = match &current {
                Value::TableV(table) | Value::ObjectV(table) => table.clone(),
                other => {
                    return Err(SofError::typing(format!(
                        "cannot look up `{segment}` inside a {}",
                        other.type_name()
                    )))
                }
            };
            current = table.borrow().get(&segment_id).ok_or_else(|| {
                SofError::reference(format!(
                    "`{segment}` is not defined in this namespace"
                ))
            })?;
        }
        Ok(current)
    }

    /// Runs a code block's body on the current stack, with imports resolving
    /// relative to the block's own file.
    fn run_block(&mut self, block: &CodeBlock) -> Result<Flow> {
        let saved = std::mem::replace(&mut self.file, block.file.clone());
        let flow = self.exec_list(&block.ast);
        self.file = saved;
        flow
    }

    /// Pops an arity and a code block and builds a function value over the
    /// current global table.
    fn make_function(&mut self, kind: FunctionKind, op: &str) -> Result<crate::value::Function> {
        let arity = match self.stack.pop()? {
            Value::IntV(n) if n >= 0 => n as u64,
            other => {
                return Err(SofError::typing(format!(
                    "`{op}` expects a non-negative argument count, found {}",
                    other.debug_string()
                )))
            }
        };
        let block = match self.stack.pop()? {
            Value::BlockV(block) => block,
            other => {
                return Err(SofError::typing(format!(
                    "`{op}` expects a code block, found {}",
                    other.type_name()
                )))
            }
        };
        Ok(crate::value::Function {
            block,
            arity,
            kind,
            global: self.stack.global(),
        })
    }

    /// The function invocation protocol.
    ///
    /// Pops the residual arguments, pushes a call delimiter capturing the
    /// function's own global table, re-pushes the arguments above it in
    /// declaration order and runs the body. An explicit `return` value, or
    /// else the topmost value the body left in its frame, survives as the
    /// single result; a constructor instead always results in a fresh object
    /// made of the frame's definitions.
    fn invoke_function(&mut self, fun: Rc<crate::value::Function>, bound: &[Value]) -> Result<()> {
        let needed = (fun.arity as usize).saturating_sub(bound.len());
        let mut args = Vec::with_capacity(needed);
        for _ in 0..needed {
            args.push(self.stack.pop()?);
        }
        args.reverse();

        let delimiter = match fun.kind {
            FunctionKind::Plain => Rc::new(RefCell::new(Nametable::function_delimiter(
                fun.global.clone(),
            ))),
            FunctionKind::Constructor => Rc::new(RefCell::new(Nametable::method_delimiter(
                fun.global.clone(),
            ))),
        };
        let frame = self.stack.push_table_frame(delimiter.clone());
        for arg in bound.iter().cloned().chain(args) {
            self.stack.push(arg);
        }

        let flow = match self.run_block(&fun.block) {
            Ok(flow) => flow,
            Err(err) => {
                self.stack.drop_frame(frame);
                return Err(err);
            }
        };
        let result = match (fun.kind, flow) {
            (FunctionKind::Constructor, _) => {
                // A constructor's frame table *is* the new object; a stray
                // return value must not linger in it.
                let _ = delimiter.borrow_mut().take_return();
                Some(Value::ObjectV(delimiter.clone()))
            }
            (FunctionKind::Plain, Flow::Return) => delimiter.borrow_mut().take_return(),
            (FunctionKind::Plain, Flow::Normal) => self.stack.frame_result(frame),
        };
        self.stack.drop_frame(frame);
        if let Some(value) = result {
            self.stack.push(value);
        }
        Ok(())
    }

    /// The method invocation protocol: like a function call, except the
    /// receiver's own attribute table is the call delimiter, so the body
    /// reads and writes the object's attributes directly.
    fn invoke_method(
        &mut self,
        fun: Rc<crate::value::Function>,
        bound: &[Value],
        receiver: TableRef,
    ) -> Result<()> {
        let needed = (fun.arity as usize).saturating_sub(bound.len());
        let mut args = Vec::with_capacity(needed);
        for _ in 0..needed {
            args.push(self.stack.pop()?);
        }
        args.reverse();

        let frame = self.stack.push_table_frame(receiver.clone());
        for arg in bound.iter().cloned().chain(args) {
            self.stack.push(arg);
        }

        let flow = match self.run_block(&fun.block) {
            Ok(flow) => flow,
            Err(err) => {
                self.stack.drop_frame(frame);
                return Err(err);
            }
        };
        let result = match flow {
            Flow::Return => receiver.borrow_mut().take_return(),
            Flow::Normal => self.stack.frame_result(frame),
        };
        self.stack.drop_frame(frame);
        if let Some(value) = result {
            self.stack.push(value);
        }
        Ok(())
    }

    /// `switch`: pops the default handler, then (body, condition) pairs for
    /// as long as the top of the stack is a code block. Conditions are tried
    /// in the order the pairs were written; the first truthy one selects its
    /// body, and the default runs when none matches.
    fn exec_switch(&mut self, span: Span) -> Result<Flow> {
        let default = self.stack.pop()?;
        let mut pairs = vec![];
        while matches!(self.stack.top(), Some(Value::BlockV(_))) {
            let condition = self.stack.pop()?;
            let body = self.stack.pop()?;
            pairs.push((body, condition));
        }
        // Popping reversed the pairs; walk them back in written order.
        for (body, condition) in pairs.into_iter().rev() {
            if let Flow::Return = self.call_value(condition, span)? {
                return Ok(Flow::Return);
            }
            if self.stack.pop()?.truth() {
                return self.call_value(body, span);
            }
        }
        self.call_value(default, span)
    }

    /// `curry`: pops a function, then argument values down to the `|`
    /// marker, and builds a function with those arguments pre-bound.
    fn exec_curry(&mut self) -> Result<()> {
        let (function, mut bound) = match self.stack.pop()? {
            Value::FunV(fun) => (fun, vec![]),
            Value::CurriedV(curried) => (curried.function.clone(), curried.bound.clone()),
            other => {
                return Err(SofError::typing(format!(
                    "`curry` expects a function, found {}",
                    other.type_name()
                )))
            }
        };
        let mut collected = vec![];
        loop {
            let value = self.stack.pop().map_err(|err| {
                err.with_note("`curry` collects arguments down to a `|` marker")
            })?;
            match value {
                Value::MarkerV(Marker::CurryPipe) => break,
                value => collected.push(value),
            }
        }
        collected.reverse();
        bound.extend(collected);
        if bound.len() as u64 > function.arity {
            return Err(SofError::typing(format!(
                "cannot bind {} arguments to a function of {}",
                bound.len(),
                function.arity
            )));
        }
        self.stack
            .push(Value::CurriedV(Rc::new(CurriedFunction { function, bound })));
        Ok(())
    }

    /// `nativecall`: pops a descriptor string, then the declared number of
    /// arguments, and invokes the registered host function.
    fn exec_nativecall(&mut self) -> Result<()> {
        let descriptor = match self.stack.pop()? {
            Value::StrV(s) => s.to_string(),
            other => {
                return Err(SofError::typing(format!(
                    "`nativecall` expects a descriptor string, found {}",
                    other.type_name()
                )))
            }
        };
        let natives = self.natives.clone();
        let native = natives.get(&descriptor).ok_or_else(|| {
            SofError::native(format!(
                "no native function is registered under `{descriptor}`"
            ))
        })?;
        let mut args = Vec::with_capacity(native.arity);
        for _ in 0..native.arity {
            args.push(self.stack.pop()?);
        }
        args.reverse();
        if let Some(result) = native.invoke(&args)? {
            self.stack.push(result);
        }
        Ok(())
    }

    /// `use`: pops a module specifier, runs the module's top level once under
    /// its own global table, and binds that table as a namespace under the
    /// specifier's last segment.
    fn exec_use(&mut self) -> Result<()> {
        let specifier = match self.stack.pop()? {
            Value::IdentV(id) => id.name().to_string(),
            Value::StrV(s) => s.to_string(),
            other => {
                return Err(SofError::typing(format!(
                    "`use` expects a module name, found {}",
                    other.type_name()
                )))
            }
        };
        let requesting = match self.file.name() {
            // Strings and the REPL have no directory to resolve against.
            name if name.starts_with('<') => None,
            name => Some(PathBuf::from(name)),
        };
        let module = self
            .modules
            .get_module(requesting.as_deref(), &specifier)?;

        let key = module.name().to_string();
        let global = match self.loaded.get(&key) {
            Some(global) => global.clone(),
            None => {
                let global = Nametable::shared(TableKind::Plain);
                // Registered before running, so an import cycle terminates.
                self.loaded.insert(key, global.clone());
                let ast = module.ast().ok_or_else(|| {
                    SofError::module(format!("`{specifier}` has not been parsed"))
                })?;
                let saved_stack =
                    std::mem::replace(&mut self.stack, Stack::new(global.clone()));
                let saved_file = std::mem::replace(&mut self.file, module.clone());
                let outcome = self.exec_list(&ast);
                self.stack = saved_stack;
                self.file = saved_file;
                outcome
                    .map_err(|err| err.with_note(format!("while running module `{specifier}`")))?;
                global
            }
        };

        let binding = specifier
            .trim_start_matches('.')
            .rsplit(':')
            .next()
            .unwrap_or_default();
        let binding = Identifier::new(binding)
            .map_err(|_| SofError::module(format!("`{specifier}` is not a valid module name")))?;
        self.stack
            .local_scope()
            .borrow_mut()
            .define(binding, Value::TableV(global));
        Ok(())
    }
}
