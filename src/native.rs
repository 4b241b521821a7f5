//! The native (host) function registry.
//!
//! Host functions are exposed to SOF programs through an explicit
//! registration table built at startup: a mapping from a descriptor string
//! `"<namespace>.<collection>#<name>(<ArgType1>,...)"` to a plain function
//! pointer over values. The `nativecall` primitive looks descriptors up here;
//! the table is read-only after startup and shared behind an `Arc`, so
//! concurrent module interpreters can resolve natives without locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{Result, SofError};
use crate::value::{Str, Value};

/// A host function over SOF values.
///
/// Receives exactly the declared number of arguments, in declaration order,
/// and optionally produces one value to push.
pub type NativeFn = fn(&[Value]) -> Result<Option<Value>>;

/// One registered native function.
pub struct NativeFunction {
    /// The full descriptor this function is registered under.
    pub descriptor: String,
    /// Number of arguments, derived from the descriptor's argument list.
    pub arity: usize,
    /// The host implementation.
    fun: NativeFn,
}

impl NativeFunction {
    /// Invokes the host implementation.
    ///
    /// Any fault coming out of the host function is escalated to a
    /// `NativeError`, keeping the original message as a note.
    pub fn invoke(&self, args: &[Value]) -> Result<Option<Value>> {
        debug_assert_eq!(args.len(), self.arity);
        (self.fun)(args).map_err(|err| {
            SofError::native(format!("native function `{}` failed", self.descriptor))
                .with_note(err.to_string())
        })
    }
}

/// Registry of all native functions, keyed by descriptor.
pub struct NativeRegistry {
    /// The registration table.
    functions: HashMap<String, NativeFunction>,
}

impl NativeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Registers `fun` under `descriptor`.
    ///
    /// # Errors
    /// Fails with a `NativeError` if the descriptor is malformed.
    pub fn register(&mut self, descriptor: &str, fun: NativeFn) -> Result<()> {
        let arity = descriptor_arity(descriptor)?;
        self.functions.insert(
            descriptor.to_string(),
            NativeFunction {
                descriptor: descriptor.to_string(),
                arity,
                fun,
            },
        );
        Ok(())
    }

    /// Looks up a native function by descriptor.
    pub fn get(&self, descriptor: &str) -> Option<&NativeFunction> {
        self.functions.get(descriptor)
    }
}

impl Default for NativeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives the arity from a descriptor's argument list.
fn descriptor_arity(descriptor: &str) -> Result<usize> {
    let malformed = || {
        SofError::native(format!(
            "`{descriptor}` is not a valid native function descriptor"
        ))
    };
    let (path, args) = descriptor.split_once('(').ok_or_else(malformed)?;
    let args = args.strip_suffix(')').ok_or_else(malformed)?;
    let (namespace, name) = path.split_once('#').ok_or_else(malformed)?;
    if namespace.is_empty() || name.is_empty() {
        return Err(malformed());
    }
    if args.is_empty() {
        Ok(0)
    } else if args.split(',').any(str::is_empty) {
        Err(malformed())
    } else {
        Ok(args.split(',').count())
    }
}

/// The standard native library, registered at startup.
pub fn default_registry() -> Arc<NativeRegistry> {
    let mut registry = NativeRegistry::new();
    let builtins: &[(&str, NativeFn)] = &[
        ("sof.lib.MathLib#sqrt(Float)", math_sqrt),
        ("sof.lib.MathLib#abs(Integer)", math_abs),
        ("sof.lib.MathLib#pow(Float,Float)", math_pow),
        ("sof.lib.StringLib#length(String)", string_length),
        ("sof.lib.StringLib#upper(String)", string_upper),
        ("sof.lib.StringLib#lower(String)", string_lower),
        ("sof.lib.ListLib#new()", list_new),
        ("sof.lib.ListLib#push(List,Any)", list_push),
        ("sof.lib.ListLib#get(List,Integer)", list_get),
        ("sof.lib.ListLib#length(List)", list_length),
    ];
    for (descriptor, fun) in builtins {
        registry
            .register(descriptor, *fun)
            .unwrap_or_else(|_| panic!("builtin descriptor `{descriptor}` is malformed"));
    }
    Arc::new(registry)
}

/// Numeric argument as a float, promoting integers.
fn as_float(value: &Value) -> Result<f64> {
    match value {
        Value::FloatV(f) => Ok(*f),
        Value::IntV(i) => Ok(*i as f64),
        other => Err(SofError::typing(format!(
            "expected a number, found {}",
            other.type_name()
        ))),
    }
}

fn math_sqrt(args: &[Value]) -> Result<Option<Value>> {
    Ok(Some(Value::FloatV(as_float(&args[0])?.sqrt())))
}

fn math_abs(args: &[Value]) -> Result<Option<Value>> {
    match &args[0] {
        Value::IntV(i) => Ok(Some(Value::IntV(i.wrapping_abs()))),
        Value::FloatV(f) => Ok(Some(Value::FloatV(f.abs()))),
        other => Err(SofError::typing(format!(
            "expected a number, found {}",
            other.type_name()
        ))),
    }
}

fn math_pow(args: &[Value]) -> Result<Option<Value>> {
    Ok(Some(Value::FloatV(
        as_float(&args[0])?.powf(as_float(&args[1])?),
    )))
}

fn string_arg(value: &Value) -> Result<&Str> {
    match value {
        Value::StrV(s) => Ok(s),
        other => Err(SofError::typing(format!(
            "expected a String, found {}",
            other.type_name()
        ))),
    }
}

fn string_length(args: &[Value]) -> Result<Option<Value>> {
    Ok(Some(Value::IntV(string_arg(&args[0])?.char_len() as i64)))
}

fn string_upper(args: &[Value]) -> Result<Option<Value>> {
    Ok(Some(Value::StrV(string_arg(&args[0])?.to_uppercase().into())))
}

fn string_lower(args: &[Value]) -> Result<Option<Value>> {
    Ok(Some(Value::StrV(string_arg(&args[0])?.to_lowercase().into())))
}

fn list_arg(value: &Value) -> Result<&std::rc::Rc<std::cell::RefCell<Vec<Value>>>> {
    match value {
        Value::ListV(items) => Ok(items),
        other => Err(SofError::typing(format!(
            "expected a List, found {}",
            other.type_name()
        ))),
    }
}

fn list_new(_args: &[Value]) -> Result<Option<Value>> {
    Ok(Some(Value::ListV(Default::default())))
}

fn list_push(args: &[Value]) -> Result<Option<Value>> {
    list_arg(&args[0])?.borrow_mut().push(args[1].clone());
    Ok(None)
}

fn list_get(args: &[Value]) -> Result<Option<Value>> {
    let items = list_arg(&args[0])?.borrow();
    let index = match &args[1] {
        Value::IntV(i) if *i >= 0 => *i as usize,
        other => {
            return Err(SofError::typing(format!(
                "expected a non-negative index, found {}",
                other.debug_string()
            )))
        }
    };
    items.get(index).cloned().map(Some).ok_or_else(|| {
        SofError::native(format!(
            "index {index} is out of bounds for a list of {}",
            items.len()
        ))
    })
}

fn list_length(args: &[Value]) -> Result<Option<Value>> {
    Ok(Some(Value::IntV(list_arg(&args[0])?.borrow().len() as i64)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn arity_comes_from_the_descriptor() {
        let registry = default_registry();
        assert_eq!(registry.get("sof.lib.ListLib#new()").unwrap().arity, 0);
        assert_eq!(registry.get("sof.lib.MathLib#sqrt(Float)").unwrap().arity, 1);
        assert_eq!(
            registry.get("sof.lib.MathLib#pow(Float,Float)").unwrap().arity,
            2
        );
    }

    #[test]
    fn malformed_descriptors_are_rejected() {
        let mut registry = NativeRegistry::new();
        for descriptor in ["no-parens", "a#b(", "a#b(,)", "#b()", "a()"] {
            assert!(registry.register(descriptor, list_new).is_err());
        }
    }

    #[test]
    fn invocation_faults_become_native_errors() {
        let registry = default_registry();
        let get = registry.get("sof.lib.ListLib#get(List,Integer)").unwrap();
        let list = Value::ListV(Default::default());
        let err = get.invoke(&[list, Value::IntV(3)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Native);
    }

    #[test]
    fn sqrt_and_length() {
        let registry = default_registry();
        let sqrt = registry.get("sof.lib.MathLib#sqrt(Float)").unwrap();
        let res = sqrt.invoke(&[Value::FloatV(9.0)]).unwrap().unwrap();
        assert!(res.equals(&Value::FloatV(3.0)));

        let length = registry.get("sof.lib.StringLib#length(String)").unwrap();
        let res = length
            .invoke(&[Value::StrV("héllo".into())])
            .unwrap()
            .unwrap();
        assert!(res.equals(&Value::IntV(5)));
    }
}
