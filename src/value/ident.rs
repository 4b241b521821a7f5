//! Identifiers: validated names for bindings.

use std::fmt;
use std::rc::Rc;

use crate::errors::{Result, SofError};

/// An identifier value.
///
/// Validated against the identifier grammar at construction: a Unicode
/// letter, then any run of letters, digits, `_`, `'` or `:`. Equality and
/// hashing are value-equality on the normalized (trimmed) name, never
/// reference identity.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    /// The normalized name.
    name: Rc<str>,
}

impl Identifier {
    /// Creates a new identifier, validating the name.
    ///
    /// # Errors
    /// Fails with a `SyntaxError` if the (trimmed) name does not match the
    /// identifier grammar.
    pub fn new(name: &str) -> Result<Self> {
        let name = name.trim();
        if !is_valid(name) {
            return Err(SofError::syntax(format!("`{name}` is not a valid identifier")));
        }
        Ok(Self { name: name.into() })
    }

    /// The name of this identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `:`-separated segments of this identifier.
    ///
    /// A plain identifier has exactly one segment; `a:b:c` names `c` inside
    /// namespace `b` inside namespace `a`.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.name.split(':')
    }
}

/// Does `name` match the identifier grammar?
fn is_valid(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '\'' | ':'))
        }
        _ => false,
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn valid_identifiers() {
        for name in ["x", "myVar", "x_1", "x'", "vec:push", "été", "a:b:c"] {
            assert!(Identifier::new(name).is_ok(), "`{name}` should be valid");
        }
    }

    #[test]
    fn invalid_identifiers() {
        for name in ["", "1x", "_x", "'x", ":x", "a b", "a-b"] {
            assert!(Identifier::new(name).is_err(), "`{name}` should be invalid");
        }
    }

    #[test]
    fn equality_is_on_trimmed_name() {
        let a = Identifier::new(" x ").unwrap();
        let b = Identifier::new("x").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn segments() {
        let id = Identifier::new("math:vec:norm").unwrap();
        let segments: Vec<_> = id.segments().collect();
        assert_eq!(segments, ["math", "vec", "norm"]);
    }
}
