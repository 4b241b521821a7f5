//! Defining the diagnostics error codes.

/// Malformed literal, token or unbalanced delimiter.
pub const SYNTAX_ERROR: &str = "E0001";
/// Operation applied to incompatible value variants.
pub const TYPE_ERROR: &str = "E0002";
/// Division or modulus by zero.
pub const ARITHMETIC_ERROR: &str = "E0003";
/// Unresolvable identifier.
pub const REFERENCE_ERROR: &str = "E0004";
/// Illegal stack manipulation across a nametable boundary.
pub const STACK_ACCESS_ERROR: &str = "E0005";
/// Pop or peek on an empty stack.
pub const STACK_UNDERFLOW_ERROR: &str = "E0006";
/// Unresolvable import.
pub const MODULE_ERROR: &str = "E0007";
/// Failed `assert`.
pub const ASSERTION_ERROR: &str = "E0008";
/// Host function invocation failure.
pub const NATIVE_ERROR: &str = "E0009";
