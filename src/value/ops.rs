//! Binary operators over values.
//!
//! Each operator is a pure function over the tagged union, dispatching on the
//! pair of variant tags. Arithmetic follows the numeric widening rule: an
//! integer operand mixed with a float operand is promoted to float;
//! integer/integer stays integer. All errors raised here are *incomplete*
//! (position-less); the engine completes them at the dispatch boundary.

use std::cmp::Ordering;

use crate::errors::{Result, SofError};

use super::Value::{self, *};

/// Builds the type error for applying `op` to `lhs` and `rhs`.
fn type_error(op: &str, lhs: &Value, rhs: &Value) -> SofError {
    SofError::typing(format!(
        "cannot apply `{op}` to operands of type {} and {}",
        lhs.type_name(),
        rhs.type_name()
    ))
}

/// Addition.
pub fn add(lhs: &Value, rhs: &Value) -> Result<Value> {
    match (lhs, rhs) {
        // Exact zero fast paths.
        (IntV(0), IntV(y)) => Ok(IntV(*y)),
        (IntV(x), IntV(0)) => Ok(IntV(*x)),
        (IntV(x), IntV(y)) => Ok(IntV(x.wrapping_add(*y))),
        (FloatV(x), FloatV(y)) => Ok(FloatV(x + y)),
        (IntV(x), FloatV(y)) => Ok(FloatV(*x as f64 + y)),
        (FloatV(x), IntV(y)) => Ok(FloatV(x + *y as f64)),
        (StrV(x), StrV(y)) => Ok(StrV(format!("{}{}", &**x, &**y).into())),
        _ => Err(type_error("+", lhs, rhs)),
    }
}

/// Subtraction.
pub fn subtract(lhs: &Value, rhs: &Value) -> Result<Value> {
    match (lhs, rhs) {
        (IntV(x), IntV(0)) => Ok(IntV(*x)),
        (IntV(x), IntV(y)) => Ok(IntV(x.wrapping_sub(*y))),
        (FloatV(x), FloatV(y)) => Ok(FloatV(x - y)),
        (IntV(x), FloatV(y)) => Ok(FloatV(*x as f64 - y)),
        (FloatV(x), IntV(y)) => Ok(FloatV(x - *y as f64)),
        _ => Err(type_error("-", lhs, rhs)),
    }
}

/// Multiplication.
pub fn multiply(lhs: &Value, rhs: &Value) -> Result<Value> {
    match (lhs, rhs) {
        // Exact one fast paths.
        (IntV(1), IntV(y)) => Ok(IntV(*y)),
        (IntV(x), IntV(1)) => Ok(IntV(*x)),
        (IntV(x), IntV(y)) => Ok(IntV(x.wrapping_mul(*y))),
        (FloatV(x), FloatV(y)) => Ok(FloatV(x * y)),
        (IntV(x), FloatV(y)) => Ok(FloatV(*x as f64 * y)),
        (FloatV(x), IntV(y)) => Ok(FloatV(x * *y as f64)),
        _ => Err(type_error("*", lhs, rhs)),
    }
}

/// Division.
///
/// Integer division by zero is an `ArithmeticError`, never a crash. Float
/// division follows IEEE semantics.
pub fn divide(lhs: &Value, rhs: &Value) -> Result<Value> {
    match (lhs, rhs) {
        (IntV(_), IntV(0)) => Err(SofError::arithmetic("division by zero")),
        (IntV(x), IntV(y)) => Ok(IntV(x.wrapping_div(*y))),
        (FloatV(x), FloatV(y)) => Ok(FloatV(x / y)),
        (IntV(x), FloatV(y)) => Ok(FloatV(*x as f64 / y)),
        (FloatV(x), IntV(y)) => Ok(FloatV(x / *y as f64)),
        _ => Err(type_error("/", lhs, rhs)),
    }
}

/// Modulus.
pub fn modulus(lhs: &Value, rhs: &Value) -> Result<Value> {
    match (lhs, rhs) {
        (IntV(_), IntV(0)) => Err(SofError::arithmetic("modulus by zero")),
        (IntV(x), IntV(y)) => Ok(IntV(x.wrapping_rem(*y))),
        (FloatV(x), FloatV(y)) => Ok(FloatV(x % y)),
        (IntV(x), FloatV(y)) => Ok(FloatV(*x as f64 % y)),
        (FloatV(x), IntV(y)) => Ok(FloatV(x % *y as f64)),
        _ => Err(type_error("%", lhs, rhs)),
    }
}

/// Total order between two values of comparable types.
///
/// Numbers compare by magnitude (with integer/float promotion), strings
/// lexicographically. Any other pairing is a `TypeError`.
pub fn compare(lhs: &Value, rhs: &Value) -> Result<Ordering> {
    match (lhs, rhs) {
        (IntV(x), IntV(y)) => Ok(x.cmp(y)),
        (FloatV(x), FloatV(y)) => x
            .partial_cmp(y)
            .ok_or_else(|| SofError::typing("cannot order NaN")),
        (IntV(x), FloatV(y)) => (*x as f64)
            .partial_cmp(y)
            .ok_or_else(|| SofError::typing("cannot order NaN")),
        (FloatV(x), IntV(y)) => x
            .partial_cmp(&(*y as f64))
            .ok_or_else(|| SofError::typing("cannot order NaN")),
        (StrV(x), StrV(y)) => Ok((**x).cmp(&**y)),
        _ => Err(type_error("comparison", lhs, rhs)),
    }
}

/// `<`
pub fn less(lhs: &Value, rhs: &Value) -> Result<Value> {
    Ok(BoolV(compare(lhs, rhs)? == Ordering::Less))
}

/// `>`
pub fn greater(lhs: &Value, rhs: &Value) -> Result<Value> {
    Ok(BoolV(compare(lhs, rhs)? == Ordering::Greater))
}

/// `<=`
pub fn less_eq(lhs: &Value, rhs: &Value) -> Result<Value> {
    Ok(BoolV(compare(lhs, rhs)? != Ordering::Greater))
}

/// `>=`
pub fn greater_eq(lhs: &Value, rhs: &Value) -> Result<Value> {
    Ok(BoolV(compare(lhs, rhs)? != Ordering::Less))
}

/// Logical `and`: returns one of the original operands, so that truthy
/// chaining keeps the actual values.
pub fn and(lhs: Value, rhs: Value) -> Value {
    if lhs.is_false() {
        lhs
    } else {
        rhs
    }
}

/// Logical `or`: returns one of the original operands.
pub fn or(lhs: Value, rhs: Value) -> Value {
    if lhs.truth() {
        lhs
    } else {
        rhs
    }
}

/// Logical `xor`: a genuine boolean from truthiness inequality.
pub fn xor(lhs: &Value, rhs: &Value) -> Value {
    BoolV(lhs.truth() != rhs.truth())
}
