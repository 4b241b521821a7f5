//! Literal grammars: integers with radix prefixes, floats, booleans and
//! string escape decoding.
//!
//! Numeric literals are decomposed and reconstructed arithmetically, digit by
//! digit, rather than delegated to the host float parser; the reconstruction
//! is part of the language's observable behavior on precision edge cases.

use crate::errors::{Result, SofError};
use crate::value::Str;

/// Tries the integer literal grammar on a token:
/// `[+-]?(0[bodhx])?<digits>`.
///
/// Returns `None` if the token is not integer-shaped at all (then the float
/// and other grammars get their turn), `Some(Err(_))` if it is
/// integer-shaped but malformed — an out-of-radix digit names the bad
/// character and the radix.
pub fn parse_integer(token: &str) -> Option<Result<i64>> {
    let (negative, rest) = strip_sign(token);
    let mut chars = rest.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    // A decimal point means this is float territory.
    if rest.contains('.') {
        return None;
    }

    let (radix, digits) = match rest.as_bytes() {
        [b'0', b'b', ..] => (2, &rest[2..]),
        [b'0', b'o', ..] => (8, &rest[2..]),
        [b'0', b'd', ..] => (10, &rest[2..]),
        [b'0', b'h', ..] | [b'0', b'x', ..] => (16, &rest[2..]),
        _ => (10, rest),
    };
    if digits.is_empty() {
        return Some(Err(SofError::syntax(format!(
            "integer literal `{token}` has no digits"
        ))));
    }

    let mut value: i64 = 0;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else {
            return Some(Err(SofError::syntax(format!(
                "`{c}` is not a valid digit in base {radix}"
            ))));
        };
        value = match value
            .checked_mul(radix as i64)
            .and_then(|v| v.checked_add(digit as i64))
        {
            Some(value) => value,
            None => {
                return Some(Err(SofError::syntax(format!(
                    "integer literal `{token}` is out of range"
                ))))
            }
        };
    }
    Some(Ok(if negative { -value } else { value }))
}

/// Tries the float literal grammar on a token:
/// `[+-]?[0-9]+\.[0-9]+([eE][+-][0-9]+)?`.
///
/// The value is rebuilt arithmetically from its sign, integer part,
/// fractional part and exponent.
pub fn parse_float(token: &str) -> Option<Result<f64>> {
    let (negative, rest) = strip_sign(token);
    let (int_part, after_point) = rest.split_once('.')?;
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let (frac_part, exponent) = match after_point.find(['e', 'E']) {
        Some(i) => (&after_point[..i], Some(&after_point[i + 1..])),
        None => (after_point, None),
    };
    if frac_part.is_empty() || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Some(Err(SofError::syntax(format!(
            "malformed float literal `{token}`"
        ))));
    }

    let mut value: f64 = 0.0;
    for c in int_part.chars() {
        value = value * 10.0 + f64::from(c.to_digit(10).unwrap());
    }
    let mut frac: f64 = 0.0;
    for c in frac_part.chars() {
        frac = frac * 10.0 + f64::from(c.to_digit(10).unwrap());
    }
    value += frac / 10f64.powi(frac_part.len() as i32);

    if let Some(exponent) = exponent {
        // The exponent sign is mandatory in the grammar.
        let (exp_negative, exp_digits) = match exponent.as_bytes() {
            [b'+', ..] => (false, &exponent[1..]),
            [b'-', ..] => (true, &exponent[1..]),
            _ => {
                return Some(Err(SofError::syntax(format!(
                    "malformed float literal `{token}`: exponent must be signed"
                ))))
            }
        };
        if exp_digits.is_empty() || !exp_digits.bytes().all(|b| b.is_ascii_digit()) {
            return Some(Err(SofError::syntax(format!(
                "malformed float literal `{token}`"
            ))));
        }
        let mut exp: i32 = 0;
        for c in exp_digits.chars() {
            exp = exp.saturating_mul(10).saturating_add(c.to_digit(10).unwrap() as i32);
        }
        value *= 10f64.powi(if exp_negative { -exp } else { exp });
    }

    Some(Ok(if negative { -value } else { value }))
}

/// Tries the boolean literal grammar on a token (case-insensitive).
pub fn parse_boolean(token: &str) -> Option<bool> {
    if token.eq_ignore_ascii_case("true") {
        Some(true)
    } else if token.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Decodes a quoted string-literal token into its value, resolving escape
/// sequences.
///
/// The recognized escapes are `\"`, `\\`, `\n`, `\t`, `\f` and `\uXXXX`
/// (exactly four hex digits).
pub fn decode_string(token: &str) -> Result<Str> {
    let inner = token
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .filter(|_| token.len() >= 2)
        .ok_or_else(|| SofError::syntax("unterminated string literal"))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let digits: String = chars.by_ref().take(4).collect();
                let code = (digits.len() == 4)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .ok_or_else(|| {
                        SofError::syntax(format!("`\\u{digits}` is not a valid unicode escape"))
                    })?;
                out.push(char::from_u32(code).ok_or_else(|| {
                    SofError::syntax(format!("`\\u{digits}` is not a valid unicode escape"))
                })?);
            }
            Some(other) => {
                return Err(SofError::syntax(format!("unknown escape sequence `\\{other}`")))
            }
            None => return Err(SofError::syntax("string literal ends in a lone backslash")),
        }
    }
    Ok(Str::new(out))
}

/// Splits an optional leading sign off a token.
fn strip_sign(token: &str) -> (bool, &str) {
    match token.as_bytes() {
        [b'-', ..] => (true, &token[1..]),
        [b'+', ..] => (false, &token[1..]),
        _ => (false, token),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decimal_integers() {
        assert_eq!(parse_integer("0").unwrap().unwrap(), 0);
        assert_eq!(parse_integer("42").unwrap().unwrap(), 42);
        assert_eq!(parse_integer("-42").unwrap().unwrap(), -42);
        assert_eq!(parse_integer("+7").unwrap().unwrap(), 7);
    }

    #[test]
    fn radix_prefixes() {
        assert_eq!(parse_integer("0b101").unwrap().unwrap(), 5);
        assert_eq!(parse_integer("0o17").unwrap().unwrap(), 15);
        assert_eq!(parse_integer("0d19").unwrap().unwrap(), 19);
        assert_eq!(parse_integer("0hff").unwrap().unwrap(), 255);
        assert_eq!(parse_integer("0xFF").unwrap().unwrap(), 255);
        assert_eq!(parse_integer("-0b11").unwrap().unwrap(), -3);
    }

    #[test]
    fn out_of_radix_digit_names_char_and_radix() {
        let err = parse_integer("0b102").unwrap().unwrap_err();
        assert!(err.message.contains('2'));
        assert!(err.message.contains("base 2"));
        let err = parse_integer("12a").unwrap().unwrap_err();
        assert!(err.message.contains('a'));
        assert!(err.message.contains("base 10"));
    }

    #[test]
    fn integer_roundtrip_in_every_radix() {
        // Printing a parsed literal and re-parsing it yields the same value.
        for literal in ["0", "42", "-42", "0b1010", "0o777", "0d123", "0hfe", "0x10"] {
            let parsed = parse_integer(literal).unwrap().unwrap();
            let reparsed = parse_integer(&parsed.to_string()).unwrap().unwrap();
            assert_eq!(parsed, reparsed);
        }
    }

    #[test]
    fn non_integer_shapes_are_skipped() {
        assert!(parse_integer("abc").is_none());
        assert!(parse_integer("1.5").is_none());
        assert!(parse_integer("-").is_none());
        assert!(parse_integer("").is_none());
    }

    #[test]
    fn simple_floats() {
        assert_eq!(parse_float("1.5").unwrap().unwrap(), 1.5);
        assert_eq!(parse_float("-0.25").unwrap().unwrap(), -0.25);
        assert_eq!(parse_float("10.0").unwrap().unwrap(), 10.0);
    }

    #[test]
    fn float_exponents_require_a_sign() {
        assert_eq!(parse_float("1.5e+3").unwrap().unwrap(), 1500.0);
        assert_eq!(parse_float("25.0e-2").unwrap().unwrap(), 0.25);
        assert!(parse_float("1.5e3").unwrap().is_err());
    }

    #[test]
    fn malformed_floats_error_rather_than_fall_through() {
        assert!(parse_float("1.").unwrap().is_err());
        assert!(parse_float("1.x").unwrap().is_err());
    }

    #[test]
    fn non_float_shapes_are_skipped() {
        assert!(parse_float("15").is_none());
        assert!(parse_float("x.5").is_none());
    }

    #[test]
    fn booleans_are_case_insensitive() {
        assert_eq!(parse_boolean("true"), Some(true));
        assert_eq!(parse_boolean("FALSE"), Some(false));
        assert_eq!(parse_boolean("True"), Some(true));
        assert_eq!(parse_boolean("truthy"), None);
    }

    #[test]
    fn string_escapes() {
        assert_eq!(&*decode_string(r#""a\nb""#).unwrap(), "a\nb");
        assert_eq!(&*decode_string(r#""say \"hi\"""#).unwrap(), "say \"hi\"");
        assert_eq!(&*decode_string(r#""tab\there""#).unwrap(), "tab\there");
        assert_eq!(&*decode_string(r#""A""#).unwrap(), "A");
        assert_eq!(&*decode_string(r#""back\\slash""#).unwrap(), "back\\slash");
    }

    #[test]
    fn bad_escapes_fail() {
        assert!(decode_string(r#""\q""#).is_err());
        assert!(decode_string(r#""\u00""#).is_err());
        assert!(decode_string(r#""abc"#).is_err());
    }
}
