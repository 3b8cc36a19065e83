//! # Quoting Policy
//!
//! Turns a raw wire string into a literal of its declared primitive type.
//!
//! Unquoted literals are read as numbers or booleans by the document
//! parsers downstream, so only those types go through unquoted. Every other
//! type is wrapped in double quotes, with its interior escaped.
//!
//! ## Invariants
//!
//! - A quoted literal decodes back to exactly the wire value. Backslashes
//!   are always escaped, so `C:\new` never reaches the validator as a
//!   newline.
//! - A value that is already fully quoted is re-quoted once: its outer
//!   quotes are dropped and its interior is escaped.
//! - Unquoted literals lose insignificant leading zeros (`007` → `7`), since
//!   strict JSON rejects `0123` as a malformed number.

use std::borrow::Cow;

use crate::shape::PrimitiveType;

/// Whether a raw value of this type must be quoted to be read as a literal.
pub fn needs_quotes(primitive: PrimitiveType) -> bool {
    !matches!(
        primitive,
        PrimitiveType::Integer | PrimitiveType::Number | PrimitiveType::Boolean | PrimitiveType::Nil
    )
}

/// Encode a raw value as a literal of `primitive`. An absent value is `null`.
pub fn preprocess(raw: Option<&str>, primitive: PrimitiveType) -> String {
    match raw {
        None => "null".to_string(),
        Some(value) => encode_literal(value, needs_quotes(primitive)),
    }
}

/// Encode a present raw value, quoted or not.
///
/// A value starting with `*` is always quoted: unquoted it reads as a YAML
/// alias.
pub fn encode_literal(value: &str, quoted: bool) -> String {
    if quoted || value.starts_with('*') {
        quote(value)
    } else {
        strip_leading_zeros(value).into_owned()
    }
}

/// Wrap a value in double quotes, escaping its interior.
///
/// A value that is already fully quoted keeps a single pair of quotes.
pub fn quote(value: &str) -> String {
    let interior = if is_fully_quoted(value) {
        &value[1..value.len() - 1]
    } else {
        value
    };
    let mut out = String::with_capacity(interior.len() + 2);
    out.push('"');
    escape_into(&mut out, interior);
    out.push('"');
    out
}

fn is_fully_quoted(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('"') && value.ends_with('"')
}

fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
}

/// Drop insignificant leading zeros from a numeric-looking literal.
///
/// Keeps one zero before a non-digit (`00.5` → `0.5`) and at least one
/// digit overall (`000` → `0`). A leading `-` is preserved.
pub fn strip_leading_zeros(value: &str) -> Cow<'_, str> {
    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", value),
    };
    let trimmed = digits.trim_start_matches('0');
    let zeros = digits.len() - trimmed.len();
    let next_is_digit = trimmed.starts_with(|c: char| c.is_ascii_digit());

    if zeros == 0 || (zeros == 1 && !next_is_digit) {
        Cow::Borrowed(value)
    } else if next_is_digit {
        Cow::Owned(format!("{sign}{trimmed}"))
    } else {
        Cow::Owned(format!("{sign}0{trimmed}"))
    }
}
