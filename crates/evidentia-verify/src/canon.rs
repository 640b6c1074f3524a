//! A from-scratch RFC 8785 (JCS) canonicalizer subset, operating over
//! this crate's own `json::Value` rather than `serde_json::Value`.
//!
//! This duplicates the canonicalization rules `evidentia-canon` gets
//! from `serde_jcs`, because a verifier that trusted the same crate the
//! ingestion authority trusts would not be independent of it. The
//! subset this module implements is documented in the top-level design
//! notes: exotic float formatting and true Unicode NFC normalization are
//! out of scope for a dependency-free implementation, so this
//! canonicalizer assumes payload strings arrive already NFC-normalized
//! (true at rest, since ingestion normalizes before it ever persists a
//! byte) and only re-derives key ordering, whitespace removal, and
//! integer-vs-fraction number formatting.

use crate::json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalError(pub String);

impl std::fmt::Display for CanonicalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for CanonicalError {}

/// Produce the canonical UTF-8 byte form of `value`: object keys sorted
/// ascending by UTF-16 code unit, no insignificant whitespace, numbers
/// rendered without a redundant fractional part.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>, CanonicalError> {
    let mut out = String::new();
    write_value(value, &mut out)?;
    Ok(out.into_bytes())
}

fn write_value(value: &Value, out: &mut String) -> Result<(), CanonicalError> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(text) => out.push_str(&canonical_number(text)?),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out)?;
            }
            out.push(']');
        }
        Value::Object(fields) => {
            let mut sorted: Vec<&(String, Value)> = fields.iter().collect();
            sorted.sort_by(|(a, _), (b, _)| utf16_cmp(a, b));
            out.push('{');
            for (i, (k, v)) in sorted.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(k, out);
                out.push(':');
                write_value(v, out)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

/// RFC 8785 §3.2.3 orders object keys by their UTF-16 code unit
/// sequence, not by Unicode scalar value or raw UTF-8 bytes — those
/// differ for characters outside the Basic Multilingual Plane.
fn utf16_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Render a JSON number the way JCS requires: integers with no
/// fractional part print without a decimal point; everything else goes
/// through a round-trippable `f64` formatting.
fn canonical_number(text: &str) -> Result<String, CanonicalError> {
    if !text.contains('.') && !text.contains('e') && !text.contains('E') {
        // Already a bare integer literal; JCS leaves these untouched.
        return Ok(text.to_string());
    }
    let value: f64 = text.parse().map_err(|_| CanonicalError(format!("not a finite number: {}", text)))?;
    if !value.is_finite() {
        return Err(CanonicalError("non-finite number".to_string()));
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return Ok(format!("{}", value as i64));
    }
    Ok(format_shortest(value))
}

/// Rust's `Display` for `f64` already produces the shortest string that
/// round-trips back to the same value, which is the property JCS's
/// number rule depends on; this just guards against the `-0` edge case.
fn format_shortest(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::parse;

    fn bytes_of(input: &str) -> String {
        let value = parse(input).unwrap();
        String::from_utf8(canonical_bytes(&value).unwrap()).unwrap()
    }

    #[test]
    fn object_keys_sort_ascending() {
        assert_eq!(bytes_of(r#"{"b": 1, "a": 2, "c": 3}"#), r#"{"a":2,"b":1,"c":3}"#);
    }

    #[test]
    fn array_order_preserved() {
        assert_eq!(bytes_of("[3, 1, 2]"), "[3,1,2]");
    }

    #[test]
    fn integers_have_no_fractional_part() {
        assert_eq!(bytes_of(r#"{"n": 5.0}"#), r#"{"n":5}"#);
    }

    #[test]
    fn no_whitespace_anywhere() {
        let s = bytes_of(r#"{"a": [1, 2], "b": {"c": true}}"#);
        assert!(!s.contains(' ') && !s.contains('\n') && !s.contains('\t'));
    }

    #[test]
    fn semantically_equal_values_canonicalize_identically() {
        let a = bytes_of(r#"{"x": 1, "y": [true, null]}"#);
        let b = bytes_of(r#"{"y": [true, null], "x": 1}"#);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_object_canonicalizes_to_braces() {
        assert_eq!(bytes_of("{}"), "{}");
    }

    #[test]
    fn nested_array_preserves_order() {
        assert_eq!(bytes_of(r#"{"items": [3, 1, 2]}"#), r#"{"items":[3,1,2]}"#);
    }

    #[test]
    fn booleans_and_null_render_literally() {
        assert_eq!(bytes_of(r#"{"a": true, "b": false, "c": null}"#), r#"{"a":true,"b":false,"c":null}"#);
    }
}
