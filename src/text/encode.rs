//! Compact JSON text encoding.
//!
//! Objects are written in insertion order. Decimals use the shortest text
//! that parses back to the same f64 and always keep a fraction or exponent,
//! so an encoded decimal never re-parses as an integer. JSON has no spelling
//! for NaN or infinity; those encode as `null` and are rejected earlier by
//! [`validate`](crate::validate::validate) when it runs.

use std::fmt::Write;

use crate::value::Value;

/// Encode a value as compact JSON text.
pub fn encode(value: &Value) -> String {
    let mut output = String::new();
    encode_to(value, &mut output);
    output
}

/// Append the compact JSON text of `value` to `output`.
pub fn encode_to(value: &Value, output: &mut String) {
    match value {
        Value::Null => output.push_str("null"),
        Value::Boolean(true) => output.push_str("true"),
        Value::Boolean(false) => output.push_str("false"),
        Value::Integer(n) => {
            let _ = write!(output, "{}", n);
        }
        Value::Decimal(d) => write_decimal(*d, output),
        Value::String(s) => write_string(s, output),
        Value::Array(arr) => {
            output.push('[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    output.push(',');
                }
                encode_to(item, output);
            }
            output.push(']');
        }
        Value::Object(map) => {
            output.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    output.push(',');
                }
                write_string(key, output);
                output.push(':');
                encode_to(item, output);
            }
            output.push('}');
        }
    }
}

fn write_decimal(d: f64, output: &mut String) {
    if d.is_finite() {
        // Debug formatting is shortest round-trip and keeps ".0" on integral values.
        let _ = write!(output, "{:?}", d);
    } else {
        output.push_str("null");
    }
}

/// Write a string with JSON escaping, including the surrounding quotes.
pub fn write_string(s: &str, output: &mut String) {
    output.push('"');
    for ch in s.chars() {
        match ch {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\x08' => output.push_str("\\b"),
            '\x0C' => output.push_str("\\f"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c < '\x20' => {
                let _ = write!(output, "\\u{:04x}", c as u32);
            }
            c => output.push(c),
        }
    }
    output.push('"');
}
