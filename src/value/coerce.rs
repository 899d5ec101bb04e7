//! Loose conversions between value kinds.
//!
//! These back [`Formats::coerce`](crate::serialization::Formats::coerce).
//! Unlike the checked accessors on [`Value`], they accept any kind for which
//! a conversion is meaningful.

use crate::error::{Error, Result};
use crate::text;

use super::{Kind, Value};

/// Returns true if [`coerce_to`] can convert a value of kind `from` to `to`.
pub fn can_coerce(from: Kind, to: Kind) -> bool {
    if from == to {
        return true;
    }
    match (from, to) {
        (_, Kind::Boolean | Kind::String) => true,
        (Kind::Null | Kind::Boolean | Kind::Integer | Kind::Decimal | Kind::String, Kind::Integer | Kind::Decimal) => {
            true
        }
        _ => false,
    }
}

/// Succeeds only for null.
pub fn coerce_null(from: &Value) -> Result<()> {
    match from {
        Value::Null => Ok(()),
        other => Err(Error::kind(Kind::Null, other.kind())),
    }
}

/// Truthiness: false for null, `false`, zero, NaN and empty strings, arrays
/// and objects; true otherwise.
pub fn coerce_boolean(from: &Value) -> bool {
    match from {
        Value::Null => false,
        Value::Boolean(b) => *b,
        Value::Integer(i) => *i != 0,
        Value::Decimal(d) => *d != 0.0 && !d.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Integer conversion. Decimals truncate toward zero and saturate at the
/// i64 bounds; strings are parsed as numbers.
pub fn coerce_integer(from: &Value) -> Result<i64> {
    match from {
        Value::Null => Ok(0),
        Value::Boolean(b) => Ok(i64::from(*b)),
        Value::Integer(i) => Ok(*i),
        Value::Decimal(d) => Ok(*d as i64),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(i);
            }
            trimmed
                .parse::<f64>()
                .map(|d| d as i64)
                .map_err(|_| Error::custom(format!("cannot coerce {:?} to an integer", s)))
        }
        other => Err(Error::Kind {
            expected: vec![Kind::Null, Kind::Boolean, Kind::Integer, Kind::Decimal, Kind::String],
            actual: other.kind(),
        }),
    }
}

/// Decimal conversion; strings are parsed as numbers.
pub fn coerce_decimal(from: &Value) -> Result<f64> {
    match from {
        Value::Null => Ok(0.0),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Integer(i) => Ok(*i as f64),
        Value::Decimal(d) => Ok(*d),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::custom(format!("cannot coerce {:?} to a decimal", s))),
        other => Err(Error::Kind {
            expected: vec![Kind::Null, Kind::Boolean, Kind::Integer, Kind::Decimal, Kind::String],
            actual: other.kind(),
        }),
    }
}

/// Strings pass through; everything else becomes its compact JSON text.
pub fn coerce_string(from: &Value) -> String {
    match from {
        Value::String(s) => s.clone(),
        other => text::encode(other),
    }
}

/// Convert `from` to `kind`, failing where [`can_coerce`] is false.
pub fn coerce_to(from: &Value, kind: Kind) -> Result<Value> {
    if !can_coerce(from.kind(), kind) {
        return Err(Error::kind(kind, from.kind()));
    }
    Ok(match kind {
        Kind::Null => Value::Null,
        Kind::Boolean => Value::Boolean(coerce_boolean(from)),
        Kind::Integer => Value::Integer(coerce_integer(from)?),
        Kind::Decimal => Value::Decimal(coerce_decimal(from)?),
        Kind::String => Value::String(coerce_string(from)),
        Kind::Array | Kind::Object => from.clone(),
    })
}
