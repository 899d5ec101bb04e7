//! Value-level validation of serialized trees.

use crate::error::{ValidationCode, ValidationError};
use crate::path::{Path, PathElement};
use crate::value::Value;

/// Check that `value` can be represented as JSON text.
///
/// Fails on the first NaN or infinite decimal, in document order, with the
/// path of the offending value.
pub fn validate(value: &Value) -> Result<(), ValidationError> {
    let mut path = Vec::new();
    walk(value, &mut path)
}

fn walk(value: &Value, path: &mut Vec<PathElement>) -> Result<(), ValidationError> {
    match value {
        Value::Decimal(d) if !d.is_finite() => Err(ValidationError::new(
            ValidationCode::NonFiniteNumber,
            Path::new(path.clone()),
            value.clone(),
        )),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                path.push(PathElement::Index(index));
                walk(item, path)?;
                path.pop();
            }
            Ok(())
        }
        Value::Object(map) => {
            for (key, item) in map {
                path.push(PathElement::Key(key.clone()));
                walk(item, path)?;
                path.pop();
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
