//! `Option<T>` as "null or T".

use std::marker::PhantomData;

use crate::error::Result;
use crate::serialization::capability::{Extractor, Serializer};
use crate::serialization::context::{ExtractionContext, SerializationContext};
use crate::value::Value;

/// Maps JSON null to `None` and delegates everything else to `T`.
pub struct OptionalAdapter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> OptionalAdapter<T> {
    /// Create the adapter.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for OptionalAdapter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Extractor for OptionalAdapter<T> {
    type Output = Option<T>;

    fn extract(&self, ctx: &ExtractionContext<'_>, from: &Value) -> Result<Option<T>> {
        if from.is_null() {
            return Ok(None);
        }
        ctx.extract(from).map(Some)
    }
}

impl<T: 'static> Serializer for OptionalAdapter<T> {
    type Input = Option<T>;

    fn to_json(&self, ctx: &SerializationContext<'_>, from: &Option<T>) -> Result<Value> {
        match from {
            Some(inner) => ctx.to_json(inner),
            None => Ok(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{DuplicateTypeAction, Formats};

    #[test]
    fn test_null_is_none() {
        let mut formats = Formats::compose([Formats::defaults()]);
        formats
            .register_adapter(OptionalAdapter::<i64>::new(), DuplicateTypeAction::Exception)
            .unwrap();
        assert_eq!(formats.extract::<Option<i64>>(&Value::Null).unwrap(), None);
        assert_eq!(formats.extract::<Option<i64>>(&Value::Integer(3)).unwrap(), Some(3));
        assert_eq!(formats.to_json(&None::<i64>).unwrap(), Value::Null);
        assert!(formats.extract::<Option<i64>>(&Value::from("3")).is_err());
    }
}
