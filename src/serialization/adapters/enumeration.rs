//! Enumerations mapped through an explicit label table.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::serialization::capability::{Extractor, Serializer};
use crate::serialization::context::{ExtractionContext, SerializationContext};
use crate::serialization::type_info::TypeInfo;
use crate::value::Value;

/// Bidirectional mapping between enumerators and labels.
///
/// Labels are usually strings but any value works. Extraction picks the first
/// entry whose label equals the input; the case-insensitive variant compares
/// strings ignoring case. Serialization always emits the label of the
/// first entry for the enumerator, so several labels may be accepted for one
/// enumerator while a single canonical one is written. An enumerator that has
/// no entry serializes to null.
pub struct EnumAdapter<E> {
    entries: Vec<(E, Value)>,
    ignore_case: bool,
}

impl<E> EnumAdapter<E>
where
    E: PartialEq + Clone + Send + Sync + 'static,
{
    /// Case-sensitive mapping from `entries`.
    pub fn new<I, L>(entries: I) -> Self
    where
        I: IntoIterator<Item = (E, L)>,
        L: Into<Value>,
    {
        Self {
            entries: entries.into_iter().map(|(e, l)| (e, l.into())).collect(),
            ignore_case: false,
        }
    }

    /// Mapping that matches string labels case-insensitively on extraction.
    pub fn icase<I, L>(entries: I) -> Self
    where
        I: IntoIterator<Item = (E, L)>,
        L: Into<Value>,
    {
        Self {
            ignore_case: true,
            ..Self::new(entries)
        }
    }

    fn matches(&self, label: &Value, from: &Value) -> bool {
        if self.ignore_case {
            label.compare_icase(from) == Ordering::Equal
        } else {
            label == from
        }
    }
}

impl<E> Extractor for EnumAdapter<E>
where
    E: PartialEq + Clone + Send + Sync + 'static,
{
    type Output = E;

    fn extract(&self, ctx: &ExtractionContext<'_>, from: &Value) -> Result<E> {
        self.entries
            .iter()
            .find(|(_, label)| self.matches(label, from))
            .map(|(e, _)| e.clone())
            .ok_or_else(|| {
                Error::extraction(
                    ctx.path().clone(),
                    format!("Invalid value for {}: {}", TypeInfo::of::<E>(), from),
                )
            })
    }
}

impl<E> Serializer for EnumAdapter<E>
where
    E: PartialEq + Clone + Send + Sync + 'static,
{
    type Input = E;

    fn to_json(&self, _ctx: &SerializationContext<'_>, from: &E) -> Result<Value> {
        Ok(self
            .entries
            .iter()
            .find(|(e, _)| e == from)
            .map(|(_, label)| label.clone())
            .unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{DuplicateTypeAction, Formats};

    #[derive(Debug, Clone, PartialEq)]
    enum Color {
        Red,
        Green,
        Blue,
    }

    fn formats(adapter: EnumAdapter<Color>) -> Formats {
        let mut formats = Formats::new();
        formats
            .register_adapter(adapter, DuplicateTypeAction::Exception)
            .unwrap();
        formats
    }

    #[test]
    fn test_round_trip_and_aliases() {
        let formats = formats(EnumAdapter::new([
            (Color::Red, "red"),
            (Color::Green, "green"),
            (Color::Red, "crimson"),
        ]));
        assert_eq!(formats.extract::<Color>(&Value::from("crimson")).unwrap(), Color::Red);
        assert_eq!(formats.to_json(&Color::Red).unwrap(), Value::from("red"));
        assert_eq!(formats.to_json(&Color::Blue).unwrap(), Value::Null);
        let err = formats.extract::<Color>(&Value::from("RED")).unwrap_err();
        assert_eq!(err.code(), 120);
        assert!(err.to_string().contains("Invalid value for"));
    }

    #[test]
    fn test_icase() {
        let formats = formats(EnumAdapter::icase([(Color::Blue, "Blue")]));
        assert_eq!(formats.extract::<Color>(&Value::from("BLUE")).unwrap(), Color::Blue);
        assert_eq!(formats.to_json(&Color::Blue).unwrap(), Value::from("Blue"));
    }

    #[test]
    fn test_numeric_labels() {
        let formats = formats(EnumAdapter::new([(Color::Red, 1), (Color::Green, 2)]));
        assert_eq!(formats.extract::<Color>(&Value::Decimal(2.0)).unwrap(), Color::Green);
        assert_eq!(formats.to_json(&Color::Red).unwrap(), Value::Integer(1));
    }
}
