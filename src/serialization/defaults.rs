//! Built-in layers for primitive types.

use crate::error::{Error, Result};
use crate::value::coerce;
use crate::value::Value;

use super::formats::Formats;
use super::function::make_adapter;
use super::type_info::TypeInfo;

fn out_of_range<T: 'static>(n: impl std::fmt::Display) -> Error {
    Error::custom(format!(
        "{n} is out of range for {}",
        TypeInfo::of::<T>()
    ))
}

fn to_f32(d: f64) -> Result<f32> {
    let narrowed = d as f32;
    if narrowed.is_infinite() && d.is_finite() {
        return Err(out_of_range::<f32>(d));
    }
    Ok(narrowed)
}

fn to_char(s: &str) -> Result<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::custom(format!(
            "expected a single character, found {} characters",
            s.chars().count()
        ))),
    }
}

macro_rules! integers {
    ($formats:ident, $read:expr, $($t:ty),*) => {
        $(
            $formats.put_adapter(make_adapter(
                |_, from| {
                    let n: i64 = $read(from)?;
                    <$t>::try_from(n).map_err(|_| out_of_range::<$t>(n))
                },
                |_, from: &$t| {
                    i64::try_from(*from)
                        .map(Value::Integer)
                        .map_err(|_| out_of_range::<i64>(*from))
                },
            ));
        )*
    };
}

fn strict_integer(from: &Value) -> Result<i64> {
    from.as_integer()
}

fn loose_integer(from: &Value) -> Result<i64> {
    coerce::coerce_integer(from)
}

pub(crate) fn build_defaults() -> Formats {
    let mut formats = Formats::new();
    formats.put_adapter(make_adapter(
        |_, from| from.as_boolean(),
        |_, from: &bool| Ok(Value::Boolean(*from)),
    ));
    integers!(formats, strict_integer, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
    formats.put_adapter(make_adapter(
        |_, from| from.as_decimal(),
        |_, from: &f64| Ok(Value::Decimal(*from)),
    ));
    formats.put_adapter(make_adapter(
        |_, from| to_f32(from.as_decimal()?),
        |_, from: &f32| Ok(Value::Decimal(f64::from(*from))),
    ));
    formats.put_adapter(make_adapter(
        |_, from| from.as_str().map(str::to_string),
        |_, from: &String| Ok(Value::String(from.clone())),
    ));
    formats.put_adapter(make_adapter(
        |_, from| to_char(from.as_str()?),
        |_, from: &char| Ok(Value::String(from.to_string())),
    ));
    formats.put_adapter(make_adapter(
        |_, from| Ok(from.clone()),
        |_, from: &Value| Ok(from.clone()),
    ));
    tracing::trace!("default formats initialized");
    formats
}

pub(crate) fn build_coerce() -> Formats {
    let mut formats = Formats::compose([Formats::defaults()]);
    formats.put_adapter(make_adapter(
        |_, from| Ok(coerce::coerce_boolean(from)),
        |_, from: &bool| Ok(Value::Boolean(*from)),
    ));
    integers!(formats, loose_integer, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
    formats.put_adapter(make_adapter(
        |_, from| coerce::coerce_decimal(from),
        |_, from: &f64| Ok(Value::Decimal(*from)),
    ));
    formats.put_adapter(make_adapter(
        |_, from| to_f32(coerce::coerce_decimal(from)?),
        |_, from: &f32| Ok(Value::Decimal(f64::from(*from))),
    ));
    formats.put_adapter(make_adapter(
        |_, from| Ok(coerce::coerce_string(from)),
        |_, from: &String| Ok(Value::String(from.clone())),
    ));
    formats.put_adapter(make_adapter(
        |_, from| to_char(&coerce::coerce_string(from)),
        |_, from: &char| Ok(Value::String(from.to_string())),
    ));
    formats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_integers_are_range_checked() {
        let formats = Formats::defaults();
        assert_eq!(formats.extract::<u8>(&Value::Integer(255)).unwrap(), 255);
        let err = formats.extract::<u8>(&Value::Integer(256)).unwrap_err();
        assert_eq!(err.root_cause().to_string(), "256 is out of range for u8");
        assert_eq!(formats.extract::<i64>(&Value::Decimal(1.0)).unwrap_err().root_cause().code(), 100);
        assert_eq!(formats.to_json(&u64::MAX).unwrap_err().code(), 199);
    }

    #[test]
    fn test_decimals_accept_integers() {
        let formats = Formats::defaults();
        assert_eq!(formats.extract::<f64>(&Value::Integer(2)).unwrap(), 2.0);
        assert_eq!(formats.extract::<f32>(&Value::Decimal(0.5)).unwrap(), 0.5);
        assert_eq!(formats.to_json(&1.5f32).unwrap(), Value::Decimal(1.5));
    }

    #[test]
    fn test_f32_is_range_checked() {
        let err = Formats::defaults().extract::<f32>(&Value::Decimal(1e300)).unwrap_err();
        assert!(err.root_cause().to_string().ends_with("is out of range for f32"));
        assert!(Formats::coerce().extract::<f32>(&Value::from("-1e300")).is_err());
        assert_eq!(
            Formats::defaults().extract::<f32>(&Value::Decimal(f64::from(f32::MAX))).unwrap(),
            f32::MAX
        );
    }

    #[test]
    fn test_strings_and_chars() {
        let formats = Formats::defaults();
        assert_eq!(formats.extract::<String>(&Value::from("hi")).unwrap(), "hi");
        assert_eq!(formats.extract::<char>(&Value::from("x")).unwrap(), 'x');
        assert!(formats.extract::<char>(&Value::from("xy")).is_err());
        assert!(formats.extract::<String>(&Value::Integer(1)).is_err());
    }

    #[test]
    fn test_value_passes_through() {
        let formats = Formats::defaults();
        let v = Value::object([("a", Value::Null)]);
        assert_eq!(formats.extract::<Value>(&v).unwrap(), v);
        assert_eq!(formats.to_json(&v).unwrap(), v);
    }

    #[test]
    fn test_coerce_layer() {
        let formats = Formats::coerce();
        assert_eq!(formats.extract::<i32>(&Value::from("42")).unwrap(), 42);
        assert_eq!(formats.extract::<String>(&Value::Integer(7)).unwrap(), "7");
        assert!(formats.extract::<bool>(&Value::Integer(1)).unwrap());
        assert_eq!(formats.extract::<char>(&Value::Integer(5)).unwrap(), '5');
        // Serializers survive the shadowing coerce layer.
        assert_eq!(formats.to_json(&3u16).unwrap(), Value::Integer(3));
        // Non-primitive types come from the defaults below.
        assert!(formats.has_extractor(TypeInfo::of::<Value>()));
    }
}
