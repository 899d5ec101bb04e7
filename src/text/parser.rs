//! Recursive descent JSON parser.
//!
//! # Requirements
//!
//! - Integers that fit an i64 parse as [`Value::Integer`]; fractions,
//!   exponents and out-of-range integers parse as [`Value::Decimal`]
//! - Number literals that overflow to infinity are rejected
//! - Duplicate keys follow [`DuplicateKeyAction`]
//! - Nesting depth, object field and array length limits

use super::lexer::{LexResult, Lexer, Token};
use super::options::{DuplicateKeyAction, ParseOptions};
use crate::error::{ParseError, ParseErrorKind, Result};
use crate::value::{Object, Value};

/// JSON parser.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    options: ParseOptions,
    depth: u64,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input.
    pub fn new(input: &'a [u8], options: ParseOptions) -> LexResult<Self> {
        let mut lexer = Lexer::new(input, options)?;
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            options,
            depth: 0,
        })
    }

    /// Parse the input and return a Value.
    pub fn parse(&mut self) -> LexResult<Value> {
        let value = self.parse_value()?;

        if self.current != Token::Eof {
            return Err(self.error(ParseErrorKind::InvalidJson));
        }

        Ok(value)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.lexer.position())
    }

    /// Advance to the next token.
    fn advance(&mut self) -> LexResult<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn parse_value(&mut self) -> LexResult<Value> {
        let value = match &self.current {
            Token::Null => Value::Null,
            Token::True => Value::Boolean(true),
            Token::False => Value::Boolean(false),
            Token::String(s) => Value::String(s.clone()),
            Token::Number(s) => self.parse_number(s)?,
            Token::LeftBrace => return self.parse_object(),
            Token::LeftBracket => return self.parse_array(),
            _ => return Err(self.error(ParseErrorKind::InvalidJson)),
        };
        self.advance()?;
        Ok(value)
    }

    fn parse_number(&self, s: &str) -> LexResult<Value> {
        let is_integral = !s.contains(|c: char| matches!(c, '.' | 'e' | 'E'));
        if is_integral {
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Value::Integer(i));
            }
        }
        match s.parse::<f64>() {
            Ok(d) if d.is_finite() => Ok(Value::Decimal(d)),
            _ => Err(self.error(ParseErrorKind::InvalidNumber(s.to_string()))),
        }
    }

    fn enter(&mut self) -> LexResult<()> {
        self.depth += 1;
        if self.depth > self.options.max_nesting_depth {
            return Err(self.error(ParseErrorKind::NestingTooDeep(
                self.depth,
                self.options.max_nesting_depth,
            )));
        }
        Ok(())
    }

    fn parse_object(&mut self) -> LexResult<Value> {
        self.enter()?;
        self.advance()?;

        let mut map = Object::new();

        if self.current == Token::RightBrace {
            self.advance()?;
            self.depth -= 1;
            return Ok(Value::Object(map));
        }

        loop {
            let key = match &self.current {
                Token::String(s) => s.clone(),
                _ => return Err(self.error(ParseErrorKind::InvalidJson)),
            };
            self.advance()?;

            if self.options.duplicate_keys == DuplicateKeyAction::Reject && map.contains_key(&key) {
                return Err(self.error(ParseErrorKind::DuplicateKey(key)));
            }

            if self.current != Token::Colon {
                return Err(self.error(ParseErrorKind::InvalidJson));
            }
            self.advance()?;

            let value = self.parse_value()?;
            map.insert(key, value);

            if map.len() as u64 > self.options.max_object_fields {
                return Err(self.error(ParseErrorKind::TooManyFields(
                    map.len() as u64,
                    self.options.max_object_fields,
                )));
            }

            match &self.current {
                Token::Comma => {
                    self.advance()?;
                    if self.current == Token::RightBrace {
                        return Err(self.error(ParseErrorKind::InvalidJson));
                    }
                }
                Token::RightBrace => {
                    self.advance()?;
                    break;
                }
                _ => return Err(self.error(ParseErrorKind::InvalidJson)),
            }
        }

        self.depth -= 1;
        Ok(Value::Object(map))
    }

    fn parse_array(&mut self) -> LexResult<Value> {
        self.enter()?;
        self.advance()?;

        let mut arr = Vec::new();

        if self.current == Token::RightBracket {
            self.advance()?;
            self.depth -= 1;
            return Ok(Value::Array(arr));
        }

        loop {
            arr.push(self.parse_value()?);

            if arr.len() as u64 > self.options.max_array_length {
                return Err(self.error(ParseErrorKind::ArrayTooLong(
                    arr.len() as u64,
                    self.options.max_array_length,
                )));
            }

            match &self.current {
                Token::Comma => {
                    self.advance()?;
                    if self.current == Token::RightBracket {
                        return Err(self.error(ParseErrorKind::InvalidJson));
                    }
                }
                Token::RightBracket => {
                    self.advance()?;
                    break;
                }
                _ => return Err(self.error(ParseErrorKind::InvalidJson)),
            }
        }

        self.depth -= 1;
        Ok(Value::Array(arr))
    }
}

/// Parse JSON text with the default (lenient) options.
pub fn parse(input: &[u8]) -> Result<Value> {
    parse_with_options(input, ParseOptions::default())
}

/// Parse JSON text with explicit options.
pub fn parse_with_options(input: &[u8], options: ParseOptions) -> Result<Value> {
    let mut parser = Parser::new(input, options)?;
    Ok(parser.parse()?)
}

/// Parse JSON from a string slice with the default options.
pub fn parse_str(input: &str) -> Result<Value> {
    parse(input.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_lenient(input: &str) -> Result<Value> {
        parse_with_options(input.as_bytes(), ParseOptions::lenient())
    }

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse_lenient("null").unwrap(), Value::Null);
        assert_eq!(parse_lenient("true").unwrap(), Value::Boolean(true));
        assert_eq!(parse_lenient("\"hi\"").unwrap(), Value::from("hi"));
    }

    #[test]
    fn test_integer_decimal_distinction() {
        assert!(parse_lenient("42").unwrap().is_integer());
        assert!(parse_lenient("42.0").unwrap().is_decimal());
        assert!(parse_lenient("4e2").unwrap().is_decimal());
        assert_eq!(parse_lenient("-9223372036854775808").unwrap(), Value::Integer(i64::MIN));
        // Beyond i64 falls back to a decimal
        assert!(parse_lenient("9223372036854775808").unwrap().is_decimal());
    }

    #[test]
    fn test_overflowing_number_rejected() {
        let err = parse_lenient("1e400").unwrap_err();
        assert_eq!(err.code(), 150);
        assert!(matches!(
            err,
            crate::Error::Parse(ParseError {
                kind: ParseErrorKind::InvalidNumber(_),
                ..
            })
        ));
    }

    #[test]
    fn test_parse_object_preserves_order() {
        let result = parse_lenient(r#"{"b": 1, "a": 2}"#).unwrap();
        let keys: Vec<&String> = result.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_duplicate_keys() {
        let v = parse_lenient(r#"{"k": 1, "k": 2}"#).unwrap();
        assert_eq!(v, Value::object([("k", 2)]));

        let err = parse_with_options(br#"{"k": 1, "k": 2}"#, ParseOptions::strict()).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Parse(ParseError {
                kind: ParseErrorKind::DuplicateKey(_),
                ..
            })
        ));
    }

    #[test]
    fn test_nesting_depth_limit() {
        let mut options = ParseOptions::strict();
        options.max_nesting_depth = 2;
        assert!(parse_with_options(b"[[1]]", options).is_ok());
        assert!(parse_with_options(b"[[[1]]]", options).is_err());
    }

    #[test]
    fn test_array_and_field_limits() {
        let mut options = ParseOptions::lenient();
        options.max_array_length = 2;
        options.max_object_fields = 1;
        assert!(parse_with_options(b"[1, 2, 3]", options).is_err());
        assert!(parse_with_options(br#"{"a": 1, "b": 2}"#, options).is_err());
    }

    #[test]
    fn test_trailing_content_rejected() {
        assert!(parse_lenient("null extra").is_err());
        assert!(parse_lenient("[1, 2,]").is_err());
        assert!(parse_lenient(r#"{"a": 1,}"#).is_err());
    }
}
