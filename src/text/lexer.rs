//! JSON lexer/tokenizer.
//!
//! Converts raw JSON input bytes into a stream of tokens for the parser.
//! Handles UTF-8 validation, escape sequences and number syntax.
//!
//! # Requirements
//!
//! - UTF-8 validation of the whole input up front
//! - Reject unpaired surrogates, both raw and escaped
//! - Unescape strings before they reach the parser
//! - Numbers follow RFC 8259 grammar, including fractions and exponents

use super::options::ParseOptions;
use crate::error::{ParseError, ParseErrorKind};

pub(crate) type LexResult<T> = Result<T, ParseError>;

/// Token types produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Left brace `{`
    LeftBrace,
    /// Right brace `}`
    RightBrace,
    /// Left bracket `[`
    LeftBracket,
    /// Right bracket `]`
    RightBracket,
    /// Colon `:`
    Colon,
    /// Comma `,`
    Comma,
    /// Null literal
    Null,
    /// True literal
    True,
    /// False literal
    False,
    /// String value (unescaped)
    String(String),
    /// Number value (raw text, validated against the number grammar)
    Number(String),
    /// End of input
    Eof,
}

/// JSON lexer that tokenizes input.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    options: ParseOptions,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a [u8], options: ParseOptions) -> LexResult<Self> {
        if input.len() as u64 > options.max_input_size {
            return Err(ParseError::new(
                ParseErrorKind::InputTooLarge(input.len() as u64, options.max_input_size),
                0,
            ));
        }

        if let Err(e) = std::str::from_utf8(input) {
            return Err(ParseError::new(ParseErrorKind::InvalidUtf8, e.valid_up_to()));
        }

        Ok(Self {
            input,
            pos: 0,
            options,
        })
    }

    /// Get the current position in the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.pos)
    }

    /// Peek at the current byte without consuming it.
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Consume and return the current byte.
    fn advance(&mut self) -> Option<u8> {
        let b = self.input.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.advance();
        }
    }

    /// Read the next token from the input.
    pub fn next_token(&mut self) -> LexResult<Token> {
        self.skip_whitespace();

        let single = match self.peek() {
            None => return Ok(Token::Eof),
            Some(b'{') => Token::LeftBrace,
            Some(b'}') => Token::RightBrace,
            Some(b'[') => Token::LeftBracket,
            Some(b']') => Token::RightBracket,
            Some(b':') => Token::Colon,
            Some(b',') => Token::Comma,
            Some(b'"') => return self.read_string(),
            Some(b'-' | b'0'..=b'9') => return self.read_number(),
            Some(b't') => return self.read_literal(b"true", Token::True),
            Some(b'f') => return self.read_literal(b"false", Token::False),
            Some(b'n') => return self.read_literal(b"null", Token::Null),
            Some(_) => return Err(self.error(ParseErrorKind::InvalidJson)),
        };
        self.advance();
        Ok(single)
    }

    /// Read a string token, handling escape sequences.
    fn read_string(&mut self) -> LexResult<Token> {
        // Consume opening quote
        self.advance();

        let mut result = String::new();

        loop {
            match self.advance() {
                None => return Err(self.error(ParseErrorKind::InvalidJson)),
                Some(b'"') => break,
                Some(b'\\') => {
                    let escaped = self.read_escape_sequence()?;
                    result.push(escaped);
                }
                Some(b) if b < 0x20 => {
                    // Control characters must be escaped
                    return Err(self.error(ParseErrorKind::InvalidJson));
                }
                Some(b) if b <= 0x7F => result.push(b as char),
                Some(_) => {
                    // Back up and read the full UTF-8 character
                    self.pos -= 1;
                    let ch = self.read_utf8_char()?;
                    result.push(ch);
                }
            }

            if result.len() as u64 > self.options.max_string_length {
                return Err(self.error(ParseErrorKind::StringTooLong(
                    result.len() as u64,
                    self.options.max_string_length,
                )));
            }
        }

        Ok(Token::String(result))
    }

    /// Read a multi-byte UTF-8 character from the current position.
    fn read_utf8_char(&mut self) -> LexResult<char> {
        let invalid = |lexer: &Self| lexer.error(ParseErrorKind::InvalidUtf8);
        let b0 = self.advance().ok_or_else(|| invalid(self))?;

        let (len, mut codepoint) = if b0 & 0xE0 == 0xC0 {
            (2, (b0 & 0x1F) as u32)
        } else if b0 & 0xF0 == 0xE0 {
            (3, (b0 & 0x0F) as u32)
        } else if b0 & 0xF8 == 0xF0 {
            (4, (b0 & 0x07) as u32)
        } else {
            return Err(invalid(self));
        };

        for _ in 1..len {
            let b = self.advance().ok_or_else(|| invalid(self))?;
            if b & 0xC0 != 0x80 {
                return Err(invalid(self));
            }
            codepoint = (codepoint << 6) | ((b & 0x3F) as u32);
        }

        if (0xD800..=0xDFFF).contains(&codepoint) {
            return Err(invalid(self));
        }

        char::from_u32(codepoint).ok_or_else(|| invalid(self))
    }

    /// Read an escape sequence after a backslash.
    fn read_escape_sequence(&mut self) -> LexResult<char> {
        match self.advance() {
            Some(b'"') => Ok('"'),
            Some(b'\\') => Ok('\\'),
            Some(b'/') => Ok('/'),
            Some(b'b') => Ok('\x08'),
            Some(b'f') => Ok('\x0C'),
            Some(b'n') => Ok('\n'),
            Some(b'r') => Ok('\r'),
            Some(b't') => Ok('\t'),
            Some(b'u') => self.read_unicode_escape(),
            _ => Err(self.error(ParseErrorKind::InvalidJson)),
        }
    }

    /// Read a \uXXXX unicode escape sequence, combining surrogate pairs.
    fn read_unicode_escape(&mut self) -> LexResult<char> {
        let codepoint = self.read_hex4()?;

        if (0xD800..=0xDBFF).contains(&codepoint) {
            // A high surrogate must be followed by an escaped low surrogate
            if self.advance() != Some(b'\\') || self.advance() != Some(b'u') {
                return Err(self.error(ParseErrorKind::InvalidUtf8));
            }
            let low = self.read_hex4()?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(self.error(ParseErrorKind::InvalidUtf8));
            }
            let combined = 0x10000 + ((codepoint as u32 - 0xD800) << 10) + (low as u32 - 0xDC00);
            return char::from_u32(combined).ok_or_else(|| self.error(ParseErrorKind::InvalidUtf8));
        }

        if (0xDC00..=0xDFFF).contains(&codepoint) {
            return Err(self.error(ParseErrorKind::InvalidUtf8));
        }

        char::from_u32(codepoint as u32).ok_or_else(|| self.error(ParseErrorKind::InvalidUtf8))
    }

    /// Read 4 hex digits and return the value.
    fn read_hex4(&mut self) -> LexResult<u16> {
        let mut value: u16 = 0;
        for _ in 0..4 {
            let digit = match self.advance() {
                Some(b @ b'0'..=b'9') => b - b'0',
                Some(b @ b'a'..=b'f') => b - b'a' + 10,
                Some(b @ b'A'..=b'F') => b - b'A' + 10,
                _ => return Err(self.error(ParseErrorKind::InvalidJson)),
            };
            value = (value << 4) | (digit as u16);
        }
        Ok(value)
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }
        self.pos - start
    }

    /// Read a number token.
    fn read_number(&mut self) -> LexResult<Token> {
        let start = self.pos;

        if self.peek() == Some(b'-') {
            self.advance();
        }

        // Integer part: a single zero or a non-zero digit run
        match self.peek() {
            Some(b'0') => {
                self.advance();
                if let Some(b'0'..=b'9') = self.peek() {
                    return Err(self.error(ParseErrorKind::InvalidJson));
                }
            }
            Some(b'1'..=b'9') => {
                self.skip_digits();
            }
            _ => return Err(self.error(ParseErrorKind::InvalidJson)),
        }

        if self.peek() == Some(b'.') {
            self.advance();
            if self.skip_digits() == 0 {
                return Err(self.error(ParseErrorKind::InvalidJson));
            }
        }

        if let Some(b'e' | b'E') = self.peek() {
            self.advance();
            if let Some(b'+' | b'-') = self.peek() {
                self.advance();
            }
            if self.skip_digits() == 0 {
                return Err(self.error(ParseErrorKind::InvalidJson));
            }
        }

        let num_str = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error(ParseErrorKind::InvalidJson))?;

        Ok(Token::Number(num_str.to_string()))
    }

    fn read_literal(&mut self, expected: &[u8], token: Token) -> LexResult<Token> {
        for &b in expected {
            if self.advance() != Some(b) {
                return Err(self.error(ParseErrorKind::InvalidJson));
            }
        }
        Ok(token)
    }
}
