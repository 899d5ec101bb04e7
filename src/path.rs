//! Addressing locations inside a value tree.
//!
//! A [`Path`] is an immutable sequence of array indices and object keys.
//! Paths only ever grow by producing a new path, so a context can hand an
//! extended path to a nested call without affecting its own.
//!
//! # Rendering
//!
//! - The root renders as `.`
//! - An index renders as `[3]`
//! - A key that is an identifier (`[A-Za-z_$][A-Za-z0-9_$]*`) renders as `.key`
//! - Any other key renders quoted, as `["odd key"]`
//!
//! [`Path::parse`] accepts exactly this syntax, so rendering and parsing
//! round-trip.

use std::fmt;
use std::ops::Add;

use crate::error::{Error, Result};
use crate::text::lexer::{Lexer, Token};
use crate::text::{self, ParseOptions};

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathElement {
    /// Position within an array
    Index(usize),
    /// Key within an object
    Key(String),
}

impl PathElement {
    /// Returns true for array indices.
    pub fn is_index(&self) -> bool {
        matches!(self, PathElement::Index(_))
    }

    /// Returns true for object keys.
    pub fn is_key(&self) -> bool {
        matches!(self, PathElement::Key(_))
    }
}

impl From<usize> for PathElement {
    fn from(index: usize) -> Self {
        PathElement::Index(index)
    }
}

impl From<&str> for PathElement {
    fn from(key: &str) -> Self {
        PathElement::Key(key.to_string())
    }
}

impl From<String> for PathElement {
    fn from(key: String) -> Self {
        PathElement::Key(key)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if is_ident_start(c) => chars.all(is_ident_continue),
        _ => false,
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::Index(i) => write!(f, "[{}]", i),
            PathElement::Key(k) if is_identifier(k) => write!(f, ".{}", k),
            PathElement::Key(k) => {
                let mut quoted = String::with_capacity(k.len() + 2);
                text::encode::write_string(k, &mut quoted);
                write!(f, "[{}]", quoted)
            }
        }
    }
}

/// An ordered sequence of [`PathElement`]s. The empty path is the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Path {
    elements: Vec<PathElement>,
}

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from elements.
    pub fn new(elements: Vec<PathElement>) -> Self {
        Self { elements }
    }

    /// Parse the rendered form of a path.
    pub fn parse(input: &str) -> Result<Self> {
        PathParser { input, pos: 0 }.parse()
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true for the root path.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate the elements from the root outward.
    pub fn iter(&self) -> std::slice::Iter<'_, PathElement> {
        self.elements.iter()
    }

    /// The innermost element, if any.
    pub fn last(&self) -> Option<&PathElement> {
        self.elements.last()
    }

    /// The path without its innermost element; the root is its own parent.
    pub fn parent(&self) -> Path {
        let keep = self.elements.len().saturating_sub(1);
        Path::new(self.elements[..keep].to_vec())
    }

    /// A new path extended by one element.
    pub fn child(&self, element: impl Into<PathElement>) -> Path {
        let mut elements = Vec::with_capacity(self.elements.len() + 1);
        elements.extend_from_slice(&self.elements);
        elements.push(element.into());
        Path { elements }
    }

    /// A new path with all of `other`'s elements appended.
    pub fn join(&self, other: &Path) -> Path {
        let mut elements = self.elements.clone();
        elements.extend_from_slice(&other.elements);
        Path { elements }
    }

    /// Returns true if `self` is `prefix` or a descendant of it.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.elements.starts_with(&prefix.elements)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            return f.write_str(".");
        }
        for elem in &self.elements {
            write!(f, "{}", elem)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathElement;
    type IntoIter = std::slice::Iter<'a, PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl FromIterator<PathElement> for Path {
    fn from_iter<I: IntoIterator<Item = PathElement>>(iter: I) -> Self {
        Path::new(iter.into_iter().collect())
    }
}

macro_rules! add_element {
    ($($t:ty),*) => {
        $(
            impl Add<$t> for Path {
                type Output = Path;

                fn add(mut self, rhs: $t) -> Path {
                    self.elements.push(PathElement::from(rhs));
                    self
                }
            }

            impl Add<$t> for &Path {
                type Output = Path;

                fn add(self, rhs: $t) -> Path {
                    self.child(rhs)
                }
            }
        )*
    };
}

add_element!(usize, &str, String);

impl Add<PathElement> for Path {
    type Output = Path;

    fn add(mut self, rhs: PathElement) -> Path {
        self.elements.push(rhs);
        self
    }
}

impl Add<PathElement> for &Path {
    type Output = Path;

    fn add(self, rhs: PathElement) -> Path {
        self.child(rhs)
    }
}

impl Add<Path> for Path {
    type Output = Path;

    fn add(mut self, rhs: Path) -> Path {
        self.elements.extend(rhs.elements);
        self
    }
}

impl Add<&Path> for Path {
    type Output = Path;

    fn add(mut self, rhs: &Path) -> Path {
        self.elements.extend_from_slice(&rhs.elements);
        self
    }
}

impl Add<&Path> for &Path {
    type Output = Path;

    fn add(self, rhs: &Path) -> Path {
        self.join(rhs)
    }
}

struct PathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl PathParser<'_> {
    fn fail(&self) -> Error {
        Error::InvalidPath {
            text: self.input.to_string(),
            offset: self.pos,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn parse(mut self) -> Result<Path> {
        let mut elements = Vec::new();
        if self.input.is_empty() || self.input == "." {
            return Ok(Path::root());
        }
        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.pos += 1;
                    elements.push(PathElement::Key(self.identifier()?));
                }
                '[' => {
                    self.pos += 1;
                    elements.push(self.bracketed()?);
                }
                _ => return Err(self.fail()),
            }
        }
        Ok(Path::new(elements))
    }

    fn identifier(&mut self) -> Result<String> {
        let rest = &self.input[self.pos..];
        match rest.chars().next() {
            Some(c) if is_ident_start(c) => {}
            _ => return Err(self.fail()),
        }
        let len = rest
            .char_indices()
            .find(|&(_, c)| !is_ident_continue(c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        Ok(rest[..len].to_string())
    }

    fn bracketed(&mut self) -> Result<PathElement> {
        let rest = &self.input[self.pos..];
        let element = if rest.starts_with('"') {
            let mut lexer = Lexer::new(rest.as_bytes(), ParseOptions::lenient())
                .map_err(|_| self.fail())?;
            match lexer.next_token() {
                Ok(Token::String(key)) => {
                    self.pos += lexer.position();
                    PathElement::Key(key)
                }
                _ => return Err(self.fail()),
            }
        } else {
            let len = rest
                .char_indices()
                .find(|&(_, c)| !c.is_ascii_digit())
                .map_or(rest.len(), |(i, _)| i);
            let index = rest[..len].parse::<usize>().map_err(|_| self.fail())?;
            self.pos += len;
            PathElement::Index(index)
        };
        if self.peek() != Some(']') {
            return Err(self.fail());
        }
        self.pos += 1;
        Ok(element)
    }
}
