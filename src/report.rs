// Axel '0vercl0k' Souchet - October 15 2026
//! The values the dissectors pull out of requests and how they are rendered.
use std::fmt::{self, Display};

use crate::strings::hex;

/// Placeholder for anything that couldn't be read.
pub const NULL: &str = "<null>";

/// How a 32-bit field is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    /// `0x1f`.
    Hex,
    /// `31 (0x1f)`; used for sizes.
    Size,
    /// `31`.
    Dec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Word(u32, Radix),
    Text(String),
    Bytes(Vec<u8>),
    /// A frame that was not copied out of guest memory; the string says why.
    Rejected(String),
    /// The field sits outside of main RAM.
    Null,
}

impl Value {
    /// Build a word, or [`Value::Null`] if it couldn't be read.
    #[must_use]
    pub fn word(v: Option<u32>, radix: Radix) -> Self {
        v.map_or(Self::Null, |v| Self::Word(v, radix))
    }

    /// Build a byte dump, or [`Value::Null`] if it couldn't be read.
    #[must_use]
    pub fn bytes(v: Option<Vec<u8>>) -> Self {
        v.map_or(Self::Null, Self::Bytes)
    }

    #[must_use]
    pub fn as_word(&self) -> Option<u32> {
        match self {
            Self::Word(v, _) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(v, Radix::Hex) => write!(f, "{v:#x}"),
            Self::Word(v, Radix::Size) => write!(f, "{v} ({v:#x})"),
            Self::Word(v, Radix::Dec) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Bytes(b) => write!(f, "{}", hex(b)),
            Self::Rejected(why) => write!(f, "<rejected: {why}>"),
            Self::Null => write!(f, "{NULL}"),
        }
    }
}

/// A named value out of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub value: Value,
}

impl Field {
    #[must_use]
    pub fn new(name: &'static str, value: Value) -> Self {
        Self { name, value }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

/// Find the first field called `name`.
#[must_use]
pub fn find<'f>(fields: &'f [Field], name: &str) -> Option<&'f Value> {
    fields.iter().find(|f| f.name == name).map(|f| &f.value)
}
