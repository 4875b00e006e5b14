//! Query AST: selector steps plus a terminal output modifier.

use crate::element::{universal, Element};
use std::fmt;
use std::str::FromStr;

/// One navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// `.index(n)`: n-th immediate child.
    Index(usize),
    /// `.tag(t)`: first descendant (pre-order) whose first identifier octet is `t`.
    Tag(u8),
    /// `.decode()`: re-decode the value of an OCTET STRING / BIT STRING.
    Decode,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Index(n) => write!(f, ".index({})", n),
            Selector::Tag(t) => write!(f, ".tag(0x{:02x})", t),
            Selector::Decode => f.write_str(".decode()"),
        }
    }
}

/// Output format applied to the final selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modifier {
    Tlv,
    TlvHex,
    Hex,
    Int,
    Utf8,
    Count,
    Type,
    Pretty,
    #[default]
    Auto,
}

impl Modifier {
    pub const ALL: [Modifier; 9] = [
        Modifier::Tlv,
        Modifier::TlvHex,
        Modifier::Hex,
        Modifier::Int,
        Modifier::Utf8,
        Modifier::Count,
        Modifier::Type,
        Modifier::Pretty,
        Modifier::Auto,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Tlv => "tlv",
            Modifier::TlvHex => "tlvhex",
            Modifier::Hex => "hex",
            Modifier::Int => "int",
            Modifier::Utf8 => "utf8",
            Modifier::Count => "count",
            Modifier::Type => "type",
            Modifier::Pretty => "pretty",
            Modifier::Auto => "auto",
        }
    }

    /// Concrete format for `element`; only `Auto` depends on the element.
    pub fn resolve(self, element: &Element<'_>) -> Format {
        match self {
            Modifier::Tlv => Format::Tlv,
            Modifier::TlvHex => Format::TlvHex,
            Modifier::Hex => Format::Hex,
            Modifier::Int => Format::Int,
            Modifier::Utf8 => Format::Utf8,
            Modifier::Count => Format::Count,
            Modifier::Type => Format::Type,
            Modifier::Pretty => Format::Pretty,
            Modifier::Auto => {
                if element.constructed {
                    Format::Tlv
                } else if element.is_universal(universal::INTEGER) {
                    Format::Int
                } else if element.is_string_type() {
                    Format::Utf8
                } else {
                    Format::Hex
                }
            }
        }
    }
}

/// A [`Modifier`] with `auto` resolved against the selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Tlv,
    TlvHex,
    Hex,
    Int,
    Utf8,
    Count,
    Type,
    Pretty,
}

impl Format {
    pub fn modifier(self) -> Modifier {
        match self {
            Format::Tlv => Modifier::Tlv,
            Format::TlvHex => Modifier::TlvHex,
            Format::Hex => Modifier::Hex,
            Format::Int => Modifier::Int,
            Format::Utf8 => Modifier::Utf8,
            Format::Count => Modifier::Count,
            Format::Type => Modifier::Type,
            Format::Pretty => Modifier::Pretty,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Modifier::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown modifier: {}", s))
    }
}

/// Parsed query: ordered steps evaluated from the synthetic root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    pub selectors: Vec<Selector>,
    pub modifier: Modifier,
}

impl Query {
    pub fn new(selectors: Vec<Selector>, modifier: Modifier) -> Self {
        Query { selectors, modifier }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.selectors {
            write!(f, "{}", s)?;
        }
        write!(f, "@{}", self.modifier)
    }
}
