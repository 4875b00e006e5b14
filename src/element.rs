//! Decoded TLV nodes (the tree the query walks).

use std::fmt;

/// Universal tag numbers the crate inspects by name.
pub mod universal {
    pub const BOOLEAN: u64 = 1;
    pub const INTEGER: u64 = 2;
    pub const BIT_STRING: u64 = 3;
    pub const OCTET_STRING: u64 = 4;
    pub const NULL: u64 = 5;
    pub const OBJECT_IDENTIFIER: u64 = 6;
    pub const UTF8_STRING: u64 = 12;
    pub const SEQUENCE: u64 = 16;
    pub const SET: u64 = 17;
    pub const NUMERIC_STRING: u64 = 18;
    pub const PRINTABLE_STRING: u64 = 19;
    pub const TELETEX_STRING: u64 = 20;
    pub const VIDEOTEX_STRING: u64 = 21;
    pub const IA5_STRING: u64 = 22;
    pub const UTC_TIME: u64 = 23;
    pub const GENERALIZED_TIME: u64 = 24;
    pub const GRAPHIC_STRING: u64 = 25;
    pub const VISIBLE_STRING: u64 = 26;
    pub const GENERAL_STRING: u64 = 27;
    pub const UNIVERSAL_STRING: u64 = 28;
    pub const BMP_STRING: u64 = 30;
}

/// Tag class from the top two bits of the first identifier octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagClass {
    Universal,
    Application,
    Context,
    Private,
}

impl TagClass {
    pub fn from_identifier(octet: u8) -> Self {
        match octet >> 6 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::Context,
            _ => TagClass::Private,
        }
    }
}

impl fmt::Display for TagClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TagClass::Universal => "UNIVERSAL",
            TagClass::Application => "APPLICATION",
            TagClass::Context => "CONTEXT",
            TagClass::Private => "PRIVATE",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Definite(usize),
    /// Content terminated by an end-of-contents marker (`00 00`).
    Indefinite,
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Definite(n) => write!(f, "{}", n),
            Length::Indefinite => f.write_str("indef"),
        }
    }
}

/// One TLV element. All byte views borrow the buffer the element was decoded from.
///
/// Invariants kept by the decoder:
/// - `full` is `header ++ content ++ EOC` (EOC only when the length is indefinite);
/// - for constructed elements the children's `full` views tile `content` exactly;
/// - primitive elements have no children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element<'a> {
    pub class: TagClass,
    pub constructed: bool,
    pub tag_number: u64,
    /// First identifier octet: class, constructed bit and low five tag bits.
    pub identifier: u8,
    pub length: Length,
    /// Position of the header within the source buffer.
    pub offset: usize,
    pub header: &'a [u8],
    pub content: &'a [u8],
    pub full: &'a [u8],
    pub children: Vec<Element<'a>>,
    /// Headerless node built over a whole range (query root or `decode()` result).
    pub synthetic: bool,
}

impl<'a> Element<'a> {
    /// Synthetic constructed node over `bytes`; never produced by tag matching.
    pub fn root(bytes: &'a [u8], children: Vec<Element<'a>>) -> Self {
        Element {
            class: TagClass::Universal,
            constructed: true,
            tag_number: universal::SEQUENCE,
            identifier: 0x30,
            length: Length::Definite(bytes.len()),
            offset: 0,
            header: &[],
            content: bytes,
            full: bytes,
            children,
            synthetic: true,
        }
    }

    pub fn is_universal(&self, tag_number: u64) -> bool {
        self.class == TagClass::Universal && self.tag_number == tag_number
    }

    /// Primitive UNIVERSAL INTEGER.
    pub fn is_integer(&self) -> bool {
        !self.constructed && self.is_universal(universal::INTEGER)
    }

    /// Primitive UNIVERSAL string type whose content is rendered as text.
    pub fn is_string_type(&self) -> bool {
        !self.constructed
            && self.class == TagClass::Universal
            && matches!(
                self.tag_number,
                universal::UTF8_STRING
                    | universal::PRINTABLE_STRING
                    | universal::IA5_STRING
                    | universal::VISIBLE_STRING
                    | universal::BMP_STRING
            )
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}
