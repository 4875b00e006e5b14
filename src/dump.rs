//! Render a selected element: raw TLV bytes, hex, integers, strings, counts, type names,
//! or an indented tree dump.

use crate::ast::{Format, Modifier};
use crate::element::{universal, Element, TagClass};
use crate::error::{Error, Result};

/// Characters of hex shown for opaque values in the tree dump.
const PREVIEW_HEX_CHARS: usize = 64;

/// Rendered result: raw bytes for `@tlv`, text for everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output<'a> {
    Binary(&'a [u8]),
    Text(String),
}

impl<'a> Output<'a> {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Output::Binary(b) => b,
            Output::Text(s) => s.as_bytes(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Output::Text(s) => Some(s),
            Output::Binary(_) => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Output::Binary(_))
    }
}

/// Render `element` with `modifier`. Preconditions are checked before anything is produced.
pub fn render<'a>(element: &Element<'a>, modifier: Modifier) -> Result<Output<'a>> {
    let resolved = modifier.resolve(element);
    match resolved {
        Format::Tlv => Ok(Output::Binary(element.full)),
        Format::TlvHex => Ok(Output::Text(hex_string(element.full))),
        Format::Hex => Ok(Output::Text(value_hex(element))),
        Format::Int => {
            if !element.is_integer() {
                return Err(incompatible(resolved.modifier(), element));
            }
            Ok(Output::Text(integer_text(element.content)))
        }
        Format::Utf8 => {
            if !element.is_string_type() {
                return Err(Error::Value(format!(
                    "@utf8 requires a string type, found {}",
                    type_name(element)
                )));
            }
            std::str::from_utf8(element.content)
                .map(|s| Output::Text(s.to_string()))
                .map_err(|e| Error::Value(format!("invalid UTF-8: {}", e)))
        }
        Format::Count => {
            if !element.constructed {
                return Err(incompatible(resolved.modifier(), element));
            }
            Ok(Output::Text(element.child_count().to_string()))
        }
        Format::Type => Ok(Output::Text(type_name(element))),
        Format::Pretty => Ok(Output::Text(pretty(element))),
    }
}

fn incompatible(modifier: Modifier, element: &Element<'_>) -> Error {
    let constructed = if element.constructed { "constructed" } else { "primitive" };
    Error::IncompatibleOutputFormat {
        modifier,
        found: format!("{} {}", constructed, type_name(element)),
    }
}

/// Lowercase hex, no separators.
pub fn hex_string(b: &[u8]) -> String {
    hex::encode(b)
}

/// Value bytes as hex: primitive content, or the children's full TLVs (outer header dropped).
fn value_hex(element: &Element<'_>) -> String {
    if element.constructed {
        element.children.iter().map(|c| hex_string(c.full)).collect()
    } else {
        hex_string(element.content)
    }
}

/// Decimal text of big-endian two's-complement `bytes`, any width. Empty is zero.
pub fn integer_text(bytes: &[u8]) -> String {
    let negative = bytes.first().map_or(false, |b| b & 0x80 != 0);
    let mut magnitude = bytes.to_vec();
    if negative {
        for b in magnitude.iter_mut() {
            *b = !*b;
        }
        for b in magnitude.iter_mut().rev() {
            let (v, carry) = b.overflowing_add(1);
            *b = v;
            if !carry {
                break;
            }
        }
    }

    // Repeated division by 10^9; chunks come out least significant first.
    const CHUNK: u64 = 1_000_000_000;
    let mut rest: Vec<u8> = magnitude.into_iter().skip_while(|&b| b == 0).collect();
    let mut chunks: Vec<u64> = Vec::new();
    while !rest.is_empty() {
        let mut rem: u64 = 0;
        let mut quotient = Vec::with_capacity(rest.len());
        for &b in &rest {
            let cur = (rem << 8) | b as u64;
            let q = cur / CHUNK;
            rem = cur % CHUNK;
            if !quotient.is_empty() || q != 0 {
                quotient.push(q as u8);
            }
        }
        chunks.push(rem);
        rest = quotient;
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    match chunks.split_last() {
        None => out.push('0'),
        Some((most, lower)) => {
            out.push_str(&most.to_string());
            for c in lower.iter().rev() {
                out.push_str(&format!("{:09}", c));
            }
        }
    }
    out
}

fn universal_name(tag_number: u64) -> Option<&'static str> {
    Some(match tag_number {
        universal::BOOLEAN => "BOOLEAN",
        universal::INTEGER => "INTEGER",
        universal::BIT_STRING => "BIT STRING",
        universal::OCTET_STRING => "OCTET STRING",
        universal::NULL => "NULL",
        universal::OBJECT_IDENTIFIER => "OBJECT IDENTIFIER",
        universal::UTF8_STRING => "UTF8String",
        universal::SEQUENCE => "SEQUENCE",
        universal::SET => "SET",
        universal::NUMERIC_STRING => "NumericString",
        universal::PRINTABLE_STRING => "PrintableString",
        universal::TELETEX_STRING => "TeletexString",
        universal::VIDEOTEX_STRING => "VideotexString",
        universal::IA5_STRING => "IA5String",
        universal::UTC_TIME => "UTCTime",
        universal::GENERALIZED_TIME => "GeneralizedTime",
        universal::GRAPHIC_STRING => "GraphicString",
        universal::VISIBLE_STRING => "VisibleString",
        universal::GENERAL_STRING => "GeneralString",
        universal::UNIVERSAL_STRING => "UniversalString",
        universal::BMP_STRING => "BMPString",
        _ => return None,
    })
}

/// Type name: ASN.1 name for known UNIVERSAL tags, otherwise `<CLASS> <number>`.
pub fn type_name(element: &Element<'_>) -> String {
    if element.synthetic {
        return "ROOT".to_string();
    }
    if element.class == TagClass::Universal {
        if let Some(name) = universal_name(element.tag_number) {
            return name.to_string();
        }
    }
    format!("{} {}", element.class, element.tag_number)
}

/// Indented tree dump, one line per node plus a value line under primitive leaves.
/// Recursion depth is bounded by the decoder's nesting limit.
pub fn pretty(element: &Element<'_>) -> String {
    let mut lines = Vec::new();
    pretty_lines(element, 0, &mut lines);
    lines.join("\n")
}

fn pretty_lines(element: &Element<'_>, indent: usize, lines: &mut Vec<String>) {
    if element.synthetic {
        for child in &element.children {
            pretty_lines(child, indent, lines);
        }
        return;
    }
    let pad = "  ".repeat(indent);
    let suffix = if element.constructed { " (constructed)" } else { "" };
    lines.push(format!(
        "{}{}{}, length={}",
        pad,
        type_name(element),
        suffix,
        element.length
    ));
    if element.constructed {
        for child in &element.children {
            pretty_lines(child, indent + 1, lines);
        }
    } else if let Some(value) = leaf_summary(element) {
        lines.push(format!("{}  {}", pad, value));
    }
}

fn leaf_summary(element: &Element<'_>) -> Option<String> {
    if element.is_integer() {
        return Some(integer_text(element.content));
    }
    if element.is_string_type() {
        return Some(match std::str::from_utf8(element.content) {
            Ok(s) => format!("\"{}\"", s),
            Err(_) => format!("<invalid utf8> {}", hex_string(element.content)),
        });
    }
    if element.content.is_empty() {
        return None;
    }
    let hex = hex_string(element.content);
    if hex.len() > PREVIEW_HEX_CHARS {
        Some(format!("{}...", &hex[..PREVIEW_HEX_CHARS]))
    } else {
        Some(hex)
    }
}
