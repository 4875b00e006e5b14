//! # tlvq: query language for BER/DER TLV data
//!
//! Decodes a buffer of tag-length-value elements into a tree and evaluates small
//! queries against it: navigation steps pick exactly one element, and a modifier
//! renders it as raw bytes or text.
//!
//! ## Query syntax
//!
//! - `.index(n)`: n-th immediate child (decimal or `0x` hex argument)
//! - `.tag(t)`: first descendant, pre-order, whose first identifier octet is `t`
//! - `.decode()`: re-decode the value of an OCTET STRING or BIT STRING
//! - `@tlv`, `@tlvhex`, `@hex`, `@int`, `@utf8`, `@count`, `@type`, `@pretty`, `@auto` (default)
//!
//! Evaluation always starts at a synthetic root whose children are the top-level elements.
//!
//! ## Example
//!
//! ```
//! // SEQUENCE { INTEGER 5, IA5String "Hello" }
//! let input = [0x30, 0x0a, 0x02, 0x01, 0x05, 0x16, 0x05, b'H', b'e', b'l', b'l', b'o'];
//! let q = tlvq::parse(".index(0).index(1)@utf8").unwrap();
//! let out = tlvq::evaluate(&input, &q).unwrap();
//! assert_eq!(out.as_text(), Some("Hello"));
//! ```
//!
//! The library performs no I/O and no logging; the `tlvq` binary wraps it for the command line.

pub mod ast;
pub mod codec;
pub mod dump;
pub mod element;
pub mod error;
pub mod eval;
pub mod parser;
pub mod walk;

pub use ast::{Format, Modifier, Query, Selector};
pub use codec::{decode, Decoder, DEFAULT_MAX_DEPTH};
pub use dump::{render, Output};
pub use element::{Element, Length, TagClass};
pub use error::{Error, Result};
pub use eval::{evaluate, Evaluator};
pub use parser::parse;
pub use walk::{find_tag, select, Selection};
