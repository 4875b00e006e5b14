//! Error type shared by the decoder, the query parser, selection and rendering.

use crate::ast::Modifier;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Input ended inside identifier octets, length octets or content.
    #[error("Truncated encoding at offset {offset}")]
    TruncatedEncoding { offset: usize },
    #[error("Invalid encoding at offset {offset}: {reason}")]
    InvalidEncoding { offset: usize, reason: &'static str },
    #[error("Nesting deeper than {limit} levels at offset {offset}")]
    NestingTooDeep { offset: usize, limit: usize },
    /// `children: None` means the target was not constructed.
    #[error("step {step}: {}", describe_index(.index, .children))]
    IndexOutOfBounds {
        step: usize,
        index: usize,
        children: Option<usize>,
    },
    #[error("step {step}: no descendant with tag 0x{tag:02x}")]
    TagNotFound { step: usize, tag: u8 },
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
    #[error("@{modifier} cannot render {found}")]
    IncompatibleOutputFormat { modifier: Modifier, found: String },
    #[error("Value: {0}")]
    Value(String),
    #[error("Syntax: {0}")]
    Syntax(String),
}

fn describe_index(index: &usize, children: &Option<usize>) -> String {
    match children {
        Some(n) => format!("index {} out of bounds ({} children)", index, n),
        None => format!("index {} on an element that is not constructed", index),
    }
}

impl Error {
    /// True for failures caused by malformed TLV bytes rather than by the query.
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            Error::TruncatedEncoding { .. } | Error::InvalidEncoding { .. } | Error::NestingTooDeep { .. }
        )
    }

    /// True for failures of the query text itself.
    pub fn is_query(&self) -> bool {
        matches!(self, Error::Syntax(_) | Error::InvalidSelector(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_messages_distinguish_primitive_targets() {
        let oob = Error::IndexOutOfBounds { step: 1, index: 5, children: Some(2) };
        assert_eq!(oob.to_string(), "step 1: index 5 out of bounds (2 children)");
        let prim = Error::IndexOutOfBounds { step: 0, index: 0, children: None };
        assert!(prim.to_string().contains("not constructed"));
    }

    #[test]
    fn classification() {
        assert!(Error::TruncatedEncoding { offset: 3 }.is_encoding());
        assert!(Error::Syntax("x".to_string()).is_query());
        assert!(!Error::Value("x".to_string()).is_encoding());
        assert!(!Error::TagNotFound { step: 0, tag: 5 }.is_query());
    }
}
