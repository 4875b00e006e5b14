//! One-shot evaluation: decode a buffer, walk the query's selectors, render the result.

use crate::ast::Query;
use crate::codec::Decoder;
use crate::dump::{render, Output};
use crate::error::Result;
use crate::parser::parse;
use crate::walk::select;

/// Evaluates queries against input buffers. Holds only configuration; every call is
/// independent and the decoded tree is dropped when the call returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    pub decoder: Decoder,
}

impl Evaluator {
    pub fn new(decoder: Decoder) -> Self {
        Evaluator { decoder }
    }

    /// Decode all of `input`, then apply `query`. Decoding completes before any step runs.
    pub fn evaluate<'a>(&self, input: &'a [u8], query: &Query) -> Result<Output<'a>> {
        let root = self.decoder.decode_root(input)?;
        let selection = select(&root, &query.selectors, &self.decoder)?;
        render(&selection, query.modifier)
    }

    /// Parse `source` and evaluate it. Query errors are reported before the input is decoded.
    pub fn evaluate_str<'a>(&self, input: &'a [u8], source: &str) -> Result<Output<'a>> {
        let query = parse(source)?;
        self.evaluate(input, &query)
    }
}

/// Evaluate `query` against `input` with default decoder settings.
pub fn evaluate<'a>(input: &'a [u8], query: &Query) -> Result<Output<'a>> {
    Evaluator::default().evaluate(input, query)
}
