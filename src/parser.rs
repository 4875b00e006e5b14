//! Parse query text into a [`Query`] using PEST.

use crate::ast::{Modifier, Query, Selector};
use crate::error::{Error, Result};
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "query.pest"]
struct QueryParser;

/// Parse a query such as `.index(0).tag(0x04).decode()@hex`.
pub fn parse(source: &str) -> Result<Query> {
    let pairs = QueryParser::parse(Rule::query, source)
        .map_err(|e| Error::Syntax(format!("{}", e)))?;
    let pair = pairs
        .into_iter()
        .next()
        .ok_or_else(|| Error::Syntax("empty query".to_string()))?;
    build_query(pair)
}

fn build_query(pair: pest::iterators::Pair<Rule>) -> Result<Query> {
    let mut selectors = Vec::new();
    let mut modifier = Modifier::Auto;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::step => selectors.push(build_step(inner)?),
            Rule::modifier => modifier = build_modifier(inner)?,
            _ => {}
        }
    }
    Ok(Query { selectors, modifier })
}

fn build_step(pair: pest::iterators::Pair<Rule>) -> Result<Selector> {
    let mut name = "";
    let mut argument = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::step_name => name = inner.as_str(),
            Rule::argument => argument = Some(parse_number(inner.as_str())?),
            _ => {}
        }
    }
    match (name, argument) {
        ("index", Some(n)) => usize::try_from(n)
            .map(Selector::Index)
            .map_err(|_| Error::InvalidSelector(format!("index({}) is too large", n))),
        ("tag", Some(t)) => u8::try_from(t)
            .map(Selector::Tag)
            .map_err(|_| Error::InvalidSelector(format!("tag({}) does not fit in one octet", t))),
        ("decode", None) => Ok(Selector::Decode),
        ("decode", Some(_)) => Err(Error::InvalidSelector("decode() takes no argument".to_string())),
        (other, None) => Err(Error::InvalidSelector(format!("{}() requires an argument", other))),
        (other, Some(_)) => Err(Error::InvalidSelector(format!("unknown selector: {}", other))),
    }
}

fn build_modifier(pair: pest::iterators::Pair<Rule>) -> Result<Modifier> {
    let name = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::modifier_name)
        .map(|p| p.as_str())
        .unwrap_or_default();
    name.parse::<Modifier>().map_err(Error::Syntax)
}

fn parse_number(s: &str) -> Result<u64> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        s.parse::<u64>()
    };
    parsed.map_err(|_| Error::InvalidSelector(format!("argument out of range: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_selector_kinds() {
        let q = parse(".index(0).tag(0x30).decode()@pretty").expect("parse");
        assert_eq!(
            q.selectors,
            vec![Selector::Index(0), Selector::Tag(0x30), Selector::Decode]
        );
        assert_eq!(q.modifier, Modifier::Pretty);
    }

    #[test]
    fn modifier_defaults_to_auto() {
        let q = parse(".index(2)").expect("parse");
        assert_eq!(q.modifier, Modifier::Auto);
    }

    #[test]
    fn number_forms() {
        assert_eq!(parse_number("17"), Ok(17));
        assert_eq!(parse_number("0x1f"), Ok(31));
        assert_eq!(parse_number("0XFF"), Ok(255));
        assert!(parse_number("99999999999999999999999").is_err());
    }
}
