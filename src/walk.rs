//! Selection engine: applies selector steps to a starting element.
//!
//! The selection is always exactly one element. While it points into the decoded input
//! it is borrowed; after a `decode()` step it is an owned fragment built from the
//! re-decoded value, and later steps move down into that fragment. Evaluation is
//! fail-fast: the first failing step ends the query.
//!
//! | Step | Requires | Result |
//! |------|----------|--------|
//! | `index(n)` | constructed, `n < children` | `children[n]` |
//! | `tag(t)` | a descendant with identifier octet `t` | first such descendant, pre-order |
//! | `decode()` | primitive UNIVERSAL BIT STRING / OCTET STRING | synthetic root over the value |

use crate::ast::Selector;
use crate::codec::Decoder;
use crate::element::{universal, Element, TagClass};
use crate::error::{Error, Result};
use std::borrow::Cow;

/// Current selection: a node of the input tree, or of a fragment produced by `decode()`.
pub type Selection<'t, 'a> = Cow<'t, Element<'a>>;

/// Apply `selectors` in order, starting at `root`.
pub fn select<'t, 'a>(
    root: &'t Element<'a>,
    selectors: &[Selector],
    decoder: &Decoder,
) -> Result<Selection<'t, 'a>> {
    let mut current: Selection<'t, 'a> = Cow::Borrowed(root);
    for (step, selector) in selectors.iter().enumerate() {
        current = apply(current, step, *selector, decoder)?;
    }
    Ok(current)
}

fn apply<'t, 'a>(
    current: Selection<'t, 'a>,
    step: usize,
    selector: Selector,
    decoder: &Decoder,
) -> Result<Selection<'t, 'a>> {
    match selector {
        Selector::Index(index) => match current {
            Cow::Borrowed(e) => child_at(e, step, index).map(Cow::Borrowed),
            Cow::Owned(e) => {
                child_at(&e, step, index)?;
                let children = e.children.len();
                e.children
                    .into_iter()
                    .nth(index)
                    .map(Cow::Owned)
                    .ok_or(Error::IndexOutOfBounds {
                        step,
                        index,
                        children: Some(children),
                    })
            }
        },
        Selector::Tag(tag) => match current {
            Cow::Borrowed(e) => find_tag(e, tag)
                .map(Cow::Borrowed)
                .ok_or(Error::TagNotFound { step, tag }),
            Cow::Owned(e) => tag_path(&e, tag)
                .and_then(|path| take_path(e, &path))
                .map(Cow::Owned)
                .ok_or(Error::TagNotFound { step, tag }),
        },
        Selector::Decode => decode_value(&current, step, decoder).map(Cow::Owned),
    }
}

fn child_at<'t, 'a>(element: &'t Element<'a>, step: usize, index: usize) -> Result<&'t Element<'a>> {
    if !element.constructed {
        return Err(Error::IndexOutOfBounds {
            step,
            index,
            children: None,
        });
    }
    element.children.get(index).ok_or(Error::IndexOutOfBounds {
        step,
        index,
        children: Some(element.children.len()),
    })
}

/// First descendant of `element` (itself excluded) whose first identifier octet equals `tag`,
/// in pre-order: a child's whole subtree is searched before its next sibling.
pub fn find_tag<'t, 'a>(element: &'t Element<'a>, tag: u8) -> Option<&'t Element<'a>> {
    let path = tag_path(element, tag)?;
    path.iter().try_fold(element, |node, &i| node.children.get(i))
}

/// Child indices leading from `element` to the first descendant matching `tag`.
fn tag_path(element: &Element<'_>, tag: u8) -> Option<Vec<usize>> {
    // (depth, index among siblings, node)
    let mut stack: Vec<(usize, usize, &Element<'_>)> = element
        .children
        .iter()
        .enumerate()
        .rev()
        .map(|(i, c)| (0, i, c))
        .collect();
    let mut path = Vec::new();
    while let Some((depth, index, node)) = stack.pop() {
        path.truncate(depth);
        path.push(index);
        if node.identifier == tag {
            return Some(path);
        }
        stack.extend(
            node.children
                .iter()
                .enumerate()
                .rev()
                .map(|(i, c)| (depth + 1, i, c)),
        );
    }
    None
}

/// Move the node at `path` out of an owned fragment.
fn take_path<'a>(mut element: Element<'a>, path: &[usize]) -> Option<Element<'a>> {
    for &i in path {
        element = element.children.into_iter().nth(i)?;
    }
    Some(element)
}

/// Re-decode the value of a primitive OCTET STRING or BIT STRING under a new synthetic root.
fn decode_value<'a>(element: &Element<'a>, step: usize, decoder: &Decoder) -> Result<Element<'a>> {
    let is_string_container = !element.constructed
        && element.class == TagClass::Universal
        && matches!(
            element.tag_number,
            universal::BIT_STRING | universal::OCTET_STRING
        );
    if !is_string_container {
        return Err(Error::Value(format!(
            "step {}: decode() requires a primitive OCTET STRING or BIT STRING",
            step
        )));
    }
    let value: &'a [u8] = if element.tag_number == universal::BIT_STRING {
        match element.content.split_first() {
            Some((_unused_bits, rest)) => rest,
            None => {
                return Err(Error::Value(format!(
                    "step {}: decode() on an empty BIT STRING",
                    step
                )))
            }
        }
    } else {
        element.content
    };
    let children = decoder
        .decode(value, 0, value.len())
        .map_err(|e| Error::Value(format!("step {}: value is not valid TLV: {}", step, e)))?;
    Ok(Element::root(value, children))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(bytes: &[u8]) -> Element<'_> {
        Decoder::default().decode_root(bytes).expect("decode")
    }

    // SEQUENCE { INTEGER 5, IA5String "Hello" }
    const SIMPLE: [u8; 12] = [
        0x30, 0x0a, 0x02, 0x01, 0x05, 0x16, 0x05, b'H', b'e', b'l', b'l', b'o',
    ];

    #[test]
    fn index_walks_children() {
        let r = root(&SIMPLE);
        let sel = select(&r, &[Selector::Index(0), Selector::Index(1)], &Decoder::default())
            .expect("select");
        assert_eq!(sel.content, b"Hello");
        assert!(matches!(sel, Cow::Borrowed(_)));
    }

    #[test]
    fn index_out_of_bounds_and_not_constructed() {
        let r = root(&SIMPLE);
        let d = Decoder::default();
        assert_eq!(
            select(&r, &[Selector::Index(5)], &d).unwrap_err(),
            Error::IndexOutOfBounds { step: 0, index: 5, children: Some(1) }
        );
        assert_eq!(
            select(&r, &[Selector::Index(0), Selector::Index(0), Selector::Index(0)], &d)
                .unwrap_err(),
            Error::IndexOutOfBounds { step: 2, index: 0, children: None }
        );
    }

    #[test]
    fn tag_search_is_preorder_depth_first() {
        // SEQUENCE { SEQUENCE { INTEGER 1 }, INTEGER 2 }
        let bytes = [0x30, 0x08, 0x30, 0x03, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
        let r = root(&bytes);
        let found = find_tag(&r, 0x02).expect("found");
        assert_eq!(found.content, &[0x01]);
        assert_eq!(found.offset, 4);
    }

    #[test]
    fn tag_search_excludes_current() {
        let r = root(&SIMPLE);
        let d = Decoder::default();
        let seq = select(&r, &[Selector::Index(0)], &d).expect("select");
        assert!(find_tag(&seq, 0x30).is_none());
        assert_eq!(
            select(&r, &[Selector::Index(0), Selector::Tag(0x30)], &d).unwrap_err(),
            Error::TagNotFound { step: 1, tag: 0x30 }
        );
        assert!(find_tag(&r, 0x30).is_some());
    }

    #[test]
    fn decode_octet_string() {
        // OCTET STRING { INTEGER 7 }
        let bytes = [0x04, 0x03, 0x02, 0x01, 0x07];
        let r = root(&bytes);
        let sel = select(&r, &[Selector::Index(0), Selector::Decode], &Decoder::default())
            .expect("select");
        assert!(sel.synthetic);
        assert_eq!(sel.children.len(), 1);
        assert_eq!(sel.children[0].content, &[0x07]);
    }

    #[test]
    fn decode_bit_string_strips_unused_bits_octet() {
        // BIT STRING { unused=0, NULL }
        let bytes = [0x03, 0x03, 0x00, 0x05, 0x00];
        let r = root(&bytes);
        let d = Decoder::default();
        let sel = select(&r, &[Selector::Index(0), Selector::Decode, Selector::Index(0)], &d)
            .expect("select");
        assert_eq!(sel.tag_number, universal::NULL);
        assert!(matches!(sel, Cow::Owned(_)));
    }

    #[test]
    fn decode_empty_bit_string_fails() {
        let bytes = [0x03, 0x00];
        let r = root(&bytes);
        let err = select(&r, &[Selector::Index(0), Selector::Decode], &Decoder::default())
            .unwrap_err();
        assert!(matches!(err, Error::Value(_)));
    }

    #[test]
    fn decode_twice_fails() {
        let bytes = [0x04, 0x02, 0x05, 0x00];
        let r = root(&bytes);
        let err = select(
            &r,
            &[Selector::Index(0), Selector::Decode, Selector::Decode],
            &Decoder::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Value(ref m) if m.starts_with("step 2")));
    }

    #[test]
    fn decode_rejects_other_types_and_bad_content() {
        let d = Decoder::default();
        let r = root(&SIMPLE);
        assert!(matches!(
            select(&r, &[Selector::Index(0), Selector::Index(0), Selector::Decode], &d),
            Err(Error::Value(_))
        ));
        let bytes = [0x04, 0x02, 0x30, 0x05];
        let r = root(&bytes);
        assert!(matches!(
            select(&r, &[Selector::Index(0), Selector::Decode], &d),
            Err(Error::Value(_))
        ));
    }

    #[test]
    fn tag_path_follows_preorder() {
        // SEQUENCE { SEQUENCE { NULL }, SEQUENCE { BOOLEAN, INTEGER 9 } }
        let bytes = [
            0x30, 0x0c, 0x30, 0x02, 0x05, 0x00, 0x30, 0x06, 0x01, 0x01, 0x00, 0x02, 0x01, 0x09,
        ];
        let r = root(&bytes);
        assert_eq!(tag_path(&r, 0x02), Some(vec![0, 1, 1]));
        assert_eq!(tag_path(&r, 0x05), Some(vec![0, 0, 0]));
        assert_eq!(tag_path(&r, 0x04), None);
        let owned = r.clone();
        let moved = take_path(owned, &[0, 1, 1]).expect("moved");
        assert_eq!(Some(&moved), find_tag(&r, 0x02));
        assert_eq!(moved.content, &[0x09]);
    }

    #[test]
    fn tag_inside_decoded_fragment() {
        // OCTET STRING { SEQUENCE { BOOLEAN true } }
        let bytes = [0x04, 0x05, 0x30, 0x03, 0x01, 0x01, 0xff];
        let r = root(&bytes);
        let sel = select(
            &r,
            &[Selector::Index(0), Selector::Decode, Selector::Tag(0x01)],
            &Decoder::default(),
        )
        .expect("select");
        assert_eq!(sel.content, &[0xff]);
        assert!(matches!(sel, Cow::Owned(_)));
    }

    #[test]
    fn tag_moves_nested_match_out_of_fragment() {
        // OCTET STRING { SEQUENCE { NULL, SEQUENCE { INTEGER 3 } }, INTEGER 4 }
        let bytes = [
            0x04, 0x0c, 0x30, 0x07, 0x05, 0x00, 0x30, 0x03, 0x02, 0x01, 0x03, 0x02, 0x01, 0x04,
        ];
        let r = root(&bytes);
        let d = Decoder::default();
        let sel = select(&r, &[Selector::Index(0), Selector::Decode, Selector::Tag(0x02)], &d)
            .expect("select");
        assert!(matches!(sel, Cow::Owned(_)));
        assert_eq!(sel.content, &[0x03]);
        assert_eq!(sel.full, &[0x02, 0x01, 0x03]);
        assert_eq!(
            select(&r, &[Selector::Index(0), Selector::Decode, Selector::Tag(0x04)], &d)
                .unwrap_err(),
            Error::TagNotFound { step: 2, tag: 0x04 }
        );
    }
}
