//! TLV decoder: turns a byte range into an ordered tree of [`Element`]s.
//!
//! Handles short/long identifier forms, short/long/indefinite lengths and
//! recursive decoding of constructed content. Indefinite-length content is scanned
//! in the same pass: children are decoded one after another until the next two
//! octets are an end-of-contents marker, so an inner indefinite element always
//! consumes its own EOC before the outer scan looks for one.

use crate::element::{Element, Length, TagClass};
use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};

/// Default bound on nested constructed levels.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Decoder settings. Nesting depth is bounded because it is controlled by the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    pub max_depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder { max_depth: DEFAULT_MAX_DEPTH }
    }
}

/// Decode `[start, end)` of `buf` with the default settings.
pub fn decode(buf: &[u8], start: usize, end: usize) -> Result<Vec<Element<'_>>> {
    Decoder::default().decode(buf, start, end)
}

impl Decoder {
    pub fn new(max_depth: usize) -> Self {
        Decoder { max_depth }
    }

    /// Decode `[start, end)` as a sequence of TLVs that covers the range exactly.
    pub fn decode<'a>(&self, buf: &'a [u8], start: usize, end: usize) -> Result<Vec<Element<'a>>> {
        if start > end || end > buf.len() {
            return Err(Error::InvalidEncoding {
                offset: start,
                reason: "range outside buffer",
            });
        }
        let mut reader = Reader {
            buf,
            pos: start,
            max_depth: self.max_depth,
        };
        reader.read_until(end, 0)
    }

    /// Decode the whole buffer under a synthetic root (the starting point of a query).
    pub fn decode_root<'a>(&self, buf: &'a [u8]) -> Result<Element<'a>> {
        let children = self.decode(buf, 0, buf.len())?;
        Ok(Element::root(buf, children))
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    max_depth: usize,
}

impl<'a> Reader<'a> {
    fn read_u8(&mut self, end: usize, offset: usize) -> Result<u8> {
        if self.pos >= end {
            return Err(Error::TruncatedEncoding { offset });
        }
        let v = self.buf[self.pos];
        self.pos += 1;
        Ok(v)
    }

    fn read_until(&mut self, end: usize, depth: usize) -> Result<Vec<Element<'a>>> {
        let mut out = Vec::new();
        while self.pos < end {
            out.push(self.read_element(end, depth)?);
        }
        Ok(out)
    }

    fn read_element(&mut self, end: usize, depth: usize) -> Result<Element<'a>> {
        let offset = self.pos;
        let identifier = self.read_u8(end, offset)?;
        let constructed = identifier & 0x20 != 0;
        let tag_number = if identifier & 0x1f == 0x1f {
            self.read_long_tag(end, offset)?
        } else {
            (identifier & 0x1f) as u64
        };
        let length = self.read_length(end, offset)?;
        let content_start = self.pos;

        if constructed && depth >= self.max_depth {
            return Err(Error::NestingTooDeep {
                offset,
                limit: self.max_depth,
            });
        }

        let (content_end, full_end, children) = match length {
            Length::Definite(n) => {
                if end - content_start < n {
                    return Err(Error::TruncatedEncoding { offset });
                }
                let content_end = content_start + n;
                let children = if constructed {
                    self.read_until(content_end, depth + 1)?
                } else {
                    self.pos = content_end;
                    Vec::new()
                };
                (content_end, content_end, children)
            }
            Length::Indefinite => {
                if !constructed {
                    return Err(Error::InvalidEncoding {
                        offset,
                        reason: "primitive element with indefinite length",
                    });
                }
                let mut children = Vec::new();
                loop {
                    if end - self.pos < 2 {
                        return Err(Error::TruncatedEncoding { offset });
                    }
                    if self.buf[self.pos] == 0 && self.buf[self.pos + 1] == 0 {
                        break;
                    }
                    children.push(self.read_element(end, depth + 1)?);
                }
                let content_end = self.pos;
                self.pos += 2;
                (content_end, self.pos, children)
            }
        };

        Ok(Element {
            class: TagClass::from_identifier(identifier),
            constructed,
            tag_number,
            identifier,
            length,
            offset,
            header: &self.buf[offset..content_start],
            content: &self.buf[content_start..content_end],
            full: &self.buf[offset..full_end],
            children,
            synthetic: false,
        })
    }

    /// Base-128 tag number digits, high bit set on all but the last octet.
    fn read_long_tag(&mut self, end: usize, offset: usize) -> Result<u64> {
        let mut value: u64 = 0;
        loop {
            let b = self.read_u8(end, offset)?;
            if value > (u64::MAX >> 7) {
                return Err(Error::InvalidEncoding {
                    offset,
                    reason: "tag number too large",
                });
            }
            value = (value << 7) | (b & 0x7f) as u64;
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
    }

    fn read_length(&mut self, end: usize, offset: usize) -> Result<Length> {
        let first = self.read_u8(end, offset)?;
        if first & 0x80 == 0 {
            return Ok(Length::Definite(first as usize));
        }
        if first == 0x80 {
            return Ok(Length::Indefinite);
        }
        let n = (first & 0x7f) as usize;
        if n > 8 {
            return Err(Error::InvalidEncoding {
                offset,
                reason: "length too large",
            });
        }
        if end - self.pos < n {
            return Err(Error::TruncatedEncoding { offset });
        }
        let v = BigEndian::read_uint(&self.buf[self.pos..self.pos + n], n);
        self.pos += n;
        usize::try_from(v)
            .map(Length::Definite)
            .map_err(|_| Error::InvalidEncoding {
                offset,
                reason: "length too large",
            })
    }
}
