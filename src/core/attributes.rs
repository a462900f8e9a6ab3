//! Attribute scanning
//!
//! Splits the inside of an open tag into attributes and the whitespace
//! between them. Every byte between the element name and the closing `>`
//! or `/>` ends up in exactly one [`TagPart`], so a tag can be written back
//! out unchanged.

use super::scanner::Scanner;
use super::span::Span;
use crate::config::Dialect;

/// Spans of one attribute
///
/// `<a href = "x">` gives name `href`, operator ` = `, outer value `"x"`
/// and value `x`. Valueless HTML attributes (`<input disabled>`) have no
/// operator and no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpans {
    pub name: Span,
    /// `=` including the whitespace around it
    pub operator: Option<Span>,
    /// Value including its quotes
    pub value_outer: Option<Span>,
    /// Value without quotes
    pub value: Option<Span>,
}

impl AttributeSpans {
    /// Span of the whole attribute, from the name to the end of the value
    pub fn span(&self) -> Span {
        let end = self
            .value_outer
            .or(self.operator)
            .map_or(self.name.end(), |s| s.end());
        Span::from_range(self.name.start(), end)
    }

    /// Value bytes, empty for a valueless attribute
    #[inline]
    pub fn value_bytes<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        self.value.map_or(&[], |v| v.slice(input))
    }
}

/// One piece of an open tag between the element name and its end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagPart {
    Attribute(AttributeSpans),
    /// Whitespace between attributes (in HTML also stray bytes such as a
    /// lone `/`)
    Whitespace(Span),
}

impl TagPart {
    pub fn span(&self) -> Span {
        match self {
            TagPart::Attribute(attr) => attr.span(),
            TagPart::Whitespace(span) => *span,
        }
    }
}

/// How an open tag ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagEnd {
    /// `>`
    Open(Span),
    /// `/>`
    SelfClosing(Span),
}

/// Reason a tag could not be scanned. The tokenizer turns these into
/// errors (XML) or falls back to literal text (HTML).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagFault {
    /// Input ended inside the tag
    Eof,
    /// Bad name start at this offset
    InvalidName(usize),
    /// Syntax the dialect does not allow
    Malformed(&'static str, usize),
    /// Quote opened at this offset never closes
    UnterminatedValue(usize),
}

/// Scan attributes and whitespace up to and including the tag end.
///
/// `parts` is the caller's scratch buffer; it is cleared first and reused
/// across tags.
pub(crate) fn scan_tag_parts(
    cursor: &mut Scanner<'_>,
    dialect: Dialect,
    parts: &mut Vec<TagPart>,
) -> Result<TagEnd, TagFault> {
    parts.clear();
    let strict = dialect.is_strict();
    // The element name itself is not a separator
    let mut separated = false;

    loop {
        if let Some(ws) = cursor.take_whitespace() {
            parts.push(TagPart::Whitespace(ws));
            separated = true;
            continue;
        }

        let pos = cursor.position();
        match (cursor.peek(), cursor.peek_at(1)) {
            (None, _) => return Err(TagFault::Eof),
            (Some(b'>'), _) => {
                cursor.advance(1);
                return Ok(TagEnd::Open(Span::from_range(pos, pos + 1)));
            }
            (Some(b'/'), Some(b'>')) => {
                cursor.advance(2);
                return Ok(TagEnd::SelfClosing(Span::from_range(pos, pos + 2)));
            }
            (Some(b'/'), _) => {
                if strict {
                    return Err(TagFault::Malformed("unexpected '/' inside tag", pos));
                }
                cursor.advance(1);
                parts.push(TagPart::Whitespace(Span::from_range(pos, pos + 1)));
                separated = true;
            }
            (Some(_), _) => {
                if strict && !separated {
                    return Err(TagFault::Malformed(
                        "attributes must be preceded by whitespace",
                        pos,
                    ));
                }
                let attr = scan_attribute(cursor, strict)?;
                parts.push(TagPart::Attribute(attr));
                separated = false;
            }
        }
    }
}

fn scan_attribute(cursor: &mut Scanner<'_>, strict: bool) -> Result<AttributeSpans, TagFault> {
    let start = cursor.position();
    let name = if strict {
        cursor.read_name().ok_or(TagFault::InvalidName(start))?
    } else {
        match cursor.read_loose_name(b"=") {
            Some(name) => name,
            None => {
                // `<a =x>`: the '=' becomes the name
                cursor.advance(1);
                Span::from_range(start, start + 1)
            }
        }
    };

    let after_name = cursor.position();
    cursor.take_whitespace();
    if cursor.peek() != Some(b'=') {
        cursor.set_position(after_name);
        if strict {
            return Err(TagFault::Malformed("attribute value required", after_name));
        }
        return Ok(AttributeSpans {
            name,
            operator: None,
            value_outer: None,
            value: None,
        });
    }
    cursor.advance(1);
    cursor.take_whitespace();
    let operator = Span::from_range(after_name, cursor.position());

    let open = cursor.position();
    let (value_outer, value) = match cursor.peek() {
        None => return Err(TagFault::Eof),
        Some(quote @ (b'"' | b'\'')) => {
            cursor.advance(1);
            let close = cursor
                .find_byte(quote)
                .ok_or(TagFault::UnterminatedValue(open))?;
            if strict {
                if let Some(lt) = memchr::memchr(b'<', &cursor.input()[open + 1..close]) {
                    return Err(TagFault::Malformed(
                        "'<' not allowed in attribute value",
                        open + 1 + lt,
                    ));
                }
            }
            cursor.set_position(close + 1);
            (
                Span::from_range(open, close + 1),
                Span::from_range(open + 1, close),
            )
        }
        Some(_) => {
            if strict {
                return Err(TagFault::Malformed("attribute value must be quoted", open));
            }
            while let Some(b) = cursor.peek() {
                if super::scanner::is_whitespace(b) || b == b'>' {
                    break;
                }
                cursor.advance(1);
            }
            let span = Span::from_range(open, cursor.position());
            (span, span)
        }
    };

    Ok(AttributeSpans {
        name,
        operator: Some(operator),
        value_outer: Some(value_outer),
        value: Some(value),
    })
}

/// Iterate over the attributes among tag parts
pub fn attributes(parts: &[TagPart]) -> impl Iterator<Item = &AttributeSpans> {
    parts.iter().filter_map(|part| match part {
        TagPart::Attribute(attr) => Some(attr),
        TagPart::Whitespace(_) => None,
    })
}

/// First attribute called `name`
pub fn find_attribute<'p>(
    parts: &'p [TagPart],
    input: &[u8],
    name: &[u8],
    ignore_case: bool,
) -> Option<&'p AttributeSpans> {
    attributes(parts).find(|attr| names_equal(attr.name.slice(input), name, ignore_case))
}

/// Name span of the first attribute repeating an earlier one
pub(crate) fn find_duplicate(parts: &[TagPart], input: &[u8], ignore_case: bool) -> Option<Span> {
    let attrs: Vec<&AttributeSpans> = attributes(parts).collect();
    attrs.iter().enumerate().find_map(|(i, attr)| {
        let name = attr.name.slice(input);
        attrs[..i]
            .iter()
            .any(|prev| names_equal(prev.name.slice(input), name, ignore_case))
            .then_some(attr.name)
    })
}

#[inline]
pub(crate) fn names_equal(a: &[u8], b: &[u8], ignore_case: bool) -> bool {
    if ignore_case {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}
