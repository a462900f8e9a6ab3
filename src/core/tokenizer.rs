//! Markup tokenizer - pull-based scanner for XML and HTML
//!
//! Extracts one structural token per call:
//! - Text runs between constructs
//! - Open/standalone tags (attributes go to a reusable scratch buffer)
//! - Close tags
//! - Comments, CDATA sections
//! - DOCTYPE, XML declaration, processing instructions
//!
//! Under [`Dialect::Xml`] anything malformed is an error carrying its
//! position and the scan stops. Under [`Dialect::Html`] a `<` that does not
//! start a complete construct is returned as text instead.
//!
//! After an open tag the caller may switch the tokenizer into literal mode
//! ([`Tokenizer::set_literal_until`]): everything up to the matching close
//! tag is then returned as a single text token.

use super::attributes::{find_duplicate, scan_tag_parts, TagEnd, TagFault, TagPart};
use super::position::{Position, PositionTracker};
use super::scanner::{is_name_start_char, Scanner};
use super::span::Span;
use crate::config::Dialect;
use crate::error::{Construct, ParseError, ParseWarning};

/// Current scanning state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Between constructs
    Content,
    /// Inside a raw-text element body
    Literal,
    /// End of input reached or an error was returned
    Done,
}

/// `<name ...>` or `<name .../>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenTag {
    /// `<name`
    pub start: Span,
    pub name: Span,
    pub end: TagEnd,
}

/// `</name >`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseTag {
    /// `</name`
    pub start: Span,
    pub name: Span,
    /// Anything between the name and `>`
    pub whitespace: Option<Span>,
    /// `>`
    pub end: Span,
}

/// Parts of `<!DOCTYPE root PUBLIC "pub" "sys" [subset]>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocTypeSpans {
    pub span: Span,
    /// `DOCTYPE` as written
    pub keyword: Span,
    pub root: Option<Span>,
    /// `PUBLIC` or `SYSTEM` as written
    pub kind: Option<Span>,
    pub public_id: Option<Span>,
    pub system_id: Option<Span>,
    /// Between `[` and `]`
    pub internal_subset: Option<Span>,
}

/// Parts of `<?xml version="1.0" encoding="UTF-8" standalone="yes"?>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlDeclSpans {
    pub span: Span,
    /// `xml`
    pub keyword: Span,
    pub version: Option<Span>,
    pub encoding: Option<Span>,
    pub standalone: Option<Span>,
}

/// A structural token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Text(Span),
    Comment { span: Span, content: Span },
    CData { span: Span, content: Span },
    DocType(DocTypeSpans),
    XmlDeclaration(XmlDeclSpans),
    ProcessingInstruction {
        span: Span,
        target: Span,
        content: Option<Span>,
    },
    /// Attributes are in [`Tokenizer::tag_parts`] until the next call
    OpenTag(OpenTag),
    CloseTag(CloseTag),
}

impl Token {
    /// Source span of the whole token
    pub fn span(&self) -> Span {
        match self {
            Token::Text(span)
            | Token::Comment { span, .. }
            | Token::CData { span, .. }
            | Token::ProcessingInstruction { span, .. } => *span,
            Token::DocType(doctype) => doctype.span,
            Token::XmlDeclaration(decl) => decl.span,
            Token::OpenTag(tag) => {
                let end = match tag.end {
                    TagEnd::Open(end) | TagEnd::SelfClosing(end) => end,
                };
                tag.start.join(end)
            }
            Token::CloseTag(tag) => tag.start.join(tag.end),
        }
    }
}

/// Pull-based markup tokenizer
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    dialect: Dialect,
    state: ParseState,
    /// Attribute scratch buffer, reused for every open tag
    parts: Vec<TagPart>,
    /// Element name ending literal mode
    literal: Vec<u8>,
    tracker: PositionTracker,
    warnings: Vec<ParseWarning>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8], dialect: Dialect) -> Self {
        Tokenizer {
            scanner: Scanner::new(input),
            dialect,
            state: ParseState::Content,
            parts: Vec::with_capacity(8), // Most elements have < 8 attrs
            literal: Vec::new(),
            tracker: PositionTracker::new(),
            warnings: Vec::new(),
        }
    }

    #[inline]
    pub fn input(&self) -> &'a [u8] {
        self.scanner.input()
    }

    #[inline]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Attributes and whitespace of the last open tag
    #[inline]
    pub fn tag_parts(&self) -> &[TagPart] {
        &self.parts
    }

    /// Current byte offset
    #[inline]
    pub fn offset(&self) -> usize {
        self.scanner.position()
    }

    /// Treat the input as text up to the next `</name`.
    pub fn set_literal_until(&mut self, name: &[u8]) {
        if self.state == ParseState::Done {
            return;
        }
        self.literal.clear();
        self.literal.extend_from_slice(name);
        self.state = ParseState::Literal;
    }

    /// Move the position tracker to `offset` and return its position.
    /// Callers advance in document order.
    pub fn position_at(&mut self, offset: usize) -> Position {
        self.tracker.advance_to(self.scanner.input(), offset)
    }

    /// Position of `offset` without moving the tracker
    pub fn locate(&self, offset: usize) -> Position {
        self.tracker.peek(self.scanner.input(), offset)
    }

    /// Warnings raised since the last drain
    pub fn drain_warnings(&mut self) -> std::vec::Drain<'_, ParseWarning> {
        self.warnings.drain(..)
    }

    /// Get the next token, or None at end of input.
    ///
    /// After an error every further call returns `Ok(None)`.
    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        let result = self.scan();
        if result.is_err() {
            self.state = ParseState::Done;
        }
        result
    }

    fn scan(&mut self) -> Result<Option<Token>, ParseError> {
        loop {
            match self.state {
                ParseState::Done => return Ok(None),
                ParseState::Literal => {
                    if let Some(token) = self.scan_literal()? {
                        return Ok(Some(token));
                    }
                    continue;
                }
                ParseState::Content => {}
            }

            if self.scanner.is_eof() {
                self.state = ParseState::Done;
                return Ok(None);
            }

            let start = self.scanner.position();
            if self.scanner.peek() != Some(b'<') {
                let end = self
                    .scanner
                    .find_tag_start()
                    .unwrap_or(self.scanner.input().len());
                self.scanner.set_position(end);
                return Ok(Some(Token::Text(Span::from_range(start, end))));
            }
            return self.scan_markup(start).map(Some);
        }
    }

    /// Body of a raw-text element. Returns None when it is empty.
    fn scan_literal(&mut self) -> Result<Option<Token>, ParseError> {
        let start = self.scanner.position();
        let ignore_case = self.dialect.ignores_case();
        self.state = ParseState::Content;

        let end = match self.scanner.find_close_tag(&self.literal, ignore_case) {
            Some(end) => end,
            None if self.dialect.is_strict() => {
                return Err(ParseError::Unterminated {
                    construct: Construct::RawText,
                    position: self.locate(start),
                });
            }
            None => self.scanner.input().len(),
        };

        self.scanner.set_position(end);
        Ok((end > start).then(|| Token::Text(Span::from_range(start, end))))
    }

    /// Dispatch on the bytes following '<'
    fn scan_markup(&mut self, start: usize) -> Result<Token, ParseError> {
        if self.scanner.starts_with(b"<!--") {
            self.scan_comment(start)
        } else if self.scanner.starts_with(b"<![CDATA[") {
            self.scan_cdata(start)
        } else if self.scanner.starts_with_ignore_case(b"<!DOCTYPE") {
            self.scan_doctype(start)
        } else if self.scanner.starts_with(b"<?") {
            self.scan_pi(start)
        } else if self.scanner.starts_with(b"</") {
            self.scan_close_tag(start)
        } else if self.scanner.peek_at(1).is_some_and(is_name_start_char) {
            self.scan_open_tag(start)
        } else {
            self.reject(start, Construct::OpenTag, TagFault::InvalidName(start + 1))
        }
    }

    fn scan_comment(&mut self, start: usize) -> Result<Token, ParseError> {
        let content_start = start + 4;
        self.scanner.set_position(content_start);
        match self.scanner.find_seq(b"-->") {
            Some(end) => {
                self.scanner.set_position(end + 3);
                Ok(Token::Comment {
                    span: Span::from_range(start, end + 3),
                    content: Span::from_range(content_start, end),
                })
            }
            None => self.reject(start, Construct::Comment, TagFault::Eof),
        }
    }

    fn scan_cdata(&mut self, start: usize) -> Result<Token, ParseError> {
        let content_start = start + 9;
        self.scanner.set_position(content_start);
        match self.scanner.find_seq(b"]]>") {
            Some(end) => {
                self.scanner.set_position(end + 3);
                Ok(Token::CData {
                    span: Span::from_range(start, end + 3),
                    content: Span::from_range(content_start, end),
                })
            }
            None => self.reject(start, Construct::CData, TagFault::Eof),
        }
    }

    /// `<!DOCTYPE` root, external id and internal subset. Unknown trailing
    /// content up to `>` is tolerated in both dialects.
    fn scan_doctype(&mut self, start: usize) -> Result<Token, ParseError> {
        let keyword = Span::from_range(start + 2, start + 9);
        self.scanner.set_position(start + 9);
        let mut doctype = DocTypeSpans {
            span: Span::empty_at(start),
            keyword,
            root: None,
            kind: None,
            public_id: None,
            system_id: None,
            internal_subset: None,
        };

        self.scanner.take_whitespace();
        doctype.root = self.scanner.read_loose_name(b"[");
        self.scanner.take_whitespace();

        if self.scanner.starts_with_ignore_case(b"PUBLIC") {
            doctype.kind = Some(self.keyword_span(6));
            self.scanner.take_whitespace();
            doctype.public_id = self.quoted();
            self.scanner.take_whitespace();
            doctype.system_id = self.quoted();
        } else if self.scanner.starts_with_ignore_case(b"SYSTEM") {
            doctype.kind = Some(self.keyword_span(6));
            self.scanner.take_whitespace();
            doctype.system_id = self.quoted();
        }
        self.scanner.take_whitespace();

        if self.scanner.peek() == Some(b'[') {
            let subset_start = self.scanner.position() + 1;
            self.scanner.advance(1);
            match self.find_subset_end() {
                Some(close) => {
                    doctype.internal_subset = Some(Span::from_range(subset_start, close));
                    self.scanner.set_position(close + 1);
                }
                None => return self.reject(start, Construct::DocType, TagFault::Eof),
            }
        }

        let end = if self.scanner.peek() == Some(b'>') {
            self.scanner.position()
        } else {
            match self.scanner.find_byte(b'>') {
                Some(end) => end,
                None => return self.reject(start, Construct::DocType, TagFault::Eof),
            }
        };
        self.scanner.set_position(end + 1);
        doctype.span = Span::from_range(start, end + 1);
        Ok(Token::DocType(doctype))
    }

    /// Closing `]` of an internal subset: one followed by optional
    /// whitespace and `>`
    fn find_subset_end(&self) -> Option<usize> {
        let mut probe = self.scanner.clone();
        loop {
            let close = probe.find_byte(b']')?;
            probe.set_position(close + 1);
            probe.take_whitespace();
            if probe.peek() == Some(b'>') {
                return Some(close);
            }
        }
    }

    fn keyword_span(&mut self, len: usize) -> Span {
        let pos = self.scanner.position();
        self.scanner.advance(len);
        Span::from_range(pos, pos + len)
    }

    /// Inner span of a quoted literal at the cursor, consumed only if the
    /// closing quote exists
    fn quoted(&mut self) -> Option<Span> {
        let quote = self.scanner.peek().filter(|&b| b == b'"' || b == b'\'')?;
        let open = self.scanner.position();
        self.scanner.advance(1);
        match self.scanner.find_byte(quote) {
            Some(close) => {
                self.scanner.set_position(close + 1);
                Some(Span::from_range(open + 1, close))
            }
            None => {
                self.scanner.set_position(open);
                None
            }
        }
    }

    /// `<?target content?>`, or the XML declaration when the target is `xml`
    fn scan_pi(&mut self, start: usize) -> Result<Token, ParseError> {
        self.scanner.set_position(start + 2);
        let Some(target) = self.scanner.read_name() else {
            return self.reject(
                start,
                Construct::ProcessingInstruction,
                TagFault::InvalidName(start + 2),
            );
        };

        let is_xml = if self.dialect.is_strict() {
            target.slice(self.input()) == b"xml"
        } else {
            target.slice(self.input()).eq_ignore_ascii_case(b"xml")
        };
        let construct = if is_xml {
            Construct::XmlDeclaration
        } else {
            Construct::ProcessingInstruction
        };

        let Some(close) = self.scanner.find_seq(b"?>") else {
            return self.reject(start, construct, TagFault::Eof);
        };

        if is_xml {
            return self.scan_xml_declaration(start, target, close);
        }

        let separated = self.scanner.take_whitespace().is_some();
        let content_start = self.scanner.position();
        if !separated && content_start != close && self.dialect.is_strict() {
            return Err(ParseError::InvalidName {
                position: self.locate(content_start),
            });
        }
        self.scanner.set_position(close + 2);
        Ok(Token::ProcessingInstruction {
            span: Span::from_range(start, close + 2),
            target,
            content: (close > content_start).then(|| Span::from_range(content_start, close)),
        })
    }

    fn scan_xml_declaration(
        &mut self,
        start: usize,
        keyword: Span,
        close: usize,
    ) -> Result<Token, ParseError> {
        let strict = self.dialect.is_strict();
        if strict && start != 0 {
            return Err(ParseError::MisplacedDeclaration {
                position: self.locate(start),
            });
        }

        let mut decl = XmlDeclSpans {
            span: Span::from_range(start, close + 2),
            keyword,
            version: None,
            encoding: None,
            standalone: None,
        };

        // Pseudo-attributes, scanned over the declaration body only
        let input = self.input();
        let mut body = Scanner::new(&input[..close]);
        body.set_position(keyword.end());
        let mut well_formed = true;
        loop {
            let separated = body.take_whitespace().is_some();
            if body.is_eof() {
                break;
            }
            let Some(name) = body.read_name().filter(|_| separated) else {
                well_formed = false;
                break;
            };
            body.take_whitespace();
            if body.peek() != Some(b'=') {
                well_formed = false;
                break;
            }
            body.advance(1);
            body.take_whitespace();
            let Some(quote) = body.peek().filter(|&b| b == b'"' || b == b'\'') else {
                well_formed = false;
                break;
            };
            let open = body.position();
            body.advance(1);
            let Some(end) = body.find_byte(quote) else {
                well_formed = false;
                break;
            };
            body.set_position(end + 1);
            let value = Some(Span::from_range(open + 1, end));
            match name.slice(input) {
                b"version" => decl.version = value,
                b"encoding" => decl.encoding = value,
                b"standalone" => decl.standalone = value,
                _ => well_formed = false,
            }
        }

        if strict && (!well_formed || decl.version.is_none()) {
            return Err(ParseError::MisplacedDeclaration {
                position: self.locate(start),
            });
        }

        self.scanner.set_position(close + 2);
        Ok(Token::XmlDeclaration(decl))
    }

    fn scan_close_tag(&mut self, start: usize) -> Result<Token, ParseError> {
        self.scanner.set_position(start + 2);
        let Some(name) = self.scanner.read_name() else {
            return self.reject(start, Construct::CloseTag, TagFault::InvalidName(start + 2));
        };
        let mut whitespace = self.scanner.take_whitespace();

        let end = match self.scanner.peek() {
            Some(b'>') => self.scanner.position(),
            None => return self.reject(start, Construct::CloseTag, TagFault::Eof),
            Some(_) if self.dialect.is_strict() => {
                return Err(ParseError::MalformedAttribute {
                    reason: "close tag cannot contain attributes",
                    position: self.locate(self.scanner.position()),
                });
            }
            Some(_) => match self.scanner.find_byte(b'>') {
                Some(end) => {
                    whitespace = Some(Span::from_range(name.end(), end));
                    end
                }
                None => return self.reject(start, Construct::CloseTag, TagFault::Eof),
            },
        };

        self.scanner.set_position(end + 1);
        Ok(Token::CloseTag(CloseTag {
            start: Span::from_range(start, name.end()),
            name,
            whitespace,
            end: Span::from_range(end, end + 1),
        }))
    }

    fn scan_open_tag(&mut self, start: usize) -> Result<Token, ParseError> {
        self.scanner.set_position(start + 1);
        let Some(name) = self.scanner.read_name() else {
            return self.reject(start, Construct::OpenTag, TagFault::InvalidName(start + 1));
        };

        let end = match scan_tag_parts(&mut self.scanner, self.dialect, &mut self.parts) {
            Ok(end) => end,
            Err(fault) => return self.reject(start, Construct::OpenTag, fault),
        };

        let input = self.scanner.input();
        if let Some(dup) = find_duplicate(&self.parts, input, self.dialect.ignores_case()) {
            let name = String::from_utf8_lossy(dup.slice(input)).into_owned();
            let position = self.locate(dup.start());
            if self.dialect.is_strict() {
                return Err(ParseError::DuplicateAttribute { name, position });
            }
            self.warnings
                .push(ParseWarning::DuplicateAttribute { name, position });
        }

        Ok(Token::OpenTag(OpenTag {
            start: Span::from_range(start, name.end()),
            name,
            end,
        }))
    }

    /// Failure at a `<`: an error under XML, literal text under HTML
    fn reject(&mut self, start: usize, construct: Construct, fault: TagFault) -> Result<Token, ParseError> {
        self.parts.clear();
        if self.dialect.is_strict() {
            return Err(self.fault_error(start, construct, fault));
        }

        // The '<' and everything up to the next '<' become text
        self.scanner.set_position(start + 1);
        let end = self
            .scanner
            .find_tag_start()
            .unwrap_or(self.scanner.input().len());
        self.scanner.set_position(end);
        Ok(Token::Text(Span::from_range(start, end)))
    }

    fn fault_error(&self, start: usize, construct: Construct, fault: TagFault) -> ParseError {
        match fault {
            TagFault::Eof => ParseError::Unterminated {
                construct,
                position: self.locate(start),
            },
            TagFault::InvalidName(offset) => ParseError::InvalidName {
                position: self.locate(offset),
            },
            TagFault::Malformed(reason, offset) => ParseError::MalformedAttribute {
                reason,
                position: self.locate(offset),
            },
            TagFault::UnterminatedValue(offset) => ParseError::Unterminated {
                construct: Construct::AttributeValue,
                position: self.locate(offset),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attributes::attributes;

    fn tokens(input: &[u8], dialect: Dialect) -> Result<Vec<Token>, ParseError> {
        let mut tokenizer = Tokenizer::new(input, dialect);
        let mut out = Vec::new();
        while let Some(token) = tokenizer.next_token()? {
            out.push(token);
        }
        Ok(out)
    }

    fn text_of(input: &[u8], span: Span) -> &str {
        span.as_str(input).unwrap()
    }

    #[test]
    fn test_simple_element() {
        let input = b"<root>text</root>";
        let toks = tokens(input, Dialect::Xml).unwrap();
        assert_eq!(toks.len(), 3);
        match toks[0] {
            Token::OpenTag(tag) => {
                assert_eq!(text_of(input, tag.name), "root");
                assert_eq!(text_of(input, tag.start), "<root");
                assert_eq!(tag.end, TagEnd::Open(Span::from_range(5, 6)));
            }
            ref other => panic!("unexpected {other:?}"),
        }
        assert_eq!(toks[1], Token::Text(Span::from_range(6, 10)));
        assert!(matches!(toks[2], Token::CloseTag(_)));
    }

    #[test]
    fn test_tokens_cover_input() {
        let input = b"<?xml version=\"1.0\"?>\n<!DOCTYPE a>\n<a x=\"1\"><!--c--><![CDATA[d]]><?pi data?></a >";
        let toks = tokens(input, Dialect::Xml).unwrap();
        let mut offset = 0;
        for token in &toks {
            assert_eq!(token.span().start(), offset);
            offset = token.span().end();
        }
        assert_eq!(offset, input.len());
    }

    #[test]
    fn test_attributes_in_scratch() {
        let input = b"<a href=\"x\" id='y'/>";
        let mut tokenizer = Tokenizer::new(input, Dialect::Xml);
        let token = tokenizer.next_token().unwrap().unwrap();
        assert!(matches!(
            token,
            Token::OpenTag(OpenTag {
                end: TagEnd::SelfClosing(_),
                ..
            })
        ));
        let names: Vec<_> = attributes(tokenizer.tag_parts())
            .map(|a| text_of(input, a.name))
            .collect();
        assert_eq!(names, ["href", "id"]);
    }

    #[test]
    fn test_comment_and_cdata_content() {
        let input = b"<!-- hi --><![CDATA[<x>]]>";
        let toks = tokens(input, Dialect::Xml).unwrap();
        match (toks[0], toks[1]) {
            (Token::Comment { content: c, .. }, Token::CData { content: d, .. }) => {
                assert_eq!(text_of(input, c), " hi ");
                assert_eq!(text_of(input, d), "<x>");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_doctype_parts() {
        let input = b"<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0//EN\" \"x.dtd\" [<!ENTITY a \"b\">]>";
        let toks = tokens(input, Dialect::Xml).unwrap();
        let Token::DocType(doctype) = toks[0] else {
            panic!("expected doctype");
        };
        assert_eq!(text_of(input, doctype.keyword), "DOCTYPE");
        assert_eq!(text_of(input, doctype.root.unwrap()), "html");
        assert_eq!(text_of(input, doctype.kind.unwrap()), "PUBLIC");
        assert_eq!(text_of(input, doctype.public_id.unwrap()), "-//W3C//DTD XHTML 1.0//EN");
        assert_eq!(text_of(input, doctype.system_id.unwrap()), "x.dtd");
        assert_eq!(text_of(input, doctype.internal_subset.unwrap()), "<!ENTITY a \"b\">");
        assert_eq!(doctype.span.end(), input.len());
    }

    #[test]
    fn test_html_doctype_lowercase() {
        let input = b"<!doctype html><p>";
        let toks = tokens(input, Dialect::Html).unwrap();
        let Token::DocType(doctype) = toks[0] else {
            panic!("expected doctype");
        };
        assert_eq!(text_of(input, doctype.keyword), "doctype");
        assert!(doctype.kind.is_none());
    }

    #[test]
    fn test_xml_declaration() {
        let input = b"<?xml version=\"1.0\" encoding='UTF-8' standalone=\"yes\"?><a/>";
        let toks = tokens(input, Dialect::Xml).unwrap();
        let Token::XmlDeclaration(decl) = toks[0] else {
            panic!("expected declaration");
        };
        assert_eq!(text_of(input, decl.version.unwrap()), "1.0");
        assert_eq!(text_of(input, decl.encoding.unwrap()), "UTF-8");
        assert_eq!(text_of(input, decl.standalone.unwrap()), "yes");
    }

    #[test]
    fn test_xml_declaration_must_be_first() {
        let err = tokens(b"\n<?xml version=\"1.0\"?><a/>", Dialect::Xml).unwrap_err();
        match err {
            ParseError::MisplacedDeclaration { position } => {
                assert_eq!((position.line, position.column), (2, 1));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_processing_instruction() {
        let input = b"<?php echo 1; ?><?empty?>";
        let toks = tokens(input, Dialect::Html).unwrap();
        match (toks[0], toks[1]) {
            (
                Token::ProcessingInstruction {
                    target,
                    content: Some(content),
                    ..
                },
                Token::ProcessingInstruction { content: None, .. },
            ) => {
                assert_eq!(text_of(input, target), "php");
                assert_eq!(text_of(input, content), "echo 1; ");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_close_tag_whitespace() {
        let input = b"</div  >";
        let toks = tokens(input, Dialect::Xml).unwrap();
        let Token::CloseTag(tag) = toks[0] else {
            panic!("expected close tag");
        };
        assert_eq!(text_of(input, tag.start), "</div");
        assert_eq!(text_of(input, tag.whitespace.unwrap()), "  ");
    }

    #[test]
    fn test_strict_unterminated_comment() {
        let err = tokens(b"<a><!-- never", Dialect::Xml).unwrap_err();
        match err {
            ParseError::Unterminated {
                construct,
                position,
            } => {
                assert_eq!(construct, Construct::Comment);
                assert_eq!(position.offset, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_strict_invalid_name() {
        let err = tokens(b"<a>1 < 2</a>", Dialect::Xml).unwrap_err();
        assert!(matches!(err, ParseError::InvalidName { position } if position.offset == 6));
    }

    #[test]
    fn test_strict_duplicate_attribute() {
        let err = tokens(b"<a x=\"1\" x=\"2\"/>", Dialect::Xml).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateAttribute { ref name, .. } if name == "x"));
    }

    #[test]
    fn test_html_duplicate_attribute_warns() {
        let mut tokenizer = Tokenizer::new(b"<a x=1 X=2>", Dialect::Html);
        assert!(tokenizer.next_token().unwrap().is_some());
        let warnings: Vec<_> = tokenizer.drain_warnings().collect();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_html_stray_lt_is_text() {
        let input = b"1 < 2 <b>x</b>";
        let toks = tokens(input, Dialect::Html).unwrap();
        assert_eq!(toks[0], Token::Text(Span::from_range(0, 2)));
        assert_eq!(toks[1], Token::Text(Span::from_range(2, 6)));
        assert!(matches!(toks[2], Token::OpenTag(_)));
    }

    #[test]
    fn test_html_unterminated_tag_is_text() {
        let input = b"<p>a<b class=\"x";
        let toks = tokens(input, Dialect::Html).unwrap();
        assert_eq!(toks.last(), Some(&Token::Text(Span::from_range(4, input.len()))));
    }

    #[test]
    fn test_literal_mode() {
        let input = b"<script>if (a<b) x = '</p>';</SCRIPT>";
        let mut tokenizer = Tokenizer::new(input, Dialect::Html);
        assert!(matches!(tokenizer.next_token(), Ok(Some(Token::OpenTag(_)))));
        tokenizer.set_literal_until(b"script");
        let Ok(Some(Token::Text(body))) = tokenizer.next_token() else {
            panic!("expected literal text");
        };
        assert_eq!(text_of(input, body), "if (a<b) x = '</p>';");
        assert!(matches!(tokenizer.next_token(), Ok(Some(Token::CloseTag(_)))));
    }

    #[test]
    fn test_literal_mode_unterminated() {
        let input = b"<style>a{}";
        let mut html = Tokenizer::new(input, Dialect::Html);
        html.next_token().unwrap();
        html.set_literal_until(b"style");
        assert_eq!(html.next_token().unwrap(), Some(Token::Text(Span::from_range(7, 10))));

        let mut xml = Tokenizer::new(input, Dialect::Xml);
        xml.next_token().unwrap();
        xml.set_literal_until(b"style");
        assert!(xml.next_token().is_err());
        assert!(xml.next_token().unwrap().is_none());
    }
}
