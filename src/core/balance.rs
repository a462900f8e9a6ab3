//! Element balancing automaton
//!
//! Turns tokens into events while maintaining the stack of open elements.
//! Every close tag is resolved into a matched close, a run of synthesized
//! auto-closes followed by the close, or an unmatched close, according to
//! the [`BalancingPolicy`]. Under the HTML dialect the element catalog adds
//! void elements, raw-text elements and implied sibling closes.

use super::attributes::{names_equal, TagEnd, TagPart};
use super::elements::ElementCatalog;
use super::span::Span;
use super::tokenizer::{CloseTag, OpenTag, Token, Tokenizer};
use crate::config::{BalancingPolicy, Dialect};
use crate::error::{ParseError, ParseWarning};
use crate::sax::events::Event;
use std::collections::VecDeque;
use tracing::trace;

/// An open element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub name: Span,
    /// Index of the enclosing frame, None at the root
    pub parent: Option<usize>,
}

/// Stack-based balancing state machine
pub struct BalancingAutomaton<'a> {
    input: &'a [u8],
    dialect: Dialect,
    policy: BalancingPolicy,
    catalog: Option<&'static ElementCatalog>,
    stack: Vec<Frame>,
    max_depth: usize,
}

impl<'a> BalancingAutomaton<'a> {
    pub fn new(input: &'a [u8], dialect: Dialect, policy: BalancingPolicy) -> Self {
        let catalog = match dialect {
            Dialect::Html => Some(ElementCatalog::html()),
            Dialect::Xml => None,
        };
        Self {
            input,
            dialect,
            policy,
            catalog,
            stack: Vec::with_capacity(32),
            max_depth: 0,
        }
    }

    /// Open elements, outermost first
    #[inline]
    pub fn stack(&self) -> &[Frame] {
        &self.stack
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Deepest nesting seen so far (standalone elements count)
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Translate one token into events appended to `out`.
    ///
    /// Returns the element name when the token opened a raw-text element,
    /// in which case the caller switches the tokenizer to literal mode.
    pub fn process(
        &mut self,
        token: &Token,
        scan: &Tokenizer<'_>,
        out: &mut VecDeque<Event>,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<Option<Span>, ParseError> {
        match *token {
            Token::Text(span) => out.push_back(Event::Text { span }),
            Token::Comment { span, content } => out.push_back(Event::Comment { span, content }),
            Token::CData { span, content } => out.push_back(Event::CData { span, content }),
            Token::DocType(doctype) => out.push_back(Event::DocType(doctype)),
            Token::XmlDeclaration(decl) => out.push_back(Event::XmlDeclaration(decl)),
            Token::ProcessingInstruction {
                span,
                target,
                content,
            } => out.push_back(Event::ProcessingInstruction {
                span,
                target,
                content,
            }),
            Token::OpenTag(tag) => return Ok(self.open(&tag, scan.tag_parts(), out)),
            Token::CloseTag(tag) => self.close(&tag, scan, out, warnings)?,
        }
        Ok(None)
    }

    fn open(&mut self, tag: &OpenTag, parts: &[TagPart], out: &mut VecDeque<Event>) -> Option<Span> {
        let name_bytes = tag.name.slice(self.input);
        let spec = self.catalog.and_then(|catalog| catalog.lookup(name_bytes));

        if let Some(rule) = spec.and_then(|spec| spec.sibling) {
            if self.policy == BalancingPolicy::AutoClose {
                // Outermost closer below the first limit element
                let mut target = None;
                for (i, frame) in self.stack.iter().enumerate().rev() {
                    let open = frame.name.slice(self.input);
                    if rule.is_limit(open) {
                        break;
                    }
                    if rule.closes_name(open) {
                        target = Some(i);
                    }
                }
                if let Some(target) = target {
                    self.auto_close_to(target, tag.start.start(), out);
                }
            }
        }

        let void = spec.is_some_and(|spec| spec.void);
        let name = tag.name;
        self.max_depth = self.max_depth.max(self.stack.len() + 1);

        match tag.end {
            TagEnd::SelfClosing(end) => {
                out.push_back(Event::StandaloneElementStart {
                    span: tag.start,
                    name,
                });
                push_parts(parts, out);
                out.push_back(Event::StandaloneElementEnd {
                    span: end,
                    name,
                    minimized: true,
                });
                None
            }
            TagEnd::Open(end) if void => {
                out.push_back(Event::StandaloneElementStart {
                    span: tag.start,
                    name,
                });
                push_parts(parts, out);
                out.push_back(Event::StandaloneElementEnd {
                    span: end,
                    name,
                    minimized: false,
                });
                None
            }
            TagEnd::Open(end) => {
                out.push_back(Event::OpenElementStart {
                    span: tag.start,
                    name,
                });
                push_parts(parts, out);
                out.push_back(Event::OpenElementEnd { span: end, name });
                self.stack.push(Frame {
                    name,
                    parent: self.stack.len().checked_sub(1),
                });
                spec.filter(|spec| spec.raw_text).map(|_| name)
            }
        }
    }

    fn close(
        &mut self,
        tag: &CloseTag,
        scan: &Tokenizer<'_>,
        out: &mut VecDeque<Event>,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<(), ParseError> {
        let name_bytes = tag.name.slice(self.input);
        let ignore_case = self.dialect.ignores_case();
        let found = self
            .stack
            .iter()
            .rposition(|frame| names_equal(frame.name.slice(self.input), name_bytes, ignore_case));
        let top = self.stack.len().checked_sub(1);

        let matched = match (found, self.policy) {
            (Some(i), _) if Some(i) == top => true,
            (Some(i), BalancingPolicy::AutoClose) => {
                if self.dialect.is_strict() {
                    for frame in self.stack[i + 1..].iter().rev() {
                        warnings.push(ParseWarning::AutoClosed {
                            name: self.name_string(frame.name),
                            position: scan.locate(tag.start.start()),
                        });
                    }
                }
                self.auto_close_to(i + 1, tag.start.start(), out);
                true
            }
            (_, BalancingPolicy::RequireBalanced) => {
                return Err(ParseError::UnbalancedClose {
                    name: self.name_string(tag.name),
                    position: scan.locate(tag.start.start()),
                });
            }
            _ => false,
        };

        if matched {
            self.stack.pop();
            let name = tag.name;
            out.push_back(Event::CloseElementStart {
                span: tag.start,
                name,
            });
            if let Some(span) = tag.whitespace {
                out.push_back(Event::InnerWhitespace { span });
            }
            out.push_back(Event::CloseElementEnd {
                span: tag.end,
                name,
            });
        } else {
            warnings.push(ParseWarning::UnmatchedClose {
                name: self.name_string(tag.name),
                position: scan.locate(tag.start.start()),
            });
            out.push_back(Event::UnmatchedCloseStart {
                span: tag.start,
                name: tag.name,
            });
            if let Some(span) = tag.whitespace {
                out.push_back(Event::InnerWhitespace { span });
            }
            out.push_back(Event::UnmatchedCloseEnd {
                span: tag.end,
                name: tag.name,
            });
        }
        Ok(())
    }

    /// Resolve elements still open at end of input
    pub fn finish(
        &mut self,
        scan: &Tokenizer<'_>,
        out: &mut VecDeque<Event>,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<(), ParseError> {
        if self.stack.is_empty() {
            return Ok(());
        }
        let end = self.input.len();
        match self.policy {
            BalancingPolicy::RequireBalanced => Err(ParseError::UnclosedElements {
                names: self
                    .stack
                    .iter()
                    .map(|frame| self.name_string(frame.name))
                    .collect(),
                position: scan.locate(end),
            }),
            BalancingPolicy::AutoClose => {
                if self.dialect.is_strict() {
                    for frame in self.stack.iter().rev() {
                        warnings.push(ParseWarning::UnclosedAtEnd {
                            name: self.name_string(frame.name),
                            position: scan.locate(end),
                        });
                    }
                }
                self.auto_close_to(0, end, out);
                Ok(())
            }
            BalancingPolicy::NoBalancing => Ok(()),
        }
    }

    /// Pop every frame at index `>= keep`, innermost first
    fn auto_close_to(&mut self, keep: usize, offset: usize, out: &mut VecDeque<Event>) {
        let span = Span::empty_at(offset);
        while self.stack.len() > keep {
            let Some(frame) = self.stack.pop() else {
                break;
            };
            trace!(
                element = %String::from_utf8_lossy(frame.name.slice(self.input)),
                offset,
                "auto-closing element"
            );
            out.push_back(Event::AutoCloseStart {
                span,
                name: frame.name,
            });
            out.push_back(Event::AutoCloseEnd {
                span,
                name: frame.name,
            });
        }
    }

    fn name_string(&self, name: Span) -> String {
        String::from_utf8_lossy(name.slice(self.input)).into_owned()
    }
}

fn push_parts(parts: &[TagPart], out: &mut VecDeque<Event>) {
    out.extend(parts.iter().map(|part| match *part {
        TagPart::Attribute(attr) => Event::Attribute(attr),
        TagPart::Whitespace(span) => Event::InnerWhitespace { span },
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sax::events::EventKind;

    fn run(input: &[u8], dialect: Dialect, policy: BalancingPolicy) -> Result<(Vec<Event>, Vec<ParseWarning>), ParseError> {
        let mut scan = Tokenizer::new(input, dialect);
        let mut automaton = BalancingAutomaton::new(input, dialect, policy);
        let mut out = VecDeque::new();
        let mut warnings = Vec::new();
        while let Some(token) = scan.next_token()? {
            if let Some(name) = automaton.process(&token, &scan, &mut out, &mut warnings)? {
                scan.set_literal_until(name.slice(input));
            }
        }
        automaton.finish(&scan, &mut out, &mut warnings)?;
        Ok((out.into_iter().collect(), warnings))
    }

    /// Compact rendering: `+x` open, `-x` close, `~x` auto-close, `!x` unmatched, `=x` standalone
    fn outline(input: &[u8], events: &[Event]) -> String {
        let mut out = Vec::new();
        for event in events {
            let name = |span: &Span| span.as_str(input).unwrap_or("?").to_string();
            match event {
                Event::OpenElementStart { name: n, .. } => out.push(format!("+{}", name(n))),
                Event::CloseElementStart { name: n, .. } => out.push(format!("-{}", name(n))),
                Event::AutoCloseStart { name: n, .. } => out.push(format!("~{}", name(n))),
                Event::UnmatchedCloseStart { name: n, .. } => out.push(format!("!{}", name(n))),
                Event::StandaloneElementStart { name: n, .. } => out.push(format!("={}", name(n))),
                _ => {}
            }
        }
        out.join(" ")
    }

    #[test]
    fn test_matched_close() {
        let input = b"<a><b></b></a>";
        let (events, warnings) = run(input, Dialect::Xml, BalancingPolicy::AutoClose).unwrap();
        assert_eq!(outline(input, &events), "+a +b -b -a");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_deeper_match_auto_closes() {
        let input = b"<a><b><c></a>";
        let (events, warnings) = run(input, Dialect::Xml, BalancingPolicy::AutoClose).unwrap();
        assert_eq!(outline(input, &events), "+a +b +c ~c ~b -a");
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_unmatched_close_leaves_stack() {
        let input = b"<a></x></a>";
        let (events, warnings) = run(input, Dialect::Xml, BalancingPolicy::AutoClose).unwrap();
        assert_eq!(outline(input, &events), "+a !x -a");
        assert!(matches!(warnings[0], ParseWarning::UnmatchedClose { ref name, .. } if name == "x"));
    }

    #[test]
    fn test_no_balancing() {
        let input = b"<a><b></a></b>";
        let (events, _) = run(input, Dialect::Xml, BalancingPolicy::NoBalancing).unwrap();
        assert_eq!(outline(input, &events), "+a +b !a -b");
    }

    #[test]
    fn test_require_balanced_rejects_mismatch() {
        let err = run(b"<a><b></a>", Dialect::Xml, BalancingPolicy::RequireBalanced).unwrap_err();
        assert!(matches!(err, ParseError::UnbalancedClose { ref name, position } if name == "a" && position.offset == 6));
    }

    #[test]
    fn test_require_balanced_rejects_unclosed() {
        let err = run(b"<a><b></b>", Dialect::Xml, BalancingPolicy::RequireBalanced).unwrap_err();
        assert!(matches!(err, ParseError::UnclosedElements { ref names, .. } if names == &["a"]));
    }

    #[test]
    fn test_xml_case_sensitive_close() {
        let err = run(b"<a></A>", Dialect::Xml, BalancingPolicy::RequireBalanced).unwrap_err();
        assert!(matches!(err, ParseError::UnbalancedClose { .. }));
        let input = b"<a></A>";
        let (events, _) = run(input, Dialect::Html, BalancingPolicy::RequireBalanced).unwrap();
        assert_eq!(outline(input, &events), "+a -A");
    }

    #[test]
    fn test_end_of_document() {
        let input = b"<a><b>";
        let (events, warnings) = run(input, Dialect::Html, BalancingPolicy::AutoClose).unwrap();
        assert_eq!(outline(input, &events), "+a +b ~b ~a");
        assert!(warnings.is_empty());
        assert_eq!(events.last().map(|e| e.span()), Some(Span::empty_at(6)));

        let (_, warnings) = run(input, Dialect::Xml, BalancingPolicy::AutoClose).unwrap();
        assert_eq!(warnings.len(), 2);

        let (events, _) = run(input, Dialect::Xml, BalancingPolicy::NoBalancing).unwrap();
        assert_eq!(outline(input, &events), "+a +b");
    }

    #[test]
    fn test_list_items_close_siblings() {
        let input = b"<ul><li>hello<li>goodbye</ul>";
        let (events, _) = run(input, Dialect::Html, BalancingPolicy::AutoClose).unwrap();
        assert_eq!(outline(input, &events), "+ul +li ~li +li ~li -ul");

        let (events, _) = run(input, Dialect::Xml, BalancingPolicy::AutoClose).unwrap();
        assert_eq!(outline(input, &events), "+ul +li +li ~li ~li -ul");
    }

    #[test]
    fn test_nested_list_limit() {
        let input = b"<ul><li><ol><li>a<li>b</ol></ul>";
        let (events, _) = run(input, Dialect::Html, BalancingPolicy::AutoClose).unwrap();
        assert_eq!(outline(input, &events), "+ul +li +ol +li ~li +li ~li -ol ~li -ul");
    }

    #[test]
    fn test_table_sections() {
        let input = b"<table><tbody><tr><td>1<td>2<tr><td>3<tbody><tr><td>4</table>";
        let (events, _) = run(input, Dialect::Html, BalancingPolicy::AutoClose).unwrap();
        assert_eq!(
            outline(input, &events),
            "+table +tbody +tr +td ~td +td ~td ~tr +tr +td ~td ~tr ~tbody +tbody +tr +td ~td ~tr ~tbody -table"
        );
    }

    #[test]
    fn test_block_closes_paragraph() {
        let input = b"<p>one<div>two</div><p>three";
        let (events, _) = run(input, Dialect::Html, BalancingPolicy::AutoClose).unwrap();
        assert_eq!(outline(input, &events), "+p ~p +div -div +p ~p");
    }

    #[test]
    fn test_paragraph_survives_limit() {
        let input = b"<p>a<button><div>b</div></button></p>";
        let (events, _) = run(input, Dialect::Html, BalancingPolicy::AutoClose).unwrap();
        assert_eq!(outline(input, &events), "+p +button +div -div -button -p");
    }

    #[test]
    fn test_void_elements() {
        let input = b"<hr/><hr><br></br>";
        let (events, _) = run(input, Dialect::Html, BalancingPolicy::AutoClose).unwrap();
        assert_eq!(outline(input, &events), "=hr =hr =br !br");
        let minimized: Vec<bool> = events
            .iter()
            .filter_map(|e| match e {
                Event::StandaloneElementEnd { minimized, .. } => Some(*minimized),
                _ => None,
            })
            .collect();
        assert_eq!(minimized, [true, false, false]);
    }

    #[test]
    fn test_raw_text_requested() {
        let input = b"<script>a</b></script>";
        let (events, _) = run(input, Dialect::Html, BalancingPolicy::AutoClose).unwrap();
        let kinds: Vec<EventKind> = events.iter().map(Event::kind).collect();
        assert_eq!(
            kinds,
            [
                EventKind::OpenElementStart,
                EventKind::OpenElementEnd,
                EventKind::Text,
                EventKind::CloseElementStart,
                EventKind::CloseElementEnd,
            ]
        );
    }

    #[test]
    fn test_attribute_events_in_order() {
        let input = b"<a x=\"1\" y='2'>";
        let (events, _) = run(input, Dialect::Html, BalancingPolicy::NoBalancing).unwrap();
        let kinds: Vec<EventKind> = events.iter().map(Event::kind).collect();
        assert_eq!(
            kinds,
            [
                EventKind::OpenElementStart,
                EventKind::InnerWhitespace,
                EventKind::Attribute,
                EventKind::InnerWhitespace,
                EventKind::Attribute,
                EventKind::OpenElementEnd,
            ]
        );
    }

    #[test]
    fn test_max_depth() {
        let input = b"<a><b><c/></b></a>";
        let mut scan = Tokenizer::new(input, Dialect::Xml);
        let mut automaton = BalancingAutomaton::new(input, Dialect::Xml, BalancingPolicy::AutoClose);
        let mut out = VecDeque::new();
        let mut warnings = Vec::new();
        while let Some(token) = scan.next_token().unwrap() {
            automaton.process(&token, &scan, &mut out, &mut warnings).unwrap();
        }
        assert_eq!(automaton.max_depth(), 3);
        assert_eq!(automaton.depth(), 0);
    }

    #[test]
    fn test_frame_parents() {
        let input = b"<a><b><c>";
        let mut scan = Tokenizer::new(input, Dialect::Xml);
        let mut automaton = BalancingAutomaton::new(input, Dialect::Xml, BalancingPolicy::NoBalancing);
        let mut out = VecDeque::new();
        let mut warnings = Vec::new();
        while let Some(token) = scan.next_token().unwrap() {
            automaton.process(&token, &scan, &mut out, &mut warnings).unwrap();
        }
        let parents: Vec<_> = automaton.stack().iter().map(|f| f.parent).collect();
        assert_eq!(parents, [None, Some(0), Some(1)]);
    }
}
