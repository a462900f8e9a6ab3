//! Markup parser facade
//!
//! Drives tokenizer, balancing automaton and selector evaluator over one
//! input in a single synchronous pass, handing every event to a
//! [`MarkupHandler`].

use crate::config::ParseConfig;
use crate::error::{ParseError, ParseWarning};
use crate::reader::EventReader;
use crate::sax::events::Event;
use crate::sax::handler::{Directive, EventContext, MarkupHandler};
use std::io::Read;
use tracing::{debug, trace};

/// Outcome of a successful parse
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseSummary {
    /// Events delivered to the handler
    pub event_count: usize,
    /// Deepest element nesting seen
    pub max_depth: usize,
    pub warnings: Vec<ParseWarning>,
    /// The handler returned [`Directive::Stop`]
    pub stopped: bool,
}

/// Push parser
///
/// Holds only the configuration, so one parser can serve any number of
/// parses, also from several threads at once.
#[derive(Debug, Clone, Default)]
pub struct MarkupParser {
    config: ParseConfig,
}

impl MarkupParser {
    pub fn new(config: ParseConfig) -> Self {
        MarkupParser { config }
    }

    pub fn html() -> Self {
        Self::new(ParseConfig::html())
    }

    pub fn xml() -> Self {
        Self::new(ParseConfig::xml())
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Parse `input`, calling `handler` for every event
    ///
    /// Returns after the whole input is consumed, the handler stops the
    /// parse, or on the first error.
    pub fn parse<H>(&self, input: &[u8], handler: &mut H) -> Result<ParseSummary, ParseError>
    where
        H: MarkupHandler + ?Sized,
    {
        debug!(
            dialect = %self.config.dialect,
            policy = %self.config.policy,
            len = input.len(),
            selectors = self.config.selectors.len(),
            "parse started"
        );

        let mut reader = EventReader::new(input, &self.config);
        let mut stopped = false;

        while let Some(parsed) = reader.next_event()? {
            let ctx = EventContext {
                input,
                span: parsed.event.span(),
                position: parsed.position,
                selection: &parsed.selection,
            };
            match handler
                .event(&parsed.event, &ctx)
                .map_err(ParseError::Handler)?
            {
                Directive::Continue => {}
                Directive::LiteralUntil(name) => {
                    if let Event::OpenElementEnd { .. } = parsed.event {
                        reader.literal_until(&name);
                    } else {
                        trace!(element = %name, kind = ?parsed.event.kind(), "literal directive ignored");
                    }
                }
                Directive::Stop => {
                    debug!(offset = parsed.position.offset, "parse stopped by handler");
                    stopped = true;
                    break;
                }
            }
        }

        let summary = ParseSummary {
            event_count: reader.event_count(),
            max_depth: reader.max_depth(),
            warnings: reader.take_warnings(),
            stopped,
        };
        debug!(
            events = summary.event_count,
            max_depth = summary.max_depth,
            warnings = summary.warnings.len(),
            "parse finished"
        );
        Ok(summary)
    }

    pub fn parse_str<H>(&self, input: &str, handler: &mut H) -> Result<ParseSummary, ParseError>
    where
        H: MarkupHandler + ?Sized,
    {
        self.parse(input.as_bytes(), handler)
    }

    /// Read `source` to the end, then parse it
    pub fn parse_reader<R, H>(&self, mut source: R, handler: &mut H) -> Result<ParseSummary, ParseError>
    where
        R: Read,
        H: MarkupHandler + ?Sized,
    {
        let mut buffer = Vec::new();
        source.read_to_end(&mut buffer)?;
        self.parse(&buffer, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::span::Span;
    use crate::error::HandlerError;
    use crate::sax::handler::HandlerResult;
    use crate::sax::EventCollector;

    #[test]
    fn test_summary() {
        let mut collector = EventCollector::new();
        let summary = MarkupParser::html()
            .parse_str("<ul><li>a<li>b</ul>", &mut collector)
            .unwrap();
        assert_eq!(summary.event_count, collector.event_count());
        assert_eq!(summary.max_depth, 2);
        assert!(summary.warnings.is_empty());
        assert!(!summary.stopped);
    }

    struct StopAfter(usize);

    impl MarkupHandler for StopAfter {
        fn event(&mut self, _event: &Event, _ctx: &EventContext<'_>) -> HandlerResult {
            if self.0 == 0 {
                return Ok(Directive::Stop);
            }
            self.0 -= 1;
            Ok(Directive::Continue)
        }
    }

    #[test]
    fn test_stop() {
        let summary = MarkupParser::xml()
            .parse(b"<a><b/></a>", &mut StopAfter(2))
            .unwrap();
        assert!(summary.stopped);
        assert_eq!(summary.event_count, 3);
    }

    struct Failing;

    impl MarkupHandler for Failing {
        fn text(&mut self, _span: Span, _ctx: &EventContext<'_>) -> HandlerResult {
            Err(HandlerError::from("no text allowed"))
        }
    }

    #[test]
    fn test_handler_error() {
        let err = MarkupParser::html().parse(b"<p>x</p>", &mut Failing).unwrap_err();
        assert!(matches!(err, ParseError::Handler(_)));
        assert_eq!(err.to_string(), "event handler failed: no text allowed");
    }

    #[test]
    fn test_literal_directive() {
        let mut collector = EventCollector::new().with_literal_element("template");
        MarkupParser::html()
            .parse(b"<template><p>x</p></template>", &mut collector)
            .unwrap();
        let texts = collector
            .events()
            .iter()
            .filter(|e| matches!(e.event, Event::Text { .. }))
            .count();
        assert_eq!(texts, 1);
    }

    #[test]
    fn test_parse_reader() {
        let mut collector = EventCollector::new();
        let input: &[u8] = b"<r>1</r>";
        MarkupParser::xml().parse_reader(input, &mut collector).unwrap();
        assert_eq!(collector.source_text(input), input);
    }
}
