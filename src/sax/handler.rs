//! Event consumer interface
//!
//! A [`MarkupHandler`] gets one callback per [`Event`] variant. Every
//! callback has a no-op default, so a handler only implements what it
//! cares about. The return value steers the parse: continue, read the
//! element content that follows as literal text, or stop.

use super::events::Event;
use crate::core::attributes::AttributeSpans;
use crate::core::position::Position;
use crate::core::span::Span;
use crate::core::tokenizer::{DocTypeSpans, XmlDeclSpans};
use crate::error::HandlerError;
use crate::selector::Selection;

/// Result of a handler callback
pub type HandlerResult = Result<Directive, HandlerError>;

/// What the parser does after a callback
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Directive {
    #[default]
    Continue,
    /// Treat everything up to `</name` as text. Only honored when returned
    /// for an open element end.
    LiteralUntil(String),
    /// End the parse now; no further events, including the document end
    Stop,
}

/// Per-event data shared by all callbacks
#[derive(Debug, Clone, Copy)]
pub struct EventContext<'c> {
    /// Whole input; event spans index into it
    pub input: &'c [u8],
    /// Source text of the event
    pub span: Span,
    /// Where the event starts
    pub position: Position,
    /// Selectors enclosing the event
    pub selection: &'c Selection,
}

impl<'c> EventContext<'c> {
    #[inline]
    pub fn bytes(&self, span: Span) -> &'c [u8] {
        span.slice(self.input)
    }

    /// Span text, `None` if it is not valid UTF-8
    #[inline]
    pub fn text(&self, span: Span) -> Option<&'c str> {
        span.as_str(self.input)
    }

    /// Source text of the event itself
    pub fn source(&self) -> &'c [u8] {
        self.span.slice(self.input)
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.selection.is_selected()
    }
}

/// Consumer of parse events
///
/// The parser calls [`MarkupHandler::event`], whose default forwards to
/// the per-variant callbacks. Override `event` to see every event through
/// one method.
#[allow(unused_variables)]
pub trait MarkupHandler {
    fn event(&mut self, event: &Event, ctx: &EventContext<'_>) -> HandlerResult {
        dispatch(self, event, ctx)
    }

    fn document_start(&mut self, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn document_end(&mut self, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn open_element_start(&mut self, name: Span, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    /// Return [`Directive::LiteralUntil`] here to read the element content
    /// as text
    fn open_element_end(&mut self, name: Span, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn standalone_element_start(&mut self, name: Span, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn standalone_element_end(
        &mut self,
        name: Span,
        minimized: bool,
        ctx: &EventContext<'_>,
    ) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn close_element_start(&mut self, name: Span, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn close_element_end(&mut self, name: Span, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn auto_close_element_start(&mut self, name: Span, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn auto_close_element_end(&mut self, name: Span, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn unmatched_close_element_start(&mut self, name: Span, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn unmatched_close_element_end(&mut self, name: Span, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn attribute(&mut self, attribute: &AttributeSpans, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn inner_whitespace(&mut self, span: Span, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn text(&mut self, span: Span, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn comment(&mut self, content: Span, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn cdata(&mut self, content: Span, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn doctype(&mut self, doctype: &DocTypeSpans, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn xml_declaration(&mut self, decl: &XmlDeclSpans, ctx: &EventContext<'_>) -> HandlerResult {
        Ok(Directive::Continue)
    }

    fn processing_instruction(
        &mut self,
        target: Span,
        content: Option<Span>,
        ctx: &EventContext<'_>,
    ) -> HandlerResult {
        Ok(Directive::Continue)
    }
}

/// Route an event to its per-variant callback
pub fn dispatch<H: MarkupHandler + ?Sized>(
    handler: &mut H,
    event: &Event,
    ctx: &EventContext<'_>,
) -> HandlerResult {
    match *event {
        Event::DocumentStart { .. } => handler.document_start(ctx),
        Event::DocumentEnd { .. } => handler.document_end(ctx),
        Event::OpenElementStart { name, .. } => handler.open_element_start(name, ctx),
        Event::OpenElementEnd { name, .. } => handler.open_element_end(name, ctx),
        Event::StandaloneElementStart { name, .. } => handler.standalone_element_start(name, ctx),
        Event::StandaloneElementEnd {
            name, minimized, ..
        } => handler.standalone_element_end(name, minimized, ctx),
        Event::CloseElementStart { name, .. } => handler.close_element_start(name, ctx),
        Event::CloseElementEnd { name, .. } => handler.close_element_end(name, ctx),
        Event::AutoCloseStart { name, .. } => handler.auto_close_element_start(name, ctx),
        Event::AutoCloseEnd { name, .. } => handler.auto_close_element_end(name, ctx),
        Event::UnmatchedCloseStart { name, .. } => handler.unmatched_close_element_start(name, ctx),
        Event::UnmatchedCloseEnd { name, .. } => handler.unmatched_close_element_end(name, ctx),
        Event::Attribute(ref attribute) => handler.attribute(attribute, ctx),
        Event::InnerWhitespace { span } => handler.inner_whitespace(span, ctx),
        Event::Text { span } => handler.text(span, ctx),
        Event::Comment { content, .. } => handler.comment(content, ctx),
        Event::CData { content, .. } => handler.cdata(content, ctx),
        Event::DocType(ref doctype) => handler.doctype(doctype, ctx),
        Event::XmlDeclaration(ref decl) => handler.xml_declaration(decl, ctx),
        Event::ProcessingInstruction {
            target, content, ..
        } => handler.processing_instruction(target, content, ctx),
    }
}

/// Feeds every event to two handlers in turn
///
/// `Stop` from either side stops the parse. A literal directive is taken
/// from the first handler that returns one.
#[derive(Debug, Default)]
pub struct Tee<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Tee { first, second }
    }

    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: MarkupHandler, B: MarkupHandler> MarkupHandler for Tee<A, B> {
    fn event(&mut self, event: &Event, ctx: &EventContext<'_>) -> HandlerResult {
        let first = self.first.event(event, ctx)?;
        let second = self.second.event(event, ctx)?;
        Ok(match (first, second) {
            (Directive::Stop, _) | (_, Directive::Stop) => Directive::Stop,
            (literal @ Directive::LiteralUntil(_), _) | (_, literal @ Directive::LiteralUntil(_)) => {
                literal
            }
            _ => Directive::Continue,
        })
    }
}
