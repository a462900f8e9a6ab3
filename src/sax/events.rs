//! Markup Event Types
//!
//! Defines the events emitted by a parse. Events use Spans for zero-copy
//! access to the input; every event's [`Event::span`] covers exactly the
//! source text it stands for, so writing the spans of all events back out
//! reproduces the input. Synthetic events (document start/end, auto-close)
//! have empty spans.

use crate::core::attributes::AttributeSpans;
use crate::core::span::Span;
use crate::core::tokenizer::{DocTypeSpans, XmlDeclSpans};

/// A parse event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    DocumentStart { span: Span },
    DocumentEnd { span: Span },

    /// `<name` of an element with content
    OpenElementStart { span: Span, name: Span },
    /// `>` closing the open tag
    OpenElementEnd { span: Span, name: Span },

    /// `<name` of an element without content (`<x/>`, HTML void elements)
    StandaloneElementStart { span: Span, name: Span },
    /// `/>`, or `>` for a void element written without slash
    StandaloneElementEnd {
        span: Span,
        name: Span,
        minimized: bool,
    },

    /// `</name`
    CloseElementStart { span: Span, name: Span },
    /// `>`
    CloseElementEnd { span: Span, name: Span },

    /// Synthesized close of an element left open
    AutoCloseStart { span: Span, name: Span },
    AutoCloseEnd { span: Span, name: Span },

    /// `</name` with no open element to close
    UnmatchedCloseStart { span: Span, name: Span },
    UnmatchedCloseEnd { span: Span, name: Span },

    Attribute(AttributeSpans),
    /// Whitespace inside a tag
    InnerWhitespace { span: Span },

    Text { span: Span },
    Comment { span: Span, content: Span },
    CData { span: Span, content: Span },
    DocType(DocTypeSpans),
    XmlDeclaration(XmlDeclSpans),
    ProcessingInstruction {
        span: Span,
        target: Span,
        content: Option<Span>,
    },
}

/// Event discriminant, for filtering and counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DocumentStart,
    DocumentEnd,
    OpenElementStart,
    OpenElementEnd,
    StandaloneElementStart,
    StandaloneElementEnd,
    CloseElementStart,
    CloseElementEnd,
    AutoCloseStart,
    AutoCloseEnd,
    UnmatchedCloseStart,
    UnmatchedCloseEnd,
    Attribute,
    InnerWhitespace,
    Text,
    Comment,
    CData,
    DocType,
    XmlDeclaration,
    ProcessingInstruction,
}

impl Event {
    /// Source text covered by this event
    pub fn span(&self) -> Span {
        match self {
            Event::DocumentStart { span }
            | Event::DocumentEnd { span }
            | Event::OpenElementStart { span, .. }
            | Event::OpenElementEnd { span, .. }
            | Event::StandaloneElementStart { span, .. }
            | Event::StandaloneElementEnd { span, .. }
            | Event::CloseElementStart { span, .. }
            | Event::CloseElementEnd { span, .. }
            | Event::AutoCloseStart { span, .. }
            | Event::AutoCloseEnd { span, .. }
            | Event::UnmatchedCloseStart { span, .. }
            | Event::UnmatchedCloseEnd { span, .. }
            | Event::InnerWhitespace { span }
            | Event::Text { span }
            | Event::Comment { span, .. }
            | Event::CData { span, .. }
            | Event::ProcessingInstruction { span, .. } => *span,
            Event::Attribute(attr) => attr.span(),
            Event::DocType(doctype) => doctype.span,
            Event::XmlDeclaration(decl) => decl.span,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::DocumentStart { .. } => EventKind::DocumentStart,
            Event::DocumentEnd { .. } => EventKind::DocumentEnd,
            Event::OpenElementStart { .. } => EventKind::OpenElementStart,
            Event::OpenElementEnd { .. } => EventKind::OpenElementEnd,
            Event::StandaloneElementStart { .. } => EventKind::StandaloneElementStart,
            Event::StandaloneElementEnd { .. } => EventKind::StandaloneElementEnd,
            Event::CloseElementStart { .. } => EventKind::CloseElementStart,
            Event::CloseElementEnd { .. } => EventKind::CloseElementEnd,
            Event::AutoCloseStart { .. } => EventKind::AutoCloseStart,
            Event::AutoCloseEnd { .. } => EventKind::AutoCloseEnd,
            Event::UnmatchedCloseStart { .. } => EventKind::UnmatchedCloseStart,
            Event::UnmatchedCloseEnd { .. } => EventKind::UnmatchedCloseEnd,
            Event::Attribute(_) => EventKind::Attribute,
            Event::InnerWhitespace { .. } => EventKind::InnerWhitespace,
            Event::Text { .. } => EventKind::Text,
            Event::Comment { .. } => EventKind::Comment,
            Event::CData { .. } => EventKind::CData,
            Event::DocType(_) => EventKind::DocType,
            Event::XmlDeclaration(_) => EventKind::XmlDeclaration,
            Event::ProcessingInstruction { .. } => EventKind::ProcessingInstruction,
        }
    }

    /// Element name for element start/end events
    pub fn element_name(&self) -> Option<Span> {
        match self {
            Event::OpenElementStart { name, .. }
            | Event::OpenElementEnd { name, .. }
            | Event::StandaloneElementStart { name, .. }
            | Event::StandaloneElementEnd { name, .. }
            | Event::CloseElementStart { name, .. }
            | Event::CloseElementEnd { name, .. }
            | Event::AutoCloseStart { name, .. }
            | Event::AutoCloseEnd { name, .. }
            | Event::UnmatchedCloseStart { name, .. }
            | Event::UnmatchedCloseEnd { name, .. } => Some(*name),
            _ => None,
        }
    }

    /// Check if this event opens an element scope
    #[inline]
    pub fn is_element_start(&self) -> bool {
        matches!(
            self,
            Event::OpenElementStart { .. } | Event::StandaloneElementStart { .. }
        )
    }

    /// Check if this event ends an element scope (pops the stack)
    #[inline]
    pub fn is_element_end(&self) -> bool {
        matches!(
            self,
            Event::CloseElementEnd { .. }
                | Event::AutoCloseEnd { .. }
                | Event::StandaloneElementEnd { .. }
        )
    }

    /// Check if this event is a node of its own (not part of a tag)
    #[inline]
    pub fn is_node(&self) -> bool {
        matches!(
            self,
            Event::Text { .. }
                | Event::Comment { .. }
                | Event::CData { .. }
                | Event::DocType(_)
                | Event::XmlDeclaration(_)
                | Event::ProcessingInstruction { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_span_and_kind() {
        let event = Event::Text {
            span: Span::new(3, 4),
        };
        assert_eq!(event.span(), Span::new(3, 4));
        assert_eq!(event.kind(), EventKind::Text);
        assert!(event.is_node());
        assert!(event.element_name().is_none());
    }

    #[test]
    fn test_attribute_span() {
        let attr = AttributeSpans {
            name: Span::from_range(3, 5),
            operator: Some(Span::from_range(5, 6)),
            value_outer: Some(Span::from_range(6, 9)),
            value: Some(Span::from_range(7, 8)),
        };
        assert_eq!(Event::Attribute(attr).span(), Span::from_range(3, 9));
    }

    #[test]
    fn test_element_scope() {
        let name = Span::new(1, 1);
        assert!(Event::OpenElementStart { span: name, name }.is_element_start());
        assert!(Event::AutoCloseEnd {
            span: Span::empty_at(4),
            name
        }
        .is_element_end());
        assert!(!Event::CloseElementStart { span: name, name }.is_element_end());
    }
}
