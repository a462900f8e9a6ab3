//! Event Collector
//!
//! A [`MarkupHandler`] that records every event with its position and
//! selection, for batch inspection after the parse.

use super::events::{Event, EventKind};
use super::handler::{Directive, EventContext, HandlerResult, MarkupHandler};
use crate::core::attributes::names_equal;
use crate::core::position::Position;
use crate::selector::Selection;

/// One recorded event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedEvent {
    pub event: Event,
    pub position: Position,
    pub selection: Selection,
}

/// Collector that gathers events during a parse
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<CollectedEvent>,
    /// Elements whose content is requested as literal text
    literal: Vec<String>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(256),
            literal: Vec::new(),
        }
    }

    /// Ask for the content of every `name` element as literal text
    /// (ASCII case-insensitive)
    pub fn with_literal_element(mut self, name: impl Into<String>) -> Self {
        self.literal.push(name.into());
        self
    }

    pub fn events(&self) -> &[CollectedEvent] {
        &self.events
    }

    /// Take the collected events
    pub fn take_events(&mut self) -> Vec<CollectedEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.iter().map(|e| e.event.kind()).collect()
    }

    /// Concatenated source text of all events
    pub fn source_text(&self, input: &[u8]) -> Vec<u8> {
        self.concat(input, |_| true)
    }

    /// Concatenated source text of the events inside a selected block
    pub fn selected_text(&self, input: &[u8]) -> Vec<u8> {
        self.concat(input, |e| e.selection.is_selected())
    }

    fn concat(&self, input: &[u8], keep: impl Fn(&CollectedEvent) -> bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(input.len());
        for collected in self.events.iter().filter(|e| keep(e)) {
            out.extend_from_slice(collected.event.span().slice(input));
        }
        out
    }
}

impl MarkupHandler for EventCollector {
    fn event(&mut self, event: &Event, ctx: &EventContext<'_>) -> HandlerResult {
        self.events.push(CollectedEvent {
            event: *event,
            position: ctx.position,
            selection: ctx.selection.clone(),
        });

        if let Event::OpenElementEnd { name, .. } = event {
            let name = name.slice(ctx.input);
            if let Some(literal) = self
                .literal
                .iter()
                .find(|l| names_equal(l.as_bytes(), name, true))
            {
                return Ok(Directive::LiteralUntil(literal.clone()));
            }
        }
        Ok(Directive::Continue)
    }
}
