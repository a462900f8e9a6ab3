//! Zero-Copy Event Reader
//!
//! Pull-based parse of a byte slice. Each call to [`EventReader::next_event`]
//! returns the next balanced event with its position and the selectors
//! enclosing it. Tokens are pulled lazily: the reader only scans ahead when
//! the events of the previous token have all been handed out.

use crate::config::ParseConfig;
use crate::core::balance::BalancingAutomaton;
use crate::core::position::Position;
use crate::core::span::Span;
use crate::core::tokenizer::Tokenizer;
use crate::error::{ParseError, ParseWarning};
use crate::sax::events::Event;
use crate::selector::{Selection, SelectorEvaluator};
use std::collections::VecDeque;
use tracing::{trace, warn};

/// An event with its parse context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    pub event: Event,
    pub position: Position,
    pub selection: Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Start,
    Running,
    Finished,
    Done,
}

/// Pull parser over a byte slice
pub struct EventReader<'a> {
    input: &'a [u8],
    tokenizer: Tokenizer<'a>,
    automaton: BalancingAutomaton<'a>,
    evaluator: SelectorEvaluator,
    queue: VecDeque<Event>,
    warnings: Vec<ParseWarning>,
    /// Warnings already logged
    logged: usize,
    state: ReaderState,
    event_count: usize,
}

impl<'a> EventReader<'a> {
    pub fn new(input: &'a [u8], config: &ParseConfig) -> Self {
        EventReader {
            input,
            tokenizer: Tokenizer::new(input, config.dialect),
            automaton: BalancingAutomaton::new(input, config.dialect, config.policy),
            evaluator: SelectorEvaluator::new(&config.selectors),
            queue: VecDeque::with_capacity(16),
            warnings: Vec::new(),
            logged: 0,
            state: ReaderState::Start,
            event_count: 0,
        }
    }

    pub fn from_str(input: &'a str, config: &ParseConfig) -> Self {
        Self::new(input.as_bytes(), config)
    }

    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    /// Read the input following the current position as text up to the
    /// next `</name`
    ///
    /// Meant to be called right after an open element end.
    pub fn literal_until(&mut self, name: &str) {
        trace!(element = name, offset = self.tokenizer.offset(), "literal content requested");
        self.tokenizer.set_literal_until(name.as_bytes());
    }

    /// Warnings so far
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<ParseWarning> {
        self.logged = 0;
        std::mem::take(&mut self.warnings)
    }

    /// Current number of open elements
    pub fn depth(&self) -> usize {
        self.automaton.depth()
    }

    pub fn max_depth(&self) -> usize {
        self.automaton.max_depth()
    }

    /// Events returned so far
    pub fn event_count(&self) -> usize {
        self.event_count
    }

    /// Next event, or `None` after the document end
    ///
    /// Inputs longer than [`Span::MAX_INPUT_LEN`] fail on the first call.
    /// After an error every further call returns `Ok(None)`.
    pub fn next_event(&mut self) -> Result<Option<ParsedEvent>, ParseError> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Ok(Some(self.annotate(event)));
            }

            match self.state {
                ReaderState::Start => {
                    if let Err(e) = check_input_len(self.input.len()) {
                        self.state = ReaderState::Done;
                        return Err(e);
                    }
                    self.state = ReaderState::Running;
                    return Ok(Some(self.annotate(Event::DocumentStart {
                        span: Span::empty_at(0),
                    })));
                }
                ReaderState::Running => {
                    if let Err(e) = self.advance() {
                        self.state = ReaderState::Done;
                        self.queue.clear();
                        return Err(e);
                    }
                }
                ReaderState::Finished => {
                    self.state = ReaderState::Done;
                    return Ok(Some(self.annotate(Event::DocumentEnd {
                        span: Span::empty_at(self.input.len()),
                    })));
                }
                ReaderState::Done => return Ok(None),
            }
        }
    }

    /// Scan one token and queue its events
    fn advance(&mut self) -> Result<(), ParseError> {
        match self.tokenizer.next_token()? {
            Some(token) => {
                let raw = self.automaton.process(
                    &token,
                    &self.tokenizer,
                    &mut self.queue,
                    &mut self.warnings,
                );
                self.warnings.extend(self.tokenizer.drain_warnings());
                self.log_warnings();
                if let Some(name) = raw? {
                    trace!(
                        element = %String::from_utf8_lossy(name.slice(self.input)),
                        "raw text element, switching to literal content"
                    );
                    self.tokenizer.set_literal_until(name.slice(self.input));
                }
            }
            None => {
                let result = self
                    .automaton
                    .finish(&self.tokenizer, &mut self.queue, &mut self.warnings);
                self.log_warnings();
                result?;
                self.state = ReaderState::Finished;
            }
        }
        Ok(())
    }

    fn annotate(&mut self, event: Event) -> ParsedEvent {
        self.event_count += 1;
        let position = self.tokenizer.position_at(event.span().start());
        let selection = self
            .evaluator
            .observe(&event, self.tokenizer.tag_parts(), self.input);
        if selection.is_selected() && event.is_element_start() {
            trace!(selectors = ?selection.matched(), %position, "selected block starts");
        }
        ParsedEvent {
            event,
            position,
            selection,
        }
    }

    fn log_warnings(&mut self) {
        for warning in &self.warnings[self.logged..] {
            warn!(%warning, "markup warning");
        }
        self.logged = self.warnings.len();
    }
}

impl Iterator for EventReader<'_> {
    type Item = Result<ParsedEvent, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

/// Spans address input with 32-bit offsets
fn check_input_len(len: usize) -> Result<(), ParseError> {
    if len > Span::MAX_INPUT_LEN {
        return Err(ParseError::InputTooLarge {
            len,
            max: Span::MAX_INPUT_LEN,
        });
    }
    Ok(())
}

/// Parse a byte slice and return all events
pub fn parse_events(input: &[u8], config: &ParseConfig) -> Result<Vec<ParsedEvent>, ParseError> {
    EventReader::new(input, config).collect()
}
