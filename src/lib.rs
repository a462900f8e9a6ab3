//! RustyMarkup - Streaming XML/HTML parsing with block selectors
//!
//! One forward pass over an in-memory buffer produces a stream of balanced
//! events that reference the input by span:
//!
//! - Tokenizer: structural tokens, strict XML or permissive HTML rules
//! - BalancingAutomaton: open-element stack, HTML sibling auto-close,
//!   unmatched and missing close tags per [`BalancingPolicy`]
//! - SelectorEvaluator: which compiled [`Selector`]s enclose each event
//!
//! Two surfaces drive the same pipeline: the pull-based [`EventReader`]
//! and the push-based [`MarkupParser`], which hands events to a
//! [`MarkupHandler`].
//!
//! ```
//! use rustymarkup::{EventCollector, MarkupParser, ParseConfig, Selector, Dialect};
//! use std::sync::Arc;
//!
//! let selector = Arc::new(Selector::parse("#x", Dialect::Html).unwrap());
//! let parser = MarkupParser::new(ParseConfig::html().with_selector(selector));
//! let input = br#"<div><p id="x">t</p></div>"#;
//!
//! let mut collector = EventCollector::new();
//! parser.parse(input, &mut collector).unwrap();
//! assert_eq!(collector.selected_text(input), br#"<p id="x">t</p>"#);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod parser;
pub mod reader;
pub mod sax;
pub mod selector;
pub mod strategy;

pub use config::{BalancingPolicy, Dialect, ParseConfig};
pub use crate::core::{Position, Span};
pub use error::{HandlerError, ParseError, ParseWarning, SelectorError};
pub use parser::{MarkupParser, ParseSummary};
pub use reader::{EventReader, ParsedEvent};
pub use sax::{Directive, Event, EventCollector, EventContext, MarkupHandler};
pub use selector::{
    FragmentReferenceResolver, ReferenceResolver, Selection, Selector, SelectorCache,
    SelectorOptions,
};
