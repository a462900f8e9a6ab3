//! Event-based Markup Interface
//!
//! ## Architecture
//!
//! ```text
//! Tokenizer ---> BalancingAutomaton ---> SelectorEvaluator ---> MarkupHandler
//!   tokens          balanced events        selection per event     consumer
//! ```
//!
//! ## Event Types
//!
//! - Element tags arrive in pieces: `<name`, attributes, inner whitespace,
//!   `>` or `/>`, and `</name`, `>` for close tags
//! - `AutoClose*` events stand in for close tags the input left out
//! - `UnmatchedClose*` events carry close tags that closed nothing
//! - Text, comments, CDATA, DOCTYPE, XML declaration, processing
//!   instructions
//!
//! ## Memory Efficiency
//!
//! Events use Spans (offset + length) into the original input, so a parse
//! allocates nothing per event beyond the selection set.

pub mod collector;
pub mod events;
pub mod handler;

pub use collector::{CollectedEvent, EventCollector};
pub use events::{Event, EventKind};
pub use handler::{dispatch, Directive, EventContext, HandlerResult, MarkupHandler, Tee};
