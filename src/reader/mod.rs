//! Pull-based Reader Module
//!
//! - EventReader: zero-copy iterator over the balanced events of a slice,
//!   each annotated with its position and selection

pub mod slice;

pub use slice::{parse_events, EventReader, ParsedEvent};
