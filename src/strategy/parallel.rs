//! Parallel Parsing
//!
//! Uses Rayon to parse many independent documents with one shared
//! configuration. Compiled selectors are shared read-only; every document
//! gets its own reader, automaton and evaluator state.

use crate::error::ParseError;
use crate::parser::{MarkupParser, ParseSummary};
use crate::sax::collector::EventCollector;
use crate::sax::handler::MarkupHandler;
use rayon::prelude::*;

/// Parse every input, creating one handler per input with `make_handler`
///
/// Results come back in input order, each with the handler that consumed
/// the document.
pub fn parse_many<I, H, F>(
    parser: &MarkupParser,
    inputs: &[I],
    make_handler: F,
) -> Vec<Result<(H, ParseSummary), ParseError>>
where
    I: AsRef<[u8]> + Sync,
    H: MarkupHandler + Send,
    F: Fn(usize) -> H + Sync + Send,
{
    inputs
        .par_iter()
        .enumerate()
        .map(|(i, input)| {
            let mut handler = make_handler(i);
            parser
                .parse(input.as_ref(), &mut handler)
                .map(|summary| (handler, summary))
        })
        .collect()
}

/// Parse every input into an [`EventCollector`]
pub fn collect_many<I>(parser: &MarkupParser, inputs: &[I]) -> Vec<Result<EventCollector, ParseError>>
where
    I: AsRef<[u8]> + Sync,
{
    parse_many(parser, inputs, |_| EventCollector::new())
        .into_iter()
        .map(|result| result.map(|(collector, _)| collector))
        .collect()
}
