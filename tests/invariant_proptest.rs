//! Property-based tests for the event stream
//!
//! Over arbitrary markup-like input:
//! - permissive HTML never fails and never panics
//! - event spans, concatenated, reproduce the input exactly
//! - positions follow document order and agree with the input
//! - under auto-close balancing every element start has exactly one end

use proptest::prelude::*;
use rustymarkup::reader::{parse_events, ParsedEvent};
use rustymarkup::{BalancingPolicy, Dialect, Event, ParseConfig};

/// Fragments that combine into plausible and broken markup alike
fn markup() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        prop::sample::select(vec![
            "<", ">", "/>", "</", "<!--", "-->", "<![CDATA[", "]]>", "<?pi ", "?>",
            "<!DOCTYPE html>", "\n", " ", "=", "\"", "'",
        ])
        .prop_map(str::to_string),
        prop::sample::select(vec![
            "p", "li", "ul", "td", "tr", "table", "div", "br", "script", "a", "b",
        ])
        .prop_map(str::to_string),
        "[a-z]{1,3}",
        "[a-z0-9 ]{0,5}",
    ];
    prop::collection::vec(piece, 0..40).prop_map(|pieces| pieces.concat())
}

fn config(dialect: Dialect, policy: BalancingPolicy) -> ParseConfig {
    ParseConfig {
        dialect,
        policy,
        ..ParseConfig::default()
    }
}

fn concat_spans(input: &[u8], events: &[ParsedEvent]) -> Vec<u8> {
    events
        .iter()
        .flat_map(|e| e.event.span().slice(input).iter().copied())
        .collect()
}

proptest! {
    #[test]
    fn html_never_fails(input in markup()) {
        for policy in [BalancingPolicy::NoBalancing, BalancingPolicy::AutoClose] {
            prop_assert!(parse_events(input.as_bytes(), &config(Dialect::Html, policy)).is_ok());
        }
    }

    #[test]
    fn spans_reproduce_input(input in markup()) {
        let events = parse_events(input.as_bytes(), &config(Dialect::Html, BalancingPolicy::AutoClose))
            .unwrap();
        prop_assert_eq!(concat_spans(input.as_bytes(), &events), input.as_bytes().to_vec());
    }

    #[test]
    fn xml_round_trips_or_errors(input in markup()) {
        for policy in [BalancingPolicy::NoBalancing, BalancingPolicy::AutoClose, BalancingPolicy::RequireBalanced] {
            if let Ok(events) = parse_events(input.as_bytes(), &config(Dialect::Xml, policy)) {
                prop_assert_eq!(concat_spans(input.as_bytes(), &events), input.as_bytes().to_vec());
            }
        }
    }

    #[test]
    fn positions_are_monotonic(input in markup()) {
        let bytes = input.as_bytes();
        let events = parse_events(bytes, &config(Dialect::Html, BalancingPolicy::AutoClose)).unwrap();
        let mut previous = 0;
        for parsed in &events {
            let offset = parsed.event.span().start();
            prop_assert!(offset >= previous);
            prop_assert_eq!(parsed.position.offset, offset);

            let before = &bytes[..offset];
            let line = 1 + before.iter().filter(|&&b| b == b'\n').count();
            prop_assert_eq!(parsed.position.line as usize, line);
            previous = offset;
        }
    }

    #[test]
    fn element_pairs_balance(input in markup()) {
        let events = parse_events(input.as_bytes(), &config(Dialect::Html, BalancingPolicy::AutoClose))
            .unwrap();
        let mut depth = 0usize;
        for parsed in &events {
            if parsed.event.is_element_start() {
                depth += 1;
            } else if parsed.event.is_element_end() {
                prop_assert!(depth > 0);
                depth -= 1;
            }
        }
        prop_assert_eq!(depth, 0);
        prop_assert!(matches!(events.first().map(|e| e.event), Some(Event::DocumentStart { .. })), "first event must be DocumentStart");
        prop_assert!(matches!(events.last().map(|e| e.event), Some(Event::DocumentEnd { .. })), "last event must be DocumentEnd");
    }
}
