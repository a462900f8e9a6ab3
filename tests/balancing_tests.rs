//! Balancing Tests
//!
//! Element stack behavior across dialects and balancing policies, checked
//! through the pull reader. Outlines use `+x` for an open element, `-x` for
//! its close, `~x` for a synthesized close, `!x` for an unmatched close and
//! `=x` for a standalone element; text appears as is.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rustymarkup::reader::parse_events;
use rustymarkup::{BalancingPolicy, Dialect, Event, ParseConfig, ParseError, ParseWarning};

fn config(dialect: Dialect, policy: BalancingPolicy) -> ParseConfig {
    ParseConfig {
        dialect,
        policy,
        ..ParseConfig::default()
    }
}

fn outline(input: &str, dialect: Dialect, policy: BalancingPolicy) -> String {
    let bytes = input.as_bytes();
    let name = |span: rustymarkup::Span| String::from_utf8_lossy(span.slice(bytes)).into_owned();
    parse_events(bytes, &config(dialect, policy))
        .unwrap()
        .into_iter()
        .filter_map(|parsed| match parsed.event {
            Event::OpenElementStart { name: n, .. } => Some(format!("+{}", name(n))),
            Event::CloseElementStart { name: n, .. } => Some(format!("-{}", name(n))),
            Event::AutoCloseStart { name: n, .. } => Some(format!("~{}", name(n))),
            Event::UnmatchedCloseStart { name: n, .. } => Some(format!("!{}", name(n))),
            Event::StandaloneElementStart { name: n, .. } => Some(format!("={}", name(n))),
            Event::Text { span } => Some(name(span)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn warnings(input: &str, dialect: Dialect, policy: BalancingPolicy) -> Vec<ParseWarning> {
    let mut reader = rustymarkup::EventReader::new(input.as_bytes(), &config(dialect, policy));
    while reader.next_event().unwrap().is_some() {}
    reader.take_warnings()
}

// ============================================================================
// HTML sibling rules
// ============================================================================

#[rstest]
#[case("<ul><li>hello<li>goodbye</ul>", "+ul +li hello ~li +li goodbye ~li -ul")]
#[case("<dl><dt>a<dd>b<dt>c</dl>", "+dl +dt a ~dt +dd b ~dd +dt c ~dt -dl")]
#[case(
    "<table><tr><td>1<td>2<tr><td>3</table>",
    "+table +tr +td 1 ~td +td 2 ~td ~tr +tr +td 3 ~td ~tr -table"
)]
#[case("<p>a<div>b</div>", "+p a ~p +div b -div")]
#[case("<p>a<p>b", "+p a ~p +p b ~p")]
#[case("<ul><li>a<ul><li>b</ul></ul>", "+ul +li a +ul +li b ~li -ul ~li -ul")]
#[case("<select><option>a<option>b</select>", "+select +option a ~option +option b ~option -select")]
#[case("<hr/><hr><br>", "=hr =hr =br")]
#[case("<p>x<hr>y", "+p x ~p =hr y")]
#[case("<DIV>a</div>", "+DIV a -div")]
fn test_html_auto_close(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(outline(input, Dialect::Html, BalancingPolicy::AutoClose), expected);
}

#[test]
fn test_html_auto_close_is_silent() {
    let found = warnings("<ul><li>a<li>b</ul>", Dialect::Html, BalancingPolicy::AutoClose);
    assert_eq!(found, vec![]);
}

// ============================================================================
// XML
// ============================================================================

#[test]
fn test_xml_has_no_sibling_rules() {
    let input = "<ul><li>hello<li>goodbye</ul>";
    assert_eq!(
        outline(input, Dialect::Xml, BalancingPolicy::AutoClose),
        "+ul +li hello +li goodbye ~li ~li -ul"
    );
    let found = warnings(input, Dialect::Xml, BalancingPolicy::AutoClose);
    assert_eq!(found.len(), 2);
    assert!(found
        .iter()
        .all(|w| matches!(w, ParseWarning::AutoClosed { name, .. } if name == "li")));
}

#[test]
fn test_xml_void_names_are_plain_elements() {
    assert_eq!(
        outline("<r><hr>x</hr><hr/></r>", Dialect::Xml, BalancingPolicy::AutoClose),
        "+r +hr x -hr =hr -r"
    );
}

#[test]
fn test_xml_unclosed_at_end_warns() {
    let found = warnings("<a><b>", Dialect::Xml, BalancingPolicy::AutoClose);
    let names: Vec<_> = found
        .iter()
        .map(|w| match w {
            ParseWarning::UnclosedAtEnd { name, .. } => name.as_str(),
            other => panic!("unexpected warning {other}"),
        })
        .collect();
    assert_eq!(names, ["b", "a"]);
}

// ============================================================================
// Policies
// ============================================================================

#[rstest]
#[case(BalancingPolicy::NoBalancing, "+a +b !a")]
#[case(BalancingPolicy::AutoClose, "+a +b ~b -a")]
fn test_missing_inner_close(#[case] policy: BalancingPolicy, #[case] expected: &str) {
    assert_eq!(outline("<a><b></a>", Dialect::Xml, policy), expected);
}

#[rstest]
#[case(Dialect::Xml)]
#[case(Dialect::Html)]
fn test_unmatched_close_always_reported(#[case] dialect: Dialect) {
    assert_eq!(
        outline("<a></b></a>", dialect, BalancingPolicy::AutoClose),
        "+a !b -a"
    );
    let found = warnings("<a></b></a>", dialect, BalancingPolicy::AutoClose);
    assert!(matches!(found.as_slice(), [ParseWarning::UnmatchedClose { name, .. }] if name == "b"));
}

#[test]
fn test_require_balanced_rejects_mismatch() {
    let err = parse_events(
        b"<a><b></a>",
        &config(Dialect::Xml, BalancingPolicy::RequireBalanced),
    )
    .unwrap_err();
    assert!(matches!(err, ParseError::UnbalancedClose { ref name, .. } if name == "a"));
    let position = err.position().unwrap();
    assert_eq!((position.line, position.column, position.offset), (1, 7, 6));
}

#[test]
fn test_require_balanced_rejects_unclosed() {
    let err = parse_events(
        b"<a><b></b>",
        &config(Dialect::Xml, BalancingPolicy::RequireBalanced),
    )
    .unwrap_err();
    assert!(matches!(err, ParseError::UnclosedElements { ref names, .. } if names == &["a"]));
}

#[test]
fn test_no_balancing_leaves_open_elements() {
    assert_eq!(
        outline("<a><b>", Dialect::Xml, BalancingPolicy::NoBalancing),
        "+a +b"
    );
}

// ============================================================================
// Raw text
// ============================================================================

#[rstest]
#[case("<script>a</b>c</script>", "+script a</b>c -script")]
#[case("<STYLE>p < q</style>", "+STYLE p < q -style")]
#[case("<textarea><p>x</textarea>", "+textarea <p>x -textarea")]
#[case("<title>x", "+title x ~title")]
fn test_raw_text_elements(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(outline(input, Dialect::Html, BalancingPolicy::AutoClose), expected);
}
