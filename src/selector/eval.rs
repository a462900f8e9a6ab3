//! Selector Evaluator
//!
//! Tracks, alongside the balanced event stream, which selectors currently
//! enclose the parse position. Every path step of every selector gets a
//! global slot; each open element records which slots it matched and which
//! slots were matched by itself or an ancestor, so both axes are answered
//! from the parent frame alone without revisiting the stack.

use super::compiler::{Branch, Selector, Step};
use super::parser::{Axis, CompareOp, NodeTest, Predicate, PseudoNode};
use crate::core::attributes::{find_attribute, names_equal, TagPart};
use crate::core::scanner::is_whitespace;
use crate::sax::events::Event;
use std::sync::Arc;
use tracing::trace;

/// Selectors enclosing one event, by index into the evaluator's list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    matched: Vec<usize>,
}

impl Selection {
    /// Whether any selector encloses the event
    #[inline]
    pub fn is_selected(&self) -> bool {
        !self.matched.is_empty()
    }

    /// Matching selector indices, ascending
    pub fn matched(&self) -> &[usize] {
        &self.matched
    }

    pub fn contains(&self, selector: usize) -> bool {
        self.matched.binary_search(&selector).is_ok()
    }
}

/// Location of a global step slot
#[derive(Debug, Clone, Copy)]
struct Slot {
    selector: usize,
    path: usize,
    /// Step index within its path
    step: usize,
    last: bool,
}

#[derive(Debug, Clone, Default)]
struct Frame {
    /// Slots this element satisfies
    matched: Vec<bool>,
    /// Slots satisfied by this element or an ancestor
    reach: Vec<bool>,
    /// Per-slot count of children passing the step's node test
    counters: Vec<u32>,
    /// Selectors whose final step this element satisfies
    selects: Vec<usize>,
}

impl Frame {
    fn new(slots: usize) -> Self {
        Frame {
            matched: vec![false; slots],
            reach: vec![false; slots],
            counters: vec![0; slots],
            selects: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.matched.fill(false);
        self.reach.fill(false);
        self.counters.fill(0);
        self.selects.clear();
    }
}

/// Per-parse selector state
///
/// Compiled selectors are shared; the evaluator owns all mutable matching
/// state, so each parse needs its own instance.
#[derive(Debug)]
pub struct SelectorEvaluator {
    selectors: Vec<Arc<Selector>>,
    slots: Vec<Slot>,
    /// Frame pool; `frames[0]` is the document
    frames: Vec<Frame>,
    depth: usize,
    /// Open selected elements per selector
    active: Vec<u32>,
}

impl SelectorEvaluator {
    pub fn new(selectors: &[Arc<Selector>]) -> Self {
        let mut slots = Vec::new();
        for (selector, compiled) in selectors.iter().enumerate() {
            for (path, p) in compiled.paths().iter().enumerate() {
                for step in 0..p.steps.len() {
                    slots.push(Slot {
                        selector,
                        path,
                        step,
                        last: step + 1 == p.steps.len(),
                    });
                }
            }
        }
        let root = Frame::new(slots.len());
        SelectorEvaluator {
            selectors: selectors.to_vec(),
            slots,
            frames: vec![root],
            depth: 1,
            active: vec![0; selectors.len()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn selectors(&self) -> &[Arc<Selector>] {
        &self.selectors
    }

    /// Update the state for `event` and report the selectors enclosing it
    ///
    /// `parts` must hold the attributes of the tag an element-start event
    /// belongs to.
    pub fn observe(&mut self, event: &Event, parts: &[TagPart], input: &[u8]) -> Selection {
        if self.selectors.is_empty() {
            return Selection::default();
        }

        match event {
            Event::OpenElementStart { name, .. } | Event::StandaloneElementStart { name, .. } => {
                self.enter(name.slice(input), parts, input);
                self.selection(&[])
            }
            _ if event.is_element_end() => {
                let selection = self.selection(&[]);
                self.leave();
                selection
            }
            _ => match node_kind(event) {
                Some(kind) => {
                    let extra = self.node_matches(kind);
                    self.selection(&extra)
                }
                None => self.selection(&[]),
            },
        }
    }

    fn push_frame(&mut self) -> usize {
        if self.depth == self.frames.len() {
            self.frames.push(Frame::new(self.slots.len()));
        } else {
            self.frames[self.depth].reset();
        }
        self.depth += 1;
        self.depth - 1
    }

    fn enter(&mut self, name: &[u8], parts: &[TagPart], input: &[u8]) {
        let child = self.push_frame();
        let (head, tail) = self.frames.split_at_mut(child);
        let parent = &mut head[child - 1];
        let frame = &mut tail[0];
        let parent_is_root = child == 1;

        for (g, slot) in self.slots.iter().enumerate() {
            let selector = &self.selectors[slot.selector];
            let step = &selector.paths()[slot.path].steps[slot.step];
            let ignore_case = selector.dialect().ignores_case();

            if !step
                .branches
                .iter()
                .any(|branch| element_matches(branch, name, parts, input, ignore_case))
            {
                continue;
            }
            if !passes_index(step, parent, g) {
                continue;
            }
            if !axis_allows(step.axis, slot.step, g, parent, parent_is_root) {
                continue;
            }

            frame.matched[g] = true;
            if slot.last && !frame.selects.contains(&slot.selector) {
                trace!(selector = selector.source(), depth = child, "selector matched element");
                frame.selects.push(slot.selector);
            }
        }

        for g in 0..self.slots.len() {
            frame.reach[g] = parent.reach[g] || frame.matched[g];
        }
        for &selector in &frame.selects {
            self.active[selector] += 1;
        }
    }

    fn leave(&mut self) {
        if self.depth <= 1 {
            return;
        }
        self.depth -= 1;
        let frame = &self.frames[self.depth];
        for &selector in &frame.selects {
            self.active[selector] -= 1;
        }
    }

    /// Selectors whose final pseudo-node step selects a non-element node
    /// under the current element
    fn node_matches(&mut self, kind: PseudoNode) -> Vec<usize> {
        let mut extra = Vec::new();
        let top = self.depth - 1;
        let parent = &mut self.frames[top];

        for (g, slot) in self.slots.iter().enumerate() {
            if !slot.last {
                continue;
            }
            let step = &self.selectors[slot.selector].paths()[slot.path].steps[slot.step];
            match step.pseudo() {
                Some(PseudoNode::Content) => {}
                Some(pseudo) if pseudo == kind => {}
                _ => continue,
            }
            if !passes_index(step, parent, g) {
                continue;
            }
            if axis_allows(step.axis, slot.step, g, parent, top == 0) && !extra.contains(&slot.selector) {
                extra.push(slot.selector);
            }
        }
        extra
    }

    fn selection(&self, extra: &[usize]) -> Selection {
        let mut matched: Vec<usize> = self
            .active
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(i, _)| i)
            .collect();
        for &selector in extra {
            if !matched.contains(&selector) {
                matched.push(selector);
            }
        }
        matched.sort_unstable();
        Selection { matched }
    }
}

fn node_kind(event: &Event) -> Option<PseudoNode> {
    match event {
        Event::Text { .. } => Some(PseudoNode::Text),
        Event::Comment { .. } => Some(PseudoNode::Comment),
        Event::CData { .. } => Some(PseudoNode::CData),
        Event::DocType(_) => Some(PseudoNode::DocType),
        Event::XmlDeclaration(_) => Some(PseudoNode::XmlDecl),
        Event::ProcessingInstruction { .. } => Some(PseudoNode::ProcInstr),
        _ => None,
    }
}

/// Count a candidate and check its position among its siblings
fn passes_index(step: &Step, parent: &mut Frame, slot: usize) -> bool {
    match step.index {
        Some(index) => {
            parent.counters[slot] += 1;
            index.accepts(parent.counters[slot])
        }
        None => true,
    }
}

fn axis_allows(axis: Axis, step: usize, slot: usize, parent: &Frame, parent_is_root: bool) -> bool {
    match (step, axis) {
        (0, Axis::Child) => parent_is_root,
        (0, Axis::Descendant) => true,
        (_, Axis::Child) => parent.matched[slot - 1],
        (_, Axis::Descendant) => parent.reach[slot - 1],
    }
}

fn element_matches(
    branch: &Branch,
    name: &[u8],
    parts: &[TagPart],
    input: &[u8],
    ignore_case: bool,
) -> bool {
    let node_ok = match &branch.node {
        NodeTest::Any | NodeTest::Pseudo(PseudoNode::Content) => true,
        NodeTest::Name(expected) => names_equal(name, expected.as_bytes(), ignore_case),
        NodeTest::Pseudo(_) => false,
    };
    node_ok
        && branch
            .predicate
            .as_ref()
            .is_none_or(|p| predicate_matches(p, parts, input, ignore_case))
}

/// Evaluate an attribute predicate against the attributes of one tag
///
/// Comparisons on an absent attribute are false. `class='x'` also matches
/// when `x` is one of the whitespace-separated class tokens.
pub fn predicate_matches(
    predicate: &Predicate,
    parts: &[TagPart],
    input: &[u8],
    ignore_case: bool,
) -> bool {
    match predicate {
        Predicate::Compare { name, op, value } => {
            match find_attribute(parts, input, name.as_bytes(), ignore_case) {
                Some(attr) => compare(
                    name.as_bytes(),
                    *op,
                    attr.value_bytes(input),
                    value.as_bytes(),
                    ignore_case,
                ),
                None => false,
            }
        }
        Predicate::Exists(name) => find_attribute(parts, input, name.as_bytes(), ignore_case).is_some(),
        Predicate::NotExists(name) => {
            find_attribute(parts, input, name.as_bytes(), ignore_case).is_none()
        }
        Predicate::Not(inner) => !predicate_matches(inner, parts, input, ignore_case),
        Predicate::And(left, right) => {
            predicate_matches(left, parts, input, ignore_case)
                && predicate_matches(right, parts, input, ignore_case)
        }
        Predicate::Or(left, right) => {
            predicate_matches(left, parts, input, ignore_case)
                || predicate_matches(right, parts, input, ignore_case)
        }
    }
}

fn compare(name: &[u8], op: CompareOp, actual: &[u8], expected: &[u8], ignore_case: bool) -> bool {
    let equal = || {
        actual == expected
            || (names_equal(name, b"class", ignore_case)
                && actual
                    .split(|&b| is_whitespace(b))
                    .any(|token| token == expected))
    };
    match op {
        CompareOp::Eq => equal(),
        CompareOp::NotEq => !equal(),
        CompareOp::StartsWith => actual.starts_with(expected),
        CompareOp::EndsWith => actual.ends_with(expected),
        CompareOp::Contains => memchr::memmem::find(actual, expected).is_some(),
    }
}
