//! Selector Compiler
//!
//! Turns a parsed selector into its matching form. Shorthand conditions are
//! folded into one predicate per step, fragment references are resolved,
//! and with a reference resolver present every named step gains a second
//! branch matching any element that declares a fragment of that name.

use super::parser::{
    self, Axis, CompareOp, Condition, IndexFilter, NodeTest, PathAst, Predicate, PseudoNode,
    StepAst,
};
use crate::config::Dialect;
use crate::error::SelectorError;
use std::fmt;
use std::sync::Arc;

/// Maps a fragment reference to predicate source text
///
/// The returned text is parsed as the inside of a `[...]` bracket, for
/// example `th:fragment='menu' OR data-th-fragment='menu'`.
pub trait ReferenceResolver: Send + Sync {
    fn resolve_selector(&self, reference: &str) -> String;
}

impl<F> ReferenceResolver for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn resolve_selector(&self, reference: &str) -> String {
        self(reference)
    }
}

/// Resolver matching a fragment-name attribute and its `data-` alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentReferenceResolver {
    attribute: String,
}

impl FragmentReferenceResolver {
    pub const DEFAULT_ATTRIBUTE: &'static str = "th:fragment";

    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// `th:fragment` → `data-th-fragment`
    pub fn alias(&self) -> String {
        format!("data-{}", self.attribute.replace(':', "-"))
    }
}

impl Default for FragmentReferenceResolver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTRIBUTE)
    }
}

impl ReferenceResolver for FragmentReferenceResolver {
    fn resolve_selector(&self, reference: &str) -> String {
        let value = quote(reference);
        format!("{}={value} OR {}={value}", self.attribute, self.alias())
    }
}

/// Compilation settings
#[derive(Clone, Default)]
pub struct SelectorOptions {
    pub dialect: Dialect,
    pub reference_resolver: Option<Arc<dyn ReferenceResolver>>,
}

impl SelectorOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            reference_resolver: None,
        }
    }

    pub fn with_resolver(mut self, resolver: impl ReferenceResolver + 'static) -> Self {
        self.reference_resolver = Some(Arc::new(resolver));
        self
    }

    /// Shortcut for the default `th:fragment` resolver
    pub fn with_fragment_resolver(self) -> Self {
        self.with_resolver(FragmentReferenceResolver::default())
    }
}

impl fmt::Debug for SelectorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorOptions")
            .field("dialect", &self.dialect)
            .field("reference_resolver", &self.reference_resolver.is_some())
            .finish()
    }
}

/// Compiled selector, immutable and shareable across parses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    dialect: Dialect,
    paths: Vec<Path>,
}

/// One `||` alternative
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub steps: Vec<Step>,
}

/// One location step; an element satisfies it if any branch matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    pub branches: Vec<Branch>,
    pub index: Option<IndexFilter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub node: NodeTest,
    pub predicate: Option<Predicate>,
}

impl Step {
    /// Pseudo-node kind if this step selects non-element nodes
    pub fn pseudo(&self) -> Option<PseudoNode> {
        match self.branches.first().map(|b| &b.node) {
            Some(NodeTest::Pseudo(kind)) => Some(*kind),
            _ => None,
        }
    }
}

impl Selector {
    /// Compile selector source
    pub fn compile(source: &str, options: &SelectorOptions) -> Result<Self, SelectorError> {
        let ast = parser::parse(source)?;
        let resolver = options.reference_resolver.as_deref();
        let paths = ast
            .paths
            .iter()
            .map(|path| compile_path(source, path, resolver))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Selector {
            source: source.to_string(),
            dialect: options.dialect,
            paths,
        })
    }

    /// Compile without a reference resolver
    pub fn parse(source: &str, dialect: Dialect) -> Result<Self, SelectorError> {
        Self::compile(source, &SelectorOptions::new(dialect))
    }

    /// Text the selector was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Canonical string form
    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn compile_path(
    source: &str,
    path: &PathAst,
    resolver: Option<&dyn ReferenceResolver>,
) -> Result<Path, SelectorError> {
    let expand = resolver.is_some()
        && !matches!(
            path.steps.last().map(|s| &s.node),
            Some(NodeTest::Pseudo(PseudoNode::Content))
        );
    let steps = path
        .steps
        .iter()
        .map(|step| compile_step(source, step, resolver, expand))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Path { steps })
}

fn compile_step(
    source: &str,
    step: &StepAst,
    resolver: Option<&dyn ReferenceResolver>,
    expand: bool,
) -> Result<Step, SelectorError> {
    let mut predicate: Option<Predicate> = None;
    let mut has_reference = false;

    for condition in &step.conditions {
        let next = match condition {
            Condition::Predicate(p) => p.clone(),
            Condition::FragmentRef { name, offset } => {
                has_reference = true;
                match resolver {
                    Some(resolver) => resolve(source, resolver, name, *offset, name.len() + 1)?,
                    None => fragment_presence(),
                }
            }
        };
        predicate = Some(match predicate {
            Some(prev) => prev.and(next),
            None => next,
        });
    }

    let mut branches = Vec::with_capacity(2);
    match (&step.node, resolver) {
        (NodeTest::Name(name), Some(resolver)) if expand && !has_reference => {
            let fragment = resolve(source, resolver, name, step.offset, 1)?;
            branches.push(Branch {
                node: step.node.clone(),
                predicate: predicate.clone(),
            });
            branches.push(Branch {
                node: NodeTest::Any,
                predicate: Some(match predicate {
                    Some(p) => p.and(fragment),
                    None => fragment,
                }),
            });
        }
        _ => branches.push(Branch {
            node: step.node.clone(),
            predicate,
        }),
    }

    Ok(Step {
        axis: step.axis,
        branches,
        index: step.index,
    })
}

fn resolve(
    source: &str,
    resolver: &dyn ReferenceResolver,
    reference: &str,
    offset: usize,
    len: usize,
) -> Result<Predicate, SelectorError> {
    let resolved = resolver.resolve_selector(reference);
    parser::parse_predicate(&resolved).map_err(|e| {
        SelectorError::at(
            source,
            offset,
            len,
            format!("fragment reference '{reference}' resolved to invalid predicate '{resolved}': {}", e.message),
        )
    })
}

/// Any non-empty fragment attribute, for `%ref` without a resolver
fn fragment_presence() -> Predicate {
    let resolver = FragmentReferenceResolver::default();
    Predicate::compare(resolver.attribute(), CompareOp::NotEq, "")
        .or(Predicate::compare(resolver.alias(), CompareOp::NotEq, ""))
}

fn quote(value: &str) -> String {
    if value.contains('\'') {
        format!("\"{value}\"")
    } else {
        format!("'{value}'")
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.paths.as_slice() {
            [path] => write!(f, "{path}"),
            paths => {
                f.write_str("(")?;
                for (i, path) in paths.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" || ")?;
                    }
                    write!(f, "{path}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_branch = |f: &mut fmt::Formatter<'_>, branch: &Branch| -> fmt::Result {
            f.write_str(self.axis.as_str())?;
            match &branch.node {
                NodeTest::Any => f.write_str("*")?,
                NodeTest::Name(name) => f.write_str(name)?,
                NodeTest::Pseudo(kind) => f.write_str(kind.as_str())?,
            }
            if let Some(predicate) = &branch.predicate {
                write!(f, "[{predicate}]")?;
            }
            if let Some(index) = self.index {
                write!(f, "{index}")?;
            }
            Ok(())
        };

        match self.branches.as_slice() {
            [branch] => write_branch(f, branch),
            branches => {
                f.write_str("(")?;
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" || ")?;
                    }
                    write_branch(f, branch)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { name, op, value } => {
                write!(f, "{name}{}{}", op.as_str(), quote(value))
            }
            Predicate::Exists(name) => f.write_str(name),
            Predicate::NotExists(name) => write!(f, "!{name}"),
            Predicate::Not(inner) => write!(f, "!({inner})"),
            Predicate::And(left, right) => {
                write_operand(f, left)?;
                f.write_str(" AND ")?;
                write_operand(f, right)
            }
            Predicate::Or(left, right) => write!(f, "{left} OR {right}"),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Predicate) -> fmt::Result {
    match operand {
        Predicate::Or(..) => write!(f, "({operand})"),
        _ => write!(f, "{operand}"),
    }
}
