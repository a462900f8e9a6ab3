//! Block selectors
//!
//! A small path language for picking blocks out of the event stream:
//!
//! - `//div`, `/html/body`, `ul/li[2]`: element steps with child and
//!   descendant axes and 1-based position filters
//! - `p.main`, `#x`, `%menu`: class, id and fragment-reference shorthand
//! - `a[href^='http' AND !(rel='nofollow')]`: attribute predicates
//! - `div/text()`, `div/content()`: non-element nodes
//!
//! Selectors are compiled once into an immutable [`Selector`] and shared
//! across parses; each parse evaluates them with its own
//! [`SelectorEvaluator`].

pub mod cache;
pub mod compiler;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use cache::SelectorCache;
pub use compiler::{
    FragmentReferenceResolver, ReferenceResolver, Selector, SelectorOptions,
};
pub use eval::{Selection, SelectorEvaluator};
