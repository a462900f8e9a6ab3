//! Core markup parsing primitives
//!
//! This module contains the fundamental building blocks of a parse:
//! - Span / Position: zero-copy input references and line/column tracking
//! - Scanner: SIMD-accelerated byte cursor using memchr
//! - Attributes: attribute and inner-whitespace scanning inside a tag
//! - Tokenizer: pull-based state machine producing structural tokens
//! - Elements: read-only HTML element catalog
//! - Balance: open-element stack and close-tag resolution

pub mod attributes;
pub mod balance;
pub mod elements;
pub mod position;
pub mod scanner;
pub mod span;
pub mod tokenizer;

pub use position::Position;
pub use span::Span;
