//! Parsing Strategy Module
//!
//! - Parallel: many independent documents at once over one configuration

pub mod parallel;

pub use parallel::{collect_many, parse_many};
