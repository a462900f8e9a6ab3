//! Parse configuration
//!
//! A parse is configured by a [`Dialect`] (scanning rules and name case
//! sensitivity), a [`BalancingPolicy`] (what to do with close tags that do
//! not match the innermost open element) and any number of compiled
//! selectors whose matches are reported with every event.

use crate::selector::Selector;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Scanning rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// XML well-formedness: malformed markup is an error, names are case
    /// sensitive
    Xml,
    /// Permissive HTML: uninterpretable `<` is text, names are case
    /// insensitive, the HTML element catalog applies
    #[default]
    Html,
}

impl Dialect {
    /// Whether malformed markup aborts the parse
    #[inline]
    pub fn is_strict(self) -> bool {
        matches!(self, Dialect::Xml)
    }

    /// Whether element and attribute names compare ASCII case-insensitively
    #[inline]
    pub fn ignores_case(self) -> bool {
        matches!(self, Dialect::Html)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Xml => "xml-strict",
            Dialect::Html => "html-permissive",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xml-strict" | "xml" => Ok(Dialect::Xml),
            "html-permissive" | "html" => Ok(Dialect::Html),
            other => Err(UnknownOption::new("dialect", other)),
        }
    }
}

/// What happens to close tags that do not match the innermost open element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BalancingPolicy {
    /// Only exact matches of the innermost element close it; everything
    /// else is reported as unmatched
    NoBalancing,
    /// Missing closes are synthesized as auto-close events
    #[default]
    AutoClose,
    /// Any imbalance is an error
    RequireBalanced,
}

impl BalancingPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            BalancingPolicy::NoBalancing => "no-balancing",
            BalancingPolicy::AutoClose => "auto-close",
            BalancingPolicy::RequireBalanced => "require-balanced",
        }
    }
}

impl fmt::Display for BalancingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BalancingPolicy {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no-balancing" => Ok(BalancingPolicy::NoBalancing),
            "auto-close" => Ok(BalancingPolicy::AutoClose),
            "require-balanced" => Ok(BalancingPolicy::RequireBalanced),
            other => Err(UnknownOption::new("balancing policy", other)),
        }
    }
}

/// Unrecognized option name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownOption {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Everything one parse needs besides the input.
///
/// Cheap to clone: selectors are shared behind `Arc`, so one configuration
/// can drive many concurrent parses.
#[derive(Debug, Clone, Default)]
pub struct ParseConfig {
    pub dialect: Dialect,
    pub policy: BalancingPolicy,
    pub selectors: Vec<Arc<Selector>>,
}

impl ParseConfig {
    /// Permissive HTML with auto-close balancing
    pub fn html() -> Self {
        Self {
            dialect: Dialect::Html,
            ..Self::default()
        }
    }

    /// Strict XML with auto-close balancing
    pub fn xml() -> Self {
        Self {
            dialect: Dialect::Xml,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: BalancingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Report matches of `selector` with every event. Its index in the
    /// configuration is the id used in [`Selection`](crate::selector::Selection).
    pub fn with_selector(mut self, selector: Arc<Selector>) -> Self {
        self.selectors.push(selector);
        self
    }

    pub fn with_selectors(mut self, selectors: impl IntoIterator<Item = Arc<Selector>>) -> Self {
        self.selectors.extend(selectors);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParseConfig::default();
        assert_eq!(config.dialect, Dialect::Html);
        assert_eq!(config.policy, BalancingPolicy::AutoClose);
        assert!(config.selectors.is_empty());
    }

    #[test]
    fn test_option_names_round_trip() {
        for dialect in [Dialect::Xml, Dialect::Html] {
            assert_eq!(dialect.to_string().parse::<Dialect>(), Ok(dialect));
        }
        for policy in [
            BalancingPolicy::NoBalancing,
            BalancingPolicy::AutoClose,
            BalancingPolicy::RequireBalanced,
        ] {
            assert_eq!(policy.to_string().parse::<BalancingPolicy>(), Ok(policy));
        }
    }

    #[test]
    fn test_unknown_option() {
        let err = "sgml".parse::<Dialect>().unwrap_err();
        assert_eq!(err.to_string(), "unknown dialect 'sgml'");
    }

    #[test]
    fn test_builder() {
        let config = ParseConfig::xml().with_policy(BalancingPolicy::RequireBalanced);
        assert!(config.dialect.is_strict());
        assert_eq!(config.policy, BalancingPolicy::RequireBalanced);
    }
}
