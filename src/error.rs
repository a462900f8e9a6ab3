//! Error and warning types
//!
//! Structural scan errors and well-formedness violations abort a parse and
//! carry the offending position. Permissive modes downgrade the
//! well-formedness cases to [`ParseWarning`]s instead.

use crate::core::position::Position;
use std::fmt;
use thiserror::Error;

/// Error raised by a [`MarkupHandler`](crate::sax::MarkupHandler) callback.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Markup construct named in scan errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    /// `<name ...>` or `<name .../>`
    OpenTag,
    /// `</name>`
    CloseTag,
    /// `<!-- ... -->`
    Comment,
    /// `<![CDATA[ ... ]]>`
    CData,
    /// `<!DOCTYPE ...>`
    DocType,
    /// `<?xml ...?>`
    XmlDeclaration,
    /// `<?target ...?>`
    ProcessingInstruction,
    /// Quoted attribute value
    AttributeValue,
    /// Literal content of a raw-text element
    RawText,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Construct::OpenTag => "open tag",
            Construct::CloseTag => "close tag",
            Construct::Comment => "comment",
            Construct::CData => "CDATA section",
            Construct::DocType => "DOCTYPE",
            Construct::XmlDeclaration => "XML declaration",
            Construct::ProcessingInstruction => "processing instruction",
            Construct::AttributeValue => "attribute value",
            Construct::RawText => "raw text element",
        };
        f.write_str(name)
    }
}

/// Fatal parse error
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input ended inside a construct
    #[error("unterminated {construct} starting at {position}")]
    Unterminated {
        construct: Construct,
        position: Position,
    },

    /// Element or attribute name contains an illegal character
    #[error("illegal character in name at {position}")]
    InvalidName { position: Position },

    /// Attribute syntax not allowed by the dialect
    #[error("malformed attribute at {position}: {reason}")]
    MalformedAttribute {
        reason: &'static str,
        position: Position,
    },

    /// Same attribute name repeated inside one tag
    #[error("duplicate attribute '{name}' at {position}")]
    DuplicateAttribute { name: String, position: Position },

    /// XML declaration not at the very start of the document, or malformed
    #[error("misplaced or malformed XML declaration at {position}")]
    MisplacedDeclaration { position: Position },

    /// Close tag that does not match the innermost open element
    #[error("close tag '{name}' at {position} does not match the open element")]
    UnbalancedClose { name: String, position: Position },

    /// Document ended while elements were still open
    #[error("document ended with unclosed elements [{}] at {position}", names.join(", "))]
    UnclosedElements {
        names: Vec<String>,
        position: Position,
    },

    /// Input longer than a span offset can address
    #[error("input of {len} bytes exceeds the {max} byte limit")]
    InputTooLarge { len: usize, max: usize },

    /// Consumer callback failed
    #[error("event handler failed: {0}")]
    Handler(#[source] HandlerError),

    /// Reading the input source failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Position of the offending input, if the error has one
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::Unterminated { position, .. }
            | ParseError::InvalidName { position }
            | ParseError::MalformedAttribute { position, .. }
            | ParseError::DuplicateAttribute { position, .. }
            | ParseError::MisplacedDeclaration { position }
            | ParseError::UnbalancedClose { position, .. }
            | ParseError::UnclosedElements { position, .. } => Some(*position),
            ParseError::InputTooLarge { .. } | ParseError::Handler(_) | ParseError::Io(_) => None,
        }
    }
}

/// Non-fatal well-formedness issue reported in permissive modes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Close tag with no open element of that name
    UnmatchedClose { name: String, position: Position },
    /// Open elements closed implicitly by a close tag of an ancestor
    AutoClosed { name: String, position: Position },
    /// Attribute repeated inside one tag (kept as-is)
    DuplicateAttribute { name: String, position: Position },
    /// Elements still open at end of document
    UnclosedAtEnd { name: String, position: Position },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::UnmatchedClose { name, position } => {
                write!(f, "unmatched close tag '{name}' at {position}")
            }
            ParseWarning::AutoClosed { name, position } => {
                write!(f, "element '{name}' auto-closed at {position}")
            }
            ParseWarning::DuplicateAttribute { name, position } => {
                write!(f, "duplicate attribute '{name}' at {position}")
            }
            ParseWarning::UnclosedAtEnd { name, position } => {
                write!(f, "element '{name}' still open at end of document ({position})")
            }
        }
    }
}

/// Selector compilation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector: {message} at offset {offset} ('{fragment}')")]
pub struct SelectorError {
    /// What went wrong
    pub message: String,
    /// Offending substring of the selector source
    pub fragment: String,
    /// Byte offset of `fragment` in the selector source
    pub offset: usize,
}

impl SelectorError {
    /// Build an error pointing at `source[offset..]`, clipped to the token
    pub fn at(source: &str, offset: usize, len: usize, message: impl Into<String>) -> Self {
        let start = offset.min(source.len());
        let mut end = (start + len.max(1)).min(source.len());
        while !source.is_char_boundary(end) {
            end += 1;
        }
        Self {
            message: message.into(),
            fragment: source[start..end].to_string(),
            offset: start,
        }
    }
}
