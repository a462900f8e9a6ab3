//! Span - offset and length into the original input
//!
//! Zero-copy reference to a portion of the input document.
//! Used for element names, attribute names/values, text, comment bodies
//! and every other event payload.

use std::fmt;
use std::ops::Range;

/// A span referencing a portion of the input document.
///
/// Size: 8 bytes (offset: 4 bytes, len: 4 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset into the original input
    pub offset: u32,
    /// Length in bytes
    pub len: u32,
}

impl Span {
    /// Largest input length whose offsets all fit a span
    pub const MAX_INPUT_LEN: usize = u32::MAX as usize;

    /// Create a new span
    #[inline]
    pub const fn new(offset: u32, len: u32) -> Self {
        Self { offset, len }
    }

    /// Create a span covering `start..end` (byte offsets)
    #[inline]
    pub fn from_range(start: usize, end: usize) -> Self {
        debug_assert!(start <= end && end <= Self::MAX_INPUT_LEN);
        Self {
            offset: start as u32,
            len: (end - start) as u32,
        }
    }

    /// Create an empty span positioned at `offset`.
    ///
    /// Synthetic events (auto-close) use these: they occupy no input.
    #[inline]
    pub fn empty_at(offset: usize) -> Self {
        debug_assert!(offset <= Self::MAX_INPUT_LEN);
        Self {
            offset: offset as u32,
            len: 0,
        }
    }

    /// Check if this span is empty
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Start offset as usize
    #[inline]
    pub const fn start(&self) -> usize {
        self.offset as usize
    }

    /// Get the end offset (exclusive)
    #[inline]
    pub const fn end(&self) -> usize {
        self.offset as usize + self.len as usize
    }

    /// Byte range of this span
    #[inline]
    pub const fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Extract the byte slice from input
    #[inline]
    pub fn slice<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        input.get(self.range()).unwrap_or(&[])
    }

    /// Extract as UTF-8 string from input
    #[inline]
    pub fn as_str<'a>(&self, input: &'a [u8]) -> Option<&'a str> {
        std::str::from_utf8(self.slice(input)).ok()
    }

    /// Smallest span covering both `self` and `other`
    #[inline]
    pub fn join(&self, other: Span) -> Span {
        let start = self.start().min(other.start());
        let end = self.end().max(other.end());
        Span::from_range(start, end)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start(), self.end())
    }
}
