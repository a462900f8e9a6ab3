//! Line/column tracking
//!
//! Maps absolute byte offsets to 1-based (line, column) pairs while the
//! scan cursor moves forward. Columns count characters, not bytes, so
//! multi-byte UTF-8 sequences advance the column by one.

use memchr::{memchr_iter, memrchr};

/// A location in the input.
///
/// Ordering is lexicographic by (line, column), which is also document
/// order for positions produced by one forward scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// 1-based line number
    pub line: u32,
    /// 1-based column number
    pub column: u32,
    /// Absolute byte offset into the input
    pub offset: usize,
}

impl Position {
    /// Position of the first byte of a document
    pub const START: Position = Position {
        line: 1,
        column: 1,
        offset: 0,
    };
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Forward-only offset to position mapper.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    current: Position,
}

impl PositionTracker {
    /// Tracker positioned at the start of the input
    pub fn new() -> Self {
        Self {
            current: Position::START,
        }
    }

    /// Position of the last offset reached
    #[inline]
    pub fn current(&self) -> Position {
        self.current
    }

    /// Position of `offset` without moving the tracker.
    ///
    /// Diagnostics use this for offsets inside a token whose events have
    /// not been positioned yet. Offsets behind the current one resolve to
    /// the current position.
    pub fn peek(&self, input: &[u8], offset: usize) -> Position {
        let offset = offset.min(input.len());
        if offset <= self.current.offset {
            return self.current;
        }

        let gap = &input[self.current.offset..offset];
        let mut pos = self.current;
        let newlines = memchr_iter(b'\n', gap).count();
        if newlines == 0 {
            pos.column += char_count(gap);
        } else {
            pos.line += newlines as u32;
            // Column restarts right after the last '\n'
            let after = memrchr(b'\n', gap).map_or(0, |i| i + 1);
            pos.column = 1 + char_count(&gap[after..]);
        }
        pos.offset = offset;
        pos
    }

    /// Advance to `offset` and return its position.
    ///
    /// Offsets behind the current one are never recomputed: the current
    /// position is returned unchanged.
    pub fn advance_to(&mut self, input: &[u8], offset: usize) -> Position {
        self.current = self.peek(input, offset);
        self.current
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of UTF-8 scalar values in `bytes` (continuation bytes skipped)
#[inline]
fn char_count(bytes: &[u8]) -> u32 {
    bytes.iter().filter(|&&b| (b & 0xC0) != 0x80).count() as u32
}
