//! SIMD-accelerated byte cursor using memchr
//!
//! Uses memchr crate for fast delimiter searching with SIMD acceleration:
//! - SSE2 (default x86_64)
//! - AVX2 (runtime detection)
//! - NEON (aarch64)
//!
//! The cursor knows nothing about markup: it finds bytes and byte
//! sequences, reads names and whitespace runs, and hands back [`Span`]s.

use super::span::Span;
use memchr::{memchr, memmem};

/// Byte cursor over the input document
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given input
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Scanner { input, pos: 0 }
    }

    /// The whole input
    #[inline]
    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Set the current position
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Get remaining bytes
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Peek at byte at offset from current position
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Advance by n bytes (clamped to the end of input)
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Skip a whitespace run, returning its span if non-empty
    #[inline]
    pub fn take_whitespace(&mut self) -> Option<Span> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !is_whitespace(b) {
                break;
            }
            self.pos += 1;
        }
        (self.pos > start).then(|| Span::from_range(start, self.pos))
    }

    /// Find next '<' (structural lead-in) using SIMD
    #[inline]
    pub fn find_tag_start(&self) -> Option<usize> {
        self.find_byte(b'<')
    }

    /// Find next occurrence of a specific byte
    #[inline]
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        memchr(byte, self.remaining()).map(|i| self.pos + i)
    }

    /// Find the next occurrence of a byte sequence (`-->`, `]]>`, `?>`)
    #[inline]
    pub fn find_seq(&self, needle: &[u8]) -> Option<usize> {
        memmem::find(self.remaining(), needle).map(|i| self.pos + i)
    }

    /// Find the next `</name` whose name is exactly `name` (ASCII case
    /// folded when `ignore_case`), followed by whitespace, `/`, `>` or the
    /// end of input. Returns the offset of the `<`.
    pub fn find_close_tag(&self, name: &[u8], ignore_case: bool) -> Option<usize> {
        let mut from = self.pos;
        let finder = memmem::Finder::new(b"</");
        while let Some(i) = finder.find(&self.input[from..]) {
            let lt = from + i;
            let name_start = lt + 2;
            let name_end = name_start + name.len();
            if let Some(candidate) = self.input.get(name_start..name_end) {
                let same = if ignore_case {
                    candidate.eq_ignore_ascii_case(name)
                } else {
                    candidate == name
                };
                let boundary = self
                    .input
                    .get(name_end)
                    .is_none_or(|&b| is_whitespace(b) || b == b'>' || b == b'/');
                if same && boundary {
                    return Some(lt);
                }
            }
            from = name_start;
        }
        None
    }

    /// Check if input starts with a byte sequence at current position
    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.remaining().starts_with(needle)
    }

    /// Same as [`starts_with`](Self::starts_with), ASCII case-insensitive
    #[inline]
    pub fn starts_with_ignore_case(&self, needle: &[u8]) -> bool {
        self.remaining()
            .get(..needle.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(needle))
    }

    /// Read an XML name (starts with letter/underscore/colon, continues
    /// with letters/digits/hyphens/underscores/periods/colons)
    pub fn read_name(&mut self) -> Option<Span> {
        let start = self.pos;
        if !is_name_start_char(self.peek()?) {
            return None;
        }
        self.pos += 1;
        while self.peek().is_some_and(is_name_char) {
            self.pos += 1;
        }
        Some(Span::from_range(start, self.pos))
    }

    /// Read a lenient HTML name: any run of bytes up to whitespace, `/`,
    /// `>` or one of the `extra` stop bytes
    pub fn read_loose_name(&mut self, extra: &[u8]) -> Option<Span> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_whitespace(b) || b == b'/' || b == b'>' || extra.contains(&b) {
                break;
            }
            self.pos += 1;
        }
        (self.pos > start).then(|| Span::from_range(start, self.pos))
    }
}

/// Markup whitespace (space, tab, newline, carriage return, form feed)
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0C)
}

/// Check if byte is valid name start character
/// Allows ASCII letters, underscore, colon, and non-ASCII (UTF-8 Unicode)
#[inline]
pub fn is_name_start_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

/// Check if byte is valid name character
/// Allows ASCII alphanumeric, punctuation, and non-ASCII (UTF-8 Unicode)
#[inline]
pub fn is_name_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b':') || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tag_start() {
        let scanner = Scanner::new(b"hello <world>");
        assert_eq!(scanner.find_tag_start(), Some(6));
    }

    #[test]
    fn test_find_seq() {
        let mut scanner = Scanner::new(b"<!-- a -- b -->tail");
        scanner.advance(4);
        assert_eq!(scanner.find_seq(b"-->"), Some(12));
    }

    #[test]
    fn test_read_name() {
        let mut scanner = Scanner::new(b"element-name>");
        let span = scanner.read_name().unwrap();
        assert_eq!(span.slice(scanner.input()), b"element-name");
        assert_eq!(scanner.position(), 12);
    }

    #[test]
    fn test_read_name_rejects_digit() {
        let mut scanner = Scanner::new(b"1abc");
        assert!(scanner.read_name().is_none());
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn test_read_loose_name() {
        let mut scanner = Scanner::new(b"@click=x");
        let span = scanner.read_loose_name(b"=").unwrap();
        assert_eq!(span.slice(scanner.input()), b"@click");
    }

    #[test]
    fn test_take_whitespace() {
        let mut scanner = Scanner::new(b"  \t\n hello");
        assert_eq!(scanner.take_whitespace(), Some(Span::from_range(0, 5)));
        assert_eq!(scanner.take_whitespace(), None);
    }

    #[test]
    fn test_starts_with_ignore_case() {
        let scanner = Scanner::new(b"<!doctype html>");
        assert!(scanner.starts_with_ignore_case(b"<!DOCTYPE"));
        assert!(!scanner.starts_with(b"<!DOCTYPE"));
    }

    #[test]
    fn test_find_close_tag() {
        let scanner = Scanner::new(b"if (a </b) x; </scriptx> </SCRIPT >");
        assert_eq!(scanner.find_close_tag(b"script", true), Some(25));
        assert_eq!(scanner.find_close_tag(b"script", false), None);
    }

    #[test]
    fn test_find_close_tag_at_eof() {
        let scanner = Scanner::new(b"x</style");
        assert_eq!(scanner.find_close_tag(b"style", false), Some(1));
    }
}
