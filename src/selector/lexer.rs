//! Selector Lexer
//!
//! Tokenizes selector source into tokens carrying their byte offsets.
//! After a comparison operator the next token is read as a value: either a
//! quoted string or a bare run up to whitespace, `]` or `)`.

use crate::error::SelectorError;

/// Selector token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Slash,       // /
    DoubleSlash, // //
    Star,        // *
    Dot,         // .
    Hash,        // #
    Percent,     // %
    At,          // @
    Bang,        // !
    DoublePipe,  // ||

    // Comparison operators
    Eq,         // =
    NotEq,      // !=
    StartsWith, // ^=
    EndsWith,   // $=
    Contains,   // *=

    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]

    /// Name, number or keyword
    Word(String),
    /// Quoted string (quotes removed)
    Str(String),
    /// Unquoted value after an operator
    Bare(String),

    Eof,
}

impl Token {
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            Token::Eq | Token::NotEq | Token::StartsWith | Token::EndsWith | Token::Contains
        )
    }

    /// Word equal to `keyword`, ASCII case-insensitively
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

/// A token and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
    pub len: usize,
}

/// Selector lexer
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    expect_value: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            expect_value: false,
        }
    }

    /// Tokenize the whole input; the last token is always `Eof`
    pub fn tokenize(input: &'a str) -> Result<Vec<Spanned>, SelectorError> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let spanned = lexer.next_token()?;
            let done = spanned.token == Token::Eof;
            tokens.push(spanned);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Get the remaining input
    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Peek at current character
    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Peek at character at offset
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    /// Skip whitespace
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Spanned, SelectorError> {
        self.skip_whitespace();
        let start = self.pos;

        let Some(c) = self.peek() else {
            return Ok(self.spanned(Token::Eof, start));
        };

        if std::mem::take(&mut self.expect_value) {
            let token = if c == '\'' || c == '"' {
                self.read_string(c)?
            } else {
                self.read_bare()?
            };
            return Ok(self.spanned(token, start));
        }

        let next = self.peek_at(1);
        let (token, len) = match (c, next) {
            ('/', Some('/')) => (Token::DoubleSlash, 2),
            ('/', _) => (Token::Slash, 1),
            ('|', Some('|')) => (Token::DoublePipe, 2),
            ('!', Some('=')) => (Token::NotEq, 2),
            ('^', Some('=')) => (Token::StartsWith, 2),
            ('$', Some('=')) => (Token::EndsWith, 2),
            ('*', Some('=')) => (Token::Contains, 2),
            ('!', _) => (Token::Bang, 1),
            ('*', _) => (Token::Star, 1),
            ('=', _) => (Token::Eq, 1),
            ('.', _) => (Token::Dot, 1),
            ('#', _) => (Token::Hash, 1),
            ('%', _) => (Token::Percent, 1),
            ('@', _) => (Token::At, 1),
            ('(', _) => (Token::LeftParen, 1),
            (')', _) => (Token::RightParen, 1),
            ('[', _) => (Token::LeftBracket, 1),
            (']', _) => (Token::RightBracket, 1),
            ('\'' | '"', _) => {
                let token = self.read_string(c)?;
                return Ok(self.spanned(token, start));
            }
            (c, _) if is_word_char(c) => {
                let token = self.read_word();
                return Ok(self.spanned(token, start));
            }
            (c, _) => {
                return Err(SelectorError::at(
                    self.input,
                    start,
                    c.len_utf8(),
                    format!("unexpected character '{c}'"),
                ));
            }
        };

        self.pos += len;
        if token.is_operator() {
            self.expect_value = true;
        }
        Ok(self.spanned(token, start))
    }

    fn spanned(&self, token: Token, start: usize) -> Spanned {
        Spanned {
            token,
            offset: start,
            len: self.pos - start,
        }
    }

    /// Read a name, number or keyword
    fn read_word(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !is_word_char(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        Token::Word(self.input[start..self.pos].to_string())
    }

    /// Read a quoted string literal
    fn read_string(&mut self, quote: char) -> Result<Token, SelectorError> {
        let start = self.pos;
        self.pos += 1; // Skip opening quote
        match self.remaining().find(quote) {
            Some(len) => {
                let value = self.input[self.pos..self.pos + len].to_string();
                self.pos += len + 1;
                Ok(Token::Str(value))
            }
            None => Err(SelectorError::at(
                self.input,
                start,
                self.input.len() - start,
                "unterminated string literal",
            )),
        }
    }

    /// Read an unquoted value
    ///
    /// Quote characters are only allowed inside quoted values.
    fn read_bare(&mut self) -> Result<Token, SelectorError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ']' || c == ')' {
                break;
            }
            if c == '\'' || c == '"' {
                return Err(SelectorError::at(
                    self.input,
                    self.pos,
                    1,
                    "quote character in unquoted value",
                ));
            }
            self.pos += c.len_utf8();
        }
        Ok(Token::Bare(self.input[start..self.pos].to_string()))
    }
}

/// Characters allowed in names: letters, digits, `-`, `_`, `:` and any
/// non-ASCII character
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | ':') || !c.is_ascii()
}
