//! Selector Parser
//!
//! Recursive descent parser for block selectors:
//!
//! ```text
//! selector   := path ('||' path)*
//! path       := step+
//! step       := ('/' | '//')? node? shorthand* bracket*
//! node       := name | '*' | pseudo '(' ')'
//! shorthand  := '.' name | '#' name | '%' name
//! bracket    := '[' (index | or_expr) ']'
//! index      := digits | 'even' '(' ')' | 'odd' '(' ')'
//! or_expr    := and_expr ('OR' and_expr)*
//! and_expr   := unary ('AND' unary)*
//! unary      := '!' '(' or_expr ')' | '!' '@'? name | '(' or_expr ')' | test
//! test       := '@'? name (op value)?
//! ```
//!
//! Redundant parentheses enclosing the whole selector are removed before
//! parsing.

use super::lexer::{Lexer, Spanned, Token};
use crate::error::SelectorError;
use std::fmt;

/// Selector AST: alternatives joined by `||`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorAst {
    pub paths: Vec<PathAst>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAst {
    pub steps: Vec<StepAst>,
}

/// One location step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepAst {
    pub axis: Axis,
    pub node: NodeTest,
    /// Shorthand and bracket conditions in source order, joined by AND
    pub conditions: Vec<Condition>,
    pub index: Option<IndexFilter>,
    /// Offset of the step in the source, for diagnostics
    pub offset: usize,
}

/// Relation of a step to the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Child,
    Descendant,
}

impl Axis {
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::Child => "/",
            Axis::Descendant => "//",
        }
    }
}

/// Node test in a step
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeTest {
    /// Any element (`*`)
    Any,
    /// Element with this name
    Name(String),
    /// Non-element node kind, or `content()`
    Pseudo(PseudoNode),
}

/// Pseudo-node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoNode {
    Text,
    Comment,
    CData,
    DocType,
    XmlDecl,
    ProcInstr,
    /// Every child node of the matched parent, elements included
    Content,
}

impl PseudoNode {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(PseudoNode::Text),
            "comment" => Some(PseudoNode::Comment),
            "cdata" => Some(PseudoNode::CData),
            "doctype" => Some(PseudoNode::DocType),
            "xmldecl" => Some(PseudoNode::XmlDecl),
            "procinstr" => Some(PseudoNode::ProcInstr),
            "content" => Some(PseudoNode::Content),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PseudoNode::Text => "text()",
            PseudoNode::Comment => "comment()",
            PseudoNode::CData => "cdata()",
            PseudoNode::DocType => "doctype()",
            PseudoNode::XmlDecl => "xmldecl()",
            PseudoNode::ProcInstr => "procinstr()",
            PseudoNode::Content => "content()",
        }
    }
}

/// Condition attached to a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Predicate(Predicate),
    /// `%name`, resolved at compile time
    FragmentRef { name: String, offset: usize },
}

/// Boolean attribute predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    Compare {
        name: String,
        op: CompareOp,
        value: String,
    },
    Exists(String),
    NotExists(String),
    Not(Box<Predicate>),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    pub fn compare(name: impl Into<String>, op: CompareOp, value: impl Into<String>) -> Self {
        Predicate::Compare {
            name: name.into(),
            op,
            value: value.into(),
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }
}

/// Attribute value comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    NotEq,
    StartsWith,
    EndsWith,
    Contains,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::StartsWith => "^=",
            CompareOp::EndsWith => "$=",
            CompareOp::Contains => "*=",
        }
    }
}

/// Position filter, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFilter {
    Position(u32),
    Even,
    Odd,
}

impl IndexFilter {
    #[inline]
    pub fn accepts(self, position: u32) -> bool {
        match self {
            IndexFilter::Position(n) => position == n,
            IndexFilter::Even => position % 2 == 0,
            IndexFilter::Odd => position % 2 == 1,
        }
    }
}

impl fmt::Display for IndexFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexFilter::Position(n) => write!(f, "[{n}]"),
            IndexFilter::Even => f.write_str("[even()]"),
            IndexFilter::Odd => f.write_str("[odd()]"),
        }
    }
}

/// Selector parser
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    /// Index of the token that ends parsing (Eof, or a stripped ')')
    end: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser
    pub fn new(source: &'a str) -> Result<Self, SelectorError> {
        let tokens = Lexer::tokenize(source)?;
        let end = tokens.len() - 1;
        Ok(Parser {
            source,
            tokens,
            pos: 0,
            end,
        })
    }

    /// Parse a complete selector
    pub fn parse(mut self) -> Result<SelectorAst, SelectorError> {
        self.strip_enclosing_parens();
        let mut paths = vec![self.parse_path()?];
        while self.current().token == Token::DoublePipe {
            self.advance();
            paths.push(self.parse_path()?);
        }
        if self.pos != self.end {
            return Err(self.error_here("unexpected token"));
        }
        Ok(SelectorAst { paths })
    }

    /// Parse a bare predicate expression (the inside of a bracket)
    pub fn parse_predicate_source(mut self) -> Result<Predicate, SelectorError> {
        let predicate = self.parse_or()?;
        if self.pos != self.end {
            return Err(self.error_here("unexpected token in predicate"));
        }
        Ok(predicate)
    }

    /// Drop outer `( ... )` pairs that enclose everything
    fn strip_enclosing_parens(&mut self) {
        while self.tokens[self.pos].token == Token::LeftParen {
            let mut depth = 0usize;
            let mut closing = None;
            for (i, spanned) in self.tokens[self.pos..self.end].iter().enumerate() {
                match spanned.token {
                    Token::LeftParen => depth += 1,
                    Token::RightParen => {
                        depth -= 1;
                        if depth == 0 {
                            closing = Some(self.pos + i);
                            break;
                        }
                    }
                    _ => {}
                }
            }
            match closing {
                Some(close) if close + 1 == self.end => {
                    self.pos += 1;
                    self.end = close;
                }
                _ => break,
            }
        }
    }

    fn current(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.end)]
    }

    fn peek_token(&self, ahead: usize) -> &Token {
        &self.tokens[(self.pos + ahead).min(self.end)].token
    }

    fn at_end(&self) -> bool {
        self.pos >= self.end
    }

    fn advance(&mut self) {
        if self.pos < self.end {
            self.pos += 1;
        }
    }

    fn error_here(&self, message: &str) -> SelectorError {
        if self.at_end() {
            // point at the last token read
            let (offset, len) = match self.pos.checked_sub(1).map(|i| &self.tokens[i]) {
                Some(last) => (last.offset, last.len),
                None => (self.source.len(), 0),
            };
            return SelectorError::at(
                self.source,
                offset,
                len,
                format!("{message}: unexpected end of selector"),
            );
        }
        let current = self.current();
        SelectorError::at(self.source, current.offset, current.len, message)
    }

    fn expect(&mut self, token: Token, message: &str) -> Result<(), SelectorError> {
        if !self.at_end() && self.current().token == token {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(message))
        }
    }

    fn parse_path(&mut self) -> Result<PathAst, SelectorError> {
        let mut steps = Vec::new();
        loop {
            steps.push(self.parse_step(steps.is_empty())?);
            match self.current().token {
                Token::Slash | Token::DoubleSlash if !self.at_end() => continue,
                _ => break,
            }
        }

        if let Some(i) = steps[..steps.len() - 1]
            .iter()
            .position(|step| matches!(step.node, NodeTest::Pseudo(_)))
        {
            let step = &steps[i];
            return Err(SelectorError::at(
                self.source,
                step.offset,
                1,
                "pseudo-node must be the last step",
            ));
        }
        Ok(PathAst { steps })
    }

    fn parse_step(&mut self, first: bool) -> Result<StepAst, SelectorError> {
        let offset = self.current().offset;
        let axis = match self.current().token {
            Token::Slash if !self.at_end() => {
                self.advance();
                Axis::Child
            }
            Token::DoubleSlash if !self.at_end() => {
                self.advance();
                Axis::Descendant
            }
            // A leading step without slash searches the whole document
            _ if first => Axis::Descendant,
            _ => return Err(self.error_here("expected '/' or '//'")),
        };

        let node_offset = self.current().offset;
        let node = match self.current().token.clone() {
            _ if self.at_end() => {
                return Err(self.error_here("expected element name, '*' or pseudo-node"))
            }
            Token::Star => {
                self.advance();
                NodeTest::Any
            }
            Token::Word(name) if *self.peek_token(1) == Token::LeftParen => {
                let Some(pseudo) = PseudoNode::from_name(&name) else {
                    return Err(SelectorError::at(
                        self.source,
                        node_offset,
                        name.len(),
                        format!("unknown pseudo-node '{name}()'"),
                    ));
                };
                self.advance();
                self.advance();
                self.expect(Token::RightParen, "expected ')' after pseudo-node")?;
                NodeTest::Pseudo(pseudo)
            }
            Token::Word(name) => {
                self.advance();
                NodeTest::Name(name)
            }
            Token::Dot | Token::Hash | Token::Percent | Token::LeftBracket => NodeTest::Any,
            _ => return Err(self.error_here("expected element name, '*' or pseudo-node")),
        };

        let mut step = StepAst {
            axis,
            node,
            conditions: Vec::new(),
            index: None,
            offset,
        };

        loop {
            if self.at_end() {
                break;
            }
            let cond_offset = self.current().offset;
            match self.current().token {
                Token::Dot => {
                    self.advance();
                    let class = self.expect_word("expected class name after '.'")?;
                    step.conditions
                        .push(Condition::Predicate(Predicate::compare("class", CompareOp::Eq, class)));
                }
                Token::Hash => {
                    self.advance();
                    let id = self.expect_word("expected id after '#'")?;
                    step.conditions
                        .push(Condition::Predicate(Predicate::compare("id", CompareOp::Eq, id)));
                }
                Token::Percent => {
                    self.advance();
                    let name = self.expect_word("expected fragment reference after '%'")?;
                    step.conditions.push(Condition::FragmentRef {
                        name,
                        offset: cond_offset,
                    });
                }
                Token::LeftBracket => {
                    self.advance();
                    self.parse_bracket(&mut step, cond_offset)?;
                    self.expect(Token::RightBracket, "expected ']'")?;
                }
                _ => break,
            }
        }

        if matches!(step.node, NodeTest::Pseudo(_)) && !step.conditions.is_empty() {
            return Err(SelectorError::at(
                self.source,
                node_offset,
                self.current().offset.saturating_sub(node_offset).max(1),
                "attribute predicates are not allowed on pseudo-nodes",
            ));
        }
        Ok(step)
    }

    fn parse_bracket(&mut self, step: &mut StepAst, offset: usize) -> Result<(), SelectorError> {
        let index = match self.current().token.clone() {
            Token::Word(w) if w.bytes().all(|b| b.is_ascii_digit()) => {
                match w.parse::<u32>() {
                    Ok(n) if n > 0 => Some(IndexFilter::Position(n)),
                    _ => {
                        return Err(SelectorError::at(
                            self.source,
                            self.current().offset,
                            w.len(),
                            "position must be a number starting at 1",
                        ))
                    }
                }
            }
            Token::Word(w)
                if (w == "even" || w == "odd")
                    && *self.peek_token(1) == Token::LeftParen
                    && *self.peek_token(2) == Token::RightParen =>
            {
                Some(if w == "even" {
                    IndexFilter::Even
                } else {
                    IndexFilter::Odd
                })
            }
            _ => None,
        };

        match index {
            Some(_) if step.index.is_some() => Err(SelectorError::at(
                self.source,
                offset,
                1,
                "only one position filter allowed per step",
            )),
            Some(filter) => {
                // digits, or name '(' ')'
                let skip = if matches!(filter, IndexFilter::Position(_)) { 1 } else { 3 };
                for _ in 0..skip {
                    self.advance();
                }
                step.index = Some(filter);
                Ok(())
            }
            None => {
                let predicate = self.parse_or()?;
                step.conditions.push(Condition::Predicate(predicate));
                Ok(())
            }
        }
    }

    fn parse_or(&mut self) -> Result<Predicate, SelectorError> {
        let mut left = self.parse_and()?;
        while !self.at_end() && self.current().token.is_keyword("or") {
            self.advance();
            let right = self.parse_and()?;
            left = left.or(right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Predicate, SelectorError> {
        let mut left = self.parse_unary()?;
        while !self.at_end() && self.current().token.is_keyword("and") {
            self.advance();
            let right = self.parse_unary()?;
            left = left.and(right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Predicate, SelectorError> {
        if self.at_end() {
            return Err(self.error_here("expected predicate"));
        }
        match self.current().token {
            Token::Bang => {
                self.advance();
                if !self.at_end() && self.current().token == Token::LeftParen {
                    self.advance();
                    let inner = self.parse_or()?;
                    self.expect(Token::RightParen, "expected ')'")?;
                    Ok(Predicate::Not(Box::new(inner)))
                } else {
                    let name = self.parse_attribute_name()?;
                    Ok(Predicate::NotExists(name))
                }
            }
            Token::LeftParen => {
                self.advance();
                let inner = self.parse_or()?;
                self.expect(Token::RightParen, "expected ')'")?;
                Ok(inner)
            }
            _ => self.parse_test(),
        }
    }

    fn parse_test(&mut self) -> Result<Predicate, SelectorError> {
        let name = self.parse_attribute_name()?;
        let op = match self.current().token {
            _ if self.at_end() => return Ok(Predicate::Exists(name)),
            Token::Eq => CompareOp::Eq,
            Token::NotEq => CompareOp::NotEq,
            Token::StartsWith => CompareOp::StartsWith,
            Token::EndsWith => CompareOp::EndsWith,
            Token::Contains => CompareOp::Contains,
            _ => return Ok(Predicate::Exists(name)),
        };
        self.advance();

        let value = match self.current().token.clone() {
            Token::Str(v) if !self.at_end() => v,
            Token::Bare(v) if !self.at_end() && !v.is_empty() => v,
            _ => return Err(self.error_here("expected value after operator")),
        };
        self.advance();
        Ok(Predicate::Compare { name, op, value })
    }

    fn parse_attribute_name(&mut self) -> Result<String, SelectorError> {
        if !self.at_end() && self.current().token == Token::At {
            self.advance();
        }
        self.expect_word("expected attribute name")
    }

    fn expect_word(&mut self, message: &str) -> Result<String, SelectorError> {
        match self.current().token.clone() {
            Token::Word(w) if !self.at_end() => {
                self.advance();
                Ok(w)
            }
            _ => Err(self.error_here(message)),
        }
    }
}

/// Parse selector source into an AST
pub fn parse(source: &str) -> Result<SelectorAst, SelectorError> {
    Parser::new(source)?.parse()
}

/// Parse a predicate expression such as `a='x' OR b`
pub fn parse_predicate(source: &str) -> Result<Predicate, SelectorError> {
    Parser::new(source)?.parse_predicate_source()
}
