//! minicc-par - Recursive-descent parser for miniC.
//!
//! Consumes the token stream produced by `minicc-lex` and builds the AST of
//! [`ast`]. The parser is a pure function of the token stream: it holds no
//! state beyond its position, and the first syntax error aborts the
//! compilation unit with the offending line.
//!
//! Expression parsing is precedence climbing; every left-associative level
//! folds as it goes, so `a - b - c` parses as `(a - b) - c`. Assignment is
//! the only right-associative level.

pub mod ast;
mod edge_cases;
mod expr;
mod stmt;

pub use ast::*;

use minicc_lex::{Token, TokenKind};
use thiserror::Error;

/// A fatal syntax error. Parsing stops at the first one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SyntaxError {
    pub line: u32,
    pub message: String,
}

pub type ParseResult<T> = Result<T, SyntaxError>;

/// Parses a full translation unit.
pub fn parse(tokens: Vec<Token>) -> ParseResult<Program> {
    Parser::new(tokens).parse_program()
}

/// The miniC parser.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// program -> segment*
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut items = Vec::new();
        while self.peek().is_some() {
            items.extend(self.parse_segment()?);
        }
        Ok(items)
    }

    /// segment -> type def
    ///
    /// A segment is either a function (the identifier is followed by `(`) or
    /// a comma-separated list of variable/array definitions.
    fn parse_segment(&mut self) -> ParseResult<Vec<Item>> {
        let ret = self.parse_type()?;
        let (name, line) = self.parse_ident()?;

        if self.accept(TokenKind::LParen) {
            let params = self.parse_params()?;
            self.expect(TokenKind::RParen)?;
            let body = self.parse_functail()?;
            return Ok(vec![Item::Func(FuncDef {
                name,
                ret,
                params,
                body,
                line,
            })]);
        }

        if ret == RetType::Void {
            return Err(self.error_at(line, "VOID Can't be used for VAR or ARRAY"));
        }

        let mut items = vec![self.parse_defdata(name, line)?];
        while self.accept(TokenKind::Comma) {
            let (name, line) = self.parse_ident()?;
            items.push(self.parse_defdata(name, line)?);
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(items)
    }

    /// defdata -> ident ('[' num ']')*
    fn parse_defdata(&mut self, name: String, line: u32) -> ParseResult<Item> {
        let extents = self.parse_extents()?;
        if extents.is_empty() {
            Ok(Item::Var(VarDecl { name, line }))
        } else {
            Ok(Item::Array(ArrayDecl {
                name,
                extents: extents.into_iter().map(Some).collect(),
                line,
            }))
        }
    }

    /// Zero or more `[num]` suffixes with mandatory constant extents.
    fn parse_extents(&mut self) -> ParseResult<Vec<i64>> {
        let mut extents = Vec::new();
        while self.accept(TokenKind::LBrack) {
            extents.push(self.parse_num_value()?);
            self.expect(TokenKind::RBrack)?;
        }
        Ok(extents)
    }

    /// para -> (onepara (',' onepara)*)?
    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(params);
        }
        params.push(self.parse_onepara()?);
        while self.accept(TokenKind::Comma) {
            params.push(self.parse_onepara()?);
        }
        Ok(params)
    }

    /// onepara -> type ident paradatatail
    ///
    /// The first dimension of an array parameter may be empty (`int a[]`),
    /// recorded as a leading `None` extent.
    fn parse_onepara(&mut self) -> ParseResult<Param> {
        let ty = self.parse_type()?;
        let (name, line) = self.parse_ident()?;
        if ty == RetType::Void {
            return Err(self.error_at(line, "VOID Can't be used for VAR or ARRAY"));
        }

        let mut extents: Vec<Option<i64>> = Vec::new();
        if self.accept(TokenKind::LBrack) {
            if self.accept(TokenKind::RBrack) {
                extents.push(None);
            } else {
                extents.push(Some(self.parse_num_value()?));
                self.expect(TokenKind::RBrack)?;
            }
            while self.accept(TokenKind::LBrack) {
                extents.push(Some(self.parse_num_value()?));
                self.expect(TokenKind::RBrack)?;
            }
        }

        if extents.is_empty() {
            Ok(Param::Var(VarDecl { name, line }))
        } else {
            Ok(Param::Array(ArrayDecl {
                name,
                extents,
                line,
            }))
        }
    }

    /// functail -> ';' | block
    fn parse_functail(&mut self) -> ParseResult<Option<Block>> {
        if self.accept(TokenKind::Semicolon) {
            return Ok(None);
        }
        if self.accept(TokenKind::LBrace) {
            let line = self.last_line();
            return Ok(Some(self.parse_block_body(line)?));
        }
        Err(self.error_here("Expected ';' or '{' in function body"))
    }

    /// type -> 'int' | 'void'
    fn parse_type(&mut self) -> ParseResult<RetType> {
        if self.accept(TokenKind::Int) {
            Ok(RetType::Int)
        } else if self.accept(TokenKind::Void) {
            Ok(RetType::Void)
        } else {
            Err(self.error_here("Expected INT or VOID"))
        }
    }

    fn parse_ident(&mut self) -> ParseResult<(String, u32)> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Ident => {
                let name = t.lexeme.clone();
                let line = t.line;
                self.advance();
                Ok((name, line))
            }
            _ => Err(self.error_here("Expected IDENT")),
        }
    }

    /// Expects an integer literal and returns its normalised decimal value.
    fn parse_num_value(&mut self) -> ParseResult<i64> {
        match self.peek() {
            Some(t) if t.kind.is_number() => {
                let value = normalize_number(t).ok_or_else(|| SyntaxError {
                    line: t.line,
                    message: format!("Integer literal '{}' out of range", t.lexeme),
                })?;
                self.advance();
                Ok(value)
            }
            _ => Err(self.error_here("Expected NUM")),
        }
    }

    // ---- token plumbing ----

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().map(|t| t.kind) == Some(kind)
    }

    pub(crate) fn advance(&mut self) {
        self.pos += 1;
    }

    /// Consumes the next token if it has the given kind.
    pub(crate) fn accept(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.accept(kind) {
            Ok(())
        } else {
            let found = match self.peek() {
                Some(t) => format!("'{}'", t.lexeme),
                None => "end of input".to_string(),
            };
            Err(self.error_here(format!("Expected {kind:?}, Found {found}")))
        }
    }

    /// Line of the most recently consumed token.
    pub(crate) fn last_line(&self) -> u32 {
        if self.pos == 0 {
            return 1;
        }
        self.tokens[self.pos - 1].line
    }

    /// Line to report an error at: the current token's, or past the last one.
    fn error_line(&self) -> u32 {
        match self.peek() {
            Some(t) => t.line,
            None => self.tokens.last().map(|t| t.line).unwrap_or(1),
        }
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line: self.error_line(),
            message: message.into(),
        }
    }

    pub(crate) fn error_at(&self, line: u32, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line,
            message: message.into(),
        }
    }
}

/// Normalises a literal token to its decimal value.
pub(crate) fn normalize_number(token: &Token) -> Option<i64> {
    match token.kind {
        TokenKind::Dec => token.lexeme.parse().ok(),
        TokenKind::Hex => i64::from_str_radix(&token.lexeme[2..], 16).ok(),
        TokenKind::Oct => i64::from_str_radix(&token.lexeme[1..], 8).ok(),
        _ => None,
    }
}
