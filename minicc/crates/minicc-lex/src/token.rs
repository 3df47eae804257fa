//! Token model.

use serde::Serialize;
use std::fmt;

/// Kind of a lexed token.
///
/// The three integer-literal kinds are kept apart so the parser can normalise
/// hex and octal spellings to decimal while the token stream still reproduces
/// the source faithfully.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Identifier: `[a-zA-Z_][a-zA-Z0-9_]*`.
    Ident,
    /// Decimal integer literal (`0` or `[1-9][0-9]*`).
    Dec,
    /// Hexadecimal integer literal (`0x...`).
    Hex,
    /// Octal integer literal (`0` followed by octal digits).
    Oct,

    // Keywords.
    Int,
    Void,
    If,
    Else,
    While,
    For,
    Switch,
    Case,
    Break,
    Continue,
    Return,

    // Operators.
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Not,
    Amp,
    Pipe,
    AndAnd,
    OrOr,
    Gt,
    Ge,
    Lt,
    Le,
    EqEq,
    Ne,
    PlusPlus,
    MinusMinus,

    // Brackets and punctuation.
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Semicolon,

    /// A character the alphabet does not cover. The parser rejects these.
    Unknown,
}

impl TokenKind {
    /// Maps an identifier spelling to its keyword kind, if it is one.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        Some(match ident {
            "int" => TokenKind::Int,
            "void" => TokenKind::Void,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "return" => TokenKind::Return,
            _ => return None,
        })
    }

    /// Whether this kind is one of the integer-literal kinds.
    pub fn is_number(&self) -> bool {
        matches!(self, TokenKind::Dec | TokenKind::Hex | TokenKind::Oct)
    }
}

/// A lexed token: kind, original spelling, and 1-based source line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(kind={:?}, lexeme={:?}, line={})",
            self.kind, self.lexeme, self.line
        )
    }
}
