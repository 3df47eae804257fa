//! minicc-lex - Lexical analyzer for miniC.
//!
//! Transforms the source character stream into a token stream. Recognition is
//! longest-match over the token alphabet (`++` beats `+`, `==` beats `=`),
//! direct-coded rather than table-driven: each token family has its own scan
//! routine. Whitespace and comments are consumed silently; the line counter
//! advances on every newline, including those inside block comments.
//!
//! The lexer itself never fails. Characters outside the alphabet become
//! [`TokenKind::Unknown`] tokens, which the parser rejects with a syntax
//! error carrying the offending line.

pub mod cursor;
mod edge_cases;
pub mod token;

pub use token::{Token, TokenKind};

use cursor::Cursor;

/// The miniC lexer.
///
/// Use [`Lexer::next_token`] to pull tokens one at a time, or [`tokenize`]
/// to collect the whole stream.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

/// Lexes `source` to completion.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token() {
        tokens.push(token);
    }
    tokens
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer over `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Returns the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_trivia();
        if self.cursor.is_eof() {
            return None;
        }

        let line = self.cursor.line();
        let c = self.cursor.current_char();

        if c.is_ascii_alphabetic() || c == '_' {
            return Some(self.lex_ident(line));
        }
        if c.is_ascii_digit() {
            return Some(self.lex_number(line));
        }
        Some(self.lex_operator(line))
    }

    /// Consumes whitespace, line comments, and block comments.
    fn skip_trivia(&mut self) {
        loop {
            let c = self.cursor.current_char();
            if c.is_whitespace() {
                self.cursor.advance();
            } else if c == '/' && self.cursor.char_at(1) == '/' {
                while !self.cursor.is_eof() && self.cursor.current_char() != '\n' {
                    self.cursor.advance();
                }
            } else if c == '/' && self.cursor.char_at(1) == '*' {
                self.cursor.advance();
                self.cursor.advance();
                // An unterminated block comment swallows the rest of the file.
                while !self.cursor.is_eof() {
                    if self.cursor.current_char() == '*' && self.cursor.char_at(1) == '/' {
                        self.cursor.advance();
                        self.cursor.advance();
                        break;
                    }
                    self.cursor.advance();
                }
            } else {
                return;
            }
        }
    }

    fn lex_ident(&mut self, line: u32) -> Token {
        let start = self.cursor.position();
        loop {
            let c = self.cursor.current_char();
            if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            self.cursor.advance();
        }
        let lexeme = self.cursor.slice_from(start);
        let kind = TokenKind::keyword(lexeme).unwrap_or(TokenKind::Ident);
        Token::new(kind, lexeme, line)
    }

    /// Scans a decimal, hex, or octal literal.
    ///
    /// A leading `0` followed by octal digits is octal; a bare `0` (or `0`
    /// followed by a non-octal digit) is the decimal literal `0`, matching
    /// the longest-match rule rather than erroring on `08`.
    fn lex_number(&mut self, line: u32) -> Token {
        let start = self.cursor.position();
        if self.cursor.current_char() == '0' {
            self.cursor.advance();
            if self.cursor.current_char() == 'x' && self.cursor.char_at(1).is_ascii_hexdigit() {
                self.cursor.advance();
                while self.cursor.current_char().is_ascii_hexdigit() {
                    self.cursor.advance();
                }
                return Token::new(TokenKind::Hex, self.cursor.slice_from(start), line);
            }
            let digits_start = self.cursor.position();
            while matches!(self.cursor.current_char(), '0'..='7') {
                self.cursor.advance();
            }
            if self.cursor.position() > digits_start {
                return Token::new(TokenKind::Oct, self.cursor.slice_from(start), line);
            }
            return Token::new(TokenKind::Dec, "0", line);
        }
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        Token::new(TokenKind::Dec, self.cursor.slice_from(start), line)
    }

    /// Scans operators, brackets, and punctuation, two-character forms first.
    fn lex_operator(&mut self, line: u32) -> Token {
        use TokenKind::*;

        let c = self.cursor.current_char();
        let c1 = self.cursor.char_at(1);
        let two = match (c, c1) {
            ('&', '&') => Some(AndAnd),
            ('|', '|') => Some(OrOr),
            ('+', '+') => Some(PlusPlus),
            ('-', '-') => Some(MinusMinus),
            ('=', '=') => Some(EqEq),
            ('!', '=') => Some(Ne),
            ('<', '=') => Some(Le),
            ('>', '=') => Some(Ge),
            _ => None,
        };
        if let Some(kind) = two {
            let start = self.cursor.position();
            self.cursor.advance();
            self.cursor.advance();
            return Token::new(kind, self.cursor.slice_from(start), line);
        }

        let kind = match c {
            '=' => Assign,
            '+' => Plus,
            '-' => Minus,
            '*' => Star,
            '/' => Slash,
            '%' => Percent,
            '!' => Not,
            '&' => Amp,
            '|' => Pipe,
            '>' => Gt,
            '<' => Lt,
            '(' => LParen,
            ')' => RParen,
            '[' => LBrack,
            ']' => RBrack,
            '{' => LBrace,
            '}' => RBrace,
            ',' => Comma,
            ';' => Semicolon,
            _ => Unknown,
        };
        let start = self.cursor.position();
        self.cursor.advance();
        Token::new(kind, self.cursor.slice_from(start), line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_a_global_and_main() {
        let tokens = tokenize("int a;\nint main(){a=1;}");
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[1].lexeme, "a");
        assert_eq!(tokens[1].line, 1);
        assert_eq!(tokens[3].kind, TokenKind::Int);
        assert_eq!(tokens[3].line, 2);
        assert_eq!(tokens[4].lexeme, "main");
    }

    #[test]
    fn longest_match_beats_single_char() {
        use TokenKind::*;
        assert_eq!(
            kinds("++ + == = <= < >= > != ! && & || | --"),
            vec![
                PlusPlus, Plus, EqEq, Assign, Le, Lt, Ge, Gt, Ne, Not, AndAnd, Amp, OrOr, Pipe,
                MinusMinus
            ]
        );
    }

    #[test]
    fn adjacent_plus_signs_group_greedily() {
        // `+++` lexes as `++` `+`, mirroring C's maximal munch.
        assert_eq!(
            kinds("a+++b"),
            vec![
                TokenKind::Ident,
                TokenKind::PlusPlus,
                TokenKind::Plus,
                TokenKind::Ident
            ]
        );
    }

    #[test]
    fn number_bases() {
        let tokens = tokenize("0 12 0x1F 017 08");
        assert_eq!(tokens[0].kind, TokenKind::Dec);
        assert_eq!(tokens[1].kind, TokenKind::Dec);
        assert_eq!(tokens[2].kind, TokenKind::Hex);
        assert_eq!(tokens[2].lexeme, "0x1F");
        assert_eq!(tokens[3].kind, TokenKind::Oct);
        // `08` is not octal: it splits into `0` and `8`.
        assert_eq!(tokens[4].kind, TokenKind::Dec);
        assert_eq!(tokens[4].lexeme, "0");
        assert_eq!(tokens[5].lexeme, "8");
    }

    #[test]
    fn comments_are_trivia_and_count_lines() {
        let tokens = tokenize("int a; // trailing\nint b;\n/* two\nlines */ int c;");
        let lines: Vec<u32> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(
            tokens.iter().map(|t| t.lexeme.as_str()).collect::<Vec<_>>(),
            vec!["int", "a", ";", "int", "b", ";", "int", "c", ";"]
        );
        assert_eq!(lines, vec![1, 1, 1, 2, 2, 2, 4, 4, 4]);
    }

    #[test]
    fn keywords_are_not_identifiers() {
        use TokenKind::*;
        assert_eq!(
            kinds("int void if else while for switch case break continue return intx"),
            vec![Int, Void, If, Else, While, For, Switch, Case, Break, Continue, Return, Ident]
        );
    }

    #[test]
    fn unknown_characters_pass_through() {
        let tokens = tokenize("int a @ b;");
        assert_eq!(tokens[2].kind, TokenKind::Unknown);
        assert_eq!(tokens[2].lexeme, "@");
    }
}
