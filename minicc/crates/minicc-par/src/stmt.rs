//! Statement parsing.

use crate::ast::*;
use crate::{ParseResult, Parser};
use minicc_lex::TokenKind;

impl Parser {
    /// Parses the statements of a block whose `{` has been consumed.
    pub(crate) fn parse_block_body(&mut self, line: u32) -> ParseResult<Block> {
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.peek().is_none() {
                return Err(self.error_here("Expected '}'"));
            }
            stmts.extend(self.parse_one_statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Block { stmts, line })
    }

    /// One statement slot inside a block: a local declaration list (which may
    /// expand to several statements), or a single statement. The empty
    /// statement `;` contributes nothing.
    fn parse_one_statement(&mut self) -> ParseResult<Vec<Stmt>> {
        if self.check(TokenKind::Int) || self.check(TokenKind::Void) {
            return self.parse_local_decls();
        }
        Ok(self.parse_statement()?.into_iter().collect())
    }

    /// Local declaration list: `int a, b[2], c;`.
    fn parse_local_decls(&mut self) -> ParseResult<Vec<Stmt>> {
        let ty = self.parse_type()?;
        let mut decls = Vec::new();
        loop {
            let (name, line) = self.parse_ident()?;
            if ty == RetType::Void {
                return Err(self.error_at(line, "VOID Can't be used for VAR or ARRAY"));
            }
            let extents = self.parse_local_extents()?;
            if extents.is_empty() {
                decls.push(Stmt::Var(VarDecl { name, line }));
            } else {
                decls.push(Stmt::Array(ArrayDecl {
                    name,
                    extents: extents.into_iter().map(Some).collect(),
                    line,
                }));
            }
            if !self.accept(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(decls)
    }

    fn parse_local_extents(&mut self) -> ParseResult<Vec<i64>> {
        let mut extents = Vec::new();
        while self.accept(TokenKind::LBrack) {
            extents.push(self.parse_num_value()?);
            self.expect(TokenKind::RBrack)?;
        }
        Ok(extents)
    }

    /// statement -> while | if | switch | break | continue | return | block
    ///            | ';' | expr ';'
    ///
    /// Returns `None` for the empty statement.
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Option<Stmt>> {
        if self.accept(TokenKind::While) {
            let line = self.last_line();
            self.expect(TokenKind::LParen)?;
            let cond = self.parse_expr()?;
            self.expect(TokenKind::RParen)?;
            let body = self.parse_statement()?.map(Box::new);
            return Ok(Some(Stmt::While { cond, body, line }));
        }

        if self.accept(TokenKind::If) {
            let line = self.last_line();
            self.expect(TokenKind::LParen)?;
            let cond = self.parse_expr()?;
            self.expect(TokenKind::RParen)?;
            let then = self.parse_statement()?.map(Box::new);
            let els = if self.accept(TokenKind::Else) {
                self.parse_statement()?.map(Box::new)
            } else {
                None
            };
            return Ok(Some(Stmt::If {
                cond,
                then,
                els,
                line,
            }));
        }

        if self.accept(TokenKind::Switch) {
            return Ok(Some(self.parse_switch()?));
        }

        if self.accept(TokenKind::Break) {
            let line = self.last_line();
            self.expect(TokenKind::Semicolon)?;
            return Ok(Some(Stmt::Break { line }));
        }

        if self.accept(TokenKind::Continue) {
            let line = self.last_line();
            self.expect(TokenKind::Semicolon)?;
            return Ok(Some(Stmt::Continue { line }));
        }

        if self.accept(TokenKind::Return) {
            let line = self.last_line();
            if self.accept(TokenKind::Semicolon) {
                return Ok(Some(Stmt::Return { expr: None, line }));
            }
            let expr = self.parse_expr()?;
            self.expect(TokenKind::Semicolon)?;
            return Ok(Some(Stmt::Return {
                expr: Some(expr),
                line,
            }));
        }

        if self.accept(TokenKind::LBrace) {
            let line = self.last_line();
            return Ok(Some(Stmt::Block(self.parse_block_body(line)?)));
        }

        if self.accept(TokenKind::Semicolon) {
            return Ok(None);
        }

        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Some(Stmt::Expr(expr)))
    }

    /// `switch (expr) { ... }`.
    ///
    /// The grammar admits the header but the language does not define the
    /// statement; the body is consumed brace-balanced without interpretation
    /// and the analyzer rejects the construct.
    fn parse_switch(&mut self) -> ParseResult<Stmt> {
        let line = self.last_line();
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::LBrace)?;
        let mut depth = 1u32;
        while depth > 0 {
            match self.peek() {
                Some(t) if t.kind == TokenKind::LBrace => depth += 1,
                Some(t) if t.kind == TokenKind::RBrace => depth -= 1,
                Some(_) => {}
                None => return Err(self.error_here("Expected '}'")),
            }
            self.advance();
        }
        Ok(Stmt::Switch { cond, line })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parse;
    use minicc_lex::tokenize;

    fn body_of(source: &str) -> Vec<Stmt> {
        let program = parse(tokenize(source)).expect("source should parse");
        match program.into_iter().next().unwrap() {
            Item::Func(f) => f.body.unwrap().stmts,
            other => panic!("expected func, got {other:?}"),
        }
    }

    #[test]
    fn declaration_list_expands() {
        let stmts = body_of("int f(){int a, b[2], c;}");
        assert_eq!(stmts.len(), 3);
        assert!(matches!(&stmts[1], Stmt::Array(a) if a.extents == vec![Some(2)]));
    }

    #[test]
    fn if_else_attaches_to_nearest() {
        let stmts = body_of("int f(int x){if (x) if (x) return 1; else return 2; return 3;}");
        match &stmts[0] {
            Stmt::If { then, els, .. } => {
                assert!(els.is_none());
                match then.as_deref() {
                    Some(Stmt::If { els, .. }) => assert!(els.is_some()),
                    other => panic!("expected nested if, got {other:?}"),
                }
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn while_with_empty_body() {
        let stmts = body_of("int f(int x){while (x--) ; return 0;}");
        assert!(matches!(&stmts[0], Stmt::While { body: None, .. }));
    }

    #[test]
    fn empty_statements_vanish() {
        let stmts = body_of("int f(){;;return 0;;}");
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn switch_body_is_opaque() {
        let stmts = body_of("int f(int x){switch (x) { case 1: {x = 2;} } return x;}");
        assert_eq!(stmts.len(), 2);
        assert!(matches!(&stmts[0], Stmt::Switch { .. }));
    }

    #[test]
    fn nested_blocks_parse() {
        let stmts = body_of("int f(){{int a; {a = 1;}} return 0;}");
        match &stmts[0] {
            Stmt::Block(b) => assert_eq!(b.stmts.len(), 2),
            other => panic!("expected block, got {other:?}"),
        }
    }
}
