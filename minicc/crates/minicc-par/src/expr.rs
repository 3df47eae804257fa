//! Expression parsing.
//!
//! One method per precedence level, loosest binding first:
//! assignment, `||`, `&&`, relational, additive, multiplicative, unary
//! prefix, unary postfix, primary.

use crate::ast::*;
use crate::{normalize_number, ParseResult, Parser};
use minicc_lex::TokenKind;

impl Parser {
    /// expr -> assexpr
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_assign()
    }

    /// assexpr -> orexpr ('=' assexpr)?   (right-associative)
    fn parse_assign(&mut self) -> ParseResult<Expr> {
        let lhs = self.parse_or()?;
        if self.accept(TokenKind::Assign) {
            let line = self.last_line();
            let rhs = self.parse_assign()?;
            return Ok(Expr::Assign {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                line,
            });
        }
        Ok(lhs)
    }

    /// orexpr -> andexpr ('||' andexpr)*
    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.accept(TokenKind::OrOr) {
            let line = self.last_line();
            let rhs = self.parse_and()?;
            lhs = Expr::Binary {
                op: BinaryOp::LogicOr,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                line,
            };
        }
        Ok(lhs)
    }

    /// andexpr -> cmpexpr ('&&' cmpexpr)*
    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_cmp()?;
        while self.accept(TokenKind::AndAnd) {
            let line = self.last_line();
            let rhs = self.parse_cmp()?;
            lhs = Expr::Binary {
                op: BinaryOp::LogicAnd,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                line,
            };
        }
        Ok(lhs)
    }

    /// cmpexpr -> aloexpr (cmpop aloexpr)*
    fn parse_cmp(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek().map(|t| t.kind) {
                Some(TokenKind::EqEq) => BinaryOp::Eq,
                Some(TokenKind::Ne) => BinaryOp::Ne,
                Some(TokenKind::Lt) => BinaryOp::Lt,
                Some(TokenKind::Le) => BinaryOp::Le,
                Some(TokenKind::Gt) => BinaryOp::Gt,
                Some(TokenKind::Ge) => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let line = self.last_line();
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                line,
            };
        }
        Ok(lhs)
    }

    /// aloexpr -> item (('+' | '-') item)*
    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = if self.accept(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.accept(TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let line = self.last_line();
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                line,
            };
        }
        Ok(lhs)
    }

    /// item -> factor (('*' | '/' | '%') factor)*
    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_factor()?;
        loop {
            let op = if self.accept(TokenKind::Star) {
                BinaryOp::Mul
            } else if self.accept(TokenKind::Slash) {
                BinaryOp::Div
            } else if self.accept(TokenKind::Percent) {
                BinaryOp::Rem
            } else {
                break;
            };
            let line = self.last_line();
            let rhs = self.parse_factor()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                line,
            };
        }
        Ok(lhs)
    }

    /// factor -> ('!' | '-' | '++' | '--') factor | val
    fn parse_factor(&mut self) -> ParseResult<Expr> {
        let op = match self.peek().map(|t| t.kind) {
            Some(TokenKind::Not) => Some(UnaryOp::Not),
            Some(TokenKind::Minus) => Some(UnaryOp::Neg),
            Some(TokenKind::PlusPlus) => Some(UnaryOp::PreInc),
            Some(TokenKind::MinusMinus) => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let line = self.last_line();
            let target = self.parse_factor()?;
            return Ok(Expr::Unary {
                op,
                target: Box::new(target),
                line,
            });
        }
        self.parse_postfix()
    }

    /// val -> elem ('++' | '--')*
    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_elem()?;
        loop {
            let op = if self.accept(TokenKind::PlusPlus) {
                IncDec::Inc
            } else if self.accept(TokenKind::MinusMinus) {
                IncDec::Dec
            } else {
                break;
            };
            let line = self.last_line();
            expr = Expr::Postfix {
                op,
                target: Box::new(expr),
                line,
            };
        }
        Ok(expr)
    }

    /// elem -> '(' expr ')' | num | ident | ident '[' expr ']'+ | ident '(' args ')'
    fn parse_elem(&mut self) -> ParseResult<Expr> {
        if self.accept(TokenKind::LParen) {
            let expr = self.parse_expr()?;
            self.expect(TokenKind::RParen)?;
            return Ok(expr);
        }

        if let Some(t) = self.peek() {
            if t.kind.is_number() {
                let line = t.line;
                let value = normalize_number(t).ok_or_else(|| {
                    self.error_at(line, format!("Integer literal '{}' out of range", t.lexeme))
                })?;
                self.advance();
                return Ok(Expr::Num { value, line });
            }
        }

        if let Some(t) = self.peek() {
            if t.kind == TokenKind::Ident {
                let name = t.lexeme.clone();
                let line = t.line;
                self.advance();

                if self.accept(TokenKind::LBrack) {
                    let mut indices = vec![self.parse_expr()?];
                    self.expect(TokenKind::RBrack)?;
                    while self.accept(TokenKind::LBrack) {
                        indices.push(self.parse_expr()?);
                        self.expect(TokenKind::RBrack)?;
                    }
                    return Ok(Expr::Index {
                        name,
                        indices,
                        line,
                    });
                }

                if self.accept(TokenKind::LParen) {
                    let args = self.parse_args()?;
                    self.expect(TokenKind::RParen)?;
                    return Ok(Expr::Call { name, args, line });
                }

                return Ok(Expr::Ident { name, line });
            }
        }

        Err(self.error_here("Expected '(' or NUM or IDENT"))
    }

    /// realarg -> (expr (',' expr)*)?
    fn parse_args(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(args);
        }
        args.push(self.parse_expr()?);
        while self.accept(TokenKind::Comma) {
            args.push(self.parse_expr()?);
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parse;
    use minicc_lex::tokenize;

    fn expr_of(source: &str) -> Expr {
        let program = parse(tokenize(&format!("int f(int x){{{source};}}"))).expect("should parse");
        match program.into_iter().next().unwrap() {
            Item::Func(f) => match f.body.unwrap().stmts.into_iter().next().unwrap() {
                Stmt::Expr(e) => e,
                other => panic!("expected expr stmt, got {other:?}"),
            },
            other => panic!("expected func, got {other:?}"),
        }
    }

    #[test]
    fn subtraction_is_left_leaning() {
        // a - b - c must parse as (a - b) - c.
        match expr_of("1 - 2 - 3") {
            Expr::Binary { op, lhs, rhs, .. } => {
                assert_eq!(op, BinaryOp::Sub);
                assert!(matches!(*rhs, Expr::Num { value: 3, .. }));
                assert!(matches!(*lhs, Expr::Binary { op: BinaryOp::Sub, .. }));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn multiplication_binds_tighter() {
        match expr_of("1 + 2 * 3") {
            Expr::Binary { op, rhs, .. } => {
                assert_eq!(op, BinaryOp::Add);
                assert!(matches!(*rhs, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn assignment_is_right_associative() {
        match expr_of("x = x = 1") {
            Expr::Assign { rhs, .. } => {
                assert!(matches!(*rhs, Expr::Assign { .. }));
            }
            other => panic!("expected assign, got {other:?}"),
        }
    }

    #[test]
    fn logic_binds_looser_than_comparison() {
        match expr_of("x > 0 && x < 10") {
            Expr::Binary { op, lhs, rhs, .. } => {
                assert_eq!(op, BinaryOp::LogicAnd);
                assert!(matches!(*lhs, Expr::Binary { op: BinaryOp::Gt, .. }));
                assert!(matches!(*rhs, Expr::Binary { op: BinaryOp::Lt, .. }));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn parenthesised_expression_overrides() {
        match expr_of("(1 + 2) * 3") {
            Expr::Binary { op, lhs, .. } => {
                assert_eq!(op, BinaryOp::Mul);
                assert!(matches!(*lhs, Expr::Binary { op: BinaryOp::Add, .. }));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn literals_normalise_to_decimal() {
        assert!(matches!(expr_of("0x10"), Expr::Num { value: 16, .. }));
        assert!(matches!(expr_of("017"), Expr::Num { value: 15, .. }));
        assert!(matches!(expr_of("42"), Expr::Num { value: 42, .. }));
    }

    #[test]
    fn prefix_and_postfix_increment() {
        assert!(matches!(
            expr_of("++x"),
            Expr::Unary { op: UnaryOp::PreInc, .. }
        ));
        assert!(matches!(
            expr_of("x++"),
            Expr::Postfix { op: IncDec::Inc, .. }
        ));
    }

    #[test]
    fn unary_minus_nests() {
        match expr_of("-!x") {
            Expr::Unary { op, target, .. } => {
                assert_eq!(op, UnaryOp::Neg);
                assert!(matches!(*target, Expr::Unary { op: UnaryOp::Not, .. }));
            }
            other => panic!("expected unary, got {other:?}"),
        }
    }

    #[test]
    fn call_and_subscript() {
        match expr_of("f(x, 1)") {
            Expr::Call { name, args, .. } => {
                assert_eq!(name, "f");
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected call, got {other:?}"),
        }
        match expr_of("x[1][2]") {
            Expr::Index { indices, .. } => assert_eq!(indices.len(), 2),
            other => panic!("expected index, got {other:?}"),
        }
    }
}
