//! minicc-par - AST Node Definitions
//!
//! This module contains all AST node definitions produced by the parser.
//! Nodes are immutable after parsing; every node carries the 1-based source
//! line it started on.

use serde::Serialize;

/// AST root - a translation unit is a list of top-level items.
pub type Program = Vec<Item>;

/// Top-level item in a translation unit.
#[derive(Debug, Clone, Serialize)]
pub enum Item {
    /// Global scalar definition
    Var(VarDecl),

    /// Global array definition
    Array(ArrayDecl),

    /// Function definition or declaration
    Func(FuncDef),
}

/// Scalar variable declaration (`int a`)
#[derive(Debug, Clone, Serialize)]
pub struct VarDecl {
    pub name: String,
    pub line: u32,
}

/// Array declaration (`int b[3][4]`, or `int a[]` as a parameter)
///
/// `extents` holds one entry per dimension. Only the leading entry of a
/// function parameter may be `None`, encoding an unknown outer size.
#[derive(Debug, Clone, Serialize)]
pub struct ArrayDecl {
    pub name: String,
    pub extents: Vec<Option<i64>>,
    pub line: u32,
}

/// Function return type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RetType {
    Int,
    Void,
}

/// Function definition (`body` present) or declaration (`body` absent)
#[derive(Debug, Clone, Serialize)]
pub struct FuncDef {
    pub name: String,
    pub ret: RetType,
    pub params: Vec<Param>,
    pub body: Option<Block>,
    pub line: u32,
}

/// Formal parameter
#[derive(Debug, Clone, Serialize)]
pub enum Param {
    Var(VarDecl),
    Array(ArrayDecl),
}

/// Braced statement sequence
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub line: u32,
}

/// Statement
#[derive(Debug, Clone, Serialize)]
pub enum Stmt {
    /// Local scalar declaration
    Var(VarDecl),

    /// Local array declaration
    Array(ArrayDecl),

    /// `if (cond) stmt [else stmt]`; a branch is `None` when its statement
    /// is the empty statement `;`
    If {
        cond: Expr,
        then: Option<Box<Stmt>>,
        els: Option<Box<Stmt>>,
        line: u32,
    },

    /// `while (cond) stmt`
    While {
        cond: Expr,
        body: Option<Box<Stmt>>,
        line: u32,
    },

    /// `switch (cond) { ... }` - parsed opaquely, rejected by the analyzer
    Switch { cond: Expr, line: u32 },

    Break { line: u32 },

    Continue { line: u32 },

    /// `return [expr];`
    Return { expr: Option<Expr>, line: u32 },

    Block(Block),

    /// Expression statement
    Expr(Expr),
}

/// Expression
#[derive(Debug, Clone, Serialize)]
pub enum Expr {
    /// Integer literal, normalised to its decimal value
    Num { value: i64, line: u32 },

    /// Plain identifier use
    Ident { name: String, line: u32 },

    /// Array subscript `a[i][j]`
    Index {
        name: String,
        indices: Vec<Expr>,
        line: u32,
    },

    /// Function call `f(a, b)`
    Call {
        name: String,
        args: Vec<Expr>,
        line: u32,
    },

    /// Prefix unary operator
    Unary {
        op: UnaryOp,
        target: Box<Expr>,
        line: u32,
    },

    /// Postfix `++`/`--`
    Postfix {
        op: IncDec,
        target: Box<Expr>,
        line: u32,
    },

    /// Binary operator
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        line: u32,
    },

    /// Assignment (right-associative)
    Assign {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        line: u32,
    },
}

impl Expr {
    /// The source line this expression starts on.
    pub fn line(&self) -> u32 {
        match self {
            Expr::Num { line, .. }
            | Expr::Ident { line, .. }
            | Expr::Index { line, .. }
            | Expr::Call { line, .. }
            | Expr::Unary { line, .. }
            | Expr::Postfix { line, .. }
            | Expr::Binary { line, .. }
            | Expr::Assign { line, .. } => *line,
        }
    }
}

/// Prefix unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// Unary `-`
    Neg,
    /// `++x`
    PreInc,
    /// `--x`
    PreDec,
}

/// Increment or decrement, for the postfix forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IncDec {
    Inc,
    Dec,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LogicAnd,
    LogicOr,
}
