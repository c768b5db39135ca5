//! The typed AST. Expressions and statements are each a tagged sum type
//! (`ExprKind`, `StmtKind`) rather than one flat struct with nullable
//! fields — each variant only carries the fields that node kind actually
//! uses.

use crate::diagnostics::Span;
use crate::types::Type;

/// A local variable or parameter. Lives in the owning `Function`'s
/// `locals` vector; `Var` expressions refer to it by index rather than by
/// pointer.
#[derive(Debug, Clone)]
pub struct Obj {
    pub name: String,
    pub ty: Type,
    /// Frame offset relative to `fp`, filled once by codegen. Negative.
    pub offset: i64,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    /// Filled by the type-decoration pass; absent only mid-parse.
    pub ty: Option<Type>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr {
            kind,
            span,
            ty: None,
        }
    }

    pub fn ty(&self) -> &Type {
        self.ty
            .as_ref()
            .expect("expression used before type decoration")
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Num(i64),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Le(Box<Expr>, Box<Expr>),
    Gt(Box<Expr>, Box<Expr>),
    Ge(Box<Expr>, Box<Expr>),
    Assign(Box<Expr>, Box<Expr>),
    Addr(Box<Expr>),
    Deref(Box<Expr>),
    /// Index into the enclosing function's `locals`.
    Var(usize),
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    ExprStmt(Expr),
    Null,
    Return(Expr),
    Compound(Vec<Stmt>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    For {
        init: Option<Expr>,
        cond: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    /// Indices into `locals`, in declaration order.
    pub params: Vec<usize>,
    /// Every local (params included), in declaration order.
    pub locals: Vec<Obj>,
    pub body: Stmt,
    /// Aligned total frame size, filled once by codegen.
    pub stack_size: i64,
}

pub type Program = Vec<Function>;
