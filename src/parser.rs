//! Recursive-descent parser, built over a `Vec<Token>` cursor instead of
//! a linked list. Maintains a per-function locals table while parsing
//! that function's body; each function starts with a fresh table, since
//! locals never need to be visible across function boundaries.

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{Expr, ExprKind, Function, Obj, Program, Stmt, StmtKind};
use crate::decorate::{self, CmpOp};
use crate::diagnostics::{Diagnostics, Span};
use crate::token::{Token, TokenKind, tokenize};
use crate::types::Type;

const MAX_ARRAY_DIMS: usize = 16;

pub struct Parser<'a> {
    source: &'a str,
    diag: &'a Diagnostics<'a>,
    tokens: Vec<Token>,
    pos: usize,
    locals: Vec<Obj>,
    local_names: HashMap<String, usize>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, diag: &'a Diagnostics<'a>) -> Self {
        let tokens = tokenize(source, diag);
        Parser {
            source,
            diag,
            tokens,
            pos: 0,
            locals: Vec::new(),
            local_names: HashMap::new(),
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Vec::new();
        while !self.at_eof() {
            program.push(self.parse_function());
        }
        program
    }

    // ---- token cursor helpers ----

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn at_eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn text(&self, tok: &Token) -> &'a str {
        tok.text(self.source)
    }

    fn is_punc(&self, s: &str) -> bool {
        self.current().kind == TokenKind::Punc && self.current().is(self.source, s)
    }

    fn is_keyword(&self, s: &str) -> bool {
        self.current().kind == TokenKind::Keyword && self.current().is(self.source, s)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect_punc(&mut self, s: &str) -> Span {
        if !self.is_punc(s) {
            let got = self.text(self.current()).to_string();
            self.diag
                .bail_at(self.current().span, format!("expected '{}', got '{}'", s, got));
        }
        self.advance().span
    }

    fn expect_keyword(&mut self, s: &str) -> Span {
        if !self.is_keyword(s) {
            let got = self.text(self.current()).to_string();
            self.diag
                .bail_at(self.current().span, format!("expected '{}', got '{}'", s, got));
        }
        self.advance().span
    }

    fn expect_ident(&mut self) -> (String, Span) {
        if self.current().kind != TokenKind::Ident {
            self.diag.bail_at(self.current().span, "expected an identifier");
        }
        let tok = self.advance();
        (self.text(&tok).to_string(), tok.span)
    }

    fn expect_num(&mut self) -> (i64, Span) {
        if self.current().kind != TokenKind::Num {
            self.diag.bail_at(self.current().span, "expected a number");
        }
        let tok = self.advance();
        (tok.value, tok.span)
    }

    // ---- locals ----

    fn register_local(&mut self, name: String, ty: Type, span: Span) -> usize {
        if self.local_names.contains_key(&name) {
            self.diag
                .bail_at(span, format!("redefinition of variable '{}'", name));
        }
        let idx = self.locals.len();
        self.locals.push(Obj { name: name.clone(), ty, offset: 0 });
        self.local_names.insert(name, idx);
        idx
    }

    fn find_var(&self, name: &str) -> Option<usize> {
        self.local_names.get(name).copied()
    }

    // ---- DeclSpec / declarator helpers ----

    fn skip_stars(&mut self) -> usize {
        let mut n = 0;
        while self.is_punc("*") {
            self.advance();
            n += 1;
        }
        n
    }

    fn wrap_pointers(base: Type, stars: usize) -> Type {
        let mut ty = base;
        for _ in 0..stars {
            ty = Type::ptr_to(Rc::new(ty));
        }
        ty
    }

    /// `("[" NUM "]")+`, outer-to-inner in source order, capped at
    /// `MAX_ARRAY_DIMS`. Returns the dimensions in source order.
    fn parse_array_dims(&mut self) -> Vec<i64> {
        let mut dims = Vec::new();
        while self.is_punc("[") {
            if dims.len() >= MAX_ARRAY_DIMS {
                self.diag
                    .bail_at(self.current().span, "too many array dimensions");
            }
            self.advance();
            let (n, _) = self.expect_num();
            self.expect_punc("]");
            dims.push(n);
        }
        dims
    }

    /// Builds the array type inner-most first: `int a[2][3]` reads dims
    /// `[2, 3]` but constructs array-of-2-of-array-of-3-of-int.
    fn array_type(base: Type, dims: &[i64]) -> Type {
        let mut ty = base;
        for &len in dims.iter().rev() {
            ty = Type::array_of(Rc::new(ty), len);
        }
        ty
    }

    // ---- functions ----

    fn parse_function(&mut self) -> Function {
        self.expect_keyword("int");
        self.skip_stars(); // return-type pointer stars: parsed, unused (every function returns a plain int).
        let (name, _) = self.expect_ident();

        self.locals.clear();
        self.local_names.clear();

        let params = self.parse_func_params();
        let body = self.parse_compound_stmt();

        Function {
            name,
            params,
            locals: std::mem::take(&mut self.locals),
            body,
            stack_size: 0,
        }
    }

    fn parse_func_params(&mut self) -> Vec<usize> {
        self.expect_punc("(");
        let mut params = Vec::new();
        if !self.is_punc(")") {
            loop {
                self.expect_keyword("int");
                let stars = self.skip_stars();
                let (name, span) = self.expect_ident();
                let ty = Self::wrap_pointers(Type::Int, stars);
                let idx = self.register_local(name, ty, span);
                params.push(idx);
                if self.is_punc(",") {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect_punc(")");
        params
    }

    // ---- statements ----

    fn parse_compound_stmt(&mut self) -> Stmt {
        let start = self.expect_punc("{");
        let mut body = Vec::new();
        while !self.is_punc("}") {
            if self.at_eof() {
                self.diag.bail_at(self.current().span, "expected '}'");
            }
            if self.is_keyword("int") {
                body.extend(self.parse_declaration());
            } else {
                body.push(self.parse_stmt());
            }
        }
        let end = self.expect_punc("}");
        Stmt::new(StmtKind::Compound(body), Span::new(start.offset, end.offset - start.offset + end.len))
    }

    /// `Declaration := "int" (Declarator ("=" Expr)? ("," Declarator ("=" Expr)?)*)? ";"`
    /// Returns the (possibly empty) list of initializer assignment
    /// statements; the declarators themselves only register locals.
    fn parse_declaration(&mut self) -> Vec<Stmt> {
        self.expect_keyword("int");
        let mut inits = Vec::new();
        if !self.is_punc(";") {
            loop {
                let stars = self.skip_stars();
                let (name, span) = self.expect_ident();
                let dims = self.parse_array_dims();
                let base = Self::wrap_pointers(Type::Int, stars);
                let ty = Self::array_type(base, &dims);
                let idx = self.register_local(name, ty.clone(), span);

                if self.is_punc("=") {
                    let eq_span = self.advance().span;
                    let rhs = self.parse_expr();
                    let lhs = decorate::var(idx, ty, span);
                    let assign = decorate::assign(lhs, rhs, eq_span, self.diag);
                    inits.push(Stmt::new(StmtKind::ExprStmt(assign), eq_span));
                }

                if self.is_punc(",") {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect_punc(";");
        inits
    }

    fn parse_stmt(&mut self) -> Stmt {
        if self.is_keyword("return") {
            return self.parse_return_stmt();
        }
        if self.is_keyword("if") {
            return self.parse_if_stmt();
        }
        if self.is_keyword("while") {
            return self.parse_while_stmt();
        }
        if self.is_keyword("for") {
            return self.parse_for_stmt();
        }
        if self.is_punc("{") {
            return self.parse_compound_stmt();
        }
        if self.is_punc(";") {
            let span = self.advance().span;
            return Stmt::new(StmtKind::Null, span);
        }
        self.parse_expr_stmt()
    }

    fn parse_return_stmt(&mut self) -> Stmt {
        let start = self.expect_keyword("return");
        let expr = self.parse_expr();
        let end = self.expect_punc(";");
        Stmt::new(StmtKind::Return(expr), span_between(start, end))
    }

    fn parse_expr_stmt(&mut self) -> Stmt {
        let expr = self.parse_expr();
        let span = expr.span;
        let end = self.expect_punc(";");
        Stmt::new(StmtKind::ExprStmt(expr), span_between(span, end))
    }

    fn parse_if_stmt(&mut self) -> Stmt {
        let start = self.expect_keyword("if");
        self.expect_punc("(");
        let cond = self.parse_expr();
        self.expect_punc(")");
        let then_branch = Box::new(self.parse_stmt());
        let else_branch = if self.is_keyword("else") {
            self.advance();
            Some(Box::new(self.parse_stmt()))
        } else {
            None
        };
        Stmt::new(
            StmtKind::If { cond, then_branch, else_branch },
            start,
        )
    }

    fn parse_while_stmt(&mut self) -> Stmt {
        let start = self.expect_keyword("while");
        self.expect_punc("(");
        let cond = self.parse_expr();
        self.expect_punc(")");
        let body = Box::new(self.parse_stmt());
        Stmt::new(StmtKind::While { cond, body }, start)
    }

    fn parse_for_stmt(&mut self) -> Stmt {
        let start = self.expect_keyword("for");
        self.expect_punc("(");
        let init = if !self.is_punc(";") {
            Some(self.parse_expr())
        } else {
            None
        };
        self.expect_punc(";");
        let cond = if !self.is_punc(";") {
            Some(self.parse_expr())
        } else {
            None
        };
        self.expect_punc(";");
        let update = if !self.is_punc(")") {
            Some(self.parse_expr())
        } else {
            None
        };
        self.expect_punc(")");
        let body = Box::new(self.parse_stmt());
        Stmt::new(
            StmtKind::For { init, cond, update, body },
            start,
        )
    }

    // ---- expressions ----

    fn parse_expr(&mut self) -> Expr {
        self.parse_assign()
    }

    fn parse_assign(&mut self) -> Expr {
        let lhs = self.parse_equality();
        if self.is_punc("=") {
            let span = self.advance().span;
            let rhs = self.parse_assign(); // right-associative
            return decorate::assign(lhs, rhs, span, self.diag);
        }
        lhs
    }

    fn parse_equality(&mut self) -> Expr {
        let mut lhs = self.parse_relational();
        loop {
            if self.is_punc("==") {
                let span = self.advance().span;
                let rhs = self.parse_relational();
                lhs = decorate::cmp(CmpOp::Eq, lhs, rhs, span);
            } else if self.is_punc("!=") {
                let span = self.advance().span;
                let rhs = self.parse_relational();
                lhs = decorate::cmp(CmpOp::Ne, lhs, rhs, span);
            } else {
                return lhs;
            }
        }
    }

    fn parse_relational(&mut self) -> Expr {
        let mut lhs = self.parse_sum();
        loop {
            let op = if self.is_punc("<=") {
                Some(CmpOp::Le)
            } else if self.is_punc(">=") {
                Some(CmpOp::Ge)
            } else if self.is_punc("<") {
                Some(CmpOp::Lt)
            } else if self.is_punc(">") {
                Some(CmpOp::Gt)
            } else {
                None
            };
            let Some(op) = op else { return lhs };
            let span = self.advance().span;
            let rhs = self.parse_sum();
            lhs = decorate::cmp(op, lhs, rhs, span);
        }
    }

    fn parse_sum(&mut self) -> Expr {
        let mut lhs = self.parse_term();
        loop {
            if self.is_punc("+") {
                let span = self.advance().span;
                let rhs = self.parse_term();
                lhs = decorate::add(lhs, rhs, span, self.diag);
            } else if self.is_punc("-") {
                let span = self.advance().span;
                let rhs = self.parse_term();
                lhs = decorate::sub(lhs, rhs, span, self.diag);
            } else {
                return lhs;
            }
        }
    }

    fn parse_term(&mut self) -> Expr {
        let mut lhs = self.parse_unary();
        loop {
            if self.is_punc("*") {
                let span = self.advance().span;
                let rhs = self.parse_unary();
                lhs = decorate::mul(lhs, rhs, span);
            } else if self.is_punc("/") {
                let span = self.advance().span;
                let rhs = self.parse_unary();
                lhs = decorate::div(lhs, rhs, span);
            } else {
                return lhs;
            }
        }
    }

    fn parse_unary(&mut self) -> Expr {
        if self.is_punc("+") {
            self.advance();
            return self.parse_unary();
        }
        if self.is_punc("-") {
            let span = self.advance().span;
            let operand = self.parse_unary();
            return decorate::neg(operand, span);
        }
        if self.is_punc("*") {
            let span = self.advance().span;
            let operand = self.parse_unary();
            return decorate::deref(operand, span, self.diag);
        }
        if self.is_punc("&") {
            let span = self.advance().span;
            let operand = self.parse_unary();
            return decorate::addr(operand, span);
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_factor();
        while self.is_punc("[") {
            let span = self.advance().span;
            let index = self.parse_expr();
            self.expect_punc("]");
            let added = decorate::add(expr, index, span, self.diag);
            expr = decorate::deref(added, span, self.diag);
        }
        expr
    }

    fn parse_factor(&mut self) -> Expr {
        if self.current().kind == TokenKind::Num {
            let (val, span) = self.expect_num();
            return decorate::num(val, span);
        }

        if self.is_punc("(") {
            self.advance();
            let expr = self.parse_expr();
            self.expect_punc(")");
            return expr;
        }

        if self.is_keyword("sizeof") {
            let span = self.advance().span;
            let operand = self.parse_unary();
            return decorate::sizeof_fold(operand, span);
        }

        if self.current().kind == TokenKind::Ident {
            let (name, span) = self.expect_ident();
            if self.is_punc("(") {
                let args = self.parse_args();
                return decorate::call(name, args, span);
            }
            let Some(idx) = self.find_var(&name) else {
                self.diag.bail_at(span, "undefined variable");
            };
            let ty = self.locals[idx].ty.clone();
            return decorate::var(idx, ty, span);
        }

        let got = self.text(self.current()).to_string();
        self.diag
            .bail_at(self.current().span, format!("unexpected '{}'", got));
    }

    fn parse_args(&mut self) -> Vec<Expr> {
        self.expect_punc("(");
        let mut args = Vec::new();
        if !self.is_punc(")") {
            loop {
                args.push(self.parse_expr());
                if self.is_punc(",") {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect_punc(")");
        args
    }
}

fn span_between(start: Span, end: Span) -> Span {
    Span::new(start.offset, end.offset + end.len - start.offset)
}
