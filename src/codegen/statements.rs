//! Statement codegen: control-flow label emission and the compound-stmt
//! dispatch loop.

use crate::ast::{Obj, Stmt, StmtKind};
use crate::codegen::expr::gen_expr;
use crate::codegen::state::CodeGen;

pub fn gen_stmt(cg: &mut CodeGen, locals: &[Obj], stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::ExprStmt(expr) => gen_expr(cg, locals, expr),
        StmtKind::Return(expr) => {
            gen_expr(cg, locals, expr);
            cg.emit(format!("    b {}", cg.return_label()));
        }
        StmtKind::Compound(body) => {
            for inner in body {
                gen_stmt(cg, locals, inner);
                debug_assert_eq!(cg.depth, 0, "push/pop balance must close out each statement");
            }
        }
        StmtKind::Null => {}
        StmtKind::If { cond, then_branch, else_branch } => {
            gen_if(cg, locals, cond, then_branch, else_branch.as_deref());
        }
        StmtKind::While { cond, body } => gen_while(cg, locals, cond, body),
        StmtKind::For { init, cond, update, body } => {
            gen_for(cg, locals, init.as_ref(), cond.as_ref(), update.as_ref(), body)
        }
    }
}

fn gen_if(
    cg: &mut CodeGen,
    locals: &[Obj],
    cond: &crate::ast::Expr,
    then_branch: &Stmt,
    else_branch: Option<&Stmt>,
) {
    let Some(else_branch) = else_branch else {
        let l = cg.fresh_label();
        gen_expr(cg, locals, cond);
        cg.emit("    cmp x0, #0");
        cg.emit(format!("    beq {}", l));
        gen_stmt(cg, locals, then_branch);
        cg.emit(format!("{}:", l));
        return;
    };

    let l1 = cg.fresh_label();
    let l2 = cg.fresh_label();
    gen_expr(cg, locals, cond);
    cg.emit("    cmp x0, #0");
    cg.emit(format!("    beq {}", l1));
    gen_stmt(cg, locals, then_branch);
    cg.emit(format!("    b {}", l2));
    cg.emit(format!("{}:", l1));
    gen_stmt(cg, locals, else_branch);
    cg.emit(format!("{}:", l2));
}

fn gen_while(cg: &mut CodeGen, locals: &[Obj], cond: &crate::ast::Expr, body: &Stmt) {
    let l1 = cg.fresh_label();
    let l2 = cg.fresh_label();
    cg.emit(format!("{}:", l1));
    gen_expr(cg, locals, cond);
    cg.emit("    cmp x0, #0");
    cg.emit(format!("    beq {}", l2));
    gen_stmt(cg, locals, body);
    cg.emit(format!("    b {}", l1));
    cg.emit(format!("{}:", l2));
}

fn gen_for(
    cg: &mut CodeGen,
    locals: &[Obj],
    init: Option<&crate::ast::Expr>,
    cond: Option<&crate::ast::Expr>,
    update: Option<&crate::ast::Expr>,
    body: &Stmt,
) {
    let l1 = cg.fresh_label();
    let l2 = cg.fresh_label();
    if let Some(init) = init {
        gen_expr(cg, locals, init);
    }
    cg.emit(format!("{}:", l1));
    if let Some(cond) = cond {
        gen_expr(cg, locals, cond);
        cg.emit("    cmp x0, #0");
        cg.emit(format!("    beq {}", l2));
    }
    gen_stmt(cg, locals, body);
    if let Some(update) = update {
        gen_expr(cg, locals, update);
    }
    cg.emit(format!("    b {}", l1));
    cg.emit(format!("{}:", l2));
}
