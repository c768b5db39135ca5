//! Single-accumulator expression codegen: every expression leaves its
//! result in `x0`. Binary operators evaluate right-to-left, pushing the
//! right operand so the left can reuse `x0`, then pop the right operand
//! back into `x1`.

use crate::ast::{Expr, ExprKind, Obj};
use crate::codegen::state::{ARG_REGS, CodeGen};
use crate::types::Type;

/// Computes an lvalue's address into `x0`. Anything other than a
/// variable or a dereference has no address ("not an lvalue" is fatal).
fn gen_addr(cg: &mut CodeGen, locals: &[Obj], expr: &Expr) {
    match &expr.kind {
        ExprKind::Var(idx) => {
            cg.emit(format!("    add x0, fp, #{}", locals[*idx].offset));
        }
        ExprKind::Deref(inner) => gen_expr(cg, locals, inner),
        _ => cg.diag.bail_at(expr.span, "not an lvalue"),
    }
}

/// Loads through the address currently in `x0`, unless `ty` is an array
/// — an array's "value" is its own address, so there is nothing to load.
fn load(cg: &mut CodeGen, ty: &Type) {
    if matches!(ty, Type::Array { .. }) {
        return;
    }
    cg.emit("    ldr x0, [x0]");
}

/// Stores `x0` through the address left by a preceding `push`ed target
/// address; assumes `x1` is free to clobber.
fn store(cg: &mut CodeGen) {
    cg.pop("x1");
    cg.emit("    str x1, [x0]");
}

pub fn gen_expr(cg: &mut CodeGen, locals: &[Obj], expr: &Expr) {
    match &expr.kind {
        ExprKind::Num(val) => {
            cg.emit(format!("    mov x0, #{}", val));
            return;
        }
        ExprKind::Neg(operand) => {
            gen_expr(cg, locals, operand);
            cg.emit("    neg x0, x0");
            return;
        }
        ExprKind::Var(_) => {
            gen_addr(cg, locals, expr);
            load(cg, expr.ty());
            return;
        }
        ExprKind::Assign(lhs, rhs) => {
            gen_expr(cg, locals, rhs);
            cg.push("x0");
            gen_addr(cg, locals, lhs);
            store(cg);
            return;
        }
        ExprKind::Deref(operand) => {
            gen_expr(cg, locals, operand);
            load(cg, expr.ty());
            return;
        }
        ExprKind::Addr(operand) => {
            gen_addr(cg, locals, operand);
            return;
        }
        ExprKind::Call { name, args } => {
            gen_call(cg, locals, name, args);
            return;
        }
        _ => {}
    }

    // Remaining kinds are all binary: evaluate rhs, stash it, evaluate
    // lhs into x0, then recover rhs into x1.
    let (lhs, rhs): (&Expr, &Expr) = match &expr.kind {
        ExprKind::Add(l, r)
        | ExprKind::Sub(l, r)
        | ExprKind::Mul(l, r)
        | ExprKind::Div(l, r)
        | ExprKind::Eq(l, r)
        | ExprKind::Ne(l, r)
        | ExprKind::Lt(l, r)
        | ExprKind::Le(l, r)
        | ExprKind::Gt(l, r)
        | ExprKind::Ge(l, r) => (l, r),
        _ => unreachable!("handled above"),
    };

    gen_expr(cg, locals, rhs);
    cg.push("x0");
    gen_expr(cg, locals, lhs);
    cg.pop("x1");

    match &expr.kind {
        ExprKind::Add(..) => cg.emit("    add x0, x0, x1"),
        ExprKind::Sub(..) => cg.emit("    sub x0, x0, x1"),
        ExprKind::Mul(..) => cg.emit("    mul x0, x0, x1"),
        ExprKind::Div(..) => cg.emit("    sdiv x0, x0, x1"),
        ExprKind::Eq(..) => emit_cmp(cg, "eq"),
        ExprKind::Ne(..) => emit_cmp(cg, "ne"),
        ExprKind::Lt(..) => emit_cmp(cg, "lt"),
        ExprKind::Le(..) => emit_cmp(cg, "le"),
        ExprKind::Gt(..) => emit_cmp(cg, "gt"),
        ExprKind::Ge(..) => emit_cmp(cg, "ge"),
        _ => unreachable!("handled above"),
    }
}

fn emit_cmp(cg: &mut CodeGen, cond: &str) {
    cg.emit("    cmp x0, x1");
    cg.emit("    mov x0, #0");
    cg.emit(format!("    cset x0, {}", cond));
}

/// Arguments are evaluated left-to-right and pushed so `x0` stays free
/// between them, then popped off in reverse (LIFO undoes the push order)
/// straight into their argument registers.
fn gen_call(cg: &mut CodeGen, locals: &[Obj], name: &str, args: &[Expr]) {
    for arg in args {
        gen_expr(cg, locals, arg);
        cg.push("x0");
    }
    for reg in ARG_REGS.iter().take(args.len()).rev() {
        cg.pop(reg);
    }
    cg.emit(format!("    bl _{}", name));
}
