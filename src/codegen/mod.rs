//! Per-function frame layout, prologue/epilogue, and the driver that
//! stitches every function's assembly into one translation unit.

mod expr;
mod frame;
mod state;
mod statements;

use crate::ast::Program;
use crate::diagnostics::Diagnostics;

pub use state::CodeGen;

/// Emits AArch64/Darwin assembly for the whole program: one
/// `.global _<name>` per function up front, then each function's
/// prologue, body, return label, and epilogue in source order.
pub fn gen_program(diag: &Diagnostics, program: &mut Program) -> String {
    let mut cg = CodeGen::new(diag);

    for fun in program.iter() {
        cg.emit(format!("    .global _{}", fun.name));
    }

    for fun in program.iter_mut() {
        frame::assign_lvar_offsets(fun);
        gen_function(&mut cg, fun);
    }

    cg.out
}

fn gen_function(cg: &mut CodeGen, fun: &mut crate::ast::Function) {
    cg.enter_function(&fun.name);

    cg.emit(format!("_{}:", fun.name));
    cg.emit("    stp fp, lr, [sp, #-16]!");
    cg.emit("    mov fp, sp");
    cg.emit(format!("    sub sp, sp, #{}", fun.stack_size));

    for (i, &local_idx) in fun.params.iter().enumerate() {
        let offset = fun.locals[local_idx].offset;
        cg.emit(format!("    str {}, [fp, #{}]", state::ARG_REGS[i], offset));
    }

    statements::gen_stmt(cg, &fun.locals, &fun.body);
    debug_assert_eq!(cg.depth, 0, "push/pop balance must close out the function body");

    cg.emit(format!("{}:", cg.return_label()));
    cg.emit("    mov sp, fp");
    cg.emit("    ldp fp, lr, [sp], #16");
    cg.emit("    ret");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::parser::Parser;

    fn compile(src: &str) -> String {
        let diag = Diagnostics::new(src);
        let mut parser = Parser::new(src, &diag);
        let mut program = parser.parse_program();
        gen_program(&diag, &mut program)
    }

    #[test]
    fn emits_global_directive_per_function() {
        let asm = compile("int add(int a, int b) { return a+b; } int main() { return add(1,2); }");
        assert!(asm.contains(".global _add"));
        assert!(asm.contains(".global _main"));
    }

    #[test]
    fn prologue_epilogue_and_return_label_shape() {
        let asm = compile("int main() { return 42; }");
        assert!(asm.contains("_main:"));
        assert!(asm.contains("stp fp, lr, [sp, #-16]!"));
        assert!(asm.contains("mov fp, sp"));
        assert!(asm.contains(".L.return.main:"));
        assert!(asm.contains("ldp fp, lr, [sp], #16"));
        assert!(asm.contains("ret"));
    }

    #[test]
    fn params_spilled_from_argument_registers() {
        let asm = compile("int add(int a, int b) { return a+b; }");
        assert!(asm.contains("str x0, [fp, #-8]"));
        assert!(asm.contains("str x1, [fp, #-16]"));
    }

    #[test]
    fn stack_size_is_16_byte_aligned_in_sub_instruction() {
        let asm = compile("int main() { int a; return a; }");
        assert!(asm.contains("sub sp, sp, #16"));
    }

    #[test]
    fn function_call_emits_bl_with_underscore_prefix() {
        let asm = compile("int add(int a, int b) { return a+b; } int main() { return add(3,4); }");
        assert!(asm.contains("bl _add"));
    }
}
