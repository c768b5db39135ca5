//! Library entry point: wires the tokenizer, parser, type decoration,
//! and code generator into one `compile_source` call that turns a source
//! string into AArch64 assembly text.
//!
//! Type decoration happens inline as the parser builds each node (see
//! `decorate`'s module doc), so by the time `parse_program` returns, the
//! AST is already fully typed and ready for codegen.

pub mod ast;
pub mod codegen;
pub mod decorate;
pub mod diagnostics;
pub mod parser;
pub mod token;
pub mod types;

pub use ast::Program;
pub use codegen::CodeGen;
pub use parser::Parser;

use diagnostics::Diagnostics;

/// Compiles `source` into AArch64/Darwin assembly text.
///
/// Any lexical, syntactic, or semantic error is fatal and terminates the
/// process via `Diagnostics::bail`/`bail_at` — this function only returns
/// on success. `Err` is reserved for the small set of argument-shape
/// errors the CLI layer catches before compilation even starts (e.g. an
/// empty source string).
pub fn compile_source(source: &str) -> Result<String, String> {
    if source.is_empty() {
        return Err("empty source string".to_string());
    }

    let diag = Diagnostics::new(source);
    let mut parser = Parser::new(source, &diag);
    let mut program = parser.parse_program();
    Ok(codegen::gen_program(&diag, &mut program))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn returns(src: &str) -> String {
        compile_source(src).expect("compile_source should succeed")
    }

    #[test]
    fn empty_source_is_rejected_before_compilation() {
        assert!(compile_source("").is_err());
    }

    #[test]
    fn arithmetic_respects_operator_precedence() {
        let asm = returns("int main() { return 1+2*3; }");
        assert!(asm.contains("mul"));
        assert!(asm.contains("add"));
        assert!(asm.contains("_main:"));
    }

    #[test]
    fn locals_with_initializers_and_subtraction() {
        let asm = returns("int main() { int a=3; int b=5; return a*b - 1; }");
        assert!(asm.contains("mul"));
        assert!(asm.contains("sub"));
    }

    #[test]
    fn for_loop_accumulates_into_a_local() {
        let asm = returns(
            "int main() { int i=0; int s=0; for (i=1; i<=10; i=i+1) s = s+i; return s; }",
        );
        assert!(asm.contains("cset x0, le"));
        assert!(asm.matches("b .L1.main").count() >= 1);
    }

    #[test]
    fn two_function_calls_are_summed() {
        let asm = returns(
            "int add(int a, int b) { return a+b; } int main() { return add(3, 4) + add(5, 6); }",
        );
        assert_eq!(asm.matches("bl _add").count(), 2);
    }

    #[test]
    fn pointer_write_through_stores_to_the_pointee() {
        let asm = returns("int main() { int x=7; int *p=&x; *p = *p + 3; return x; }");
        assert!(asm.contains("str x1, [x0]"));
    }

    #[test]
    fn array_elements_are_assigned_and_summed() {
        let asm = returns(
            "int main() { int a[3]; a[0]=1; a[1]=2; a[2]=4; return a[0]+a[1]+a[2]; }",
        );
        assert!(asm.contains("sub sp, sp, #32"));
    }

    #[test]
    fn while_loop_followed_by_if_else() {
        let asm = returns(
            "int main() { int i=0; while (i<5) i=i+1; if (i==5) return 42; else return 0; }",
        );
        assert!(asm.contains("cset x0, lt"));
        assert!(asm.contains("cset x0, eq"));
    }

    #[test]
    fn sizeof_an_array_is_a_compile_time_constant() {
        let asm = returns("int main() { int a[4]; return sizeof(a); }");
        assert!(asm.contains("mov x0, #32"));
    }

    // Fatal diagnostics (undefined variable, pointer+pointer, assigning to
    // an array, syntax errors) call `process::exit` and so can't be
    // asserted on in-process; they're covered by the CLI integration
    // tests in tests/negative_diagnostics.rs, which run the built binary
    // out-of-process and check its exit status.
}
