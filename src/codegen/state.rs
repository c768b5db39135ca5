//! Core codegen state: the output buffer, the `sp`-relative push/pop
//! balance counter, and per-function label naming.

use std::fmt::Write as _;

use crate::diagnostics::Diagnostics;

/// Argument registers x0-x7, in order. The language has no variadic
/// functions, so 8 registers is always enough for a call's arguments.
pub const ARG_REGS: [&str; 8] = ["x0", "x1", "x2", "x3", "x4", "x5", "x6", "x7"];

pub struct CodeGen<'a> {
    pub out: String,
    /// Number of `str`-pushed words currently on the native stack that
    /// haven't been popped back off. Must return to zero after every
    /// statement.
    pub depth: i64,
    pub diag: &'a Diagnostics<'a>,
    current_fn_name: String,
    label_counter: u32,
}

impl<'a> CodeGen<'a> {
    pub fn new(diag: &'a Diagnostics<'a>) -> Self {
        CodeGen {
            out: String::new(),
            depth: 0,
            diag,
            current_fn_name: String::new(),
            label_counter: 1,
        }
    }

    pub fn enter_function(&mut self, name: &str) {
        self.current_fn_name = name.to_string();
        self.label_counter = 1;
    }

    /// `.L<k>.<funcname>`, numbered per function starting at 1.
    pub fn fresh_label(&mut self) -> String {
        let label = format!(".L{}.{}", self.label_counter, self.current_fn_name);
        self.label_counter += 1;
        label
    }

    pub fn return_label(&self) -> String {
        format!(".L.return.{}", self.current_fn_name)
    }

    pub fn emit(&mut self, line: impl AsRef<str>) {
        writeln!(self.out, "{}", line.as_ref()).expect("write to String never fails");
    }

    /// `str <reg>, [sp, #-16]!` — pre-decrement push, 16-byte aligned.
    pub fn push(&mut self, reg: &str) {
        self.emit(format!("    str {}, [sp, #-16]!", reg));
        self.depth += 1;
    }

    /// `ldr <reg>, [sp], #16` — post-increment pop.
    pub fn pop(&mut self, reg: &str) {
        self.emit(format!("    ldr {}, [sp], #16", reg));
        self.depth -= 1;
    }
}
