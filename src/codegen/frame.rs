//! Stack frame layout: assigns each local a negative `fp`-relative offset
//! and rounds the frame to a 16-byte boundary.

use crate::ast::Function;

pub fn align_to(n: i64, align: i64) -> i64 {
    (n + align - 1) / align * align
}

/// Walks locals newest-declared-first, so the most recently declared
/// variable sits closest to `fp`. Mutates `fun.locals[*].offset` and
/// `fun.stack_size` in place.
pub fn assign_lvar_offsets(fun: &mut Function) {
    let mut offset: i64 = 0;
    for local in fun.locals.iter_mut().rev() {
        offset += local.ty.size();
        local.offset = -offset;
    }
    fun.stack_size = align_to(offset, 16);
}
