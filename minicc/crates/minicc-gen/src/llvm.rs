//! LLVM textual instruction formatting.
//!
//! Small pure helpers shared by the emitter: the type printer and the
//! per-instruction format strings. Everything here returns plain `String`s;
//! placement (indentation, labels, result registers) is the emitter's job.

use minicc_sem::{CalcOp, CmpOp, Width};

/// `i<n>` for a scalar width.
pub fn scalar_type(size: Width) -> String {
    format!("i{}", size.bits())
}

/// Nested array type for a declared-extent chain.
///
/// Extents apply outermost-first; a `None` extent renders the type built so
/// far as a pointer, which is how an open outer dimension of an array
/// parameter becomes pointer-to-element.
pub fn array_type(size: Width, extents: &[Option<i64>]) -> String {
    let mut ty = scalar_type(size);
    for extent in extents.iter().rev() {
        ty = match extent {
            Some(extent) => format!("[{extent} x {ty}]"),
            None => format!("{ty}*"),
        };
    }
    ty
}

/// Type of an operand slot: array extents when declared, scalar otherwise.
pub fn slot_type(size: Width, extents: Option<&[Option<i64>]>) -> String {
    match extents {
        Some(extents) => array_type(size, extents),
        None => scalar_type(size),
    }
}

/// Binary arithmetic instruction. `add`/`sub`/`mul` carry `nsw`, matching
/// signed miniC arithmetic; `xor` works on the 1-bit truth values.
pub fn calc(op: CalcOp, ty: &str, lhs: &str, rhs: &str) -> String {
    let mnemonic = match op {
        CalcOp::Add => "add nsw",
        CalcOp::Sub => "sub nsw",
        CalcOp::Mul => "mul nsw",
        CalcOp::Div => "sdiv",
        CalcOp::Rem => "srem",
        CalcOp::Xor => "xor",
    };
    format!("{mnemonic} {ty} {lhs}, {rhs}")
}

/// Signed integer comparison.
pub fn icmp(op: CmpOp, ty: &str, lhs: &str, rhs: &str) -> String {
    let cond = match op {
        CmpOp::Eq => "eq",
        CmpOp::Ne => "ne",
        CmpOp::Lt => "slt",
        CmpOp::Le => "sle",
        CmpOp::Gt => "sgt",
        CmpOp::Ge => "sge",
    };
    format!("icmp {cond} {ty} {lhs}, {rhs}")
}

pub fn load(ty: &str, ptr: &str) -> String {
    format!("load {ty}, {ty}* {ptr}")
}

pub fn store(ty: &str, value: &str, ptr: &str) -> String {
    format!("store {ty} {value}, {ty}* {ptr}")
}

pub fn zext(from: &str, value: &str, to: &str) -> String {
    format!("zext {from} {value} to {to}")
}

pub fn br(target: &str) -> String {
    format!("br label %{target}")
}

pub fn br_cond(cond: &str, true_label: &str, false_label: &str) -> String {
    format!("br i1 {cond}, label %{true_label}, label %{false_label}")
}

/// `getelementptr` with the leading zero index that steps through the
/// aggregate pointer itself.
pub fn gep(agg: &str, ptr: &str, index_ty: &str, index: &str) -> String {
    format!("getelementptr inbounds {agg}, {agg}* {ptr}, i32 0, {index_ty} {index}")
}

/// `getelementptr` without the leading zero: plain pointer arithmetic, used
/// for the open outer dimension of array parameters.
pub fn gep_flat(agg: &str, ptr: &str, index_ty: &str, index: &str) -> String {
    format!("getelementptr inbounds {agg}, {agg}* {ptr}, {index_ty} {index}")
}
