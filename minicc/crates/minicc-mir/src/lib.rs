//! minicc-mir - Basic blocks and the control-flow graph over the sentence
//! stream.
//!
//! The builder walks the analyzer's sentence list once. A block starts at
//! every labelled sentence (blocks reached only by fall-through get a
//! synthetic `KS<n>` name) and closes at a terminator: `Jmp` with one
//! successor, `IfJmp` with two, `Return` and `FuncEnd` with none. Definition
//! sentences (globals, function heads, prototypes) separate functions rather
//! than belonging to any block and are skipped.
//!
//! No optimisation happens here; the graph exists for downstream analysis.

mod block;
mod cfg;

pub use block::{build_blocks, BaseBlock};
pub use cfg::ControlFlowGraph;
