//! minicc-sem - Semantic analysis and lowering for miniC.
//!
//! The analyzer consumes the AST and produces the flat "sentence" stream:
//! three-address records already shaped the way the IR emitter needs them.
//! Storage is allocation-per-variable with explicit loads and stores,
//! `&&`/`||` become control flow through a 1-bit slot, every width change is
//! an explicit sentence, and every labelled sentence begins a basic block.
//!
//! The crate also owns the pieces the rest of the pipeline shares: the
//! sentence and operand model ([`sentence`]), symbols and the overloadable
//! function table ([`symbol`]), and the scope stack with its symbol-flow
//! trace ([`scope`]).

mod analysis;
mod edge_cases;
pub mod scope;
pub mod sentence;
pub mod symbol;

pub use analysis::{analyze, Analysis, Analyzer};
pub use scope::{Frame, ScopeStack};
pub use sentence::{
    CalcOp, CmpOp, Extents, FuncRet, Operand, ParamSlot, PhiArm, Sentence, SentenceKind, Width,
};
pub use symbol::{
    library_functions, DefFrom, FuncSymbol, FunctionTable, ParamInfo, ParamSig, Symbol, SymbolKind,
};
