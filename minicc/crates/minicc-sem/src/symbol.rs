//! Symbols and the function table.

use crate::sentence::{Extents, FuncRet, Width};
use indexmap::IndexMap;
use serde::Serialize;

/// What a variable symbol names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SymbolKind {
    IntVar,
    IntArray,
}

impl SymbolKind {
    /// The source-facing spelling used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            SymbolKind::IntVar => "int var",
            SymbolKind::IntArray => "int array",
        }
    }
}

/// A variable or array symbol in some scope frame.
#[derive(Clone, Debug, Serialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// The storage register backing the symbol (`%...` or `@...`).
    pub reg: String,
    /// Declared extents for arrays; `None` for scalars.
    pub extents: Option<Extents>,
    pub line: u32,
}

/// Whether a function symbol came from a definition or a prototype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DefFrom {
    Define,
    Declare,
}

/// One formal parameter of a function symbol.
#[derive(Clone, Debug, Serialize)]
pub struct ParamInfo {
    pub name: String,
    pub size: Width,
    /// Declared extents for array parameters (leading `None` allowed).
    pub extents: Option<Extents>,
}

impl ParamInfo {
    /// The overload-key contribution of this parameter.
    pub fn sig(&self) -> ParamSig {
        ParamSig {
            size: self.size,
            dims: self.extents.as_ref().map_or(0, |e| e.len()),
        }
    }
}

/// One element of an overload key: parameter width and dimensionality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ParamSig {
    pub size: Width,
    pub dims: usize,
}

/// A function symbol. Overloads of one source name share a table entry; each
/// carries its own mangled `ir_name` and a stable entry/leave label pair.
#[derive(Clone, Debug, Serialize)]
pub struct FuncSymbol {
    pub name: String,
    /// The name emitted into the IR (`name` + one `i` per earlier overload).
    pub ir_name: String,
    pub ret: FuncRet,
    pub params: Vec<ParamInfo>,
    pub line: u32,
    pub def_from: DefFrom,
    /// Entry/leave labels; absent on the pre-declared library functions.
    pub entry_label: Option<String>,
    pub leave_label: Option<String>,
}

impl FuncSymbol {
    /// The overload key of this symbol (name excluded).
    pub fn profile(&self) -> Vec<ParamSig> {
        self.params.iter().map(ParamInfo::sig).collect()
    }
}

/// Function table: source name to its overload set, insertion-ordered so that
/// overload resolution is deterministic.
pub type FunctionTable = IndexMap<String, Vec<FuncSymbol>>;

/// The library functions every translation unit can call. Their bodies come
/// from the emitter's prelude.
pub fn library_functions() -> FunctionTable {
    fn int_param(name: &str) -> ParamInfo {
        ParamInfo {
            name: name.into(),
            size: Width::I32,
            extents: None,
        }
    }
    fn array_param(name: &str) -> ParamInfo {
        ParamInfo {
            name: name.into(),
            size: Width::I32,
            extents: Some(vec![None]),
        }
    }
    fn library(name: &str, ret: FuncRet, params: Vec<ParamInfo>) -> (String, Vec<FuncSymbol>) {
        (
            name.into(),
            vec![FuncSymbol {
                name: name.into(),
                ir_name: name.into(),
                ret,
                params,
                line: 0,
                def_from: DefFrom::Define,
                entry_label: None,
                leave_label: None,
            }],
        )
    }

    FunctionTable::from_iter([
        library("getint", FuncRet::Int, vec![]),
        library("getch", FuncRet::Int, vec![]),
        library("getarray", FuncRet::Int, vec![array_param("a")]),
        library("putint", FuncRet::Void, vec![int_param("k")]),
        library("putch", FuncRet::Void, vec![int_param("c")]),
        library(
            "putarray",
            FuncRet::Void,
            vec![int_param("n"), array_param("d")],
        ),
    ])
}
