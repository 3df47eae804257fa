//! The lowering core: AST to sentence list.
//!
//! The analyzer walks the parsed program and produces the linear sentence
//! stream the emitter renders, together with the function table and the
//! scope-stack trace. Semantic diagnostics never abort the walk; they are
//! reported through the [`Handler`] and the driver decides afterwards whether
//! emission may proceed.
//!
//! Two disciplines shape everything here:
//!
//! * **Pending label.** A single slot holds the label the next emitted
//!   sentence must carry. [`Analyzer::emit`] consumes it; if the previous
//!   sentence does not end its basic block, a synthetic `Jmp` to the label is
//!   inserted first so that every labelled sentence starts a block.
//! * **Width discipline.** Arithmetic runs on 32-bit operands, branches and
//!   `Xor` on 1-bit operands. Conversions are always explicit: `Zext` widens,
//!   a `!= 0` comparison narrows.

use crate::scope::{Frame, ScopeStack};
use crate::sentence::{
    CalcOp, CmpOp, Extents, FuncRet, Operand, ParamSlot, Sentence, SentenceKind, Width,
};
use crate::symbol::{
    library_functions, DefFrom, FuncSymbol, FunctionTable, ParamInfo, ParamSig, Symbol, SymbolKind,
};
use minicc_par::{
    ArrayDecl, Block, Expr, FuncDef, IncDec, Item, Param, Program, RetType, Stmt, UnaryOp, VarDecl,
};
use minicc_util::{Handler, Stage};

/// Everything the analyzer produces for one translation unit.
#[derive(Debug)]
pub struct Analysis {
    /// The sentence stream, in program order of effects.
    pub sentences: Vec<Sentence>,
    /// Function table including the pre-declared library functions.
    pub functions: FunctionTable,
    /// Deep-copied scope snapshots recorded on every push and pop.
    pub scope_trace: Vec<Vec<Frame>>,
}

/// Analyzes `program`, reporting diagnostics through `handler`.
pub fn analyze(program: &Program, handler: &Handler) -> Analysis {
    Analyzer::new(handler).run(program)
}

/// The semantic analyzer.
pub struct Analyzer<'a> {
    handler: &'a Handler,

    scopes: ScopeStack,
    functions: FunctionTable,
    sentences: Vec<Sentence>,

    /// Label to attach to the next emitted sentence.
    pending_label: Option<String>,
    /// `(cond_entry, leave)` of every enclosing loop, innermost last.
    loop_stack: Vec<(String, String)>,
    /// Leave label of the function currently being lowered.
    func_leave: Option<String>,
    /// Return-value slot of the current `int` function.
    return_slot: Option<Operand>,

    reg_counter: u32,
    label_counter: u32,
}

impl<'a> Analyzer<'a> {
    pub fn new(handler: &'a Handler) -> Self {
        Self {
            handler,
            scopes: ScopeStack::new(),
            functions: library_functions(),
            sentences: Vec::new(),
            pending_label: None,
            loop_stack: Vec::new(),
            func_leave: None,
            return_slot: None,
            reg_counter: 0,
            label_counter: 0,
        }
    }

    /// Lowers the whole translation unit.
    pub fn run(mut self, program: &Program) -> Analysis {
        for item in program {
            match item {
                Item::Var(v) => self.lower_global_var(v),
                Item::Array(a) => self.lower_global_array(a),
                Item::Func(f) => self.lower_function(f),
            }
        }
        Analysis {
            sentences: self.sentences,
            functions: self.functions,
            scope_trace: self.scopes.into_trace(),
        }
    }

    // ---- naming ----

    fn error(&self, line: u32, message: impl Into<String>) {
        self.handler.error(Stage::Analyzer, line, message);
    }

    fn new_label(&mut self) -> String {
        self.label_counter += 1;
        format!("L{}", self.label_counter)
    }

    fn new_temp_name(&mut self) -> String {
        let reg = format!("%t{}", self.reg_counter);
        self.reg_counter += 1;
        reg
    }

    fn new_temp(&mut self, size: Width) -> Operand {
        Operand::Tmp {
            reg: self.new_temp_name(),
            size,
        }
    }

    /// Register name for a user symbol. Shadowed names, and names that would
    /// collide with the reserved temporary shape `t<n>`, get a numeric suffix
    /// from the register counter.
    fn set_reg(&mut self, name: &str, is_global: bool) -> String {
        let sigil = if is_global { "@" } else { "%" };
        if self.scopes.is_bound(name) || is_temp_shaped(name) {
            let n = self.reg_counter;
            self.reg_counter += 1;
            format!("{sigil}{name}{n}")
        } else {
            format!("{sigil}{name}")
        }
    }

    // ---- emission ----

    /// Appends a sentence, attaching the pending label. If the label would
    /// land after a fall-through, a synthetic jump to it closes the previous
    /// block first.
    fn emit(&mut self, kind: SentenceKind, line: u32) {
        let label = self.take_pending();
        self.sentences.push(Sentence { kind, label, line });
    }

    fn take_pending(&mut self) -> Option<String> {
        let label = self.pending_label.take()?;
        if self.sentences.last().is_some_and(|s| !s.is_terminator()) {
            self.sentences.push(Sentence::new(
                SentenceKind::Jmp {
                    target: label.clone(),
                },
                0,
            ));
        }
        Some(label)
    }

    /// Closes the current block with a jump to `target` unless the previous
    /// sentence already ends it.
    fn close_block(&mut self, target: &str) {
        if self.sentences.last().is_some_and(|s| !s.is_terminator()) {
            self.sentences.push(Sentence::new(
                SentenceKind::Jmp {
                    target: target.to_string(),
                },
                0,
            ));
        }
    }

    /// Ends a branch arm with a jump to `target`. When the arm already ended
    /// in a terminator and no label is pending, the jump would be dead code
    /// after a terminator, so nothing is emitted.
    fn emit_edge(&mut self, target: &str, line: u32) {
        if self.pending_label.is_some() || self.sentences.last().is_some_and(|s| !s.is_terminator())
        {
            self.emit(
                SentenceKind::Jmp {
                    target: target.to_string(),
                },
                line,
            );
        }
    }

    /// Whether any jump emitted so far targets `label`.
    fn label_is_used(&self, label: &str) -> bool {
        self.sentences.iter().any(|s| match &s.kind {
            SentenceKind::Jmp { target } => target == label,
            SentenceKind::IfJmp {
                true_label,
                false_label,
                ..
            } => true_label == label || false_label == label,
            _ => false,
        })
    }

    // ---- symbols ----

    /// Reports a redefinition against the current frame. Returns true when
    /// the name is free.
    fn check_redefinition(&self, name: &str, line: u32) -> bool {
        if let Some(prev) = self.scopes.lookup_current(name) {
            self.error(
                line,
                format!("Redefinition of {name}, it was defined in line {}", prev.line),
            );
            return false;
        }
        true
    }

    fn insert_symbol(&mut self, symbol: Symbol) {
        if self.check_redefinition(&symbol.name, symbol.line) {
            self.scopes.insert(symbol);
        }
    }

    /// Inserts a function symbol, mangling `ir_name` when the source name is
    /// already taken by other overloads. Returns false on redefinition.
    fn insert_function(&mut self, sym: &mut FuncSymbol) -> bool {
        if let Some(list) = self.functions.get(&sym.name) {
            for prior in list {
                if prior.profile() == sym.profile() {
                    self.error(
                        sym.line,
                        format!(
                            "Redefine of function {}, already defined in {}",
                            sym.name, prior.line
                        ),
                    );
                    return false;
                }
            }
            sym.ir_name = format!("{}{}", sym.name, "i".repeat(list.len()));
        }
        self.functions
            .entry(sym.name.clone())
            .or_default()
            .push(sym.clone());
        true
    }

    fn find_overload(&self, name: &str, profile: &[ParamSig]) -> Option<usize> {
        self.functions
            .get(name)?
            .iter()
            .position(|f| f.profile() == profile)
    }

    // ---- globals ----

    fn lower_global_var(&mut self, v: &VarDecl) {
        let reg = self.set_reg(&v.name, true);
        self.insert_symbol(Symbol {
            name: v.name.clone(),
            kind: SymbolKind::IntVar,
            reg: reg.clone(),
            extents: None,
            line: v.line,
        });
        self.sentences
            .push(Sentence::new(SentenceKind::DefineGlobalVar { reg }, v.line));
    }

    fn lower_global_array(&mut self, a: &ArrayDecl) {
        let reg = self.set_reg(&a.name, true);
        self.insert_symbol(Symbol {
            name: a.name.clone(),
            kind: SymbolKind::IntArray,
            reg: reg.clone(),
            extents: Some(a.extents.clone()),
            line: a.line,
        });
        self.sentences.push(Sentence::new(
            SentenceKind::DefineGlobalArray {
                reg,
                extents: a.extents.clone(),
            },
            a.line,
        ));
    }

    // ---- functions ----

    fn lower_function(&mut self, f: &FuncDef) {
        self.scopes.push();
        let ret = match f.ret {
            RetType::Int => FuncRet::Int,
            RetType::Void => FuncRet::Void,
        };

        // Formal parameters: the signature carries a named incoming register;
        // the body addresses an interior slot the incoming value is stored
        // into, mirroring the alloca+store convention of the emitter.
        let mut slots: Vec<ParamSlot> = Vec::new();
        let mut param_setup: Vec<Sentence> = Vec::new();
        let mut infos: Vec<ParamInfo> = Vec::new();
        for param in &f.params {
            match param {
                Param::Var(v) => {
                    let incoming = self.set_reg(&v.name, false);
                    let slot_reg = self.new_temp_name();
                    slots.push(ParamSlot {
                        reg: incoming.clone(),
                        size: Width::I32,
                        extents: None,
                    });
                    param_setup.push(Sentence::new(
                        SentenceKind::DefineLocalVar {
                            reg: slot_reg.clone(),
                            size: Width::I32,
                        },
                        0,
                    ));
                    param_setup.push(Sentence::new(
                        SentenceKind::Assign {
                            dst: Operand::Var {
                                reg: slot_reg.clone(),
                                size: Width::I32,
                                declared: None,
                            },
                            src: Operand::Var {
                                reg: incoming,
                                size: Width::I32,
                                declared: None,
                            },
                        },
                        0,
                    ));
                    self.insert_symbol(Symbol {
                        name: v.name.clone(),
                        kind: SymbolKind::IntVar,
                        reg: slot_reg,
                        extents: None,
                        line: v.line,
                    });
                    infos.push(ParamInfo {
                        name: v.name.clone(),
                        size: Width::I32,
                        extents: None,
                    });
                }
                Param::Array(a) => {
                    let incoming = self.set_reg(&a.name, false);
                    let slot_reg = self.new_temp_name();
                    slots.push(ParamSlot {
                        reg: incoming.clone(),
                        size: Width::I32,
                        extents: Some(a.extents.clone()),
                    });
                    param_setup.push(Sentence::new(
                        SentenceKind::DefineLocalArray {
                            reg: slot_reg.clone(),
                            extents: a.extents.clone(),
                        },
                        0,
                    ));
                    param_setup.push(Sentence::new(
                        SentenceKind::Assign {
                            dst: Operand::Var {
                                reg: slot_reg.clone(),
                                size: Width::I32,
                                declared: Some(a.extents.clone()),
                            },
                            src: Operand::Var {
                                reg: incoming,
                                size: Width::I32,
                                declared: Some(a.extents.clone()),
                            },
                        },
                        0,
                    ));
                    self.insert_symbol(Symbol {
                        name: a.name.clone(),
                        kind: SymbolKind::IntArray,
                        reg: slot_reg,
                        extents: Some(a.extents.clone()),
                        line: a.line,
                    });
                    infos.push(ParamInfo {
                        name: a.name.clone(),
                        size: Width::I32,
                        extents: Some(a.extents.clone()),
                    });
                }
            }
        }

        let mut entry = self.new_label();
        let mut leave = self.new_label();
        let mut sym = FuncSymbol {
            name: f.name.clone(),
            ir_name: f.name.clone(),
            ret,
            params: infos,
            line: f.line,
            def_from: if f.body.is_some() {
                DefFrom::Define
            } else {
                DefFrom::Declare
            },
            entry_label: Some(entry.clone()),
            leave_label: Some(leave.clone()),
        };

        let Some(body) = &f.body else {
            // Prototype: record the symbol, emit the declaration sentence.
            self.scopes.pop();
            if self.insert_function(&mut sym) {
                self.sentences.push(Sentence::new(
                    SentenceKind::DeclareFunc {
                        name: sym.ir_name.clone(),
                        ret,
                        params: slots,
                    },
                    f.line,
                ));
            }
            return;
        };

        // A definition matching a prior declaration adopts its symbol, so
        // every call site and the entry label stay stable.
        let mut def_label = None;
        match self.find_overload(&f.name, &sym.profile()) {
            Some(idx) => {
                let prior = &mut self.functions.get_mut(&f.name).unwrap()[idx];
                if prior.def_from == DefFrom::Declare {
                    prior.def_from = DefFrom::Define;
                    prior.line = f.line;
                    sym.ir_name = prior.ir_name.clone();
                    entry = prior.entry_label.clone().unwrap_or(entry);
                    leave = prior.leave_label.clone().unwrap_or(leave);
                    def_label = Some(entry);
                } else {
                    let line = prior.line;
                    self.error(
                        f.line,
                        format!("Redefine of function {}, already defined in {line}", f.name),
                    );
                }
            }
            None => {
                self.insert_function(&mut sym);
            }
        }

        self.sentences.push(Sentence {
            kind: SentenceKind::DefineFunc {
                name: sym.ir_name.clone(),
                ret,
                params: slots,
            },
            label: def_label,
            line: f.line,
        });
        self.sentences.extend(param_setup);

        self.return_slot = match ret {
            FuncRet::Int => {
                let reg = self.set_reg("retg", false);
                self.insert_symbol(Symbol {
                    name: "retg".into(),
                    kind: SymbolKind::IntVar,
                    reg: reg.clone(),
                    extents: None,
                    line: 0,
                });
                self.sentences.push(Sentence::new(
                    SentenceKind::DefineLocalVar {
                        reg: reg.clone(),
                        size: Width::I32,
                    },
                    0,
                ));
                Some(Operand::Var {
                    reg,
                    size: Width::I32,
                    declared: None,
                })
            }
            FuncRet::Void => None,
        };
        self.func_leave = Some(leave.clone());

        for stmt in &body.stmts {
            self.lower_statement(stmt);
        }

        // Funnel every path through the leave label, where the return slot is
        // read back (or a bare ret void issued). A pending label no jump ever
        // targeted marks an unreachable join after returning arms; it is
        // dropped rather than materialised as a dead block.
        if let Some(pending) = self.pending_label.take() {
            let fall_through = self.sentences.last().is_some_and(|s| !s.is_terminator());
            if fall_through || self.label_is_used(&pending) {
                self.pending_label = Some(pending);
                self.emit(
                    SentenceKind::Jmp {
                        target: leave.clone(),
                    },
                    f.line,
                );
            }
        }
        self.pending_label = Some(leave);
        if let Some(slot) = self.return_slot.clone() {
            let value = self.new_temp(Width::I32);
            self.emit(
                SentenceKind::Load {
                    dst: value.clone(),
                    src: slot,
                },
                f.line,
            );
            self.emit(SentenceKind::Return { value: Some(value) }, f.line);
        } else {
            self.emit(SentenceKind::Return { value: None }, f.line);
        }
        self.emit(SentenceKind::FuncEnd, f.line);

        self.scopes.pop();
        self.func_leave = None;
        self.return_slot = None;
    }

    // ---- statements ----

    fn lower_statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var(v) => {
                let reg = self.set_reg(&v.name, false);
                self.insert_symbol(Symbol {
                    name: v.name.clone(),
                    kind: SymbolKind::IntVar,
                    reg: reg.clone(),
                    extents: None,
                    line: v.line,
                });
                self.emit(
                    SentenceKind::DefineLocalVar {
                        reg,
                        size: Width::I32,
                    },
                    v.line,
                );
            }
            Stmt::Array(a) => {
                let reg = self.set_reg(&a.name, false);
                self.insert_symbol(Symbol {
                    name: a.name.clone(),
                    kind: SymbolKind::IntArray,
                    reg: reg.clone(),
                    extents: Some(a.extents.clone()),
                    line: a.line,
                });
                self.emit(
                    SentenceKind::DefineLocalArray {
                        reg,
                        extents: a.extents.clone(),
                    },
                    a.line,
                );
            }
            Stmt::If {
                cond,
                then,
                els,
                line,
            } => self.lower_if(cond, then.as_deref(), els.as_deref(), *line),
            Stmt::While { cond, body, line } => self.lower_while(cond, body.as_deref(), *line),
            Stmt::Switch { line, .. } => {
                self.error(*line, "'switch' is not implemented");
            }
            Stmt::Break { line } => match self.loop_stack.last() {
                Some((_, leave)) => {
                    let target = leave.clone();
                    self.emit(SentenceKind::Jmp { target }, *line);
                }
                None => self.error(*line, "Can't find loop block to set 'break'"),
            },
            Stmt::Continue { line } => match self.loop_stack.last() {
                Some((cond_entry, _)) => {
                    let target = cond_entry.clone();
                    self.emit(SentenceKind::Jmp { target }, *line);
                }
                None => self.error(*line, "Can't find loop block to set 'continue'"),
            },
            Stmt::Return { expr, line } => self.lower_return(expr.as_ref(), *line),
            Stmt::Block(b) => self.lower_block(b),
            Stmt::Expr(e) => {
                self.lower_expr(e);
            }
        }
    }

    fn lower_block(&mut self, block: &Block) {
        self.scopes.push();
        for stmt in &block.stmts {
            self.lower_statement(stmt);
        }
        self.scopes.pop();
    }

    fn lower_if(&mut self, cond: &Expr, then: Option<&Stmt>, els: Option<&Stmt>, line: u32) {
        let cond_entry = match self.pending_label.take() {
            Some(label) => label,
            None => self.new_label(),
        };
        let block_leave = self.new_label();
        let true_leave = self.new_label();
        let false_leave = self.new_label();

        self.close_block(&cond_entry);
        self.pending_label = Some(cond_entry);
        let cond_op = self.lower_expr(cond);
        self.branch(cond_op, &true_leave, &false_leave, line);

        self.pending_label = Some(true_leave);
        if let Some(stmt) = then {
            self.lower_statement(stmt);
        }
        self.emit_edge(&block_leave, line);

        // The else arm always gets its block, even when empty: both exits of
        // the conditional converge on the same leave label.
        self.pending_label = Some(false_leave);
        if let Some(stmt) = els {
            self.lower_statement(stmt);
        }
        self.emit_edge(&block_leave, line);

        self.pending_label = Some(block_leave);
    }

    fn lower_while(&mut self, cond: &Expr, body: Option<&Stmt>, line: u32) {
        let cond_entry = match self.pending_label.take() {
            Some(label) => label,
            None => self.new_label(),
        };
        let block_leave = self.new_label();
        let body_label = self.new_label();

        self.close_block(&cond_entry);
        self.pending_label = Some(cond_entry.clone());
        let cond_op = self.lower_expr(cond);
        self.branch(cond_op, &body_label, &block_leave, line);

        self.loop_stack
            .push((cond_entry.clone(), block_leave.clone()));
        self.pending_label = Some(body_label);
        if let Some(stmt) = body {
            self.lower_statement(stmt);
        }
        self.emit_edge(&cond_entry, line);
        self.loop_stack.pop();

        self.pending_label = Some(block_leave);
    }

    fn lower_return(&mut self, expr: Option<&Expr>, line: u32) {
        if let Some(expr) = expr {
            if self.return_slot.is_none() {
                self.error(line, "Return type 'void' can't have return value");
                return;
            }
            let value = self.lower_expr(expr);
            let value = self.to_width(value, Width::I32, line);
            let slot = self.return_slot.clone().unwrap();
            self.emit(SentenceKind::Assign { dst: slot, src: value }, line);
        }
        if let Some(leave) = self.func_leave.clone() {
            self.emit(SentenceKind::Jmp { target: leave }, line);
        }
    }

    // ---- expressions ----

    /// Lowers an expression to the operand holding its value.
    fn lower_expr(&mut self, expr: &Expr) -> Operand {
        match expr {
            Expr::Num { value, .. } => Operand::Num {
                value: *value,
                size: Width::I32,
            },
            Expr::Ident { name, line } => self.lower_ident_use(name, *line),
            Expr::Index {
                name,
                indices,
                line,
            } => self.lower_index(name, indices, *line),
            Expr::Call { name, args, line } => self.lower_call(name, args, *line),
            Expr::Assign { lhs, rhs, line } => self.lower_assign(lhs, rhs, *line),
            Expr::Unary { op, target, line } => self.lower_unary(*op, target, *line),
            Expr::Postfix { op, target, line } => self.lower_postfix(*op, target, *line),
            Expr::Binary { op, lhs, rhs, line } => match op {
                minicc_par::BinaryOp::LogicAnd => self.lower_short_circuit(true, lhs, rhs, *line),
                minicc_par::BinaryOp::LogicOr => self.lower_short_circuit(false, lhs, rhs, *line),
                _ => self.lower_binary(*op, lhs, rhs, *line),
            },
        }
    }

    /// Reading an identifier loads its slot into a fresh temporary.
    fn lower_ident_use(&mut self, name: &str, line: u32) -> Operand {
        let Some(sym) = self.scopes.lookup(name) else {
            self.error(line, format!("Undefined variable {name}"));
            return poison();
        };
        let src = Operand::Var {
            reg: sym.reg.clone(),
            size: Width::I32,
            declared: sym.extents.clone(),
        };
        let dst = self.new_temp(Width::I32);
        self.emit(
            SentenceKind::Load {
                dst: dst.clone(),
                src,
            },
            line,
        );
        dst
    }

    /// A subscript evaluates to an element reference carrying its index and
    /// declared-extent chains; the emitter expands it to GEPs in place.
    fn lower_index(&mut self, name: &str, indices: &[Expr], line: u32) -> Operand {
        let Some(sym) = self.scopes.lookup(name) else {
            self.error(line, format!("Undefined variable {name}"));
            return poison();
        };
        if sym.kind != SymbolKind::IntArray {
            self.error(line, format!("{} is not subscriptable", sym.kind.describe()));
            return poison();
        }
        let reg = sym.reg.clone();
        let declared: Extents = sym.extents.clone().unwrap_or_default();
        if indices.len() != declared.len() {
            self.error(
                line,
                format!(
                    "Dimension count mismatch on {name}: declared {}, subscripted {}",
                    declared.len(),
                    indices.len()
                ),
            );
            return poison();
        }

        let mut index_ops = Vec::with_capacity(indices.len());
        for (i, index) in indices.iter().enumerate() {
            if let Expr::Num { value, .. } = index {
                if let Some(Some(extent)) = declared.get(i) {
                    if *value < 0 || *value >= *extent {
                        self.error(
                            line,
                            format!("Constant index {value} out of declared bound {extent}"),
                        );
                    }
                }
                index_ops.push(Operand::Num {
                    value: *value,
                    size: Width::I32,
                });
            } else {
                let op = self.lower_expr(index);
                index_ops.push(self.to_width(op, Width::I32, line));
            }
        }

        Operand::ArrayRef {
            reg,
            indices: index_ops,
            declared,
            size: Width::I32,
        }
    }

    fn lower_call(&mut self, name: &str, args: &[Expr], line: u32) -> Operand {
        let mut arg_ops = Vec::with_capacity(args.len());
        for arg in args {
            // A bare identifier naming an array passes the array by
            // reference, keeping its declared extents for the emitter.
            if let Expr::Ident { name: arg_name, .. } = arg {
                if let Some(sym) = self.scopes.lookup(arg_name) {
                    if let Some(extents) = &sym.extents {
                        arg_ops.push(Operand::Var {
                            reg: sym.reg.clone(),
                            size: Width::I32,
                            declared: Some(extents.clone()),
                        });
                        continue;
                    }
                }
            }
            let op = self.lower_expr(arg);
            if op.is_void() {
                self.error(line, "Can't use VOID value in expression");
                arg_ops.push(poison());
                continue;
            }
            let op = self.to_width(op, Width::I32, line);
            arg_ops.push(op);
        }

        let profile: Vec<ParamSig> = arg_ops.iter().map(operand_sig).collect();
        let Some(overloads) = self.functions.get(name) else {
            self.error(line, format!("Undefined function {name}"));
            return poison();
        };
        let Some(sym) = overloads.iter().find(|f| f.profile() == profile) else {
            self.error(line, format!("Can't find proper function call of {name}"));
            return poison();
        };
        let callee = sym.ir_name.clone();
        let ret = sym.ret;

        let dst = match ret {
            FuncRet::Int => Some(self.new_temp(Width::I32)),
            FuncRet::Void => None,
        };
        self.emit(
            SentenceKind::Call {
                callee,
                ret,
                args: arg_ops,
                dst: dst.clone(),
            },
            line,
        );
        dst.unwrap_or(Operand::Void)
    }

    /// The storage an assignment or increment writes through, without a load.
    fn lower_lvalue(&mut self, expr: &Expr) -> Option<Operand> {
        match expr {
            Expr::Num { line, .. } => {
                self.error(*line, "Number can't be evaluated");
                None
            }
            Expr::Ident { name, line } => match self.scopes.lookup(name) {
                Some(sym) => Some(Operand::Var {
                    reg: sym.reg.clone(),
                    size: Width::I32,
                    declared: sym.extents.clone(),
                }),
                None => {
                    self.error(*line, format!("Undefined variable {name}"));
                    None
                }
            },
            Expr::Index {
                name,
                indices,
                line,
            } => Some(self.lower_index(name, indices, *line)),
            _ => {
                self.error(expr.line(), "Expected left identifier of '='");
                None
            }
        }
    }

    fn lower_assign(&mut self, lhs: &Expr, rhs: &Expr, line: u32) -> Operand {
        let dst = self.lower_lvalue(lhs);
        let src = self.lower_expr(rhs);
        if src.is_void() {
            self.error(line, "Can't use VOID value in expression");
            return poison();
        }
        let src = self.to_width(src, Width::I32, line);
        match dst {
            Some(dst) => {
                self.emit(
                    SentenceKind::Assign {
                        dst: dst.clone(),
                        src,
                    },
                    line,
                );
                dst
            }
            None => poison(),
        }
    }

    fn lower_unary(&mut self, op: UnaryOp, target: &Expr, line: u32) -> Operand {
        match op {
            UnaryOp::PreInc | UnaryOp::PreDec => {
                let calc = if op == UnaryOp::PreInc {
                    CalcOp::Add
                } else {
                    CalcOp::Sub
                };
                let verb = if op == UnaryOp::PreInc {
                    "increment"
                } else {
                    "decrement"
                };
                let Some(slot) = self.incdec_slot(target, verb) else {
                    return poison();
                };
                let old = self.new_temp(Width::I32);
                self.emit(
                    SentenceKind::Load {
                        dst: old.clone(),
                        src: slot.clone(),
                    },
                    line,
                );
                let new = self.new_temp(Width::I32);
                self.emit(
                    SentenceKind::Calc {
                        op: calc,
                        dst: new.clone(),
                        lhs: old,
                        rhs: Operand::Num {
                            value: 1,
                            size: Width::I32,
                        },
                    },
                    line,
                );
                self.emit(
                    SentenceKind::Assign {
                        dst: slot,
                        src: new.clone(),
                    },
                    line,
                );
                new
            }
            UnaryOp::Neg => {
                let value = self.lower_expr(target);
                let value = self.to_width(value, Width::I32, line);
                let dst = self.new_temp(Width::I32);
                self.emit(
                    SentenceKind::Calc {
                        op: CalcOp::Sub,
                        dst: dst.clone(),
                        lhs: Operand::Num {
                            value: 0,
                            size: Width::I32,
                        },
                        rhs: value,
                    },
                    line,
                );
                dst
            }
            UnaryOp::Not => {
                let value = self.lower_expr(target);
                if value.is_void() {
                    self.error(line, "Can't use VOID value in expression");
                    return poison();
                }
                let width = value.width().unwrap_or(Width::I32);
                let ne = self.new_temp(Width::I1);
                self.emit(
                    SentenceKind::Cmp {
                        op: CmpOp::Ne,
                        dst: ne.clone(),
                        lhs: value,
                        rhs: Operand::Num {
                            value: 0,
                            size: width,
                        },
                    },
                    line,
                );
                let dst = self.new_temp(Width::I1);
                self.emit(
                    SentenceKind::Calc {
                        op: CalcOp::Xor,
                        dst: dst.clone(),
                        lhs: ne,
                        rhs: Operand::Num {
                            value: 1,
                            size: Width::I1,
                        },
                    },
                    line,
                );
                dst
            }
        }
    }

    /// Post-increment/decrement: the expression's value is the old one.
    fn lower_postfix(&mut self, op: IncDec, target: &Expr, line: u32) -> Operand {
        let calc = if op == IncDec::Inc {
            CalcOp::Add
        } else {
            CalcOp::Sub
        };
        let verb = if op == IncDec::Inc {
            "increment"
        } else {
            "decrement"
        };
        let Some(slot) = self.incdec_slot(target, verb) else {
            return poison();
        };
        let old = self.new_temp(Width::I32);
        self.emit(
            SentenceKind::Load {
                dst: old.clone(),
                src: slot.clone(),
            },
            line,
        );
        let new = self.new_temp(Width::I32);
        self.emit(
            SentenceKind::Calc {
                op: calc,
                dst: new.clone(),
                lhs: old.clone(),
                rhs: Operand::Num {
                    value: 1,
                    size: Width::I32,
                },
            },
            line,
        );
        self.emit(SentenceKind::Assign { dst: slot, src: new }, line);
        old
    }

    fn incdec_slot(&mut self, target: &Expr, verb: &str) -> Option<Operand> {
        match target {
            Expr::Ident { .. } | Expr::Index { .. } => self.lower_lvalue(target),
            _ => {
                self.error(target.line(), format!("lvalue required as {verb} operand"));
                None
            }
        }
    }

    /// `&&`/`||` lower to control flow through a 1-bit slot: store the left
    /// truth value, branch on it, store the right one on the continuing path,
    /// and read the slot back at the join.
    fn lower_short_circuit(&mut self, is_and: bool, lhs: &Expr, rhs: &Expr, line: u32) -> Operand {
        let leave = self.new_label();
        let continue_label = self.new_label();

        let slot_reg = self.new_temp_name();
        self.emit(
            SentenceKind::DefineLocalVar {
                reg: slot_reg.clone(),
                size: Width::I1,
            },
            line,
        );
        let slot = Operand::Tmp {
            reg: slot_reg,
            size: Width::I1,
        };

        let left = self.lower_expr(lhs);
        let left = self.to_width(left, Width::I1, line);
        self.emit(
            SentenceKind::Assign {
                dst: slot.clone(),
                src: left,
            },
            line,
        );
        let decide = self.new_temp(Width::I1);
        self.emit(
            SentenceKind::Load {
                dst: decide.clone(),
                src: slot.clone(),
            },
            line,
        );
        if is_and {
            self.branch(decide, &continue_label, &leave, line);
        } else {
            self.branch(decide, &leave, &continue_label, line);
        }

        self.pending_label = Some(continue_label);
        let right = self.lower_expr(rhs);
        let right = self.to_width(right, Width::I1, line);
        self.emit(
            SentenceKind::Assign {
                dst: slot.clone(),
                src: right,
            },
            line,
        );

        self.pending_label = Some(leave);
        let result = self.new_temp(Width::I1);
        self.emit(
            SentenceKind::Load {
                dst: result.clone(),
                src: slot,
            },
            line,
        );
        result
    }

    fn lower_binary(&mut self, op: minicc_par::BinaryOp, lhs: &Expr, rhs: &Expr, line: u32) -> Operand {
        use minicc_par::BinaryOp as B;

        let left = self.lower_expr(lhs);
        let right = self.lower_expr(rhs);
        let left = self.to_width(left, Width::I32, line);
        let right = self.to_width(right, Width::I32, line);

        let calc = match op {
            B::Add => Some(CalcOp::Add),
            B::Sub => Some(CalcOp::Sub),
            B::Mul => Some(CalcOp::Mul),
            B::Div => Some(CalcOp::Div),
            B::Rem => Some(CalcOp::Rem),
            _ => None,
        };
        if let Some(calc) = calc {
            let dst = self.new_temp(Width::I32);
            self.emit(
                SentenceKind::Calc {
                    op: calc,
                    dst: dst.clone(),
                    lhs: left,
                    rhs: right,
                },
                line,
            );
            return dst;
        }

        let cmp = match op {
            B::Eq => CmpOp::Eq,
            B::Ne => CmpOp::Ne,
            B::Lt => CmpOp::Lt,
            B::Le => CmpOp::Le,
            B::Gt => CmpOp::Gt,
            B::Ge => CmpOp::Ge,
            _ => unreachable!("logical operators take the short-circuit path"),
        };
        let dst = self.new_temp(Width::I1);
        self.emit(
            SentenceKind::Cmp {
                op: cmp,
                dst: dst.clone(),
                lhs: left,
                rhs: right,
            },
            line,
        );
        dst
    }

    // ---- width discipline ----

    /// Coerces `op` to `target`: `Zext` widens, `!= 0` narrows. Void values
    /// are diagnosed and replaced by a zero of the target width.
    fn to_width(&mut self, op: Operand, target: Width, line: u32) -> Operand {
        if op.is_void() {
            self.error(line, "Can't use VOID value in expression");
            return Operand::Num {
                value: 0,
                size: target,
            };
        }
        if op.width() == Some(target) {
            return op;
        }
        match target {
            Width::I1 => {
                let dst = self.new_temp(Width::I1);
                self.emit(
                    SentenceKind::Cmp {
                        op: CmpOp::Ne,
                        dst: dst.clone(),
                        lhs: op,
                        rhs: Operand::Num {
                            value: 0,
                            size: Width::I32,
                        },
                    },
                    line,
                );
                dst
            }
            Width::I32 => {
                let dst = self.new_temp(Width::I32);
                self.emit(
                    SentenceKind::Zext {
                        dst: dst.clone(),
                        src: op,
                    },
                    line,
                );
                dst
            }
        }
    }

    /// Emits the conditional jump for `cond`, narrowing it to 1 bit first.
    fn branch(&mut self, cond: Operand, true_label: &str, false_label: &str, line: u32) {
        let cond = self.to_width(cond, Width::I1, line);
        self.emit(
            SentenceKind::IfJmp {
                cond,
                true_label: true_label.to_string(),
                false_label: false_label.to_string(),
            },
            line,
        );
    }
}

/// Placeholder operand standing in for a value poisoned by an earlier
/// diagnostic: lowering continues so further errors surface, while the error
/// flag already suppresses emission.
fn poison() -> Operand {
    Operand::Num {
        value: 0,
        size: Width::I32,
    }
}

/// The overload-key contribution of a call argument.
fn operand_sig(op: &Operand) -> ParamSig {
    match op {
        Operand::Var {
            declared: Some(declared),
            ..
        } => ParamSig {
            size: Width::I32,
            dims: declared.len(),
        },
        _ => ParamSig {
            size: op.width().unwrap_or(Width::I32),
            dims: 0,
        },
    }
}

fn is_temp_shaped(name: &str) -> bool {
    name.strip_prefix('t')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}
