//! minicc-gen - Textual LLVM IR emission.
//!
//! Renders the analyzer's sentence stream to LLVM-compatible IR: the fixed
//! runtime prelude, one instruction line per sentence (array operands expand
//! to `getelementptr` chains in place), and the module epilogue. Function
//! bodies are tab-indented, labels sit left-aligned on their own `L:` lines,
//! and a final pass prunes label lines nothing jumps to.
//!
//! Emission is a pure function of the sentence list; running it twice yields
//! byte-identical output. Errors here mean an upstream stage broke the
//! sentence contract, never a user mistake.

pub mod llvm;
mod prelude;

pub use prelude::{EPILOGUE, PRELUDE};

use minicc_sem::{Operand, Sentence, SentenceKind, Width};
use rustc_hash::FxHashSet;
use thiserror::Error;

/// An invariant violation in the sentence stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("Unknown sentence op {op}")]
    UnknownOp { op: &'static str, line: u32 },

    #[error("Malformed sentence: {message}")]
    Malformed { message: String, line: u32 },
}

impl EmitError {
    /// Source line of the offending sentence.
    pub fn line(&self) -> u32 {
        match self {
            EmitError::UnknownOp { line, .. } | EmitError::Malformed { line, .. } => *line,
        }
    }
}

pub type EmitResult<T> = Result<T, EmitError>;

/// Renders `sentences` to a complete IR module.
pub fn emit(sentences: &[Sentence]) -> EmitResult<String> {
    Emitter::new().run(sentences)
}

/// A resolved operand: its SSA value text and width.
struct Resolved {
    text: String,
    size: Width,
}

struct Emitter {
    lines: Vec<String>,
    indent: usize,
    used_labels: FxHashSet<String>,
    /// Counter for element-pointer register suffixes.
    ptr_counter: u32,
}

impl Emitter {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            indent: 0,
            used_labels: FxHashSet::default(),
            ptr_counter: 0,
        }
    }

    fn run(mut self, sentences: &[Sentence]) -> EmitResult<String> {
        self.lines.push(PRELUDE.to_string());
        for sentence in sentences {
            self.sentence(sentence)?;
        }
        self.lines.push(EPILOGUE.to_string());
        self.prune_unused_labels();
        let mut out = self.lines.join("\n");
        out.push('\n');
        Ok(out)
    }

    fn line(&mut self, text: String) {
        self.lines.push(format!("{}{}", "\t".repeat(self.indent), text));
    }

    fn sentence(&mut self, s: &Sentence) -> EmitResult<()> {
        if let Some(label) = &s.label {
            self.lines.push(format!("{label}:"));
        }
        match &s.kind {
            SentenceKind::DefineGlobalVar { reg } => {
                self.line(format!("{reg} = common dso_local global i32 zeroinitializer"));
            }
            SentenceKind::DefineGlobalArray { reg, extents } => {
                let ty = llvm::array_type(Width::I32, extents);
                self.line(format!("{reg} = common dso_local global {ty} zeroinitializer"));
            }
            SentenceKind::DefineLocalVar { reg, size } => {
                self.line(format!("{reg} = alloca {}, align 4", llvm::scalar_type(*size)));
            }
            SentenceKind::DefineLocalArray { reg, extents } => {
                let ty = llvm::array_type(Width::I32, extents);
                self.line(format!("{reg} = alloca {ty}, align 16"));
            }
            SentenceKind::DefineFunc { name, ret, params } => {
                let params: Vec<String> = params
                    .iter()
                    .map(|p| {
                        format!(
                            "{} {}",
                            llvm::slot_type(p.size, p.extents.as_deref()),
                            p.reg
                        )
                    })
                    .collect();
                self.line(format!(
                    "define {} @{name}({}) #0 {{",
                    ret_type(*ret),
                    params.join(", ")
                ));
                self.indent += 1;
            }
            SentenceKind::DeclareFunc { .. } => {
                // Prototypes produce no IR: definitions are emitted in full
                // and everything external lives in the prelude.
            }
            SentenceKind::FuncEnd => {
                self.indent = self.indent.saturating_sub(1);
                self.line("}".to_string());
            }
            SentenceKind::Jmp { target } => {
                self.used_labels.insert(target.clone());
                self.line(llvm::br(target));
            }
            SentenceKind::IfJmp {
                cond,
                true_label,
                false_label,
            } => {
                let cond = self.resolve(cond, true, s.line)?;
                self.used_labels.insert(true_label.clone());
                self.used_labels.insert(false_label.clone());
                self.line(llvm::br_cond(&cond.text, true_label, false_label));
            }
            SentenceKind::Assign { dst, src } => self.assign(dst, src, s.line)?,
            SentenceKind::Calc { op, dst, lhs, rhs } => {
                let lhs = self.resolve(lhs, true, s.line)?;
                let rhs = self.resolve(rhs, true, s.line)?;
                let dst = dst_reg(dst, s.line)?;
                let ty = llvm::scalar_type(rhs.size);
                let inst = llvm::calc(*op, &ty, &lhs.text, &rhs.text);
                self.line(format!("{dst} = {inst}"));
            }
            SentenceKind::Cmp { op, dst, lhs, rhs } => {
                let lhs = self.resolve(lhs, true, s.line)?;
                let rhs = self.resolve(rhs, true, s.line)?;
                let dst = dst_reg(dst, s.line)?;
                let ty = llvm::scalar_type(lhs.size);
                let inst = llvm::icmp(*op, &ty, &lhs.text, &rhs.text);
                self.line(format!("{dst} = {inst}"));
            }
            SentenceKind::Zext { dst, src } => {
                let src = self.resolve(src, true, s.line)?;
                let dst_op = dst;
                let to = llvm::scalar_type(dst_op.width().unwrap_or(Width::I32));
                let from = llvm::scalar_type(src.size);
                let dst = dst_reg(dst_op, s.line)?;
                self.line(format!("{dst} = {}", llvm::zext(&from, &src.text, &to)));
            }
            SentenceKind::Load { dst, src } => {
                let dst = dst_reg(dst, s.line)?;
                let (ty, ptr) = match src {
                    Operand::Var {
                        reg,
                        size,
                        declared,
                    } => (llvm::slot_type(*size, declared.as_deref()), reg.clone()),
                    Operand::Tmp { reg, size } => (llvm::scalar_type(*size), reg.clone()),
                    Operand::ArrayRef {
                        reg,
                        indices,
                        declared,
                        size,
                    } => {
                        let ptr = self.expand_array(reg, indices, declared, *size, false, s.line)?;
                        (llvm::scalar_type(*size), ptr)
                    }
                    _ => {
                        return Err(EmitError::Malformed {
                            message: "load source has no storage".into(),
                            line: s.line,
                        })
                    }
                };
                self.line(format!("{dst} = {}", llvm::load(&ty, &ptr)));
            }
            SentenceKind::Call {
                callee,
                ret,
                args,
                dst,
            } => {
                let mut rendered = Vec::with_capacity(args.len());
                for arg in args {
                    rendered.push(self.call_argument(arg, s.line)?);
                }
                let call = format!("call {} @{callee}({})", ret_type(*ret), rendered.join(", "));
                match dst {
                    Some(dst) => {
                        let dst = dst_reg(dst, s.line)?;
                        self.line(format!("{dst} = {call}"));
                    }
                    None => self.line(call),
                }
            }
            SentenceKind::Return { value } => match value {
                Some(value) => {
                    let value = self.resolve(value, true, s.line)?;
                    let ty = llvm::scalar_type(value.size);
                    self.line(format!("ret {ty} {}", value.text));
                }
                None => self.line("ret void".to_string()),
            },
            SentenceKind::Phi { dst, size, arms } => {
                let dst = dst_reg(dst, s.line)?;
                let arms: Vec<String> = arms
                    .iter()
                    .map(|arm| format!("[{}, %{}]", arm.value, arm.label))
                    .collect();
                self.line(format!(
                    "{dst} = phi {} {}",
                    llvm::scalar_type(*size),
                    arms.join(", ")
                ));
            }
            SentenceKind::GetPtr { dst, base } => {
                // The analyzer expands array accesses in place, so a
                // standalone pointer computation only names the element
                // pointer a chain already produced.
                let Operand::ArrayRef {
                    reg,
                    indices,
                    declared,
                    size,
                } = base
                else {
                    return Err(EmitError::Malformed {
                        message: "GetPtr base is not an array reference".into(),
                        line: s.line,
                    });
                };
                let ptr = self.expand_array(reg, indices, declared, *size, false, s.line)?;
                let dst = dst_reg(dst, s.line)?;
                let ty = llvm::scalar_type(*size);
                self.line(format!(
                    "{dst} = getelementptr inbounds {ty}, {ty}* {ptr}, i32 0"
                ));
            }
            SentenceKind::Not { .. } => {
                return Err(EmitError::UnknownOp {
                    op: "Not",
                    line: s.line,
                })
            }
        }
        Ok(())
    }

    /// `store`: the value type follows the source operand, so storing a
    /// forwarded array parameter keeps its pointer type.
    fn assign(&mut self, dst: &Operand, src: &Operand, line: u32) -> EmitResult<()> {
        let (value, ty) = match src {
            Operand::ArrayRef {
                reg,
                indices,
                declared,
                size,
            } => {
                let value = self.expand_array(reg, indices, declared, *size, true, line)?;
                (value, llvm::scalar_type(*size))
            }
            Operand::Var {
                reg,
                size,
                declared,
            } => (reg.clone(), llvm::slot_type(*size, declared.as_deref())),
            Operand::Tmp { reg, size } => (reg.clone(), llvm::scalar_type(*size)),
            Operand::Num { value, size } => (value.to_string(), llvm::scalar_type(*size)),
            Operand::Void => {
                return Err(EmitError::Malformed {
                    message: "store of a void value".into(),
                    line,
                })
            }
        };
        let ptr = match dst {
            Operand::ArrayRef {
                reg,
                indices,
                declared,
                size,
            } => self.expand_array(reg, indices, declared, *size, false, line)?,
            Operand::Var { reg, .. } | Operand::Tmp { reg, .. } => reg.clone(),
            _ => {
                return Err(EmitError::Malformed {
                    message: "store destination has no storage".into(),
                    line,
                })
            }
        };
        self.line(llvm::store(&ty, &value, &ptr));
        Ok(())
    }

    /// Resolves an operand to its SSA value text, expanding array references
    /// to a GEP chain (plus a final element load when `load_element`).
    fn resolve(&mut self, op: &Operand, load_element: bool, line: u32) -> EmitResult<Resolved> {
        match op {
            Operand::Num { value, size } => Ok(Resolved {
                text: value.to_string(),
                size: *size,
            }),
            Operand::Var { reg, size, .. } | Operand::Tmp { reg, size } => Ok(Resolved {
                text: reg.clone(),
                size: *size,
            }),
            Operand::ArrayRef {
                reg,
                indices,
                declared,
                size,
            } => {
                let text = self.expand_array(reg, indices, declared, *size, load_element, line)?;
                Ok(Resolved { text, size: *size })
            }
            Operand::Void => Err(EmitError::Malformed {
                message: "void operand in value position".into(),
                line,
            }),
        }
    }

    /// Lowers an array element reference to its pointer: an initial load when
    /// the array arrived as a pointer parameter, then one `getelementptr` per
    /// dimension. Intermediate registers take unique suffixes derived from
    /// the base register name.
    fn expand_array(
        &mut self,
        reg: &str,
        indices: &[Operand],
        declared: &[Option<i64>],
        size: Width,
        load_element: bool,
        line: u32,
    ) -> EmitResult<String> {
        if indices.is_empty() || indices.len() != declared.len() {
            return Err(EmitError::Malformed {
                message: format!(
                    "array reference {reg} has {} indices for {} declared dimensions",
                    indices.len(),
                    declared.len()
                ),
                line,
            });
        }

        let mut remaining: Vec<Option<i64>> = declared.to_vec();
        let mut pending = indices;
        // The pointer operand of the next GEP, and the local name new
        // registers derive from (globals drop their `@` here).
        let mut ptr = reg.to_string();
        let mut name_base = reg.replace('@', "%");

        if remaining[0].is_none() {
            // Pointer parameter: fetch the pointer, then step through it
            // without the leading zero index.
            let ptr_ty = llvm::array_type(size, &remaining);
            let loaded = self.fresh_ptr(&name_base);
            self.line(format!("{loaded} = {}", llvm::load(&ptr_ty, &ptr)));
            ptr = loaded.clone();
            name_base = loaded;
            remaining.remove(0);
            let index = self.resolve(&pending[0], true, line)?;
            pending = &pending[1..];
            let elem_ty = llvm::slot_type(size, non_empty(&remaining));
            let next = self.fresh_ptr(&name_base);
            self.line(format!(
                "{next} = {}",
                llvm::gep_flat(&elem_ty, &ptr, &llvm::scalar_type(index.size), &index.text)
            ));
            ptr = next.clone();
            name_base = next;
        }

        for index_op in pending {
            let index = self.resolve(index_op, true, line)?;
            let agg_ty = llvm::array_type(size, &remaining);
            let next = self.fresh_ptr(&name_base);
            self.line(format!(
                "{next} = {}",
                llvm::gep(&agg_ty, &ptr, &llvm::scalar_type(index.size), &index.text)
            ));
            ptr = next.clone();
            name_base = next;
            remaining.remove(0);
        }

        if load_element {
            let value = format!("{ptr}_load");
            self.line(format!(
                "{value} = {}",
                llvm::load(&llvm::scalar_type(size), &ptr)
            ));
            return Ok(value);
        }
        Ok(ptr)
    }

    /// Renders one call argument as `<type> <value>`. Whole arrays decay to a
    /// pointer to their first element; forwarded array parameters pass their
    /// loaded pointer through unchanged.
    fn call_argument(&mut self, arg: &Operand, line: u32) -> EmitResult<String> {
        if let Operand::Var {
            reg,
            size,
            declared: Some(declared),
        } = arg
        {
            if declared.first().is_some_and(Option::is_none) {
                let ptr_ty = llvm::array_type(*size, declared);
                let loaded = self.fresh_ptr(&reg.replace('@', "%"));
                self.line(format!("{loaded} = {}", llvm::load(&ptr_ty, reg)));
                return Ok(format!("{ptr_ty} {loaded}"));
            }
            let agg_ty = llvm::array_type(*size, declared);
            let elem_ty = llvm::slot_type(*size, non_empty(&declared[1..]));
            let decayed = self.fresh_ptr(&reg.replace('@', "%"));
            self.line(format!(
                "{decayed} = {}",
                llvm::gep(&agg_ty, reg, "i32", "0")
            ));
            return Ok(format!("{elem_ty}* {decayed}"));
        }
        let value = self.resolve(arg, true, line)?;
        Ok(format!("{} {}", llvm::scalar_type(value.size), value.text))
    }

    fn fresh_ptr(&mut self, base: &str) -> String {
        let suffix = self.ptr_counter;
        self.ptr_counter += 1;
        format!("{base}_{suffix}")
    }

    /// Drops `L<n>:` lines whose label no jump targets: function entry labels
    /// on declaration-matched definitions, and nothing else in a well-formed
    /// stream.
    fn prune_unused_labels(&mut self) {
        let used = &self.used_labels;
        self.lines.retain(|line| match line.strip_suffix(':') {
            Some(name)
                if !name.is_empty()
                    && name.starts_with('L')
                    && name.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                used.contains(name)
            }
            _ => true,
        });
    }
}

fn ret_type(ret: minicc_sem::FuncRet) -> &'static str {
    match ret {
        minicc_sem::FuncRet::Int => "i32",
        minicc_sem::FuncRet::Void => "void",
    }
}

/// The destination register of a computing sentence.
fn dst_reg(dst: &Operand, line: u32) -> EmitResult<String> {
    dst.reg()
        .map(str::to_string)
        .ok_or_else(|| EmitError::Malformed {
            message: "destination operand has no register".into(),
            line,
        })
}

fn non_empty(extents: &[Option<i64>]) -> Option<&[Option<i64>]> {
    if extents.is_empty() {
        None
    } else {
        Some(extents)
    }
}
