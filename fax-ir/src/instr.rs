//! Three-address linear IR. An IR variable is a unique string (`x0`, `x1`,
//! …); labels are strings too (`L0`, `L1`, …).

use fax_sem::Type;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

pub type IrVar = String;
pub type Label = String;

#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    LoadIntConst(u64, IrVar),
    LoadBoolConst(bool, IrVar),
    Copy(IrVar, IrVar),
    /// `fun` is a name: either a reserved operator symbol (`+`, `==`, …) or
    /// a user/built-in function name. Never an arbitrary computed value —
    /// this IR has no representation for calling through a value.
    Call(String, Vec<IrVar>, IrVar),
    Jump(Label),
    CondJump(IrVar, Label, Label),
    Label(Label),
    LoadParam(usize, IrVar),
    Return(Option<IrVar>),
}

/// One function's compiled body plus the type of every IR variable it
/// defines, so `fax-lir`'s stack-slot allocator and `fax-gen`'s lowering can
/// decide sign-extension and which print routine to wire a bare top-level
/// result into.
#[derive(Clone, Debug, Default)]
pub struct FunctionIr {
    pub instructions: Vec<Instruction>,
    pub var_types: FxHashMap<IrVar, Type>,
    pub param_count: usize,
}

/// A whole compiled program: one entry per function, plus `main` for the
/// top-level block. `IndexMap` keeps functions in the order they were
/// generated so `fax-gen`'s textual output is stable across runs.
#[derive(Clone, Debug, Default)]
pub struct IrProgram {
    pub functions: IndexMap<String, FunctionIr>,
}

pub const MAIN: &str = "main";
