//! Naive stack-slot allocation — no register allocation at all, every IR
//! variable gets its own 8-byte slot below `%rbp`.

use fax_ir::{FunctionIr, Instruction, IrVar};
use indexmap::IndexSet;

/// `%rbp`-relative slot layout for one function: every IR variable the
/// function references, in first-appearance order, each assigned
/// `-8 * (i + 1)` bytes from `%rbp`.
#[derive(Debug, Clone)]
pub struct StackFrame {
    slots: IndexSet<IrVar>,
    /// Total bytes reserved below `%rbp`, already rounded up to a multiple
    /// of 16 so `%rsp` stays aligned before every `call`.
    pub frame_size: u32,
}

impl StackFrame {
    pub fn build(function: &FunctionIr) -> Self {
        let mut slots = IndexSet::new();
        for instruction in &function.instructions {
            for var in operands_of(instruction) {
                slots.insert(var.clone());
            }
        }
        let raw_size = (slots.len() as u32) * 8;
        let frame_size = (raw_size + 15) & !15;
        Self { slots, frame_size }
    }

    /// The `-8*(i+1)(%rbp)` operand text for `var`, or `None` if `var` is
    /// never referenced by any instruction (the unit placeholder, when it
    /// never appears as a real operand).
    pub fn slot(&self, var: &str) -> Option<String> {
        self.slots
            .get_index_of(var)
            .map(|index| format!("-{}(%rbp)", 8 * (index + 1)))
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

/// Every IR variable `instruction` reads or writes, destination last.
fn operands_of(instruction: &Instruction) -> Vec<&IrVar> {
    match instruction {
        Instruction::LoadIntConst(_, dst) | Instruction::LoadBoolConst(_, dst) => vec![dst],
        Instruction::Copy(src, dst) => vec![src, dst],
        Instruction::Call(_, args, dst) => args.iter().chain(std::iter::once(dst)).collect(),
        Instruction::Jump(_) | Instruction::Label(_) => vec![],
        Instruction::CondJump(cond, _, _) => vec![cond],
        Instruction::LoadParam(_, dst) => vec![dst],
        Instruction::Return(value) => value.iter().collect(),
    }
}
