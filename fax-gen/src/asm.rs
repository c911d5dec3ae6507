//! Linear IR -> x86-64 GAS text. One `movq`/`cmpq`/`callq` sequence per
//! instruction, every operand read and written through its `%rbp`-relative
//! stack slot — no register allocation.

use fax_ir::{FunctionIr, Instruction, IrProgram, IrVar, MAIN};
use fax_lir::StackFrame;

use crate::error::AsmError;

/// System V AMD64 integer argument registers, in order. A function with
/// more than six arguments cannot be lowered by this generator — the
/// stack-passed tail of the real ABI falls outside this generator's naive
/// scope.
const ARG_REGISTERS: &[&str] = &["%rdi", "%rsi", "%rdx", "%rcx", "%r8", "%r9"];

pub fn generate_program(ir: &IrProgram) -> Result<String, AsmError> {
    let mut out = String::new();
    out.push_str(".extern print_int\n");
    out.push_str(".extern print_bool\n");
    out.push_str(".extern read_int\n");
    out.push_str(".section .text\n\n");

    for (name, function) in &ir.functions {
        out.push_str(&generate_function(name, function)?);
        out.push('\n');
    }
    Ok(out)
}

pub fn generate_function(name: &str, function: &FunctionIr) -> Result<String, AsmError> {
    let frame = StackFrame::build(function);
    let mut lines = Vec::new();

    if name == MAIN {
        lines.push(".globl main".to_string());
    }
    lines.push(format!(".type {name},@function"));
    lines.push(format!("{name}:"));
    lines.push("    pushq %rbp".to_string());
    lines.push("    movq %rsp, %rbp".to_string());
    lines.push(format!("    subq ${}, %rsp", frame.frame_size));

    for instruction in &function.instructions {
        lower_instruction(instruction, &frame, &mut lines)?;
    }

    // Unconditional fallback epilogue: every explicit `Return` already
    // emits its own full epilogue inline, so this is only reached by
    // fallthrough when the body has none (e.g. `main`'s top-level block).
    lines.push("    movq $0, %rax".to_string());
    lines.push("    movq %rbp, %rsp".to_string());
    lines.push("    popq %rbp".to_string());
    lines.push("    ret".to_string());

    let mut text = lines.join("\n");
    text.push('\n');
    Ok(text)
}

fn slot(frame: &StackFrame, var: &IrVar) -> String {
    frame
        .slot(var)
        .unwrap_or_else(|| "-8(%rbp)".to_string())
}

fn lower_instruction(
    instruction: &Instruction,
    frame: &StackFrame,
    out: &mut Vec<String>,
) -> Result<(), AsmError> {
    out.push(format!("    # {instruction:?}"));
    match instruction {
        Instruction::LoadIntConst(value, dst) => {
            let d = slot(frame, dst);
            if *value > u32::MAX as u64 {
                out.push(format!("    movabsq ${value}, %rax"));
                out.push(format!("    movq %rax, {d}"));
            } else {
                out.push(format!("    movq ${value}, {d}"));
            }
        }
        Instruction::LoadBoolConst(value, dst) => {
            let d = slot(frame, dst);
            out.push(format!("    movq ${}, {d}", if *value { 1 } else { 0 }));
        }
        Instruction::Copy(src, dst) => {
            let s = slot(frame, src);
            let d = slot(frame, dst);
            out.push(format!("    movq {s}, %rax"));
            out.push(format!("    movq %rax, {d}"));
        }
        Instruction::Call(fun, args, dst) => lower_call(fun, args, dst, frame, out)?,
        Instruction::Jump(label) => out.push(format!("    jmp .{label}")),
        Instruction::CondJump(cond, then_label, else_label) => {
            let c = slot(frame, cond);
            out.push(format!("    cmpq $0, {c}"));
            out.push(format!("    jne .{then_label}"));
            out.push(format!("    jmp .{else_label}"));
        }
        Instruction::Label(label) => out.push(format!(".{label}:")),
        Instruction::LoadParam(index, dst) => {
            let d = slot(frame, dst);
            let reg = ARG_REGISTERS
                .get(*index)
                .ok_or_else(|| AsmError::Internal(format!("parameter {index} has no ABI slot")))?;
            out.push(format!("    movq {reg}, {d}"));
        }
        Instruction::Return(value) => {
            if let Some(value) = value {
                let s = slot(frame, value);
                out.push(format!("    movq {s}, %rax"));
            }
            out.push("    movq %rbp, %rsp".to_string());
            out.push("    popq %rbp".to_string());
            out.push("    ret".to_string());
        }
    }
    Ok(())
}

fn lower_call(
    fun: &str,
    args: &[IrVar],
    dst: &IrVar,
    frame: &StackFrame,
    out: &mut Vec<String>,
) -> Result<(), AsmError> {
    match fun {
        "+" | "-" | "*" if args.len() == 2 => lower_binary_arith(fun, args, dst, frame, out),
        "/" | "%" if args.len() == 2 => lower_div_mod(fun, args, dst, frame, out),
        "==" | "!=" | "<" | "<=" | ">" | ">=" if args.len() == 2 => {
            lower_comparison(fun, args, dst, frame, out)
        }
        "unary_-" if args.len() == 1 => {
            let a = slot(frame, &args[0]);
            out.push(format!("    movq {a}, %rax"));
            out.push("    negq %rax".to_string());
            out.push(format!("    movq %rax, {}", slot(frame, dst)));
            Ok(())
        }
        "unary_not" if args.len() == 1 => {
            let a = slot(frame, &args[0]);
            out.push(format!("    movq {a}, %rax"));
            out.push("    xorq $1, %rax".to_string());
            out.push(format!("    movq %rax, {}", slot(frame, dst)));
            Ok(())
        }
        "+" | "-" | "*" | "/" | "%" | "==" | "!=" | "<" | "<=" | ">" | ">=" | "unary_-"
        | "unary_not" => Err(AsmError::WrongOperatorArity(fun.to_string(), args.len())),
        _ => lower_function_call(fun, args, dst, frame, out),
    }
}

fn lower_binary_arith(
    op: &str,
    args: &[IrVar],
    dst: &IrVar,
    frame: &StackFrame,
    out: &mut Vec<String>,
) -> Result<(), AsmError> {
    let mnemonic = match op {
        "+" => "addq",
        "-" => "subq",
        "*" => "imulq",
        other => return Err(AsmError::UnknownOperator(other.to_string())),
    };
    let a = slot(frame, &args[0]);
    let b = slot(frame, &args[1]);
    out.push(format!("    movq {a}, %rax"));
    out.push(format!("    {mnemonic} {b}, %rax"));
    out.push(format!("    movq %rax, {}", slot(frame, dst)));
    Ok(())
}

fn lower_div_mod(
    op: &str,
    args: &[IrVar],
    dst: &IrVar,
    frame: &StackFrame,
    out: &mut Vec<String>,
) -> Result<(), AsmError> {
    let a = slot(frame, &args[0]);
    let b = slot(frame, &args[1]);
    out.push(format!("    movq {a}, %rax"));
    out.push("    cqto".to_string());
    out.push(format!("    idivq {b}"));
    let result_reg = if op == "/" { "%rax" } else { "%rdx" };
    out.push(format!("    movq {result_reg}, {}", slot(frame, dst)));
    Ok(())
}

fn lower_comparison(
    op: &str,
    args: &[IrVar],
    dst: &IrVar,
    frame: &StackFrame,
    out: &mut Vec<String>,
) -> Result<(), AsmError> {
    let set_instr = match op {
        "==" => "sete",
        "!=" => "setne",
        "<" => "setl",
        "<=" => "setle",
        ">" => "setg",
        ">=" => "setge",
        other => return Err(AsmError::UnknownOperator(other.to_string())),
    };
    let a = slot(frame, &args[0]);
    let b = slot(frame, &args[1]);
    out.push(format!("    movq {a}, %rax"));
    out.push(format!("    cmpq {b}, %rax"));
    out.push(format!("    {set_instr} %al"));
    out.push("    movzbq %al, %rax".to_string());
    out.push(format!("    movq %rax, {}", slot(frame, dst)));
    Ok(())
}

/// `print_int`/`read_int` pad the call with an extra 8 bytes of stack to
/// preserve 16-byte alignment; `print_bool` does not. This asymmetry comes
/// straight from the original asm generator's padding logic and is
/// preserved rather than "fixed" here.
fn lower_function_call(
    fun: &str,
    args: &[IrVar],
    dst: &IrVar,
    frame: &StackFrame,
    out: &mut Vec<String>,
) -> Result<(), AsmError> {
    if args.len() > ARG_REGISTERS.len() {
        return Err(AsmError::Internal(format!(
            "call to '{fun}' has {} arguments, more than this generator's {}-register limit",
            args.len(),
            ARG_REGISTERS.len()
        )));
    }
    for (index, arg) in args.iter().enumerate() {
        let a = slot(frame, arg);
        out.push(format!("    movq {a}, {}", ARG_REGISTERS[index]));
    }
    let padded = fun == "print_int" || fun == "read_int";
    if padded {
        out.push("    subq $8, %rsp".to_string());
    }
    out.push(format!("    callq {fun}"));
    if padded {
        out.push("    addq $8, %rsp".to_string());
    }
    out.push(format!("    movq %rax, {}", slot(frame, dst)));
    Ok(())
}
