//! fax-ir - three-address linear IR and the AST-to-IR generator.

mod error;
mod generator;
mod instr;

pub use error::IrError;
pub use generator::generate_program;
pub use instr::{FunctionIr, Instruction, IrProgram, IrVar, Label, MAIN};

#[cfg(test)]
mod tests {
    use super::*;
    use fax_par::parse;
    use fax_sem::check_program;

    fn generate(src: &str) -> IrProgram {
        let tokens = fax_lex::tokenize(src, "test").expect("lex ok");
        let program = parse(tokens).expect("parse ok");
        let check = check_program(&program).expect("typecheck ok");
        generate_program(&program, &check).expect("ir gen ok")
    }

    fn generate_err(src: &str) -> IrError {
        let tokens = fax_lex::tokenize(src, "test").expect("lex ok");
        let program = parse(tokens).expect("parse ok");
        let check = check_program(&program).expect("typecheck ok");
        generate_program(&program, &check).expect_err("expected an ir error")
    }

    #[test]
    fn bare_block_compiles_to_main() {
        let ir = generate("1 + 2");
        assert!(ir.functions.contains_key(MAIN));
    }

    #[test]
    fn top_level_int_result_prints() {
        let ir = generate("1 + 2");
        let main = &ir.functions[MAIN];
        assert!(main.instructions.iter().any(
            |i| matches!(i, Instruction::Call(name, _, _) if name == "print_int")
        ));
    }

    #[test]
    fn top_level_unit_result_has_no_trailing_print() {
        let ir = generate("var x = 1;");
        let main = &ir.functions[MAIN];
        assert!(!main.instructions.iter().any(
            |i| matches!(i, Instruction::Call(name, _, _) if name == "print_int" || name == "print_bool")
        ));
    }

    #[test]
    fn and_short_circuits_with_cond_jump() {
        let ir = generate("true and false");
        let main = &ir.functions[MAIN];
        assert!(main.instructions.iter().any(|i| matches!(i, Instruction::CondJump(..))));
    }

    #[test]
    fn while_loop_pushes_and_pops_loop_labels() {
        let ir = generate("var n = 0; while n < 3 { n = n + 1; break; }");
        let main = &ir.functions[MAIN];
        let jumps = main
            .instructions
            .iter()
            .filter(|i| matches!(i, Instruction::Jump(_)))
            .count();
        assert!(jumps >= 2);
    }

    #[test]
    fn break_outside_loop_is_rejected() {
        assert!(matches!(
            generate_err("break"),
            IrError::BreakOutsideLoop { .. }
        ));
    }

    #[test]
    fn continue_outside_loop_is_rejected() {
        assert!(matches!(
            generate_err("continue"),
            IrError::ContinueOutsideLoop { .. }
        ));
    }

    #[test]
    fn return_outside_function_is_rejected() {
        assert!(matches!(
            generate_err("return 1"),
            IrError::ReturnOutsideFunction { .. }
        ));
    }

    #[test]
    fn function_parameters_load_from_call_convention_slots() {
        let ir = generate("fun square(x: Int): Int { return x * x; } square(4)");
        let square = &ir.functions["square"];
        assert!(matches!(
            square.instructions.first(),
            Some(Instruction::LoadParam(0, _))
        ));
    }

    #[test]
    fn function_call_targets_are_emitted_as_plain_names() {
        let ir = generate("fun square(x: Int): Int { return x * x; } square(4)");
        let main = &ir.functions[MAIN];
        assert!(main
            .instructions
            .iter()
            .any(|i| matches!(i, Instruction::Call(name, _, _) if name == "square")));
    }

    #[test]
    fn if_without_else_has_no_copy_into_shared_result() {
        let ir = generate("if true then { 1; }");
        let main = &ir.functions[MAIN];
        assert!(main.instructions.iter().any(|i| matches!(i, Instruction::CondJump(..))));
    }
}
