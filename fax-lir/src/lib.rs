//! fax-lir - the naive stack-slot allocator that sits between `fax-ir`'s
//! linear IR and `fax-gen`'s GAS text.

mod stack_frame;

pub use stack_frame::StackFrame;

#[cfg(test)]
mod tests {
    use super::*;
    use fax_ir::{generate_program, Instruction, MAIN};
    use fax_par::parse;
    use fax_sem::check_program;

    fn build_frame(src: &str) -> StackFrame {
        let tokens = fax_lex::tokenize(src, "test").expect("lex ok");
        let program = parse(tokens).expect("parse ok");
        let check = check_program(&program).expect("typecheck ok");
        let ir = generate_program(&program, &check).expect("ir gen ok");
        StackFrame::build(&ir.functions[MAIN])
    }

    #[test]
    fn every_referenced_variable_gets_a_slot() {
        let frame = build_frame("1 + 2 * 3");
        assert!(frame.slot_count() >= 3);
    }

    #[test]
    fn frame_size_is_16_byte_aligned() {
        let frame = build_frame("1 + 2 * 3 + 4 + 5");
        assert_eq!(frame.frame_size % 16, 0);
    }

    #[test]
    fn slots_are_distinct_and_rbp_relative() {
        let frame = build_frame("var a = 1; var b = 2; a + b");
        let ir = {
            let tokens = fax_lex::tokenize("var a = 1; var b = 2; a + b", "test").unwrap();
            let program = parse(tokens).unwrap();
            let check = check_program(&program).unwrap();
            generate_program(&program, &check).unwrap()
        };
        let mut vars = std::collections::HashSet::new();
        for instruction in &ir.functions[MAIN].instructions {
            if let Instruction::Copy(_, dst) | Instruction::LoadIntConst(_, dst) = instruction {
                vars.insert(dst.clone());
            }
        }
        let mut offsets = std::collections::HashSet::new();
        for var in vars {
            if let Some(slot) = frame.slot(&var) {
                assert!(slot.ends_with("(%rbp)"));
                offsets.insert(slot);
            }
        }
        assert!(offsets.len() > 1);
    }
}
