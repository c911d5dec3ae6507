//! fax-gen - x86-64 GAS text generation and the `as`/`ld` invocation.

mod asm;
mod error;
mod linker;

pub use asm::{generate_function, generate_program};
pub use error::{AsmError, LinkError};
pub use linker::{assemble, link};

#[cfg(test)]
mod tests {
    use super::*;
    use fax_ir::generate_program as ir_generate;
    use fax_par::parse;
    use fax_sem::check_program;

    fn generate(src: &str) -> String {
        let tokens = fax_lex::tokenize(src, "test").expect("lex ok");
        let program = parse(tokens).expect("parse ok");
        let check = check_program(&program).expect("typecheck ok");
        let ir = ir_generate(&program, &check).expect("ir gen ok");
        generate_program(&ir).expect("asm gen ok")
    }

    #[test]
    fn emits_externs_and_main_label() {
        let asm = generate("1 + 2");
        assert!(asm.contains(".extern print_int"));
        assert!(asm.contains(".globl main"));
        assert!(asm.contains("main:"));
    }

    #[test]
    fn arithmetic_lowers_to_addq() {
        let asm = generate("1 + 2");
        assert!(asm.contains("addq"));
    }

    #[test]
    fn division_uses_cqto_and_idivq() {
        let asm = generate("10 / 3");
        assert!(asm.contains("cqto"));
        assert!(asm.contains("idivq"));
    }

    #[test]
    fn comparison_uses_setcc_and_movzbq() {
        let asm = generate("1 < 2");
        assert!(asm.contains("setl"));
        assert!(asm.contains("movzbq"));
    }

    #[test]
    fn unary_not_uses_xor() {
        let asm = generate("not true");
        assert!(asm.contains("xorq $1, %rax"));
    }

    #[test]
    fn unary_negation_uses_negq() {
        let asm = generate("-5");
        assert!(asm.contains("negq"));
    }

    #[test]
    fn user_function_gets_its_own_label_and_prologue() {
        let asm = generate("fun square(x: Int): Int { return x * x; } square(4)");
        assert!(asm.contains("square:"));
        assert!(asm.contains("movq %rdi,"));
    }

    #[test]
    fn print_int_call_is_padded_for_alignment() {
        let asm = generate("print_int(1)");
        assert!(asm.contains("subq $8, %rsp"));
        assert!(asm.contains("addq $8, %rsp"));
    }

    #[test]
    fn frame_size_appears_in_prologue() {
        let asm = generate("var a = 1; var b = 2; a + b");
        assert!(asm.contains("subq $"));
    }
}
