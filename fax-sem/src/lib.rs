//! fax-sem - the type checker.
//!
//! Consumes the untyped AST from `fax-par` and produces a `NodeId -> Type`
//! side table plus per-function signatures, both of which `fax-ir` reads
//! when lowering to three-address IR.

mod checker;
mod error;
mod types;

pub use checker::{check_program, CheckResult, TypeTable};
pub use error::TypeError;
pub use types::{FunctionSignature, Type};

#[cfg(test)]
mod tests {
    use super::*;
    use fax_par::parse;

    fn check_src(src: &str) -> CheckResult {
        let tokens = fax_lex::tokenize(src, "test").expect("lex ok");
        let program = parse(tokens).expect("parse ok");
        check_program(&program).expect("typecheck ok")
    }

    fn check_err(src: &str) -> TypeError {
        let tokens = fax_lex::tokenize(src, "test").expect("lex ok");
        let program = parse(tokens).expect("parse ok");
        check_program(&program).expect_err("expected a type error")
    }

    #[test]
    fn arithmetic_is_int() {
        check_src("1 + 2 * 3");
    }

    #[test]
    fn mixed_arithmetic_operand_is_rejected() {
        check_err("1 + true");
    }

    #[test]
    fn if_condition_must_be_bool() {
        check_err("if 1 then { 2 }");
    }

    #[test]
    fn if_branches_may_disagree_in_type() {
        // else branch type need not match then branch type (confirmed
        // against the original typechecker's lack of an else/then
        // agreement check).
        check_src("if true then { 1 } else { false }");
    }

    #[test]
    fn while_loop_result_is_unit_regardless_of_body() {
        check_src("var n = 0; while n < 10 { n = n + 1; }");
    }

    #[test]
    fn declaration_redeclaration_in_same_scope_is_rejected() {
        check_err("var x = 1; var x = 2;");
    }

    #[test]
    fn shadowing_in_nested_scope_is_allowed() {
        check_src("var x = 1; { var x = true; }");
    }

    #[test]
    fn declared_type_must_match_initializer() {
        check_err("var x: Bool = 1");
    }

    #[test]
    fn function_call_with_wrong_argument_type_is_rejected() {
        check_err("fun square(x: Int): Int { return x * x; } square(true)");
    }

    #[test]
    fn mutually_recursive_functions_typecheck() {
        check_src(
            "fun is_even(n: Int): Bool { if n == 0 then { return true; }; return is_odd(n - 1); }\
             fun is_odd(n: Int): Bool { if n == 0 then { return false; }; return is_even(n - 1); }\
             print_bool(is_even(10))",
        );
    }

    #[test]
    fn duplicate_parameter_names_are_rejected() {
        check_err("fun add(x: Int, x: Int): Int { return x + x; } add(1, 2)");
    }

    #[test]
    fn wrong_return_type_is_rejected() {
        check_err("fun truthy(): Bool { return 1; } truthy()");
    }

    #[test]
    fn builtins_are_preregistered() {
        check_src("print_int(1); print_bool(true); var n: Int = read_int()");
    }

    #[test]
    fn undefined_identifier_is_rejected() {
        check_err("y + 1");
    }

    #[test]
    fn unary_not_requires_bool() {
        check_err("not 1");
    }

    #[test]
    fn unary_negation_requires_int() {
        check_err("-true");
    }

    #[test]
    fn assignment_target_must_exist_and_match_type() {
        check_err("var x = 1; x = true");
    }
}
