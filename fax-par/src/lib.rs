//! fax-par - AST definitions and the recursive-descent parser.

pub mod ast;
mod error;
mod parser;

pub use ast::{Expr, ExprKind, FunctionDefinition, NodeId, Param, Program, TypeExpr};
pub use error::ParseError;
pub use parser::{parse, Parser};

#[cfg(test)]
mod tests {
    use super::*;
    use fax_lex::tokenize;

    fn parse_src(src: &str) -> Program {
        let tokens = tokenize(src, "test").expect("lex ok");
        parse(tokens).expect("parse ok")
    }

    fn parse_err(src: &str) -> ParseError {
        let tokens = tokenize(src, "test").expect("lex ok");
        parse(tokens).expect_err("expected parse error")
    }

    #[test]
    fn arithmetic_precedence() {
        let program = parse_src("1 + 2 * 3");
        let Program::Block(Expr {
            kind: ExprKind::Block { tail: Some(tail), .. },
            ..
        }) = program
        else {
            panic!("expected a bare block");
        };
        assert!(matches!(
            tail.kind,
            ExprKind::BinaryOp { ref op, .. } if op == "+"
        ));
    }

    #[test]
    fn assignment_is_right_associative_and_low_precedence() {
        // a = b == c  parses as  a = (b == c)
        let program = parse_src("var a = true; var b = true; var c = true; a = b == c");
        let Program::Block(Expr {
            kind: ExprKind::Block { tail: Some(tail), .. },
            ..
        }) = program
        else {
            panic!("expected a bare block");
        };
        let ExprKind::BinaryOp { op, right, .. } = &tail.kind else {
            panic!("expected assignment");
        };
        assert_eq!(op, "=");
        assert!(matches!(&right.kind, ExprKind::BinaryOp { op, .. } if op == "=="));
    }

    #[test]
    fn block_tail_vs_statement() {
        let program = parse_src("{ 1; 2 }");
        let Program::Block(Expr {
            kind: ExprKind::Block { tail: Some(outer_tail), .. },
            ..
        }) = program
        else {
            panic!("expected a bare block");
        };
        let ExprKind::Block { statements, tail } = &outer_tail.kind else {
            panic!("expected nested block");
        };
        assert_eq!(statements.len(), 1);
        assert!(tail.is_some());
    }

    #[test]
    fn if_without_semicolon_after_closing_brace_continues_block() {
        let program = parse_src("if true then { 1 } if false then { 2 }");
        let Program::Block(Expr {
            kind: ExprKind::Block { statements, tail },
            ..
        }) = program
        else {
            panic!("expected a bare block");
        };
        assert_eq!(statements.len(), 1);
        assert!(tail.is_some());
    }

    #[test]
    fn declaration_rejected_outside_block_statement_position() {
        parse_err("if true then var x = 3;");
    }

    #[test]
    fn consecutive_identifiers_are_a_parse_error() {
        parse_err("a + b c");
    }

    #[test]
    fn leading_fun_promotes_to_module() {
        let program = parse_src("fun square(x: Int): Int { return x * x; } square(5)");
        assert!(matches!(program, Program::Module { .. }));
    }

    #[test]
    fn function_type_annotation_parses() {
        let program = parse_src("var f: (Int, Bool) => Int = g");
        let Program::Block(Expr {
            kind: ExprKind::Block { tail: Some(tail), .. },
            ..
        }) = program
        else {
            panic!("expected a bare block");
        };
        let ExprKind::Declaration { declared_type, .. } = &tail.kind else {
            panic!("expected declaration");
        };
        assert!(matches!(declared_type, Some(TypeExpr::Function(params, _)) if params.len() == 2));
    }

    #[test]
    fn every_non_end_token_is_consumed_on_success() {
        let tokens = tokenize("1 + 2 * (3 - 1)", "test").unwrap();
        let mut parser = Parser::new(tokens);
        parser.parse_program().expect("parse ok");
    }
}
