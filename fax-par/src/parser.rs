//! Hand-written recursive-descent parser with precedence climbing.

use crate::ast::{
    Expr, ExprKind, FunctionDefinition, NodeIdGen, Param, Program, TypeExpr,
};
use crate::error::ParseError;
use fax_lex::{Token, TokenKind};

/// Identifiers that function as keywords even though the lexer has no
/// keyword table of its own — recognition happens entirely here, by text.
mod kw {
    pub const VAR: &str = "var";
    pub const FUN: &str = "fun";
    pub const IF: &str = "if";
    pub const THEN: &str = "then";
    pub const ELSE: &str = "else";
    pub const WHILE: &str = "while";
    pub const DO: &str = "do";
    pub const RETURN: &str = "return";
    pub const BREAK: &str = "break";
    pub const CONTINUE: &str = "continue";
    pub const TRUE: &str = "true";
    pub const FALSE: &str = "false";
    pub const AND: &str = "and";
    pub const OR: &str = "or";
    pub const NOT: &str = "not";
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    ids: NodeIdGen,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            ids: NodeIdGen::default(),
        }
    }

    // ---- token stream primitives -----------------------------------

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn at_end(&self) -> bool {
        self.current().kind == TokenKind::End
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn is_identifier_text(&self, text: &str) -> bool {
        self.current().kind == TokenKind::Identifier && self.current().is_text(text)
    }

    fn is_operator_text(&self, text: &str) -> bool {
        self.current().kind == TokenKind::Operator && self.current().is_text(text)
    }

    fn is_punct_text(&self, text: &str) -> bool {
        self.current().kind == TokenKind::Punctuation && self.current().is_text(text)
    }

    fn expect_identifier_text(&mut self, text: &str) -> Result<Token, ParseError> {
        if self.is_identifier_text(text) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(&format!("'{text}'"), self.current()))
        }
    }

    fn expect_punct(&mut self, text: &str) -> Result<Token, ParseError> {
        if self.is_punct_text(text) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(&format!("'{text}'"), self.current()))
        }
    }

    // ---- entry point -------------------------------------------------

    /// Parses the whole token stream into a [`Program`], consuming every
    /// token except the trailing `End`.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        if self.is_identifier_text(kw::FUN) {
            let mut functions = Vec::new();
            while self.is_identifier_text(kw::FUN) {
                functions.push(self.parse_function_definition()?);
            }
            let location = self.current().location.clone();
            let (statements, tail) = self.parse_block_body()?;
            if !self.at_end() {
                return Err(ParseError::unexpected("end of input", self.current()));
            }
            let top_level_block = Box::new(Expr::new(
                self.ids.next(),
                location.clone(),
                ExprKind::Block { statements, tail },
            ));
            Ok(Program::Module {
                functions,
                top_level_block,
                location,
            })
        } else {
            let location = self.current().location.clone();
            let (statements, tail) = self.parse_block_body()?;
            if !self.at_end() {
                return Err(ParseError::unexpected("end of input", self.current()));
            }
            Ok(Program::Block(Expr::new(
                self.ids.next(),
                location,
                ExprKind::Block { statements, tail },
            )))
        }
    }

    fn parse_function_definition(&mut self) -> Result<FunctionDefinition, ParseError> {
        let start = self.expect_identifier_text(kw::FUN)?;
        let name = self.expect_plain_identifier()?;
        self.expect_punct("(")?;
        let mut params = Vec::new();
        if !self.is_punct_text(")") {
            loop {
                let param_loc = self.current().location.clone();
                let pname = self.expect_plain_identifier()?;
                self.expect_punct(":")?;
                let ty = self.parse_type_expr()?;
                params.push(Param {
                    name: pname,
                    ty,
                    location: param_loc,
                });
                if self.is_punct_text(",") {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect_punct(")")?;
        self.expect_punct(":")?;
        let result_type = self.parse_type_expr()?;
        let body = self.parse_braced_block()?;
        Ok(FunctionDefinition {
            id: self.ids.next(),
            name,
            params,
            result_type,
            body: Box::new(body),
            location: start.location,
        })
    }

    /// An identifier that is not one of this grammar's recognized keywords.
    fn expect_plain_identifier(&mut self) -> Result<String, ParseError> {
        if self.current().kind != TokenKind::Identifier {
            return Err(ParseError::unexpected("identifier", self.current()));
        }
        let text = self.current().text.clone();
        if is_keyword(&text) {
            return Err(ParseError::new(
                format!("'{text}' is a reserved word"),
                self.current().location.clone(),
            ));
        }
        self.advance();
        Ok(text)
    }

    // ---- type expressions ---------------------------------------------

    fn parse_type_expr(&mut self) -> Result<TypeExpr, ParseError> {
        if self.is_punct_text("(") {
            self.advance();
            let mut params = Vec::new();
            if !self.is_punct_text(")") {
                loop {
                    params.push(self.parse_type_expr()?);
                    if self.is_punct_text(",") {
                        self.advance();
                        continue;
                    }
                    break;
                }
            }
            self.expect_punct(")")?;
            self.expect_operator("=>")?;
            let result = self.parse_type_expr()?;
            Ok(TypeExpr::Function(params, Box::new(result)))
        } else if self.current().kind == TokenKind::Identifier {
            let name = self.advance().text;
            Ok(TypeExpr::Named(name))
        } else {
            Err(ParseError::unexpected("a type", self.current()))
        }
    }

    fn expect_operator(&mut self, text: &str) -> Result<Token, ParseError> {
        if self.is_operator_text(text) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(&format!("'{text}'"), self.current()))
        }
    }

    // ---- blocks ---------------------------------------------------------

    fn parse_braced_block(&mut self) -> Result<Expr, ParseError> {
        let open = self.expect_punct("{")?;
        let (statements, tail) = self.parse_block_body()?;
        self.expect_punct("}")?;
        Ok(Expr::new(
            self.ids.next(),
            open.location,
            ExprKind::Block { statements, tail },
        ))
    }

    /// Parses the statements and optional tail of a block, stopping at `}`
    /// or end-of-input without consuming either — the caller decides what
    /// a proper close looks like (a brace for nested blocks, end-of-input
    /// for the top-level unit). This is the trickiest production in the
    /// grammar: after each inner expression, the next token decides whether
    /// it was a statement, the block's tail, or an error.
    fn parse_block_body(&mut self) -> Result<(Vec<Expr>, Option<Box<Expr>>), ParseError> {
        let mut statements = Vec::new();
        loop {
            if self.is_punct_text("}") || self.at_end() {
                return Ok((statements, None));
            }

            let expr = self.parse_block_item()?;

            if self.is_punct_text(";") {
                self.advance();
                statements.push(expr);
                continue;
            }
            if self.is_punct_text("}") || self.at_end() {
                return Ok((statements, Some(Box::new(expr))));
            }
            if ends_with_implicit_close(&expr.kind) {
                statements.push(expr);
                continue;
            }
            return Err(ParseError::new(
                "result but no block end",
                self.current().location.clone(),
            ));
        }
    }

    /// One statement position inside a block: `var` declarations are only
    /// legal here, never as a nested sub-expression.
    fn parse_block_item(&mut self) -> Result<Expr, ParseError> {
        if self.is_identifier_text(kw::VAR) {
            self.parse_declaration()
        } else {
            self.parse_expression()
        }
    }

    fn parse_declaration(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect_identifier_text(kw::VAR)?;
        let name = self.expect_plain_identifier()?;
        let declared_type = if self.is_punct_text(":") {
            self.advance();
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        self.expect_operator("=")?;
        let value = self.parse_expression()?;
        Ok(Expr::new(
            self.ids.next(),
            start.location,
            ExprKind::Declaration {
                name,
                declared_type,
                value: Box::new(value),
            },
        ))
    }

    // ---- expressions: precedence climbing ------------------------------

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    /// Level 0: `=`, right-associative.
    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_or()?;
        if self.is_operator_text("=") {
            let op_tok = self.advance();
            let right = self.parse_assignment()?;
            return Ok(Expr::new(
                self.ids.next(),
                op_tok.location,
                ExprKind::BinaryOp {
                    left: Box::new(left),
                    op: "=".to_string(),
                    right: Box::new(right),
                },
            ));
        }
        Ok(left)
    }

    /// Level 1: `or`, left-associative.
    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.is_identifier_text(kw::OR) {
            let op_tok = self.advance();
            let right = self.parse_and()?;
            left = Expr::new(
                self.ids.next(),
                op_tok.location,
                ExprKind::BinaryOp {
                    left: Box::new(left),
                    op: "or".to_string(),
                    right: Box::new(right),
                },
            );
        }
        Ok(left)
    }

    /// Level 2: `and`, left-associative.
    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.is_identifier_text(kw::AND) {
            let op_tok = self.advance();
            let right = self.parse_equality()?;
            left = Expr::new(
                self.ids.next(),
                op_tok.location,
                ExprKind::BinaryOp {
                    left: Box::new(left),
                    op: "and".to_string(),
                    right: Box::new(right),
                },
            );
        }
        Ok(left)
    }

    /// Level 3: `==`, `!=`, left-associative.
    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc_binop(&["==", "!="], Self::parse_comparison)
    }

    /// Level 4: `<`, `<=`, `>`, `>=`, left-associative.
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc_binop(&["<", "<=", ">", ">="], Self::parse_additive)
    }

    /// Level 5: `+`, `-`, left-associative.
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc_binop(&["+", "-"], Self::parse_multiplicative)
    }

    /// Level 6: `*`, `/`, `%`, left-associative.
    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc_binop(&["*", "/", "%"], Self::parse_unary)
    }

    fn parse_left_assoc_binop(
        &mut self,
        ops: &[&str],
        mut next: impl FnMut(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let mut left = next(self)?;
        loop {
            let matched = ops
                .iter()
                .find(|op| self.is_operator_text(op))
                .copied();
            let Some(op) = matched else { break };
            let op_tok = self.advance();
            let right = next(self)?;
            left = Expr::new(
                self.ids.next(),
                op_tok.location,
                ExprKind::BinaryOp {
                    left: Box::new(left),
                    op: op.to_string(),
                    right: Box::new(right),
                },
            );
        }
        Ok(left)
    }

    /// Level 7 (prefix): unary `not`, unary `-`, right-associative.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.is_identifier_text(kw::NOT) || self.is_operator_text("-") {
            let op_tok = self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::new(
                self.ids.next(),
                op_tok.location,
                ExprKind::Unary {
                    op: op_tok.text,
                    expr: Box::new(operand),
                },
            ));
        }
        self.parse_postfix()
    }

    /// Level 8 (postfix): call chaining, left-associative.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_factor()?;
        loop {
            if self.is_punct_text("(") {
                let open = self.advance();
                let mut args = Vec::new();
                if !self.is_punct_text(")") {
                    loop {
                        args.push(self.parse_expression()?);
                        if self.is_punct_text(",") {
                            self.advance();
                            continue;
                        }
                        break;
                    }
                }
                self.expect_punct(")")?;
                expr = Expr::new(
                    self.ids.next(),
                    open.location,
                    ExprKind::FunctionCall {
                        callee: Box::new(expr),
                        args,
                    },
                );
                continue;
            }
            break;
        }
        self.reject_adjacent_primary(&expr)?;
        Ok(expr)
    }

    /// Rejects `a b` / `1 2` style juxtaposition the instant it occurs
    /// inside a sub-expression, where the block-level "result but no
    /// block end" check never runs.
    fn reject_adjacent_primary(&self, expr: &Expr) -> Result<(), ParseError> {
        let bare_primary = matches!(
            expr.kind,
            ExprKind::IntLiteral(_) | ExprKind::Identifier(_)
        );
        if !bare_primary {
            return Ok(());
        }
        let offending = match self.current().kind {
            TokenKind::IntLiteral => true,
            TokenKind::Identifier => !is_continuation_keyword(&self.current().text),
            _ => false,
        };
        if offending {
            return Err(ParseError::new(
                format!(
                    "unexpected {} immediately after expression",
                    self.current()
                ),
                self.current().location.clone(),
            ));
        }
        Ok(())
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::IntLiteral => {
                self.advance();
                let value = tok.text.parse::<u64>().map_err(|_| {
                    ParseError::new(
                        format!("integer literal '{}' out of range", tok.text),
                        tok.location.clone(),
                    )
                })?;
                Ok(Expr::new(
                    self.ids.next(),
                    tok.location,
                    ExprKind::IntLiteral(value),
                ))
            }
            TokenKind::Punctuation if tok.text == "(" => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_punct(")")?;
                Ok(inner)
            }
            TokenKind::Punctuation if tok.text == "{" => self.parse_braced_block(),
            TokenKind::Identifier => self.parse_identifier_led_factor(tok),
            _ => Err(ParseError::unexpected("an expression", &tok)),
        }
    }

    fn parse_identifier_led_factor(&mut self, tok: Token) -> Result<Expr, ParseError> {
        match tok.text.as_str() {
            kw::TRUE => {
                self.advance();
                Ok(Expr::new(self.ids.next(), tok.location, ExprKind::BoolLiteral(true)))
            }
            kw::FALSE => {
                self.advance();
                Ok(Expr::new(self.ids.next(), tok.location, ExprKind::BoolLiteral(false)))
            }
            kw::IF => self.parse_if(),
            kw::WHILE => self.parse_while(),
            kw::RETURN => {
                self.advance();
                let value = if self.can_start_expression() {
                    Some(Box::new(self.parse_expression()?))
                } else {
                    None
                };
                Ok(Expr::new(self.ids.next(), tok.location, ExprKind::Return(value)))
            }
            kw::BREAK => {
                self.advance();
                Ok(Expr::new(self.ids.next(), tok.location, ExprKind::Break))
            }
            kw::CONTINUE => {
                self.advance();
                Ok(Expr::new(self.ids.next(), tok.location, ExprKind::Continue))
            }
            kw::VAR | kw::FUN => Err(ParseError::new(
                format!("'{}' is not allowed here", tok.text),
                tok.location,
            )),
            _ => {
                self.advance();
                Ok(Expr::new(
                    self.ids.next(),
                    tok.location,
                    ExprKind::Identifier(tok.text),
                ))
            }
        }
    }

    fn can_start_expression(&self) -> bool {
        match self.current().kind {
            TokenKind::IntLiteral => true,
            TokenKind::Punctuation => self.is_punct_text("(") || self.is_punct_text("{"),
            TokenKind::Operator => self.is_operator_text("-"),
            TokenKind::Identifier => !matches!(
                self.current().text.as_str(),
                kw::THEN | kw::ELSE | kw::DO
            ),
            TokenKind::End => false,
        }
    }

    /// `then`/`else` bodies are always braced blocks. This is what makes
    /// `ends_with_implicit_close` a reliable test for "this expression
    /// already ended in `}`, no semicolon required" — a bare-expression
    /// `then`/`else`/`do` body is never legal.
    fn parse_if(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect_identifier_text(kw::IF)?;
        let condition = self.parse_expression()?;
        self.expect_identifier_text(kw::THEN)?;
        let then_branch = self.parse_braced_block()?;
        let else_branch = if self.is_identifier_text(kw::ELSE) {
            self.advance();
            Some(Box::new(self.parse_braced_block()?))
        } else {
            None
        };
        Ok(Expr::new(
            self.ids.next(),
            start.location,
            ExprKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch,
            },
        ))
    }

    fn parse_while(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect_identifier_text(kw::WHILE)?;
        let condition = self.parse_expression()?;
        self.expect_identifier_text(kw::DO)?;
        let body = self.parse_braced_block()?;
        Ok(Expr::new(
            self.ids.next(),
            start.location,
            ExprKind::While {
                condition: Box::new(condition),
                body: Box::new(body),
            },
        ))
    }
}

fn is_keyword(text: &str) -> bool {
    matches!(
        text,
        kw::VAR
            | kw::FUN
            | kw::IF
            | kw::THEN
            | kw::ELSE
            | kw::WHILE
            | kw::DO
            | kw::RETURN
            | kw::BREAK
            | kw::CONTINUE
            | kw::TRUE
            | kw::FALSE
            | kw::AND
            | kw::OR
            | kw::NOT
    )
}

/// `then`/`else`/`do` are the only identifiers allowed to immediately
/// follow a bare literal/identifier factor without an intervening operator
/// — they close off an `if`/`while`'s preceding expression.
fn is_continuation_keyword(text: &str) -> bool {
    matches!(text, kw::THEN | kw::ELSE | kw::DO)
}

fn ends_with_implicit_close(kind: &ExprKind) -> bool {
    matches!(kind, ExprKind::Block { .. } | ExprKind::If { .. } | ExprKind::While { .. })
}

/// Parses a complete token stream into a [`Program`].
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
    Parser::new(tokens).parse_program()
}
