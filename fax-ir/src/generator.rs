//! AST + type table -> linear IR.

use fax_par::{Expr, ExprKind, FunctionDefinition, Program};
use fax_sem::{CheckResult, Type, TypeTable};
use fax_util::{SourceLocation, SymbolTable};
use indexmap::IndexMap;

use crate::error::IrError;
use crate::instr::{FunctionIr, Instruction, IrProgram, IrVar, Label, MAIN};

/// Unit-typed expressions still need *some* IR variable to stand in for
/// "this produced no value worth naming" so every `check_expr`-equivalent
/// call can return one uniformly. It's registered in every function's
/// `var_types` as `Type::Unit` up front (see `new_generator`) so it's a
/// well-typed operand wherever it's copied or read, even though the type
/// checker already guarantees a `Unit` value never flows into an operator,
/// a `print_*` call, or an assignment's right-hand side.
const UNIT_PLACEHOLDER: &str = "_unit";

struct Generator<'a> {
    types: &'a TypeTable,
    scopes: SymbolTable<IrVar>,
    current: FunctionIr,
    next_var: u32,
    next_label: u32,
    loop_stack: Vec<(Label, Label)>,
    in_function: bool,
}

const OPERATOR_NAMES: &[&str] = &[
    "+", "-", "*", "/", "%", "==", "!=", "<", "<=", ">", ">=", "and", "or",
];

pub fn generate_program(program: &Program, check: &CheckResult) -> Result<IrProgram, IrError> {
    let types = &check.types;
    let mut functions = IndexMap::new();

    match program {
        Program::Block(body) => {
            functions.insert(MAIN.to_string(), generate_main(body, types)?);
        }
        Program::Module {
            functions: defs,
            top_level_block,
            ..
        } => {
            for def in defs {
                let signature = &check.function_signatures[&def.name];
                let ir = generate_function(def, types, &signature.param_types)?;
                functions.insert(def.name.clone(), ir);
            }
            functions.insert(MAIN.to_string(), generate_main(top_level_block, types)?);
        }
    }

    Ok(IrProgram { functions })
}

fn new_generator(types: &TypeTable) -> Generator<'_> {
    let mut scopes = SymbolTable::new();
    for op in OPERATOR_NAMES {
        scopes.insert(op.to_string(), op.to_string());
    }
    let mut current = FunctionIr::default();
    current
        .var_types
        .insert(UNIT_PLACEHOLDER.to_string(), Type::Unit);
    Generator {
        types,
        scopes,
        current,
        next_var: 0,
        next_label: 0,
        loop_stack: Vec::new(),
        in_function: false,
    }
}

fn generate_main(body: &Expr, types: &TypeTable) -> Result<FunctionIr, IrError> {
    let mut gen = new_generator(types);
    let result = gen.generate_expr(body)?;
    if let Some(result_ty) = gen.current.var_types.get(&result).cloned() {
        match result_ty {
            Type::Int => {
                let discard = gen.fresh_var(Type::Unit);
                gen.emit(Instruction::Call(
                    "print_int".to_string(),
                    vec![result],
                    discard,
                ));
            }
            Type::Bool => {
                let discard = gen.fresh_var(Type::Unit);
                gen.emit(Instruction::Call(
                    "print_bool".to_string(),
                    vec![result],
                    discard,
                ));
            }
            _ => {}
        }
    }
    Ok(gen.current)
}

fn generate_function(
    def: &FunctionDefinition,
    types: &TypeTable,
    param_types: &[Type],
) -> Result<FunctionIr, IrError> {
    let mut gen = new_generator(types);
    gen.in_function = true;
    gen.current.param_count = def.params.len();

    for (index, (param, ty)) in def.params.iter().zip(param_types.iter()).enumerate() {
        let param_var = gen.fresh_var(ty.clone());
        gen.scopes.insert(param.name.clone(), param_var.clone());
        gen.emit(Instruction::LoadParam(index, param_var));
    }

    gen.generate_expr(&def.body)?;
    Ok(gen.current)
}

impl<'a> Generator<'a> {
    fn fresh_var(&mut self, ty: Type) -> IrVar {
        let name = format!("x{}", self.next_var);
        self.next_var += 1;
        self.current.var_types.insert(name.clone(), ty);
        name
    }

    fn fresh_label(&mut self) -> Label {
        let name = format!("L{}", self.next_label);
        self.next_label += 1;
        name
    }

    fn emit(&mut self, instruction: Instruction) {
        self.current.instructions.push(instruction);
    }

    fn type_of(&self, expr: &Expr) -> Type {
        self.types.get(expr.id).cloned().unwrap_or(Type::Unit)
    }

    fn generate_expr(&mut self, expr: &Expr) -> Result<IrVar, IrError> {
        match &expr.kind {
            ExprKind::IntLiteral(value) => {
                let v = self.fresh_var(Type::Int);
                self.emit(Instruction::LoadIntConst(*value, v.clone()));
                Ok(v)
            }
            ExprKind::BoolLiteral(value) => {
                let v = self.fresh_var(Type::Bool);
                self.emit(Instruction::LoadBoolConst(*value, v.clone()));
                Ok(v)
            }
            ExprKind::Identifier(name) => {
                self.scopes
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| IrError::UndefinedIdentifier {
                        name: name.clone(),
                        location: expr.location.clone(),
                    })
            }
            ExprKind::Unary { op, expr: inner } => self.generate_unary(op, inner, expr),
            ExprKind::BinaryOp { left, op, right } => self.generate_binary(op, left, right, expr),
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.generate_if(condition, then_branch, else_branch.as_deref(), expr),
            ExprKind::While { condition, body } => self.generate_while(condition, body),
            ExprKind::Block { statements, tail } => {
                self.generate_block(statements, tail.as_deref())
            }
            ExprKind::Declaration { name, value, .. } => self.generate_declaration(name, value),
            ExprKind::FunctionCall { callee, args } => self.generate_call(callee, args, expr),
            ExprKind::Return(value) => self.generate_return(value.as_deref(), &expr.location),
            ExprKind::Break => self.generate_break(&expr.location),
            ExprKind::Continue => self.generate_continue(&expr.location),
        }
    }

    fn generate_unary(&mut self, op: &str, inner: &Expr, expr: &Expr) -> Result<IrVar, IrError> {
        let v = self.generate_expr(inner)?;
        let dst = self.fresh_var(self.type_of(expr));
        self.emit(Instruction::Call(
            format!("unary_{op}"),
            vec![v],
            dst.clone(),
        ));
        Ok(dst)
    }

    fn generate_binary(
        &mut self,
        op: &str,
        left: &Expr,
        right: &Expr,
        expr: &Expr,
    ) -> Result<IrVar, IrError> {
        if op == "=" {
            let rhs = self.generate_expr(right)?;
            let ExprKind::Identifier(name) = &left.kind else {
                // fax-sem already rejects non-identifier assignment targets.
                return Err(IrError::UndefinedIdentifier {
                    name: String::new(),
                    location: left.location.clone(),
                });
            };
            let lhs_var =
                self.scopes
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| IrError::UndefinedIdentifier {
                        name: name.clone(),
                        location: left.location.clone(),
                    })?;
            self.emit(Instruction::Copy(rhs, lhs_var.clone()));
            return Ok(lhs_var);
        }

        if op == "and" {
            return self.generate_short_circuit(true, left, right);
        }
        if op == "or" {
            return self.generate_short_circuit(false, left, right);
        }

        let l = self.generate_expr(left)?;
        let r = self.generate_expr(right)?;
        let dst = self.fresh_var(self.type_of(expr));
        let op_name = self
            .scopes
            .lookup(op)
            .cloned()
            .unwrap_or_else(|| op.to_string());
        self.emit(Instruction::Call(op_name, vec![l, r], dst.clone()));
        Ok(dst)
    }

    /// `is_and == true` lowers `and` (short-circuits to `false`);
    /// `is_and == false` lowers `or` (short-circuits to `true`).
    fn generate_short_circuit(
        &mut self,
        is_and: bool,
        left: &Expr,
        right: &Expr,
    ) -> Result<IrVar, IrError> {
        let l = self.generate_expr(left)?;
        let res = self.fresh_var(Type::Bool);
        let rhs_label = self.fresh_label();
        let short_label = self.fresh_label();
        let end_label = self.fresh_label();

        if is_and {
            self.emit(Instruction::CondJump(
                l,
                rhs_label.clone(),
                short_label.clone(),
            ));
        } else {
            self.emit(Instruction::CondJump(
                l,
                short_label.clone(),
                rhs_label.clone(),
            ));
        }

        if !is_and {
            self.emit(Instruction::Label(short_label.clone()));
            self.emit(Instruction::LoadBoolConst(true, res.clone()));
            self.emit(Instruction::Jump(end_label.clone()));
            self.emit(Instruction::Label(rhs_label));
            let r = self.generate_expr(right)?;
            self.emit(Instruction::Copy(r, res.clone()));
            self.emit(Instruction::Label(end_label));
        } else {
            self.emit(Instruction::Label(rhs_label));
            let r = self.generate_expr(right)?;
            self.emit(Instruction::Copy(r, res.clone()));
            self.emit(Instruction::Jump(end_label.clone()));
            self.emit(Instruction::Label(short_label));
            self.emit(Instruction::LoadBoolConst(false, res.clone()));
            self.emit(Instruction::Label(end_label));
        }

        Ok(res)
    }

    fn generate_if(
        &mut self,
        condition: &Expr,
        then_branch: &Expr,
        else_branch: Option<&Expr>,
        expr: &Expr,
    ) -> Result<IrVar, IrError> {
        let cond = self.generate_expr(condition)?;
        let then_label = self.fresh_label();
        let end_label = self.fresh_label();

        match else_branch {
            None => {
                self.emit(Instruction::CondJump(
                    cond,
                    then_label.clone(),
                    end_label.clone(),
                ));
                self.emit(Instruction::Label(then_label));
                self.generate_expr(then_branch)?;
                self.emit(Instruction::Label(end_label));
                Ok(self.unit_var())
            }
            Some(else_branch) => {
                let else_label = self.fresh_label();
                self.emit(Instruction::CondJump(
                    cond,
                    then_label.clone(),
                    else_label.clone(),
                ));
                let result = self.fresh_var(self.type_of(expr));
                self.emit(Instruction::Label(then_label));
                let then_val = self.generate_expr(then_branch)?;
                self.emit(Instruction::Copy(then_val, result.clone()));
                self.emit(Instruction::Jump(end_label.clone()));
                self.emit(Instruction::Label(else_label));
                let else_val = self.generate_expr(else_branch)?;
                self.emit(Instruction::Copy(else_val, result.clone()));
                self.emit(Instruction::Label(end_label));
                Ok(result)
            }
        }
    }

    fn generate_while(&mut self, condition: &Expr, body: &Expr) -> Result<IrVar, IrError> {
        let start_label = self.fresh_label();
        let body_label = self.fresh_label();
        let end_label = self.fresh_label();

        self.emit(Instruction::Label(start_label.clone()));
        let cond = self.generate_expr(condition)?;
        self.emit(Instruction::CondJump(
            cond,
            body_label.clone(),
            end_label.clone(),
        ));
        self.emit(Instruction::Label(body_label));

        self.loop_stack.push((start_label.clone(), end_label.clone()));
        self.generate_expr(body)?;
        self.loop_stack.pop();

        self.emit(Instruction::Jump(start_label));
        self.emit(Instruction::Label(end_label));
        Ok(self.unit_var())
    }

    fn generate_block(
        &mut self,
        statements: &[Expr],
        tail: Option<&Expr>,
    ) -> Result<IrVar, IrError> {
        self.scopes.push_scope();
        let result = (|| {
            for statement in statements {
                self.generate_expr(statement)?;
            }
            match tail {
                Some(tail) => self.generate_expr(tail),
                None => Ok(self.unit_var()),
            }
        })();
        self.scopes.pop_scope();
        result
    }

    fn generate_declaration(&mut self, name: &str, value: &Expr) -> Result<IrVar, IrError> {
        let v = self.generate_expr(value)?;
        let d = self.fresh_var(self.type_of(value));
        self.scopes.insert(name.to_string(), d.clone());
        self.emit(Instruction::Copy(v, d.clone()));
        Ok(d)
    }

    fn generate_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        expr: &Expr,
    ) -> Result<IrVar, IrError> {
        let ExprKind::Identifier(name) = &callee.kind else {
            return Err(IrError::UnsupportedCallTarget {
                location: callee.location.clone(),
            });
        };
        let mut arg_vars = Vec::with_capacity(args.len());
        for arg in args {
            arg_vars.push(self.generate_expr(arg)?);
        }
        let dst = self.fresh_var(self.type_of(expr));
        self.emit(Instruction::Call(name.clone(), arg_vars, dst.clone()));
        Ok(dst)
    }

    fn generate_return(
        &mut self,
        value: Option<&Expr>,
        location: &SourceLocation,
    ) -> Result<IrVar, IrError> {
        if !self.in_function {
            return Err(IrError::ReturnOutsideFunction {
                location: location.clone(),
            });
        }
        let value = match value {
            Some(value) => Some(self.generate_expr(value)?),
            None => None,
        };
        self.emit(Instruction::Return(value));
        Ok(self.unit_var())
    }

    fn generate_break(&mut self, location: &SourceLocation) -> Result<IrVar, IrError> {
        let (_, end_label) = self
            .loop_stack
            .last()
            .cloned()
            .ok_or_else(|| IrError::BreakOutsideLoop {
                location: location.clone(),
            })?;
        self.emit(Instruction::Jump(end_label));
        Ok(self.unit_var())
    }

    fn generate_continue(&mut self, location: &SourceLocation) -> Result<IrVar, IrError> {
        let (start_label, _) = self
            .loop_stack
            .last()
            .cloned()
            .ok_or_else(|| IrError::ContinueOutsideLoop {
                location: location.clone(),
            })?;
        self.emit(Instruction::Jump(start_label));
        Ok(self.unit_var())
    }

    fn unit_var(&self) -> IrVar {
        UNIT_PLACEHOLDER.to_string()
    }
}
