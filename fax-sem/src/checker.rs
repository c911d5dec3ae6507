//! Type checker. Walks the untyped AST built by `fax-par` and produces a
//! `NodeId -> Type` side table rather than mutating the tree, per the
//! split documented on [`fax_par::ast::TypeExpr`].

use fax_par::{Expr, ExprKind, FunctionDefinition, NodeId, Param, Program, TypeExpr};
use fax_util::{SourceLocation, SymbolTable};
use rustc_hash::FxHashMap;

use crate::error::TypeError;
use crate::types::{FunctionSignature, Type};

/// `NodeId -> Type` for every expression node visited during checking.
#[derive(Default, Debug)]
pub struct TypeTable(FxHashMap<NodeId, Type>);

impl TypeTable {
    pub fn get(&self, id: NodeId) -> Option<&Type> {
        self.0.get(&id)
    }

    fn record(&mut self, id: NodeId, ty: Type) -> Type {
        self.0.insert(id, ty.clone());
        ty
    }
}

#[derive(Default, Debug)]
pub struct CheckResult {
    pub types: TypeTable,
    pub function_signatures: FxHashMap<String, FunctionSignature>,
}

/// Parameter and result types for the three runtime entry points, which
/// are implemented externally (`fax-runtime`) but still need to type-check
/// like any other callable.
fn builtin_signatures() -> Vec<(&'static str, FunctionSignature)> {
    vec![
        (
            "print_int",
            FunctionSignature {
                param_types: vec![Type::Int],
                result_type: Type::Unit,
            },
        ),
        (
            "print_bool",
            FunctionSignature {
                param_types: vec![Type::Bool],
                result_type: Type::Unit,
            },
        ),
        (
            "read_int",
            FunctionSignature {
                param_types: vec![],
                result_type: Type::Int,
            },
        ),
    ]
}

fn resolve_type_expr(expr: &TypeExpr, location: &SourceLocation) -> Result<Type, TypeError> {
    match expr {
        TypeExpr::Named(name) => match name.as_str() {
            "Int" => Ok(Type::Int),
            "Bool" => Ok(Type::Bool),
            "Unit" => Ok(Type::Unit),
            other => Err(TypeError::new(
                format!("unknown type name '{other}'"),
                location.clone(),
            )),
        },
        TypeExpr::Function(params, result) => {
            let param_types = params
                .iter()
                .map(|p| resolve_type_expr(p, location))
                .collect::<Result<Vec<_>, _>>()?;
            let result_type = resolve_type_expr(result, location)?;
            Ok(Type::Fun(param_types, Box::new(result_type)))
        }
    }
}

/// Threads the lexically-scoped `Int`/`Bool`/`Unit`/`Fun` environment plus
/// the declared return type of the function currently being checked (if
/// any) through the recursive walk.
struct Checker {
    scopes: SymbolTable<Type>,
    types: TypeTable,
    function_signatures: FxHashMap<String, FunctionSignature>,
    current_return_type: Option<Type>,
}

pub fn check_program(program: &Program) -> Result<CheckResult, TypeError> {
    let mut scopes = SymbolTable::new();
    let mut function_signatures = FxHashMap::default();
    for (name, sig) in builtin_signatures() {
        scopes.insert(name.to_string(), sig.as_type());
        function_signatures.insert(name.to_string(), sig);
    }

    let mut checker = Checker {
        scopes,
        types: TypeTable::default(),
        function_signatures,
        current_return_type: None,
    };

    match program {
        Program::Block(body) => {
            checker.check_expr(body)?;
        }
        Program::Module {
            functions,
            top_level_block,
            ..
        } => {
            checker.register_function_signatures(functions)?;
            checker.check_function_bodies(functions)?;
            checker.check_expr(top_level_block)?;
        }
    }

    Ok(CheckResult {
        types: checker.types,
        function_signatures: checker.function_signatures,
    })
}

impl Checker {
    /// Pass 1: every function's signature goes into the root scope before
    /// any body is checked, so functions may call each other regardless of
    /// definition order (mutual recursion).
    fn register_function_signatures(
        &mut self,
        functions: &[FunctionDefinition],
    ) -> Result<(), TypeError> {
        for function in functions {
            if self.scopes.is_bound_locally(&function.name) {
                return Err(TypeError::new(
                    format!("function '{}' is already defined", function.name),
                    function.location.clone(),
                ));
            }
            let param_types = function
                .params
                .iter()
                .map(|p| resolve_type_expr(&p.ty, &p.location))
                .collect::<Result<Vec<_>, _>>()?;
            let result_type = resolve_type_expr(&function.result_type, &function.location)?;
            let signature = FunctionSignature {
                param_types,
                result_type,
            };
            self.scopes.insert(function.name.clone(), signature.as_type());
            self.function_signatures
                .insert(function.name.clone(), signature);
        }
        Ok(())
    }

    /// Pass 2: check each body with its parameters bound and the function's
    /// declared return type available for `Return` nodes.
    fn check_function_bodies(&mut self, functions: &[FunctionDefinition]) -> Result<(), TypeError> {
        for function in functions {
            let signature = self.function_signatures[&function.name].clone();
            self.scopes.push_scope();
            for (param, ty) in function.params.iter().zip(signature.param_types.iter()) {
                self.bind_param(param, ty.clone())?;
            }

            let result_type = signature.result_type.clone();
            let previous = self.current_return_type.replace(result_type.clone());
            let body_type = self.check_expr(&function.body)?;
            self.current_return_type = previous;

            if body_type != Type::Unit && body_type != result_type {
                return Err(TypeError::new(
                    format!(
                        "function '{}' declares return type {} but its body has type {}",
                        function.name, result_type, body_type
                    ),
                    function.location.clone(),
                ));
            }
            self.scopes.pop_scope();
        }
        Ok(())
    }

    fn bind_param(&mut self, param: &Param, ty: Type) -> Result<(), TypeError> {
        if self.scopes.is_bound_locally(&param.name) {
            return Err(TypeError::new(
                format!("duplicate parameter '{}'", param.name),
                param.location.clone(),
            ));
        }
        self.scopes.insert(param.name.clone(), ty);
        Ok(())
    }

    fn check_expr(&mut self, expr: &Expr) -> Result<Type, TypeError> {
        let ty = match &expr.kind {
            ExprKind::IntLiteral(_) => Type::Int,
            ExprKind::BoolLiteral(_) => Type::Bool,
            ExprKind::Identifier(name) => self.scopes.lookup(name).cloned().ok_or_else(|| {
                TypeError::new(format!("undefined name '{name}'"), expr.location.clone())
            })?,
            ExprKind::Unary { op, expr: inner } => self.check_unary(op, inner, &expr.location)?,
            ExprKind::BinaryOp { left, op, right } => {
                self.check_binary(op, left, right, &expr.location)?
            }
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.check_if(condition, then_branch, else_branch.as_deref())?,
            ExprKind::While { condition, body } => self.check_while(condition, body)?,
            ExprKind::Block { statements, tail } => self.check_block(statements, tail.as_deref())?,
            ExprKind::Declaration {
                name,
                declared_type,
                value,
            } => self.check_declaration(name, declared_type.as_ref(), value, &expr.location)?,
            ExprKind::FunctionCall { callee, args } => {
                self.check_call(callee, args, &expr.location)?
            }
            ExprKind::Return(value) => self.check_return(value.as_deref(), &expr.location)?,
            ExprKind::Break | ExprKind::Continue => Type::Unit,
        };
        Ok(self.types.record(expr.id, ty))
    }

    /// `not` requires and produces `Bool`; `-` requires and produces `Int`.
    /// The asm lowering (`xorq $1` / `negq`) only makes sense under these
    /// operand types.
    fn check_unary(
        &mut self,
        op: &str,
        inner: &Expr,
        location: &SourceLocation,
    ) -> Result<Type, TypeError> {
        let inner_ty = self.check_expr(inner)?;
        match op {
            "not" if inner_ty == Type::Bool => Ok(Type::Bool),
            "-" if inner_ty == Type::Int => Ok(Type::Int),
            "not" | "-" => Err(TypeError::new(
                format!("operator '{op}' does not apply to {inner_ty}"),
                location.clone(),
            )),
            other => Err(TypeError::new(
                format!("unknown unary operator '{other}'"),
                location.clone(),
            )),
        }
    }

    fn check_binary(
        &mut self,
        op: &str,
        left: &Expr,
        right: &Expr,
        location: &SourceLocation,
    ) -> Result<Type, TypeError> {
        if op == "=" {
            let ExprKind::Identifier(name) = &left.kind else {
                return Err(TypeError::new(
                    "left side of an assignment must be a name",
                    location.clone(),
                ));
            };
            let target_ty = self.scopes.lookup(name).cloned().ok_or_else(|| {
                TypeError::new(format!("undefined name '{name}'"), left.location.clone())
            })?;
            let value_ty = self.check_expr(right)?;
            self.types.record(left.id, target_ty.clone());
            if value_ty != target_ty {
                return Err(TypeError::new(
                    format!("cannot assign {value_ty} to '{name}' of type {target_ty}"),
                    location.clone(),
                ));
            }
            return Ok(target_ty);
        }

        let left_ty = self.check_expr(left)?;
        let right_ty = self.check_expr(right)?;
        match op {
            "+" | "-" | "*" | "/" | "%" => {
                expect_both(op, &left_ty, &right_ty, Type::Int, location)?;
                Ok(Type::Int)
            }
            "<" | "<=" | ">" | ">=" => {
                expect_both(op, &left_ty, &right_ty, Type::Int, location)?;
                Ok(Type::Bool)
            }
            "==" | "!=" => {
                if left_ty != right_ty {
                    return Err(TypeError::new(
                        format!("cannot compare {left_ty} with {right_ty}"),
                        location.clone(),
                    ));
                }
                Ok(Type::Bool)
            }
            "and" | "or" => {
                expect_both(op, &left_ty, &right_ty, Type::Bool, location)?;
                Ok(Type::Bool)
            }
            other => Err(TypeError::new(
                format!("unknown binary operator '{other}'"),
                location.clone(),
            )),
        }
    }

    fn check_if(
        &mut self,
        condition: &Expr,
        then_branch: &Expr,
        else_branch: Option<&Expr>,
    ) -> Result<Type, TypeError> {
        let cond_ty = self.check_expr(condition)?;
        if cond_ty != Type::Bool {
            return Err(TypeError::new(
                format!("if condition must be Bool, found {cond_ty}"),
                condition.location.clone(),
            ));
        }
        let then_ty = self.check_expr(then_branch)?;
        // The else branch is checked for its own internal soundness, but it
        // is not required to agree with the then branch: with no else an
        // if's result is Unit on the path that skips it, so requiring
        // agreement would reject the common `if cond then { ... }` shape
        // used as a bare statement.
        if let Some(else_branch) = else_branch {
            self.check_expr(else_branch)?;
        }
        Ok(then_ty)
    }

    fn check_while(&mut self, condition: &Expr, body: &Expr) -> Result<Type, TypeError> {
        let cond_ty = self.check_expr(condition)?;
        if cond_ty != Type::Bool {
            return Err(TypeError::new(
                format!("while condition must be Bool, found {cond_ty}"),
                condition.location.clone(),
            ));
        }
        self.check_expr(body)?;
        Ok(Type::Unit)
    }

    fn check_block(
        &mut self,
        statements: &[Expr],
        tail: Option<&Expr>,
    ) -> Result<Type, TypeError> {
        self.scopes.push_scope();
        let result = (|| {
            for statement in statements {
                self.check_expr(statement)?;
            }
            match tail {
                Some(tail) => self.check_expr(tail),
                None => Ok(Type::Unit),
            }
        })();
        self.scopes.pop_scope();
        result
    }

    fn check_declaration(
        &mut self,
        name: &str,
        declared_type: Option<&TypeExpr>,
        value: &Expr,
        location: &SourceLocation,
    ) -> Result<Type, TypeError> {
        if self.scopes.is_bound_locally(name) {
            return Err(TypeError::new(
                format!("'{name}' is already declared in this scope"),
                location.clone(),
            ));
        }
        let value_ty = self.check_expr(value)?;
        if let Some(declared) = declared_type {
            let expected = resolve_type_expr(declared, location)?;
            if expected != value_ty {
                return Err(TypeError::new(
                    format!("'{name}' declared as {expected} but initialized with {value_ty}"),
                    location.clone(),
                ));
            }
        }
        self.scopes.insert(name.to_string(), value_ty);
        Ok(Type::Unit)
    }

    fn check_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        location: &SourceLocation,
    ) -> Result<Type, TypeError> {
        let callee_ty = self.check_expr(callee)?;
        let Type::Fun(param_types, result_type) = callee_ty else {
            return Err(TypeError::new(
                format!("cannot call a value of type {callee_ty}"),
                location.clone(),
            ));
        };
        if args.len() != param_types.len() {
            return Err(TypeError::new(
                format!(
                    "expected {} argument(s), found {}",
                    param_types.len(),
                    args.len()
                ),
                location.clone(),
            ));
        }
        for (arg, expected) in args.iter().zip(param_types.iter()) {
            let arg_ty = self.check_expr(arg)?;
            if &arg_ty != expected {
                return Err(TypeError::new(
                    format!("expected argument of type {expected}, found {arg_ty}"),
                    arg.location.clone(),
                ));
            }
        }
        Ok(*result_type)
    }

    fn check_return(
        &mut self,
        value: Option<&Expr>,
        location: &SourceLocation,
    ) -> Result<Type, TypeError> {
        let value_ty = match value {
            Some(value) => self.check_expr(value)?,
            None => Type::Unit,
        };
        // A `return` outside any function is not itself a type error here;
        // `fax-ir` rejects it once it is clear no enclosing function exists
        // to return to.
        if let Some(expected) = &self.current_return_type {
            if &value_ty != expected {
                return Err(TypeError::new(
                    format!("cannot return {value_ty} from a function declared to return {expected}"),
                    location.clone(),
                ));
            }
        }
        Ok(Type::Unit)
    }
}

fn expect_both(
    op: &str,
    left: &Type,
    right: &Type,
    expected: Type,
    location: &SourceLocation,
) -> Result<(), TypeError> {
    if *left != expected || *right != expected {
        return Err(TypeError::new(
            format!("operator '{op}' expects {expected}, found {left} and {right}"),
            location.clone(),
        ));
    }
    Ok(())
}
