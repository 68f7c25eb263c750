//! Single-traversal type checker.
//!
//! For each node, computes its resolved type and validates the rules in spec.md §4.3, producing
//! a fresh fully-annotated tree (`Program<ResolvedType>`) instead of mutating the parser's tree
//! in place. The final [`Context`] (after all top-level commands have been processed) is handed
//! back to the code generators, who need it to look up struct layouts and function signatures
//! while lowering.

pub mod context;

use context::{Context, NameInfo};

use crate::error::{CompileError, CompileResult};
use crate::parser::ast::{BinOp, Binding, Cmd, Expr, LValue, Program, ResolvedType, Stmt, Type, UnOp};

pub struct TypeChecker {
    pub ctx: Context,
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            ctx: Context::with_prelude(),
        }
    }

    pub fn check_program(&mut self, program: &Program) -> CompileResult<Program<ResolvedType>> {
        let mut cmds = Vec::with_capacity(program.cmds.len());
        for cmd in &program.cmds {
            cmds.push(self.check_cmd(cmd)?);
        }
        Ok(Program::new(cmds))
    }

    fn resolve_type(&self, ty: &Type, offset: usize) -> CompileResult<ResolvedType> {
        match ty {
            Type::Int => Ok(ResolvedType::Int),
            Type::Bool => Ok(ResolvedType::Bool),
            Type::Float => Ok(ResolvedType::Float),
            Type::Void => Ok(ResolvedType::Void),
            Type::Struct(name) => {
                if self.ctx.lookup_struct(name).is_some() {
                    Ok(ResolvedType::Struct(name.clone()))
                } else {
                    Err(CompileError::new(format!("Undeclared struct '{name}'"), offset))
                }
            }
            Type::Array { element, rank } => {
                Ok(ResolvedType::array(self.resolve_type(element, offset)?, *rank))
            }
        }
    }

    fn declare_fresh(&mut self, name: &str, offset: usize) -> CompileResult<()> {
        if self.ctx.declared_in_current_scope(name) {
            return Err(CompileError::new(format!("Redeclaration of '{name}'"), offset));
        }
        Ok(())
    }

    fn bind_lvalue(&mut self, lvalue: &LValue, ty: ResolvedType) -> CompileResult<()> {
        self.declare_fresh(lvalue.name(), lvalue.offset())?;
        self.ctx.add(lvalue.name().to_string(), NameInfo::Value(ty));
        for index in lvalue.indices() {
            self.declare_fresh(index, lvalue.offset())?;
            self.ctx.add(index.clone(), NameInfo::Value(ResolvedType::Int));
        }
        Ok(())
    }

    // ---- Commands -----------------------------------------------------

    fn check_cmd(&mut self, cmd: &Cmd) -> CompileResult<Cmd<ResolvedType>> {
        match cmd {
            Cmd::Read { file, lvalue, offset } => {
                if let LValue::Array { indices, .. } = lvalue {
                    if indices.len() != 2 {
                        return Err(CompileError::new(
                            "Read image lvalue must have rank 2",
                            *offset,
                        ));
                    }
                }
                let array_ty = ResolvedType::array(ResolvedType::Struct("rgba".to_string()), 2);
                self.bind_lvalue(lvalue, array_ty)?;
                Ok(Cmd::Read {
                    file: file.clone(),
                    lvalue: lvalue.clone(),
                    offset: *offset,
                })
            }
            Cmd::Write { expr, file, offset } => {
                let expr = self.check_expr(expr)?;
                let expected = ResolvedType::array(ResolvedType::Struct("rgba".to_string()), 2);
                if *expr.info() != expected {
                    return Err(CompileError::new(
                        "Write image requires an array of rgba pixels",
                        *offset,
                    ));
                }
                Ok(Cmd::Write {
                    expr,
                    file: file.clone(),
                    offset: *offset,
                })
            }
            Cmd::Let { lvalue, expr, offset } => {
                let expr = self.check_expr(expr)?;
                match lvalue {
                    LValue::Var { .. } => {
                        self.bind_lvalue(lvalue, expr.info().clone())?;
                    }
                    LValue::Array { indices, .. } => {
                        let rank = expr.info().rank().ok_or_else(|| {
                            CompileError::new("Let binding to an array lvalue requires an array expression", *offset)
                        })?;
                        if rank != indices.len() {
                            return Err(CompileError::new(
                                format!("Wrong rank for array let binding: expected {}, got {rank}", indices.len()),
                                *offset,
                            ));
                        }
                        self.bind_lvalue(lvalue, expr.info().clone())?;
                    }
                }
                Ok(Cmd::Let {
                    lvalue: lvalue.clone(),
                    expr,
                    offset: *offset,
                })
            }
            Cmd::Assert { expr, message, offset } => {
                let expr = self.check_expr(expr)?;
                if *expr.info() != ResolvedType::Bool {
                    return Err(CompileError::new("Assert condition must be boolean", *offset));
                }
                Ok(Cmd::Assert {
                    expr,
                    message: message.clone(),
                    offset: *offset,
                })
            }
            Cmd::Print { message, offset } => Ok(Cmd::Print {
                message: message.clone(),
                offset: *offset,
            }),
            Cmd::Show { expr, offset } => {
                let expr = self.check_expr(expr)?;
                Ok(Cmd::Show { expr, offset: *offset })
            }
            Cmd::Time { cmd, offset } => {
                let cmd = self.check_cmd(cmd)?;
                Ok(Cmd::Time {
                    cmd: Box::new(cmd),
                    offset: *offset,
                })
            }
            Cmd::Fn {
                name,
                params,
                ret,
                body,
                offset,
            } => self.check_fn_cmd(name, params, ret, body, *offset),
            Cmd::Struct { name, fields, offset } => self.check_struct_cmd(name, fields, *offset),
        }
    }

    fn check_fn_cmd(
        &mut self,
        name: &str,
        params: &[Binding],
        ret: &Type,
        body: &[Stmt],
        offset: usize,
    ) -> CompileResult<Cmd<ResolvedType>> {
        self.declare_fresh(name, offset)?;

        let mut param_types = Vec::with_capacity(params.len());
        for param in params {
            param_types.push(self.resolve_type(&param.ty, offset)?);
        }
        let ret_ty = self.resolve_type(ret, offset)?;

        // Bound before the body is checked so recursive calls resolve.
        self.ctx.add(
            name.to_string(),
            NameInfo::Fn {
                params: param_types.clone(),
                ret: ret_ty.clone(),
            },
        );

        self.ctx.push_scope();
        for (param, ty) in params.iter().zip(param_types.iter()) {
            if let Err(e) = self.bind_lvalue(&param.lvalue, ty.clone()) {
                self.ctx.pop_scope();
                return Err(e);
            }
        }

        let mut checked_body = Vec::with_capacity(body.len());
        let mut has_return = false;
        for stmt in body {
            match self.check_stmt(stmt, &ret_ty) {
                Ok(checked) => {
                    if matches!(checked, Stmt::Return { .. }) {
                        has_return = true;
                    }
                    checked_body.push(checked);
                }
                Err(e) => {
                    self.ctx.pop_scope();
                    return Err(e);
                }
            }
        }
        self.ctx.pop_scope();

        if ret_ty != ResolvedType::Void && !has_return {
            return Err(CompileError::new(
                format!("Function '{name}' must contain a return statement"),
                offset,
            ));
        }

        Ok(Cmd::Fn {
            name: name.to_string(),
            params: params.to_vec(),
            ret: ret.clone(),
            body: checked_body,
            offset,
        })
    }

    fn check_struct_cmd(
        &mut self,
        name: &str,
        fields: &[(String, Type)],
        offset: usize,
    ) -> CompileResult<Cmd<ResolvedType>> {
        self.declare_fresh(name, offset)
            .map_err(|_| CompileError::new(format!("Redeclaration of struct '{name}'"), offset))?;

        let mut seen = std::collections::HashSet::new();
        let mut resolved_fields = Vec::with_capacity(fields.len());
        for (field_name, ty) in fields {
            if !seen.insert(field_name.clone()) {
                return Err(CompileError::new("Redeclaration of struct field", offset));
            }
            resolved_fields.push((field_name.clone(), self.resolve_type(ty, offset)?));
        }

        self.ctx.add(name.to_string(), NameInfo::Struct(resolved_fields));

        Ok(Cmd::Struct {
            name: name.to_string(),
            fields: fields.to_vec(),
            offset,
        })
    }

    // ---- Statements -----------------------------------------------------

    fn check_stmt(&mut self, stmt: &Stmt, ret_ty: &ResolvedType) -> CompileResult<Stmt<ResolvedType>> {
        match stmt {
            Stmt::Let { lvalue, expr, offset } => {
                let expr = self.check_expr(expr)?;
                match lvalue {
                    LValue::Var { .. } => self.bind_lvalue(lvalue, expr.info().clone())?,
                    LValue::Array { indices, .. } => {
                        let rank = expr.info().rank().ok_or_else(|| {
                            CompileError::new(
                                "Let binding to an array lvalue requires an array expression",
                                *offset,
                            )
                        })?;
                        if rank != indices.len() {
                            return Err(CompileError::new(
                                format!("Wrong rank for array let binding: expected {}, got {rank}", indices.len()),
                                *offset,
                            ));
                        }
                        self.bind_lvalue(lvalue, expr.info().clone())?;
                    }
                }
                Ok(Stmt::Let {
                    lvalue: lvalue.clone(),
                    expr,
                    offset: *offset,
                })
            }
            Stmt::Assert { expr, message, offset } => {
                let expr = self.check_expr(expr)?;
                if *expr.info() != ResolvedType::Bool {
                    return Err(CompileError::new("Assert condition must be boolean", *offset));
                }
                Ok(Stmt::Assert {
                    expr,
                    message: message.clone(),
                    offset: *offset,
                })
            }
            Stmt::Return { expr, offset } => {
                let expr = self.check_expr(expr)?;
                if expr.info() != ret_ty {
                    return Err(CompileError::new(
                        format!(
                            "Return type mismatch: expected {ret_ty}, got {}",
                            expr.info()
                        ),
                        *offset,
                    ));
                }
                Ok(Stmt::Return { expr, offset: *offset })
            }
        }
    }

    // ---- Expressions -----------------------------------------------------

    fn check_expr(&mut self, expr: &Expr) -> CompileResult<Expr<ResolvedType>> {
        match expr {
            Expr::Int { value, offset, .. } => Ok(Expr::Int {
                value: *value,
                offset: *offset,
                info: ResolvedType::Int,
            }),
            Expr::Float { value, offset, .. } => Ok(Expr::Float {
                value: *value,
                offset: *offset,
                info: ResolvedType::Float,
            }),
            Expr::True { offset, .. } => Ok(Expr::True {
                offset: *offset,
                info: ResolvedType::Bool,
            }),
            Expr::False { offset, .. } => Ok(Expr::False {
                offset: *offset,
                info: ResolvedType::Bool,
            }),
            Expr::Void { offset, .. } => Ok(Expr::Void {
                offset: *offset,
                info: ResolvedType::Void,
            }),
            Expr::Var { name, offset, .. } => {
                let ty = self
                    .ctx
                    .lookup_value(name)
                    .ok_or_else(|| CompileError::new(format!("Undeclared variable '{name}'"), *offset))?
                    .clone();
                Ok(Expr::Var {
                    name: name.clone(),
                    offset: *offset,
                    info: ty,
                })
            }
            Expr::Unop { op, expr, offset, .. } => self.check_unop(*op, expr, *offset),
            Expr::Binop {
                op, left, right, offset, ..
            } => self.check_binop(*op, left, right, *offset),
            Expr::If {
                cond,
                then_branch,
                else_branch,
                offset,
                ..
            } => self.check_if(cond, then_branch, else_branch, *offset),
            Expr::ArrayLiteral { elements, offset, .. } => self.check_array_literal(elements, *offset),
            Expr::StructLiteral { name, fields, offset, .. } => {
                self.check_struct_literal(name, fields, *offset)
            }
            Expr::Dot { base, field, offset, .. } => self.check_dot(base, field, *offset),
            Expr::ArrayIndex { base, indices, offset, .. } => {
                self.check_array_index(base, indices, *offset)
            }
            Expr::Call { name, args, offset, .. } => self.check_call(name, args, *offset),
            Expr::ArrayLoop { axes, body, offset, .. } => self.check_array_loop(axes, body, *offset),
            Expr::SumLoop { axes, body, offset, .. } => self.check_sum_loop(axes, body, *offset),
        }
    }

    fn check_unop(&mut self, op: UnOp, expr: &Expr, offset: usize) -> CompileResult<Expr<ResolvedType>> {
        let inner = self.check_expr(expr)?;
        let ty = inner.info().clone();
        match op {
            UnOp::Neg => {
                if !ty.is_numeric() {
                    return Err(CompileError::new("Unary '-' requires a numeric operand", offset));
                }
            }
            UnOp::Not => {
                if ty != ResolvedType::Bool {
                    return Err(CompileError::new("Unary '!' requires a boolean operand", offset));
                }
            }
        }
        Ok(Expr::Unop {
            op,
            expr: Box::new(inner),
            offset,
            info: ty,
        })
    }

    fn check_binop(
        &mut self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        offset: usize,
    ) -> CompileResult<Expr<ResolvedType>> {
        let left = self.check_expr(left)?;
        let right = self.check_expr(right)?;

        if left.info() != right.info() {
            return Err(CompileError::new(
                format!(
                    "Type mismatch in binary operator: {} vs {}",
                    left.info(),
                    right.info()
                ),
                offset,
            ));
        }
        let operand_ty = left.info().clone();

        let result_ty = if op.is_logical() {
            if operand_ty != ResolvedType::Bool {
                return Err(CompileError::new("Logical operator requires boolean operands", offset));
            }
            ResolvedType::Bool
        } else if matches!(op, BinOp::Eq | BinOp::Ne) {
            ResolvedType::Bool
        } else if op.is_comparison() {
            if !operand_ty.is_numeric() {
                return Err(CompileError::new("Comparison requires numeric operands", offset));
            }
            ResolvedType::Bool
        } else {
            debug_assert!(op.is_arithmetic());
            if !operand_ty.is_numeric() {
                return Err(CompileError::new(
                    "Arithmetic operator requires numeric operands",
                    offset,
                ));
            }
            operand_ty
        };

        Ok(Expr::Binop {
            op,
            left: Box::new(left),
            right: Box::new(right),
            offset,
            info: result_ty,
        })
    }

    fn check_if(
        &mut self,
        cond: &Expr,
        then_branch: &Expr,
        else_branch: &Expr,
        offset: usize,
    ) -> CompileResult<Expr<ResolvedType>> {
        let cond = self.check_expr(cond)?;
        if *cond.info() != ResolvedType::Bool {
            return Err(CompileError::new("Condition of 'if' must be boolean", offset));
        }
        let then_branch = self.check_expr(then_branch)?;
        let else_branch = self.check_expr(else_branch)?;
        if then_branch.info() != else_branch.info() {
            return Err(CompileError::new("Branches of 'if' must have the same type", offset));
        }
        let ty = then_branch.info().clone();
        Ok(Expr::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
            offset,
            info: ty,
        })
    }

    fn check_array_literal(&mut self, elements: &[Expr], offset: usize) -> CompileResult<Expr<ResolvedType>> {
        let mut checked = Vec::with_capacity(elements.len());
        for element in elements {
            checked.push(self.check_expr(element)?);
        }
        let elem_ty = match checked.first() {
            Some(first) => {
                let ty = first.info().clone();
                for other in &checked[1..] {
                    if *other.info() != ty {
                        return Err(CompileError::new(
                            "Array literal elements must all have the same type",
                            offset,
                        ));
                    }
                }
                ty
            }
            None => ResolvedType::Void,
        };
        Ok(Expr::ArrayLiteral {
            elements: checked,
            offset,
            info: ResolvedType::array(elem_ty, 1),
        })
    }

    fn check_struct_literal(
        &mut self,
        name: &str,
        fields: &[Expr],
        offset: usize,
    ) -> CompileResult<Expr<ResolvedType>> {
        let decl = self
            .ctx
            .lookup_struct(name)
            .ok_or_else(|| CompileError::new(format!("Undeclared struct '{name}'"), offset))?
            .to_vec();
        if decl.len() != fields.len() {
            return Err(CompileError::new(
                format!(
                    "Wrong number of fields for struct '{name}': expected {}, got {}",
                    decl.len(),
                    fields.len()
                ),
                offset,
            ));
        }
        let mut checked = Vec::with_capacity(fields.len());
        for (field_expr, (field_name, field_ty)) in fields.iter().zip(decl.iter()) {
            let checked_field = self.check_expr(field_expr)?;
            if checked_field.info() != field_ty {
                return Err(CompileError::new(
                    format!("Field type mismatch for '{field_name}' of struct '{name}'"),
                    offset,
                ));
            }
            checked.push(checked_field);
        }
        Ok(Expr::StructLiteral {
            name: name.to_string(),
            fields: checked,
            offset,
            info: ResolvedType::Struct(name.to_string()),
        })
    }

    fn check_dot(&mut self, base: &Expr, field: &str, offset: usize) -> CompileResult<Expr<ResolvedType>> {
        let base = self.check_expr(base)?;
        let ResolvedType::Struct(struct_name) = base.info() else {
            return Err(CompileError::new("Field access on a non-struct type", offset));
        };
        let decl = self
            .ctx
            .lookup_struct(struct_name)
            .expect("struct type always resolves to a declared struct")
            .to_vec();
        let field_ty = decl
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, ty)| ty.clone())
            .ok_or_else(|| {
                CompileError::new(format!("No field '{field}' in struct '{struct_name}'"), offset)
            })?;
        Ok(Expr::Dot {
            base: Box::new(base),
            field: field.to_string(),
            offset,
            info: field_ty,
        })
    }

    fn check_array_index(
        &mut self,
        base: &Expr,
        indices: &[Expr],
        offset: usize,
    ) -> CompileResult<Expr<ResolvedType>> {
        let base = self.check_expr(base)?;
        let rank = base
            .info()
            .rank()
            .ok_or_else(|| CompileError::new("Indexing requires an array type", offset))?;
        if rank != indices.len() {
            return Err(CompileError::new(
                format!("Wrong number of indices for array of rank {rank}: got {}", indices.len()),
                offset,
            ));
        }
        let elem_ty = base.info().element_type().unwrap().clone();
        let mut checked = Vec::with_capacity(indices.len());
        for index in indices {
            let checked_index = self.check_expr(index)?;
            if *checked_index.info() != ResolvedType::Int {
                return Err(CompileError::new("Array index must be an integer", offset));
            }
            checked.push(checked_index);
        }
        Ok(Expr::ArrayIndex {
            base: Box::new(base),
            indices: checked,
            offset,
            info: elem_ty,
        })
    }

    fn check_call(&mut self, name: &str, args: &[Expr], offset: usize) -> CompileResult<Expr<ResolvedType>> {
        let (params, ret) = self
            .ctx
            .lookup_fn(name)
            .ok_or_else(|| CompileError::new(format!("Undeclared function '{name}'"), offset))?;
        let (params, ret) = (params.to_vec(), ret.clone());
        if params.len() != args.len() {
            return Err(CompileError::new(
                format!(
                    "Wrong number of arguments to '{name}': expected {}, got {}",
                    params.len(),
                    args.len()
                ),
                offset,
            ));
        }
        let mut checked = Vec::with_capacity(args.len());
        for (arg, expected) in args.iter().zip(params.iter()) {
            let checked_arg = self.check_expr(arg)?;
            if checked_arg.info() != expected {
                return Err(CompileError::new(
                    format!("Argument type mismatch in call to '{name}'"),
                    offset,
                ));
            }
            checked.push(checked_arg);
        }
        Ok(Expr::Call {
            name: name.to_string(),
            args: checked,
            offset,
            info: ret,
        })
    }

    fn check_loop_axes(
        &mut self,
        axes: &[(String, Expr)],
        offset: usize,
    ) -> CompileResult<Vec<(String, Expr<ResolvedType>)>> {
        if axes.is_empty() {
            return Err(CompileError::new("Loop must have at least one axis", offset));
        }
        let mut checked = Vec::with_capacity(axes.len());
        for (name, bound) in axes {
            let bound = self.check_expr(bound)?;
            if *bound.info() != ResolvedType::Int {
                return Err(CompileError::new("Loop axis bound must be an integer", offset));
            }
            checked.push((name.clone(), bound));
        }
        Ok(checked)
    }

    fn check_array_loop(
        &mut self,
        axes: &[(String, Expr)],
        body: &Expr,
        offset: usize,
    ) -> CompileResult<Expr<ResolvedType>> {
        let axes = self.check_loop_axes(axes, offset)?;
        self.ctx.push_scope();
        for (name, _) in &axes {
            self.ctx.add(name.clone(), NameInfo::Value(ResolvedType::Int));
        }
        let body = self.check_expr(body);
        self.ctx.pop_scope();
        let body = body?;
        let ty = ResolvedType::array(body.info().clone(), axes.len());
        Ok(Expr::ArrayLoop {
            axes,
            body: Box::new(body),
            offset,
            info: ty,
        })
    }

    fn check_sum_loop(
        &mut self,
        axes: &[(String, Expr)],
        body: &Expr,
        offset: usize,
    ) -> CompileResult<Expr<ResolvedType>> {
        let axes = self.check_loop_axes(axes, offset)?;
        self.ctx.push_scope();
        for (name, _) in &axes {
            self.ctx.add(name.clone(), NameInfo::Value(ResolvedType::Int));
        }
        let body = self.check_expr(body);
        self.ctx.pop_scope();
        let body = body?;
        if !body.info().is_numeric() {
            return Err(CompileError::new("Sum loop body must be numeric", offset));
        }
        let ty = body.info().clone();
        Ok(Expr::SumLoop {
            axes,
            body: Box::new(body),
            offset,
            info: ty,
        })
    }
}

/// Type-check an entire program, returning the annotated tree and the final root symbol
/// context (used by the `-t` stop-point and by both code generators).
pub fn typecheck_program(program: &Program) -> CompileResult<(Program<ResolvedType>, Context)> {
    let mut checker = TypeChecker::new();
    let typed = checker.check_program(program)?;
    Ok((typed, checker.ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;

    fn check(src: &str) -> CompileResult<Program<ResolvedType>> {
        let program = parse_program(src).unwrap();
        typecheck_program(&program).map(|(typed, _)| typed)
    }

    #[test]
    fn binop_resolves_to_int() {
        let typed = check("show 3+4\n").unwrap();
        match &typed.cmds[0] {
            Cmd::Show { expr, .. } => assert_eq!(*expr.info(), ResolvedType::Int),
            _ => unreachable!(),
        }
    }

    #[test]
    fn array_index_and_negative_bound_typecheck() {
        let typed = check("let a = [1,2,3]\nshow a[0]\n").unwrap();
        match &typed.cmds[1] {
            Cmd::Show { expr, .. } => assert_eq!(*expr.info(), ResolvedType::Int),
            _ => unreachable!(),
        }
    }

    #[test]
    fn array_loop_resolves_to_rank_k_array() {
        let typed = check("let x = array[i : 3, j : 2] i*10+j\nshow x\n").unwrap();
        match &typed.cmds[1] {
            Cmd::Show { expr, .. } => {
                assert_eq!(*expr.info(), ResolvedType::array(ResolvedType::Int, 2));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn sum_loop_resolves_to_body_type() {
        let typed = check("let s = sum[i : 5] i\nshow s\n").unwrap();
        match &typed.cmds[1] {
            Cmd::Show { expr, .. } => assert_eq!(*expr.info(), ResolvedType::Int),
            _ => unreachable!(),
        }
    }

    #[test]
    fn redeclaring_rgba_struct_is_an_error() {
        let err = check("struct rgba {\n  r : float\n  g : float\n  b : float\n  a : float\n}\n").unwrap_err();
        assert!(err.message.contains("Redeclaration"));
    }

    #[test]
    fn duplicate_struct_field_is_an_error() {
        let err = check("struct p {\n  x : int\n  x : float\n}\n").unwrap_err();
        assert_eq!(err.message, "Redeclaration of struct field");
    }

    #[test]
    fn fn_call_and_return_type_check() {
        let typed = check("fn f(a : int, b : float) : float {\n  return b + to_float(a)\n}\nshow f(3, 1.5)\n").unwrap();
        match &typed.cmds[1] {
            Cmd::Show { expr, .. } => assert_eq!(*expr.info(), ResolvedType::Float),
            _ => unreachable!(),
        }
    }

    #[test]
    fn missing_return_is_an_error() {
        let err = check("fn f() : int {\n  assert true, \"x\"\n}\n").unwrap_err();
        assert!(err.message.contains("return"));
    }

    #[test]
    fn undeclared_variable_is_an_error() {
        let err = check("show y\n").unwrap_err();
        assert!(err.message.contains("Undeclared variable"));
    }
}
