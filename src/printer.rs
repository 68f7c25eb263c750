//! AST -> S-expression dump, used by the `-p` stop-point.
//!
//! Every node renders as `(NodeKind [resolved-type] children...)` per spec.md §6. `show`'s type
//! descriptor reuses the same grammar except a struct renders as `(TupleType <field-type>...)`
//! instead of `(StructType name)` -- [`sexpr_type_for_show`] produces that variant, the general
//! [`ResolvedType`] `Display` impl produces the other.

use crate::parser::ast::{BinOp, Cmd, Expr, LValue, Program, ResolvedType, Stmt, Type, UnOp};
use crate::typechecker::context::Context;

pub fn print_program(program: &Program<ResolvedType>) -> String {
    program
        .cmds
        .iter()
        .map(print_cmd)
        .collect::<Vec<_>>()
        .join("\n")
}

fn binop_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::Le => "<=",
        BinOp::Ge => ">=",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

fn unop_symbol(op: UnOp) -> &'static str {
    match op {
        UnOp::Neg => "-",
        UnOp::Not => "!",
    }
}

fn print_type(ty: &Type) -> String {
    match ty {
        Type::Int => "(IntType)".to_string(),
        Type::Bool => "(BoolType)".to_string(),
        Type::Float => "(FloatType)".to_string(),
        Type::Void => "(VoidType)".to_string(),
        Type::Struct(name) => format!("(StructType {name})"),
        Type::Array { element, rank } => format!("(ArrayType {} {rank})", print_type(element)),
    }
}

fn print_lvalue(lvalue: &LValue) -> String {
    match lvalue {
        LValue::Var { name, .. } => name.clone(),
        LValue::Array { name, indices, .. } => format!("{name}[{}]", indices.join(",")),
    }
}

fn print_expr(expr: &Expr<ResolvedType>) -> String {
    let ty = expr.info();
    match expr {
        Expr::Int { value, .. } => format!("(IntExpr {ty} {value})"),
        Expr::Float { value, .. } => format!("(FloatExpr {ty} {value})"),
        Expr::True { .. } => format!("(TrueExpr {ty})"),
        Expr::False { .. } => format!("(FalseExpr {ty})"),
        Expr::Void { .. } => format!("(VoidExpr {ty})"),
        Expr::Var { name, .. } => format!("(VarExpr {ty} {name})"),
        Expr::ArrayLiteral { elements, .. } => {
            let parts: Vec<String> = elements.iter().map(print_expr).collect();
            format!("(ArrayLiteralExpr {ty} {})", parts.join(" "))
        }
        Expr::StructLiteral { name, fields, .. } => {
            let parts: Vec<String> = fields.iter().map(print_expr).collect();
            format!("(StructLiteralExpr {ty} {name} {})", parts.join(" "))
        }
        Expr::Dot { base, field, .. } => format!("(DotExpr {ty} {} {field})", print_expr(base)),
        Expr::ArrayIndex { base, indices, .. } => {
            let parts: Vec<String> = indices.iter().map(print_expr).collect();
            format!("(ArrayIndexExpr {ty} {} {})", print_expr(base), parts.join(" "))
        }
        Expr::Call { name, args, .. } => {
            let parts: Vec<String> = args.iter().map(print_expr).collect();
            format!("(CallExpr {ty} {name} {})", parts.join(" "))
        }
        Expr::Unop { op, expr, .. } => format!("(UnopExpr {ty} {} {})", unop_symbol(*op), print_expr(expr)),
        Expr::Binop { op, left, right, .. } => format!(
            "(BinopExpr {ty} {} {} {})",
            print_expr(left),
            binop_symbol(*op),
            print_expr(right)
        ),
        Expr::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => format!(
            "(IfExpr {ty} {} {} {})",
            print_expr(cond),
            print_expr(then_branch),
            print_expr(else_branch)
        ),
        Expr::ArrayLoop { axes, body, .. } => {
            let parts: Vec<String> = axes
                .iter()
                .map(|(name, bound)| format!("({name} {})", print_expr(bound)))
                .collect();
            format!("(ArrayLoopExpr {ty} ({}) {})", parts.join(" "), print_expr(body))
        }
        Expr::SumLoop { axes, body, .. } => {
            let parts: Vec<String> = axes
                .iter()
                .map(|(name, bound)| format!("({name} {})", print_expr(bound)))
                .collect();
            format!("(SumLoopExpr {ty} ({}) {})", parts.join(" "), print_expr(body))
        }
    }
}

fn print_stmt(stmt: &Stmt<ResolvedType>) -> String {
    match stmt {
        Stmt::Let { lvalue, expr, .. } => format!("(LetStmt {} {})", print_lvalue(lvalue), print_expr(expr)),
        Stmt::Assert { expr, message, .. } => format!("(AssertStmt {} \"{message}\")", print_expr(expr)),
        Stmt::Return { expr, .. } => format!("(ReturnStmt {})", print_expr(expr)),
    }
}

fn print_cmd(cmd: &Cmd<ResolvedType>) -> String {
    match cmd {
        Cmd::Read { file, lvalue, .. } => format!("(ReadCmd \"{file}\" {})", print_lvalue(lvalue)),
        Cmd::Write { expr, file, .. } => format!("(WriteCmd {} \"{file}\")", print_expr(expr)),
        Cmd::Let { lvalue, expr, .. } => format!("(LetCmd {} {})", print_lvalue(lvalue), print_expr(expr)),
        Cmd::Assert { expr, message, .. } => format!("(AssertCmd {} \"{message}\")", print_expr(expr)),
        Cmd::Print { message, .. } => format!("(PrintCmd \"{message}\")"),
        Cmd::Show { expr, .. } => format!("(ShowCmd {})", print_expr(expr)),
        Cmd::Time { cmd, .. } => format!("(TimeCmd {})", print_cmd(cmd)),
        Cmd::Fn {
            name, params, ret, body, ..
        } => {
            let params: Vec<String> = params
                .iter()
                .map(|b| format!("({} {})", print_lvalue(&b.lvalue), print_type(&b.ty)))
                .collect();
            let body: Vec<String> = body.iter().map(print_stmt).collect();
            format!(
                "(FnCmd {name} ({}) {} {})",
                params.join(" "),
                print_type(ret),
                body.join(" ")
            )
        }
        Cmd::Struct { name, fields, .. } => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(fname, ty)| format!("({fname} {})", print_type(ty)))
                .collect();
            format!("(StructCmd {name} {})", fields.join(" "))
        }
    }
}

/// `show`'s type descriptor: identical grammar to [`ResolvedType`]'s `Display`, except a struct
/// renders as `(TupleType <field-type>...)` instead of `(StructType name)`.
pub fn sexpr_type_for_show(ty: &ResolvedType, ctx: &Context) -> String {
    match ty {
        ResolvedType::Struct(name) => {
            let fields = ctx.lookup_struct(name).unwrap_or(&[]);
            let parts: Vec<String> = fields
                .iter()
                .map(|(_, field_ty)| sexpr_type_for_show(field_ty, ctx))
                .collect();
            format!("(TupleType {})", parts.join(" "))
        }
        ResolvedType::Array(elem, rank) => format!("(ArrayType {} {rank})", sexpr_type_for_show(elem, ctx)),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;
    use crate::typechecker::typecheck_program;

    fn print(src: &str) -> String {
        let program = parse_program(src).unwrap();
        let (typed, _) = typecheck_program(&program).unwrap();
        print_program(&typed)
    }

    #[test]
    fn prints_show_binop() {
        assert_eq!(
            print("show 3+4\n"),
            "(ShowCmd (BinopExpr (IntType) (IntExpr (IntType) 3) + (IntExpr (IntType) 4)))"
        );
    }

    #[test]
    fn show_of_rgba_struct_renders_tuple_type() {
        let program = parse_program("read image \"x.png\" to im\nshow im[0,0]\n").unwrap();
        let (typed, ctx) = typecheck_program(&program).unwrap();
        let Cmd::Show { expr, .. } = &typed.cmds[1] else {
            unreachable!()
        };
        assert_eq!(sexpr_type_for_show(expr.info(), &ctx), "(TupleType (FloatType) (FloatType) (FloatType) (FloatType))");
    }
}
