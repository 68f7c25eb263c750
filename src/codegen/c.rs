//! Typed AST -> portable C, per spec.md §4.4.
//!
//! Each expression lowers into zero or more C statements (pushed onto the current block) plus a
//! C expression string naming its value -- usually a freshly declared temporary, sometimes a
//! literal or a bare identifier when no statement is needed. Nested control structures (`if`,
//! `array`/`sum` loops) isolate their own statement lists via [`CGen::with_new_block`] so they can
//! be wrapped in C's own `if`/`for` rather than goto-threading them by hand.

use std::fmt::Write as _;

use crate::parser::ast::{BinOp, Cmd, Expr, LValue, Program, ResolvedType, Stmt, UnOp};
use crate::printer::sexpr_type_for_show;
use crate::typechecker::context::Context;

struct TypeCollector {
    structs: Vec<String>,
    arrays: Vec<(ResolvedType, usize)>,
}

impl TypeCollector {
    fn new() -> Self {
        Self {
            structs: Vec::new(),
            arrays: Vec::new(),
        }
    }

    fn register(&mut self, ty: &ResolvedType, ctx: &Context) {
        match ty {
            ResolvedType::Struct(name) => {
                if self.structs.iter().any(|s| s == name) {
                    return;
                }
                self.structs.push(name.clone());
                if let Some(fields) = ctx.lookup_struct(name) {
                    for (_, field_ty) in fields.to_vec() {
                        self.register(&field_ty, ctx);
                    }
                }
            }
            ResolvedType::Array(elem, rank) => {
                self.register(elem, ctx);
                if !self.arrays.iter().any(|(e, r)| e == &**elem && r == rank) {
                    self.arrays.push((elem.as_ref().clone(), *rank));
                }
            }
            _ => {}
        }
    }
}

fn elem_c_name(ty: &ResolvedType) -> String {
    match ty {
        ResolvedType::Int => "int64".to_string(),
        ResolvedType::Float => "float64".to_string(),
        ResolvedType::Bool => "bool".to_string(),
        ResolvedType::Void => "void".to_string(),
        ResolvedType::Struct(name) => name.clone(),
        ResolvedType::Array(elem, rank) => format!("a{rank}_{}", elem_c_name(elem)),
    }
}

fn array_type_name(elem: &ResolvedType, rank: usize) -> String {
    format!("_a{rank}_{}", elem_c_name(elem))
}

fn c_type(ty: &ResolvedType) -> String {
    match ty {
        ResolvedType::Int => "int64_t".to_string(),
        ResolvedType::Float => "double".to_string(),
        ResolvedType::Bool => "bool".to_string(),
        ResolvedType::Void => "void_t".to_string(),
        ResolvedType::Struct(name) => name.clone(),
        ResolvedType::Array(elem, rank) => array_type_name(elem, *rank),
    }
}

/// Lowers a type-checked `Program` to a single C translation unit.
pub struct CGen<'a> {
    ctx: &'a Context,
    lines: Vec<String>,
    temp_counter: usize,
}

impl<'a> CGen<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self {
            ctx,
            lines: Vec::new(),
            temp_counter: 0,
        }
    }

    fn fresh_temp(&mut self) -> String {
        self.temp_counter += 1;
        format!("_t{}", self.temp_counter)
    }

    fn emit(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn with_new_block(&mut self, f: impl FnOnce(&mut Self) -> String) -> (Vec<String>, String) {
        let saved = std::mem::take(&mut self.lines);
        let value = f(self);
        let block = std::mem::replace(&mut self.lines, saved);
        (block, value)
    }

    // ---- Typedefs -----------------------------------------------------

    fn collect_types(&self, program: &Program<ResolvedType>) -> TypeCollector {
        let mut collector = TypeCollector::new();
        // `rgba` and a rank-1 int array are always needed: `read`/`write image` and the
        // pre-bound `args` value use them even if the program never declares them itself.
        collector.register(&ResolvedType::Struct("rgba".to_string()), self.ctx);
        collector.register(&ResolvedType::array(ResolvedType::Int, 1), self.ctx);

        for cmd in &program.cmds {
            self.collect_cmd_types(cmd, &mut collector);
        }
        collector
    }

    fn collect_cmd_types(&self, cmd: &Cmd<ResolvedType>, collector: &mut TypeCollector) {
        match cmd {
            Cmd::Read { lvalue, .. } => {
                let _ = lvalue;
                collector.register(&ResolvedType::array(ResolvedType::Struct("rgba".to_string()), 2), self.ctx);
            }
            Cmd::Write { expr, .. } | Cmd::Assert { expr, .. } | Cmd::Show { expr, .. } => {
                self.collect_expr_types(expr, collector)
            }
            Cmd::Let { expr, .. } => self.collect_expr_types(expr, collector),
            Cmd::Print { .. } => {}
            Cmd::Time { cmd, .. } => self.collect_cmd_types(cmd, collector),
            Cmd::Fn { params, ret, body, .. } => {
                for param in params {
                    collector.register(&param.ty.to_resolved(), self.ctx);
                }
                collector.register(&ret.to_resolved(), self.ctx);
                for stmt in body {
                    self.collect_stmt_types(stmt, collector);
                }
            }
            Cmd::Struct { name, .. } => collector.register(&ResolvedType::Struct(name.clone()), self.ctx),
        }
    }

    fn collect_stmt_types(&self, stmt: &Stmt<ResolvedType>, collector: &mut TypeCollector) {
        match stmt {
            Stmt::Let { expr, .. } | Stmt::Assert { expr, .. } | Stmt::Return { expr, .. } => {
                self.collect_expr_types(expr, collector)
            }
        }
    }

    fn collect_expr_types(&self, expr: &Expr<ResolvedType>, collector: &mut TypeCollector) {
        collector.register(expr.info(), self.ctx);
        match expr {
            Expr::Int { .. } | Expr::Float { .. } | Expr::True { .. } | Expr::False { .. } | Expr::Void { .. } | Expr::Var { .. } => {}
            Expr::ArrayLiteral { elements, .. } => {
                for e in elements {
                    self.collect_expr_types(e, collector);
                }
            }
            Expr::StructLiteral { fields, .. } => {
                for e in fields {
                    self.collect_expr_types(e, collector);
                }
            }
            Expr::Dot { base, .. } => self.collect_expr_types(base, collector),
            Expr::ArrayIndex { base, indices, .. } => {
                self.collect_expr_types(base, collector);
                for i in indices {
                    self.collect_expr_types(i, collector);
                }
            }
            Expr::Call { args, .. } => {
                for a in args {
                    self.collect_expr_types(a, collector);
                }
            }
            Expr::Unop { expr, .. } => self.collect_expr_types(expr, collector),
            Expr::Binop { left, right, .. } => {
                self.collect_expr_types(left, collector);
                self.collect_expr_types(right, collector);
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                self.collect_expr_types(cond, collector);
                self.collect_expr_types(then_branch, collector);
                self.collect_expr_types(else_branch, collector);
            }
            Expr::ArrayLoop { axes, body, .. } | Expr::SumLoop { axes, body, .. } => {
                for (_, bound) in axes {
                    self.collect_expr_types(bound, collector);
                }
                self.collect_expr_types(body, collector);
            }
        }
    }

    fn emit_typedefs(&self, program: &Program<ResolvedType>, out: &mut String) {
        let collected = self.collect_types(program);
        let _ = writeln!(out, "typedef struct {{ }} void_t;\n");

        for name in &collected.structs {
            let fields = self.ctx.lookup_struct(name).unwrap_or_default().to_vec();
            let _ = write!(out, "typedef struct {{ ");
            for (field_name, field_ty) in &fields {
                let _ = write!(out, "{} {field_name}; ", c_type(field_ty));
            }
            let _ = writeln!(out, "}} {name};");
        }
        if !collected.structs.is_empty() {
            out.push('\n');
        }

        for (elem, rank) in &collected.arrays {
            let name = array_type_name(elem, *rank);
            let _ = write!(out, "typedef struct {{ {}* data; ", c_type(elem));
            for i in 0..*rank {
                let _ = write!(out, "int64_t d{i}; ");
            }
            let _ = writeln!(out, "}} {name};");
        }
        out.push('\n');
    }

    // ---- Expressions -----------------------------------------------------

    fn compile_expr(&mut self, expr: &Expr<ResolvedType>) -> String {
        match expr {
            Expr::Int { value, .. } => value.to_string(),
            Expr::Float { value, .. } => format!("{value:?}"),
            Expr::True { .. } => "true".to_string(),
            Expr::False { .. } => "false".to_string(),
            Expr::Void { .. } => "((void_t){ })".to_string(),
            Expr::Var { name, .. } => name.clone(),
            Expr::Unop { op, expr, .. } => {
                let inner = self.compile_expr(expr);
                match op {
                    UnOp::Neg => format!("(-({inner}))"),
                    UnOp::Not => format!("(!({inner}))"),
                }
            }
            Expr::Binop { op, left, right, .. } => self.compile_binop(*op, left, right),
            Expr::If {
                cond,
                then_branch,
                else_branch,
                info,
            } => self.compile_if(cond, then_branch, else_branch, info),
            Expr::ArrayLiteral { elements, info, .. } => self.compile_array_literal(elements, info),
            Expr::StructLiteral { name, fields, .. } => self.compile_struct_literal(name, fields),
            Expr::Dot { base, field, .. } => {
                let base_val = self.compile_expr(base);
                format!("({base_val}).{field}")
            }
            Expr::ArrayIndex { base, indices, info } => self.compile_array_index(base, indices, info),
            Expr::Call { name, args, .. } => {
                let rendered: Vec<String> = args.iter().map(|a| self.compile_expr(a)).collect();
                format!("{name}({})", rendered.join(", "))
            }
            Expr::ArrayLoop { axes, body, info } => self.compile_array_loop(axes, body, info),
            Expr::SumLoop { axes, body, info } => self.compile_sum_loop(axes, body, info),
        }
    }

    fn compile_binop(&mut self, op: BinOp, left: &Expr<ResolvedType>, right: &Expr<ResolvedType>) -> String {
        let is_float = *left.info() == ResolvedType::Float;
        let l = self.compile_expr(left);
        let r = self.compile_expr(right);
        match op {
            BinOp::Add => format!("(({l}) + ({r}))"),
            BinOp::Sub => format!("(({l}) - ({r}))"),
            BinOp::Mul => format!("(({l}) * ({r}))"),
            BinOp::Div => {
                if is_float {
                    format!("(({l}) / ({r}))")
                } else {
                    let rtmp = self.fresh_temp();
                    self.emit(format!("int64_t {rtmp} = {r};"));
                    self.emit(format!("if ({rtmp} == 0) {{ _fail_assertion(\"divide by zero\"); }}"));
                    format!("(({l}) / ({rtmp}))")
                }
            }
            BinOp::Mod => {
                if is_float {
                    format!("_fmod({l}, {r})")
                } else {
                    let rtmp = self.fresh_temp();
                    self.emit(format!("int64_t {rtmp} = {r};"));
                    self.emit(format!("if ({rtmp} == 0) {{ _fail_assertion(\"mod by zero\"); }}"));
                    format!("(({l}) % ({rtmp}))")
                }
            }
            BinOp::Lt => format!("(({l}) < ({r}))"),
            BinOp::Gt => format!("(({l}) > ({r}))"),
            BinOp::Le => format!("(({l}) <= ({r}))"),
            BinOp::Ge => format!("(({l}) >= ({r}))"),
            BinOp::Eq => format!("(({l}) == ({r}))"),
            BinOp::Ne => format!("(({l}) != ({r}))"),
            BinOp::And => format!("(({l}) && ({r}))"),
            BinOp::Or => format!("(({l}) || ({r}))"),
        }
    }

    fn compile_if(
        &mut self,
        cond: &Expr<ResolvedType>,
        then_branch: &Expr<ResolvedType>,
        else_branch: &Expr<ResolvedType>,
        info: &ResolvedType,
    ) -> String {
        let cond_val = self.compile_expr(cond);
        let result = self.fresh_temp();
        self.emit(format!("{} {result};", c_type(info)));

        let (then_lines, then_val) = self.with_new_block(|s| s.compile_expr(then_branch));
        let (else_lines, else_val) = self.with_new_block(|s| s.compile_expr(else_branch));

        self.emit(format!("if ({cond_val}) {{"));
        for line in then_lines {
            self.emit(format!("  {line}"));
        }
        self.emit(format!("  {result} = {then_val};"));
        self.emit("} else {");
        for line in else_lines {
            self.emit(format!("  {line}"));
        }
        self.emit(format!("  {result} = {else_val};"));
        self.emit("}");
        result
    }

    fn compile_array_literal(&mut self, elements: &[Expr<ResolvedType>], info: &ResolvedType) -> String {
        let elem_ty = info.element_type().unwrap().clone();
        let values: Vec<String> = elements.iter().map(|e| self.compile_expr(e)).collect();
        let result = self.fresh_temp();
        let arr_ty = c_type(info);
        self.emit(format!("{arr_ty} {result};"));
        self.emit(format!(
            "{result}.data = ({}*) _jpl_alloc({} * sizeof({}));",
            c_type(&elem_ty),
            values.len(),
            c_type(&elem_ty)
        ));
        self.emit(format!("{result}.d0 = {};", values.len()));
        for (i, value) in values.iter().enumerate() {
            self.emit(format!("{result}.data[{i}] = {value};"));
        }
        result
    }

    fn compile_struct_literal(&mut self, name: &str, fields: &[Expr<ResolvedType>]) -> String {
        let field_names = self
            .ctx
            .lookup_struct(name)
            .map(|f| f.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>())
            .unwrap_or_default();
        let values: Vec<String> = fields.iter().map(|e| self.compile_expr(e)).collect();
        let result = self.fresh_temp();
        self.emit(format!("{name} {result};"));
        for (field_name, value) in field_names.iter().zip(values.iter()) {
            self.emit(format!("{result}.{field_name} = {value};"));
        }
        result
    }

    fn compile_array_index(&mut self, base: &Expr<ResolvedType>, indices: &[Expr<ResolvedType>], info: &ResolvedType) -> String {
        let base_val = self.compile_expr(base);
        let base_tmp = self.fresh_temp();
        self.emit(format!("{} {base_tmp} = {base_val};", c_type(base.info())));

        let index_vals: Vec<String> = indices
            .iter()
            .enumerate()
            .map(|(i, idx)| {
                let v = self.compile_expr(idx);
                let tmp = self.fresh_temp();
                self.emit(format!("int64_t {tmp} = {v};"));
                self.emit(format!(
                    "if ({tmp} < 0 || {tmp} >= {base_tmp}.d{i}) {{ _fail_assertion(\"array index out of bounds\"); }}"
                ));
                tmp
            })
            .collect();

        let mut linear = index_vals[0].clone();
        for (i, idx) in index_vals.iter().enumerate().skip(1) {
            linear = format!("(({linear}) * {base_tmp}.d{i} + ({idx}))");
        }

        let result = self.fresh_temp();
        self.emit(format!("{} {result} = {base_tmp}.data[{linear}];", c_type(info)));
        result
    }

    fn compile_array_loop(&mut self, axes: &[(String, Expr<ResolvedType>)], body: &Expr<ResolvedType>, info: &ResolvedType) -> String {
        let elem_ty = info.element_type().unwrap().clone();
        let bounds: Vec<String> = axes
            .iter()
            .map(|(name, bound)| {
                let v = self.compile_expr(bound);
                let tmp = format!("_n_{name}");
                self.emit(format!("int64_t {tmp} = {v};"));
                self.emit(format!("if ({tmp} < 0) {{ _fail_assertion(\"negative array loop bound\"); }}"));
                tmp
            })
            .collect();

        let total = self.fresh_temp();
        self.emit(format!("int64_t {total} = {};", bounds.join(" * ")));

        let result = self.fresh_temp();
        self.emit(format!("{} {result};", c_type(info)));
        self.emit(format!(
            "{result}.data = ({}*) _jpl_alloc({total} * sizeof({}));",
            c_type(&elem_ty),
            c_type(&elem_ty)
        ));
        for (i, tmp) in bounds.iter().enumerate() {
            self.emit(format!("{result}.d{i} = {tmp};"));
        }

        let (body_lines, body_val) = self.with_new_block(|s| s.compile_expr(body));

        let mut linear = axes[0].0.clone();
        for (i, (name, _)) in axes.iter().enumerate().skip(1) {
            linear = format!("(({linear}) * {} + ({name}))", bounds[i]);
        }

        for (name, bound_tmp) in axes.iter().zip(bounds.iter()) {
            self.emit(format!("for (int64_t {} = 0; {} < {bound_tmp}; {}++) {{", name.0, name.0, name.0));
        }
        for line in body_lines {
            self.emit(format!("  {line}"));
        }
        self.emit(format!("  {result}.data[{linear}] = {body_val};"));
        for _ in axes {
            self.emit("}");
        }
        result
    }

    fn compile_sum_loop(&mut self, axes: &[(String, Expr<ResolvedType>)], body: &Expr<ResolvedType>, info: &ResolvedType) -> String {
        let bounds: Vec<String> = axes
            .iter()
            .map(|(name, bound)| {
                let v = self.compile_expr(bound);
                let tmp = format!("_n_{name}");
                self.emit(format!("int64_t {tmp} = {v};"));
                self.emit(format!("if ({tmp} < 0) {{ _fail_assertion(\"negative sum loop bound\"); }}"));
                tmp
            })
            .collect();

        let accum = self.fresh_temp();
        let zero = if *info == ResolvedType::Float { "0.0" } else { "0" };
        self.emit(format!("{} {accum} = {zero};", c_type(info)));

        let (body_lines, body_val) = self.with_new_block(|s| s.compile_expr(body));

        for (name, bound_tmp) in axes.iter().zip(bounds.iter()) {
            self.emit(format!("for (int64_t {} = 0; {} < {bound_tmp}; {}++) {{", name.0, name.0, name.0));
        }
        for line in body_lines {
            self.emit(format!("  {line}"));
        }
        self.emit(format!("  {accum} += {body_val};"));
        for _ in axes {
            self.emit("}");
        }
        accum
    }

    // ---- Statements / commands -----------------------------------------------------

    fn bind_lvalue_temps(&mut self, lvalue: &LValue, value: &str, value_ty: &ResolvedType) {
        match lvalue {
            LValue::Var { name, .. } => {
                self.emit(format!("{} {name} = {value};", c_type(value_ty)));
            }
            LValue::Array { name, indices, .. } => {
                self.emit(format!("{} {name} = {value};", c_type(value_ty)));
                for (i, index_name) in indices.iter().enumerate() {
                    self.emit(format!("int64_t {index_name} = {name}.d{i};"));
                }
            }
        }
    }

    fn compile_stmt(&mut self, stmt: &Stmt<ResolvedType>) {
        match stmt {
            Stmt::Let { lvalue, expr, .. } => {
                let value = self.compile_expr(expr);
                let ty = expr.info().clone();
                self.bind_lvalue_temps(lvalue, &value, &ty);
            }
            Stmt::Assert { expr, message, .. } => {
                let value = self.compile_expr(expr);
                self.emit(format!("if (!({value})) {{ _fail_assertion(\"{message}\"); }}"));
            }
            Stmt::Return { expr, .. } => {
                let value = self.compile_expr(expr);
                self.emit(format!("return {value};"));
            }
        }
    }

    fn compile_cmd(&mut self, cmd: &Cmd<ResolvedType>) {
        match cmd {
            Cmd::Read { file, lvalue, .. } => {
                let ty = ResolvedType::array(ResolvedType::Struct("rgba".to_string()), 2);
                let tmp = self.fresh_temp();
                self.emit(format!("{} {tmp};", c_type(&ty)));
                self.emit(format!("_read_image(&{tmp}, \"{file}\");"));
                self.bind_lvalue_temps(lvalue, &tmp, &ty);
            }
            Cmd::Write { expr, file, .. } => {
                let value = self.compile_expr(expr);
                self.emit(format!("_write_image({value}, \"{file}\");"));
            }
            Cmd::Let { lvalue, expr, .. } => {
                let value = self.compile_expr(expr);
                let ty = expr.info().clone();
                self.bind_lvalue_temps(lvalue, &value, &ty);
            }
            Cmd::Assert { expr, message, .. } => {
                let value = self.compile_expr(expr);
                self.emit(format!("if (!({value})) {{ _fail_assertion(\"{message}\"); }}"));
            }
            Cmd::Print { message, .. } => {
                self.emit(format!("_print(\"{message}\");"));
            }
            Cmd::Show { expr, .. } => {
                let value = self.compile_expr(expr);
                let tmp = self.fresh_temp();
                self.emit(format!("{} {tmp} = {value};", c_type(expr.info())));
                let type_desc = sexpr_type_for_show(expr.info(), self.ctx);
                self.emit(format!("_show(\"{type_desc}\", &{tmp});"));
            }
            Cmd::Time { cmd, .. } => {
                let t0 = self.fresh_temp();
                self.emit(format!("double {t0} = _get_time();"));
                self.compile_cmd(cmd);
                let t1 = self.fresh_temp();
                self.emit(format!("double {t1} = _get_time();"));
                self.emit(format!("_print_time({t0}, {t1});"));
            }
            Cmd::Fn { .. } | Cmd::Struct { .. } => {}
        }
    }

    fn compile_fn(&mut self, name: &str, params: &[crate::parser::ast::Binding], ret: &crate::parser::ast::Type, body: &[Stmt<ResolvedType>], out: &mut String) {
        let param_list: Vec<String> = params
            .iter()
            .map(|p| format!("{} {}", c_type(&p.ty.to_resolved()), p.lvalue.name()))
            .collect();
        let _ = writeln!(out, "{} {name}({}) {{", c_type(&ret.to_resolved()), param_list.join(", "));

        self.lines.clear();
        for param in params {
            if let LValue::Array { name, indices, .. } = &param.lvalue {
                for (i, index_name) in indices.iter().enumerate() {
                    self.emit(format!("int64_t {index_name} = {name}.d{i};"));
                }
            }
        }
        for stmt in body {
            self.compile_stmt(stmt);
        }
        for line in &self.lines {
            let _ = writeln!(out, "  {line}");
        }
        let _ = writeln!(out, "}}\n");
    }

    fn compile_main(&mut self, program: &Program<ResolvedType>, out: &mut String) {
        out.push_str("void jpl_main(struct args jpl_args) {\n");
        self.lines.clear();
        self.emit("int64_t argnum = jpl_args.argnum;");
        self.emit(format!("{} args = jpl_args.args;", array_type_name(&ResolvedType::Int, 1)));
        for cmd in &program.cmds {
            self.compile_cmd(cmd);
        }
        for line in &self.lines {
            let _ = writeln!(out, "  {line}");
        }
        out.push_str("}\n");
    }
}

/// Emit a complete C translation unit for a type-checked program.
pub fn emit_c(program: &Program<ResolvedType>, ctx: &Context) -> String {
    let mut out = String::new();
    out.push_str("#include \"rt/runtime.h\"\n\n");

    let mut gen = CGen::new(ctx);
    gen.emit_typedefs(program, &mut out);
    let _ = writeln!(out, "struct args {{ int64_t argnum; {} args; }};\n", array_type_name(&ResolvedType::Int, 1));

    for cmd in &program.cmds {
        if let Cmd::Fn { name, params, ret, body, .. } = cmd {
            gen.compile_fn(name, params, ret, body, &mut out);
        }
    }

    gen.compile_main(program, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;
    use crate::typechecker::typecheck_program;

    fn compile(src: &str) -> String {
        let program = parse_program(src).unwrap();
        let (typed, ctx) = typecheck_program(&program).unwrap();
        emit_c(&typed, &ctx)
    }

    #[test]
    fn emits_jpl_main_with_show() {
        let c = compile("show 3+4\n");
        assert!(c.contains("void jpl_main(struct args jpl_args)"));
        assert!(c.contains("_show("));
    }

    #[test]
    fn emits_typedef_for_rgba_and_read() {
        let c = compile("read image \"x.png\" to im\n");
        assert!(c.contains("typedef struct { double r; double g; double b; double a; } rgba;"));
        assert!(c.contains("_read_image(&"));
    }

    #[test]
    fn emits_function_with_return() {
        let c = compile("fn f(a : int, b : float) : float {\n  return b + to_float(a)\n}\nshow f(3, 1.5)\n");
        assert!(c.contains("double f(int64_t a, double b) {"));
        assert!(c.contains("return"));
    }

    #[test]
    fn array_literal_indexing_emits_bounds_checks() {
        let c = compile("let a = [1,2,3]\nshow a[0]\n");
        assert!(c.contains("_jpl_alloc"));
        assert!(c.contains("array index out of bounds"));
    }
}
