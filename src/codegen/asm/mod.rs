//! Typed AST -> NASM x86-64 (System V AMD64), per spec.md §4.5.
//!
//! The centerpiece is [`ShadowStack`]: a compile-time mirror of the runtime stack that lets every
//! `rbp`-relative offset be computed without re-reading emitted instructions. Every expression
//! lowers to code that leaves exactly `type.size(ctx)` bytes on top of both the real stack and its
//! shadow model; callers pop however many bytes they need once the sub-expression returns.

pub mod instr;
pub mod reg;
pub mod shadow_stack;

use std::collections::HashMap;

use instr::{Instruction as I, Operand as Op};
use reg::Reg;
use shadow_stack::ShadowStack;

use crate::parser::ast::{BinOp, Cmd, Expr, LValue, Program, ResolvedType, Stmt, UnOp};
use crate::typechecker::context::Context;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstKey {
    Int(i64),
    /// Bit pattern of an `f64`, so floats can be deduplicated and hashed exactly.
    Float(u64),
    Str(String),
}

/// Per-function entry for either a parameter (positive `rbp` offset, spec.md §11) or a local
/// bound by `let`/a loop axis (negative offset, tracked via the shadow stack itself).
#[derive(Debug, Clone)]
struct ParamSlot {
    offset: i64,
    is_float: bool,
}

pub struct AsmGen<'a> {
    ctx: &'a Context,
    opt: bool,
    data: Vec<(String, ConstKey)>,
    const_labels: HashMap<ConstKey, String>,
    label_counter: usize,
    text: Vec<I>,
    stack: ShadowStack,
    /// Named parameters of the function currently being lowered, addressed at positive `rbp`
    /// offsets (spec.md §11's calling-convention resolution) -- separate from the shadow stack,
    /// which only models the callee's own frame below `rbp`.
    params: HashMap<String, ParamSlot>,
}

impl<'a> AsmGen<'a> {
    pub fn new(ctx: &'a Context, opt: bool) -> Self {
        Self {
            ctx,
            opt,
            data: Vec::new(),
            const_labels: HashMap::new(),
            label_counter: 0,
            text: Vec::new(),
            stack: ShadowStack::new(),
            params: HashMap::new(),
        }
    }

    fn emit(&mut self, instr: I) {
        self.text.push(instr);
    }

    fn new_label(&mut self, prefix: &str) -> String {
        self.label_counter += 1;
        format!(".{prefix}{}", self.label_counter)
    }

    // ---- Constants pool -----------------------------------------------------

    fn intern(&mut self, key: ConstKey) -> String {
        if let Some(label) = self.const_labels.get(&key) {
            return label.clone();
        }
        let label = format!("const_{}", self.data.len());
        self.const_labels.insert(key.clone(), label.clone());
        self.data.push((label.clone(), key));
        label
    }

    fn int_label(&mut self, value: i64) -> String {
        self.intern(ConstKey::Int(value))
    }

    fn float_label(&mut self, value: f64) -> String {
        self.intern(ConstKey::Float(value.to_bits()))
    }

    fn str_label(&mut self, value: &str) -> String {
        self.intern(ConstKey::Str(value.to_string()))
    }

    fn emit_data_section(&self, out: &mut Vec<I>) {
        out.push(I::Section(".data".to_string()));
        for (label, key) in &self.data {
            match key {
                ConstKey::Int(v) => out.push(I::DataQword(label.clone(), *v)),
                ConstKey::Float(bits) => out.push(I::DataFloat(label.clone(), f64::from_bits(*bits))),
                ConstKey::Str(s) => out.push(I::DataString(label.clone(), s.clone())),
            }
        }
    }

    // ---- Stack push/pop helpers -----------------------------------------------------

    /// Push a scalar Int/Bool immediate. At `-O1` this always happens (spec.md §4.5 (d)/(e)); at
    /// `-O0` it is routed through the constants pool so `const_*` labels appear for every literal.
    fn push_int_const(&mut self, value: i64) {
        if self.opt || (-2147483648..=2147483647).contains(&value) {
            self.emit(I::Mov(Op::Reg(Reg::Rax), Op::Imm(value)));
        } else {
            let label = self.int_label(value);
            self.emit(I::Mov(Op::Reg(Reg::Rax), Op::mem(format!("rel {label}"))));
        }
        self.emit(I::Push(Op::Reg(Reg::Rax)));
        self.stack.push(8);
    }

    fn push_bool_const(&mut self, value: bool) {
        self.emit(I::Mov(Op::Reg(Reg::Rax), Op::Imm(if value { 1 } else { 0 })));
        self.emit(I::Push(Op::Reg(Reg::Rax)));
        self.stack.push(8);
    }

    fn push_float_const(&mut self, value: f64) {
        let label = self.float_label(value);
        self.emit(I::Movsd(Op::Reg(Reg::xmm(0)), Op::mem(format!("rel {label}"))));
        self.emit(I::Sub(Op::Reg(Reg::Rsp), Op::Imm(8)));
        self.emit(I::Movsd(Op::mem("rsp"), Op::Reg(Reg::xmm(0))));
        self.stack.push(8);
    }

    fn push_int_reg(&mut self, reg: Reg) {
        self.emit(I::Push(Op::Reg(reg)));
        self.stack.push(8);
    }

    fn push_float_reg(&mut self, n: u8) {
        self.emit(I::Sub(Op::Reg(Reg::Rsp), Op::Imm(8)));
        self.emit(I::Movsd(Op::mem("rsp"), Op::Reg(Reg::xmm(n))));
        self.stack.push(8);
    }

    fn pop_int(&mut self, reg: Reg) {
        self.emit(I::Pop(Op::Reg(reg)));
        self.stack.pop();
    }

    fn pop_float(&mut self, n: u8) {
        self.emit(I::Movsd(Op::Reg(Reg::xmm(n)), Op::mem("rsp")));
        self.emit(I::Add(Op::Reg(Reg::Rsp), Op::Imm(8)));
        self.stack.pop();
    }

    /// Copy `size` bytes (a multiple of 8) from `[rbp + rbp_offset]` onto the top of the stack,
    /// used to load aggregates (arrays/structs) bound to a variable.
    fn push_aggregate_from_rbp(&mut self, rbp_offset: i64, size: i64) {
        let words = size / 8;
        self.emit(I::Sub(Op::Reg(Reg::Rsp), Op::Imm(size)));
        for i in (0..words).rev() {
            self.emit(I::Mov(Op::Reg(Reg::Rax), Op::mem(format!("rbp+{}", rbp_offset + i * 8))));
            self.emit(I::Mov(Op::mem(format!("rsp+{}", i * 8)), Op::Reg(Reg::Rax)));
        }
        self.stack.push(size);
    }

    fn drop_bytes(&mut self, size: i64) {
        if size > 0 {
            self.emit(I::Add(Op::Reg(Reg::Rsp), Op::Imm(size)));
            self.stack.pop_bytes(size);
        }
    }

    fn load_var_offset(&self, name: &str) -> (i64, bool) {
        if let Some(slot) = self.stack.offset_of(name) {
            let is_float = self.ctx.lookup_value(name).map(|t| *t == ResolvedType::Float).unwrap_or(false);
            return (slot, is_float);
        }
        let p = self.params.get(name).unwrap_or_else(|| panic!("undeclared variable '{name}' reached codegen"));
        (p.offset, p.is_float)
    }

    // ---- Expressions -----------------------------------------------------

    fn compile_expr(&mut self, expr: &Expr<ResolvedType>) {
        match expr {
            Expr::Int { value, .. } => self.push_int_const(*value),
            Expr::Float { value, .. } => self.push_float_const(*value),
            Expr::True { .. } => self.push_bool_const(true),
            Expr::False { .. } => self.push_bool_const(false),
            Expr::Void { .. } => {}
            Expr::Var { name, info, .. } => self.compile_var(name, info),
            Expr::Unop { op, expr, .. } => self.compile_unop(*op, expr),
            Expr::Binop { op, left, right, .. } => self.compile_binop(*op, left, right),
            Expr::If {
                cond,
                then_branch,
                else_branch,
                info,
                ..
            } => self.compile_if(cond, then_branch, else_branch, info),
            Expr::ArrayLiteral { elements, info, .. } => self.compile_array_literal(elements, info),
            Expr::StructLiteral { name, fields, .. } => self.compile_struct_literal(name, fields),
            Expr::Dot { base, field, info, .. } => self.compile_dot(base, field, info),
            Expr::ArrayIndex { base, indices, info, .. } => self.compile_array_index(base, indices, info),
            Expr::Call { name, args, info, .. } => self.compile_call(name, args, info),
            Expr::ArrayLoop { axes, body, info, .. } => self.compile_array_loop(axes, body, info),
            Expr::SumLoop { axes, body, info, .. } => self.compile_sum_loop(axes, body, info),
        }
    }

    fn compile_var(&mut self, name: &str, ty: &ResolvedType) {
        let (offset, is_float) = self.load_var_offset(name);
        let size = ty.size(self.ctx);
        if size == 8 {
            if is_float {
                self.emit(I::Movsd(Op::Reg(Reg::xmm(0)), Op::mem(format!("rbp+{offset}"))));
                self.push_float_reg(0);
            } else {
                self.emit(I::Mov(Op::Reg(Reg::Rax), Op::mem(format!("rbp+{offset}"))));
                self.push_int_reg(Reg::Rax);
            }
        } else {
            self.push_aggregate_from_rbp(offset, size);
        }
    }

    fn compile_unop(&mut self, op: UnOp, inner: &Expr<ResolvedType>) {
        self.compile_expr(inner);
        match op {
            UnOp::Neg if *inner.info() == ResolvedType::Float => {
                self.pop_float(0);
                self.emit(I::Xor(Op::Reg(Reg::xmm(1)), Op::Reg(Reg::xmm(1))));
                self.emit(I::Subsd(Op::Reg(Reg::xmm(1)), Op::Reg(Reg::xmm(0))));
                self.push_float_reg(1);
            }
            UnOp::Neg => {
                self.pop_int(Reg::Rax);
                self.emit(I::Neg(Op::Reg(Reg::Rax)));
                self.push_int_reg(Reg::Rax);
            }
            UnOp::Not => {
                self.pop_int(Reg::Rax);
                self.emit(I::Xor(Op::Reg(Reg::Rax), Op::Imm(1)));
                self.push_int_reg(Reg::Rax);
            }
        }
    }

    fn compile_binop(&mut self, op: BinOp, left: &Expr<ResolvedType>, right: &Expr<ResolvedType>) {
        if op.is_logical() {
            self.compile_short_circuit(op, left, right);
            return;
        }

        let is_float = *left.info() == ResolvedType::Float;
        self.compile_expr(left);
        self.compile_expr(right);

        if is_float {
            self.pop_float(1);
            self.pop_float(0);
            self.compile_float_binop(op);
        } else {
            self.pop_int(Reg::R10);
            self.pop_int(Reg::Rax);
            self.compile_int_binop(op);
        }
    }

    fn compile_short_circuit(&mut self, op: BinOp, left: &Expr<ResolvedType>, right: &Expr<ResolvedType>) {
        let skip = self.new_label(if op == BinOp::And { "and_short" } else { "or_short" });
        let end = self.new_label("logic_end");
        self.compile_expr(left);
        self.pop_int(Reg::Rax);
        self.emit(I::Cmp(Op::Reg(Reg::Rax), Op::Imm(0)));
        if op == BinOp::And {
            self.emit(I::Je(skip.clone()));
        } else {
            self.emit(I::Jne(skip.clone()));
        }
        self.compile_expr(right);
        self.pop_int(Reg::Rax);
        self.emit(I::Jmp(end.clone()));
        self.emit(I::Label(skip));
        self.emit(I::Mov(Op::Reg(Reg::Rax), Op::Imm(if op == BinOp::And { 0 } else { 1 })));
        self.emit(I::Label(end));
        self.push_int_reg(Reg::Rax);
    }

    fn compile_int_binop(&mut self, op: BinOp) {
        match op {
            BinOp::Add => self.emit(I::Add(Op::Reg(Reg::Rax), Op::Reg(Reg::R10))),
            BinOp::Sub => self.emit(I::Sub(Op::Reg(Reg::Rax), Op::Reg(Reg::R10))),
            BinOp::Mul => self.emit(I::Imul(Op::Reg(Reg::Rax), Op::Reg(Reg::R10))),
            BinOp::Div | BinOp::Mod => {
                let ok = self.new_label("divcheck_ok");
                self.emit(I::Cmp(Op::Reg(Reg::R10), Op::Imm(0)));
                self.emit(I::Jne(ok.clone()));
                let msg = if op == BinOp::Div { "divide by zero" } else { "mod by zero" };
                let label = self.str_label(msg);
                self.emit(I::Lea(Op::Reg(Reg::Rdi), Op::mem(format!("rel {label}"))));
                self.emit(I::Call("_fail_assertion".to_string()));
                self.emit(I::Label(ok));
                self.emit(I::Cqo);
                self.emit(I::Idiv(Op::Reg(Reg::R10)));
                if op == BinOp::Mod {
                    self.emit(I::Mov(Op::Reg(Reg::Rax), Op::Reg(Reg::Rdx)));
                }
            }
            BinOp::Lt => self.compile_int_compare(I::Setl(Op::Reg(Reg::Al))),
            BinOp::Gt => self.compile_int_compare(I::Setg(Op::Reg(Reg::Al))),
            BinOp::Le => self.compile_int_compare(I::Setle(Op::Reg(Reg::Al))),
            BinOp::Ge => self.compile_int_compare(I::Setge(Op::Reg(Reg::Al))),
            BinOp::Eq => self.compile_int_compare(I::Sete(Op::Reg(Reg::Al))),
            BinOp::Ne => self.compile_int_compare(I::Setne(Op::Reg(Reg::Al))),
            BinOp::And | BinOp::Or => unreachable!("short-circuited separately"),
        }
        self.push_int_reg(Reg::Rax);
    }

    fn compile_int_compare(&mut self, set: I) {
        self.emit(I::Cmp(Op::Reg(Reg::Rax), Op::Reg(Reg::R10)));
        self.emit(I::Mov(Op::Reg(Reg::Rax), Op::Imm(0)));
        self.emit(set);
    }

    fn compile_float_binop(&mut self, op: BinOp) {
        match op {
            BinOp::Add => {
                self.emit(I::Addsd(Op::Reg(Reg::xmm(0)), Op::Reg(Reg::xmm(1))));
                self.push_float_reg(0);
            }
            BinOp::Sub => {
                self.emit(I::Subsd(Op::Reg(Reg::xmm(0)), Op::Reg(Reg::xmm(1))));
                self.push_float_reg(0);
            }
            BinOp::Mul => {
                self.emit(I::Mulsd(Op::Reg(Reg::xmm(0)), Op::Reg(Reg::xmm(1))));
                self.push_float_reg(0);
            }
            BinOp::Div => {
                self.emit(I::Divsd(Op::Reg(Reg::xmm(0)), Op::Reg(Reg::xmm(1))));
                self.push_float_reg(0);
            }
            BinOp::Mod => {
                self.emit(I::Call("_fmod".to_string()));
                self.push_float_reg(0);
            }
            BinOp::Lt => self.compile_float_compare(I::Setb(Op::Reg(Reg::Al))),
            BinOp::Gt => self.compile_float_compare(I::Seta(Op::Reg(Reg::Al))),
            BinOp::Le => self.compile_float_compare(I::Setbe(Op::Reg(Reg::Al))),
            BinOp::Ge => self.compile_float_compare(I::Setae(Op::Reg(Reg::Al))),
            BinOp::Eq => self.compile_float_compare(I::Sete(Op::Reg(Reg::Al))),
            BinOp::Ne => self.compile_float_compare(I::Setne(Op::Reg(Reg::Al))),
            BinOp::And | BinOp::Or => unreachable!("short-circuited separately"),
        }
    }

    fn compile_float_compare(&mut self, set: I) {
        self.emit(I::Comisd(Op::Reg(Reg::xmm(0)), Op::Reg(Reg::xmm(1))));
        self.emit(I::Mov(Op::Reg(Reg::Rax), Op::Imm(0)));
        self.emit(set);
        self.emit(I::Movzx(Op::Reg(Reg::Rax), Op::Reg(Reg::Al)));
        self.push_int_reg(Reg::Rax);
    }

    fn compile_if(&mut self, cond: &Expr<ResolvedType>, then_branch: &Expr<ResolvedType>, else_branch: &Expr<ResolvedType>, info: &ResolvedType) {
        // `-O1`: `if c then 1 else 0` collapses to just the condition's Bool value (spec.md §4.5).
        if self.opt && *info == ResolvedType::Bool && is_bool_literal(then_branch, true) && is_bool_literal(else_branch, false) {
            self.compile_expr(cond);
            return;
        }

        let else_label = self.new_label("if_else");
        let end_label = self.new_label("if_end");

        self.compile_expr(cond);
        self.pop_int(Reg::Rax);
        self.emit(I::Cmp(Op::Reg(Reg::Rax), Op::Imm(0)));
        self.emit(I::Je(else_label.clone()));

        // Only one branch runs at runtime, but the shadow stack would otherwise see both pushes.
        // Pop the then-branch's result from the model (no real instruction) before the else-branch
        // pushes its own, so the model matches the real stack's single `size` bytes either way.
        self.compile_expr(then_branch);
        self.emit(I::Jmp(end_label.clone()));
        self.stack.pop_bytes(info.size(self.ctx));

        self.emit(I::Label(else_label));
        self.compile_expr(else_branch);

        self.emit(I::Label(end_label));
    }

    fn compile_array_literal(&mut self, elements: &[Expr<ResolvedType>], info: &ResolvedType) {
        let elem_ty = info.element_type().unwrap();
        let elem_size = elem_ty.size(self.ctx);
        let n = elements.len() as i64;

        for element in elements {
            self.compile_expr(element);
        }

        self.emit(I::Mov(Op::Reg(Reg::Rdi), Op::Imm(n * elem_size.max(8))));
        self.emit(I::Call("_jpl_alloc".to_string()));
        // rax now holds the data pointer; copy the evaluated elements (still on the stack, in
        // forward order since each push grew the stack downward) into the allocation.
        for i in (0..elements.len()).rev() {
            self.emit(I::Pop(Op::Reg(Reg::R10)));
            self.stack.pop();
            self.emit(I::Mov(Op::mem(format!("rax+{}", i as i64 * elem_size)), Op::Reg(Reg::R10)));
        }
        self.push_int_reg(Reg::Rax);
        self.push_int_const(n);
        self.stack.recharacterize(2, 16, None);
    }

    fn compile_struct_literal(&mut self, name: &str, fields: &[Expr<ResolvedType>]) {
        for field in fields {
            self.compile_expr(field);
        }
        let total: i64 = fields.iter().map(|f| f.info().size(self.ctx)).sum();
        let _ = name;
        self.stack.recharacterize(fields.len(), total, None);
    }

    fn compile_dot(&mut self, base: &Expr<ResolvedType>, field: &str, info: &ResolvedType) {
        let ResolvedType::Struct(struct_name) = base.info() else {
            unreachable!("type checker guarantees Dot bases are structs")
        };
        let fields = self.ctx.lookup_struct(struct_name).unwrap_or(&[]).to_vec();
        let mut preceding = 0i64;
        let mut field_size = 0i64;
        for (fname, fty) in &fields {
            if fname == field {
                field_size = fty.size(self.ctx);
                break;
            }
            preceding += fty.size(self.ctx);
        }

        self.compile_expr(base);
        let base_size = base.info().size(self.ctx);
        let trailing = base_size - preceding - field_size;
        self.drop_bytes(trailing);
        self.copy_top_down(field_size, preceding);
    }

    /// After a value of `total` bytes sits on top of the stack, remove `skip` bytes from the
    /// bottom of it and `total - skip - keep` bytes already dropped from the top, leaving just
    /// the `keep`-byte slice starting `skip` bytes in. Used by `Dot` to project one field out of
    /// a struct already materialized on the stack.
    fn copy_top_down(&mut self, keep: i64, skip: i64) {
        if skip == 0 {
            return;
        }
        let words = keep / 8;
        for i in 0..words {
            self.emit(I::Mov(Op::Reg(Reg::Rax), Op::mem(format!("rsp+{}", i * 8))));
            self.emit(I::Mov(Op::mem(format!("rsp+{}", skip + i * 8)), Op::Reg(Reg::Rax)));
        }
        self.emit(I::Add(Op::Reg(Reg::Rsp), Op::Imm(skip)));
        self.stack.pop_bytes(skip);
    }

    fn compile_array_index(&mut self, base: &Expr<ResolvedType>, indices: &[Expr<ResolvedType>], info: &ResolvedType) {
        let rank = indices.len();

        // `-O1`: when the base is a bare variable, read its shape directly from its frame slot
        // instead of materializing the whole array on the stack first (spec.md §4.5 (f)).
        let direct_var = if self.opt {
            if let Expr::Var { name, .. } = base {
                Some((self.load_var_offset(name).0, name.clone()))
            } else {
                None
            }
        } else {
            None
        };

        let data_reg = Reg::Rax;
        let mut dim_offsets = Vec::with_capacity(rank);
        if let Some((base_off, _)) = &direct_var {
            self.emit(I::Mov(Op::Reg(data_reg), Op::mem(format!("rbp+{base_off}"))));
            for i in 0..rank {
                dim_offsets.push(format!("rbp+{}", base_off + 8 + i as i64 * 8));
            }
        } else {
            self.compile_expr(base);
            let base_size = base.info().size(self.ctx);
            // Data pointer is the first qword of the array value sitting on the stack top.
            self.emit(I::Mov(Op::Reg(data_reg), Op::mem("rsp")));
            for i in 0..rank {
                dim_offsets.push(format!("rsp+{}", (i as i64 + 1) * 8));
            }
            let _ = base_size;
        }

        for (i, index_expr) in indices.iter().enumerate() {
            self.compile_expr(index_expr);
            self.pop_int(Reg::R10);
            self.emit(I::Cmp(Op::Reg(Reg::R10), Op::Imm(0)));
            let ok1 = self.new_label("idx_nonneg");
            self.emit(I::Jge(ok1.clone()));
            let msg = self.str_label("negative array index");
            self.emit(I::Lea(Op::Reg(Reg::Rdi), Op::mem(format!("rel {msg}"))));
            self.emit(I::Call("_fail_assertion".to_string()));
            self.emit(I::Label(ok1));

            self.emit(I::Mov(Op::Reg(Reg::R11), Op::mem(dim_offsets[i].clone())));
            self.emit(I::Cmp(Op::Reg(Reg::R10), Op::Reg(Reg::R11)));
            let ok2 = self.new_label("idx_in_bounds");
            self.emit(I::Jl(ok2.clone()));
            let msg = self.str_label("array index out of bounds");
            self.emit(I::Lea(Op::Reg(Reg::Rdi), Op::mem(format!("rel {msg}"))));
            self.emit(I::Call("_fail_assertion".to_string()));
            self.emit(I::Label(ok2));

            if i == 0 {
                self.emit(I::Mov(Op::Reg(Reg::Rbx), Op::Reg(Reg::R10)));
            } else {
                self.emit(I::Imul(Op::Reg(Reg::Rbx), Op::Reg(Reg::R11)));
                self.emit(I::Add(Op::Reg(Reg::Rbx), Op::Reg(Reg::R10)));
            }
        }

        let elem_size = info.size(self.ctx);
        self.emit(I::Imul(Op::Reg(Reg::Rbx), Op::Imm(elem_size)));
        self.emit(I::Add(Op::Reg(Reg::Rax), Op::Reg(Reg::Rbx)));

        if direct_var.is_none() {
            self.drop_bytes(base.info().size(self.ctx));
        }

        if elem_size == 8 {
            self.emit(I::Mov(Op::Reg(Reg::Rax), Op::mem("rax")));
            self.push_int_reg(Reg::Rax);
        } else {
            self.emit(I::Sub(Op::Reg(Reg::Rsp), Op::Imm(elem_size)));
            for w in 0..elem_size / 8 {
                self.emit(I::Mov(Op::Reg(Reg::R10), Op::mem(format!("rax+{}", w * 8))));
                self.emit(I::Mov(Op::mem(format!("rsp+{}", w * 8)), Op::Reg(Reg::R10)));
            }
            self.stack.push(elem_size);
        }
    }

    fn compile_call(&mut self, name: &str, args: &[Expr<ResolvedType>], info: &ResolvedType) {
        let (param_types, _) = self
            .ctx
            .lookup_fn(name)
            .map(|(p, r)| (p.to_vec(), r.clone()))
            .unwrap_or_else(|| (Vec::new(), ResolvedType::Void));
        let is_aggregate_return = !matches!(info, ResolvedType::Int | ResolvedType::Float | ResolvedType::Bool | ResolvedType::Void);

        let mut int_args = Vec::new();
        let mut float_args = Vec::new();
        let mut stack_args = Vec::new();
        for (arg, ty) in args.iter().zip(param_types.iter().chain(std::iter::repeat(&ResolvedType::Int))) {
            match ty {
                ResolvedType::Float => float_args.push(arg),
                ResolvedType::Int | ResolvedType::Bool => int_args.push(arg),
                _ => stack_args.push(arg),
            }
        }

        let extra = if is_aggregate_return { 8 } else { 0 };
        self.stack.align(extra + 8 * stack_args.len() as i64);

        for arg in stack_args.iter().rev() {
            self.compile_expr(arg);
        }
        for arg in int_args.iter().rev() {
            self.compile_expr(arg);
        }
        for arg in float_args.iter().rev() {
            self.compile_expr(arg);
        }

        // Args were pushed right-to-left, so arg0 is on top; pop in forward order so arg0 lands
        // in the first register (rdi/xmm0), arg1 in the second, and so on.
        for (i, _) in float_args.iter().enumerate() {
            self.pop_float(i as u8);
        }
        for (reg, _) in Reg::INT_ARGS.iter().zip(int_args.iter()) {
            self.pop_int(*reg);
        }

        if is_aggregate_return {
            let ret_size = info.size(self.ctx);
            self.emit(I::Sub(Op::Reg(Reg::Rsp), Op::Imm(ret_size)));
            self.stack.push(ret_size);
            self.emit(I::Lea(Op::Reg(Reg::Rdi), Op::mem("rsp")));
        }

        self.emit(I::Call(name.to_string()));
        self.stack.unalign();

        for _ in stack_args {
            self.drop_bytes(8);
        }

        if !is_aggregate_return {
            match info {
                ResolvedType::Float => self.push_float_reg(0),
                ResolvedType::Void => {}
                _ => self.push_int_reg(Reg::Rax),
            }
        }
    }

    /// Push each axis's bound (asserted non-negative), named `__bound_{axis}`, in *reverse* axis
    /// order -- since `push` grows the stack toward lower addresses, this leaves the bounds
    /// contiguous in memory in forward axis order immediately above whatever is pushed next,
    /// matching the `[data_ptr][dim0][dim1]...` layout `compile_var`/`compile_array_index` read.
    fn push_axis_bounds(&mut self, axes: &[(String, Expr<ResolvedType>)], bound_msg: &str) {
        for (name, bound) in axes.iter().rev() {
            self.compile_expr(bound);
            self.pop_int(Reg::Rax);
            self.emit(I::Cmp(Op::Reg(Reg::Rax), Op::Imm(0)));
            let ok = self.new_label("axis_nonneg");
            self.emit(I::Jge(ok.clone()));
            let msg = self.str_label(bound_msg);
            self.emit(I::Lea(Op::Reg(Reg::Rdi), Op::mem(format!("rel {msg}"))));
            self.emit(I::Call("_fail_assertion".to_string()));
            self.emit(I::Label(ok));
            self.push_int_reg(Reg::Rax);
            self.stack.add_lvalue(format!("__bound_{name}"));
        }
    }

    /// Emit the loop headers for each axis (counter initialized to 0, compared against its
    /// bound), returning the matching `(start_label, end_label)` pairs in axis order. The caller
    /// emits the loop body, then [`Self::close_axis_loops`] with the same list.
    fn open_axis_loops(&mut self, axes: &[(String, Expr<ResolvedType>)]) -> Vec<(String, String)> {
        let mut labels = Vec::new();
        for (name, _) in axes {
            self.push_int_const(0);
            self.stack.add_lvalue(name.clone());

            let start = self.new_label("axis_start");
            let end = self.new_label("axis_end");
            self.emit(I::Label(start.clone()));
            let counter_off = self.stack.offset_of(name).unwrap();
            let bound_off = self.stack.offset_of(&format!("__bound_{name}")).unwrap();
            self.emit(I::Mov(Op::Reg(Reg::Rax), Op::mem(format!("rbp+{counter_off}"))));
            self.emit(I::Cmp(Op::Reg(Reg::Rax), Op::mem(format!("rbp+{bound_off}"))));
            self.emit(I::Jge(end.clone()));
            labels.push((start, end));
        }
        labels
    }

    fn close_axis_loops(&mut self, axes: &[(String, Expr<ResolvedType>)], labels: Vec<(String, String)>) {
        for ((name, _), (start, end)) in axes.iter().zip(labels).rev() {
            let counter_off = self.stack.offset_of(name).unwrap();
            self.emit(I::Mov(Op::Reg(Reg::Rax), Op::mem(format!("rbp+{counter_off}"))));
            self.emit(I::Add(Op::Reg(Reg::Rax), Op::Imm(1)));
            self.emit(I::Mov(Op::mem(format!("rbp+{counter_off}")), Op::Reg(Reg::Rax)));
            self.emit(I::Jmp(start));
            self.emit(I::Label(end));
        }
        for _ in axes {
            self.drop_bytes(8); // counters
        }
    }

    /// Compute the row-major linear element index from the axis counters into `dst`.
    fn compile_linear_index(&mut self, axes: &[(String, Expr<ResolvedType>)], dst: Reg) {
        self.emit(I::Mov(Op::Reg(dst), Op::Imm(0)));
        for (name, _) in axes {
            let counter_off = self.stack.offset_of(name).unwrap();
            let bound_off = self.stack.offset_of(&format!("__bound_{name}")).unwrap();
            self.emit(I::Imul(Op::Reg(dst), Op::mem(format!("rbp+{bound_off}"))));
            self.emit(I::Mov(Op::Reg(Reg::R11), Op::mem(format!("rbp+{counter_off}"))));
            self.emit(I::Add(Op::Reg(dst), Op::Reg(Reg::R11)));
        }
    }

    fn compile_array_loop(&mut self, axes: &[(String, Expr<ResolvedType>)], body: &Expr<ResolvedType>, info: &ResolvedType) {
        let elem_ty = info.element_type().unwrap().clone();
        let elem_size = elem_ty.size(self.ctx);

        self.push_axis_bounds(axes, "negative array loop bound");

        self.emit(I::Mov(Op::Reg(Reg::Rax), Op::Imm(1)));
        for (name, _) in axes {
            let off = self.stack.offset_of(&format!("__bound_{name}")).unwrap();
            self.emit(I::Imul(Op::Reg(Reg::Rax), Op::mem(format!("rbp+{off}"))));
            let ok = self.new_label("size_no_overflow");
            self.emit(I::Jno(ok.clone()));
            let msg = self.str_label("overflow computing array size");
            self.emit(I::Lea(Op::Reg(Reg::Rdi), Op::mem(format!("rel {msg}"))));
            self.emit(I::Call("_fail_assertion".to_string()));
            self.emit(I::Label(ok));
        }
        self.emit(I::Imul(Op::Reg(Reg::Rax), Op::Imm(elem_size.max(8))));
        self.emit(I::Mov(Op::Reg(Reg::Rdi), Op::Reg(Reg::Rax)));
        self.emit(I::Call("_jpl_alloc".to_string()));
        self.push_int_reg(Reg::Rax);
        self.stack.add_lvalue("__array_loop_data".to_string());

        let labels = self.open_axis_loops(axes);

        self.compile_linear_index(axes, Reg::Rbx);
        let data_off = self.stack.offset_of("__array_loop_data").unwrap();
        self.emit(I::Mov(Op::Reg(Reg::Rax), Op::mem(format!("rbp+{data_off}"))));
        self.emit(I::Imul(Op::Reg(Reg::Rbx), Op::Imm(elem_size.max(8))));
        self.emit(I::Add(Op::Reg(Reg::Rax), Op::Reg(Reg::Rbx)));
        self.emit(I::Push(Op::Reg(Reg::Rax)));
        self.stack.push(8);

        self.compile_expr(body);
        if elem_size == 8 {
            match elem_ty {
                ResolvedType::Float => self.pop_float(0),
                _ => self.pop_int(Reg::Rax),
            }
            self.pop_int(Reg::R10);
            if elem_ty == ResolvedType::Float {
                self.emit(I::Movsd(Op::mem("r10"), Op::Reg(Reg::xmm(0))));
            } else {
                self.emit(I::Mov(Op::mem("r10"), Op::Reg(Reg::Rax)));
            }
        } else {
            self.emit(I::Pop(Op::Reg(Reg::R10)));
            self.stack.pop();
            for w in 0..elem_size / 8 {
                self.emit(I::Mov(Op::Reg(Reg::Rax), Op::mem(format!("rsp+{}", w * 8))));
                self.emit(I::Mov(Op::mem(format!("r10+{}", w * 8)), Op::Reg(Reg::Rax)));
            }
            self.drop_bytes(elem_size);
        }

        self.close_axis_loops(axes, labels);

        // Stack now holds (top to bottom): data pointer, then bounds in forward axis order --
        // combine into one Array-typed slot, as compile_array_literal does for its pointer+length.
        self.stack.recharacterize(axes.len() + 1, 8 * (axes.len() as i64 + 1), None);
    }

    fn compile_sum_loop(&mut self, axes: &[(String, Expr<ResolvedType>)], body: &Expr<ResolvedType>, info: &ResolvedType) {
        let is_float = *info == ResolvedType::Float;
        if is_float {
            self.push_float_const(0.0);
        } else {
            self.push_int_const(0);
        }
        self.stack.add_lvalue("__sum_accum".to_string());

        self.push_axis_bounds(axes, "negative sum loop bound");
        let labels = self.open_axis_loops(axes);

        self.compile_expr(body);
        let accum_off = self.stack.offset_of("__sum_accum").unwrap();
        if is_float {
            self.pop_float(0);
            self.emit(I::Movsd(Op::Reg(Reg::xmm(1)), Op::mem(format!("rbp+{accum_off}"))));
            self.emit(I::Addsd(Op::Reg(Reg::xmm(1)), Op::Reg(Reg::xmm(0))));
            self.emit(I::Movsd(Op::mem(format!("rbp+{accum_off}")), Op::Reg(Reg::xmm(1))));
        } else {
            self.pop_int(Reg::Rax);
            self.emit(I::Add(Op::mem(format!("rbp+{accum_off}")), Op::Reg(Reg::Rax)));
        }

        self.close_axis_loops(axes, labels);
        self.drop_bytes(8 * axes.len() as i64); // bounds
    }

    // ---- Commands -----------------------------------------------------

    fn compile_stmt(&mut self, stmt: &Stmt<ResolvedType>) {
        match stmt {
            Stmt::Let { lvalue, expr, .. } => {
                self.compile_expr(expr);
                self.bind_lvalue(lvalue, expr.info());
            }
            Stmt::Assert { expr, message, .. } => self.compile_assert(expr, message),
            Stmt::Return { expr, .. } => {
                self.compile_expr(expr);
                match expr.info() {
                    ResolvedType::Float => self.pop_float(0),
                    ResolvedType::Void => {}
                    _ => self.pop_int(Reg::Rax),
                }
                self.emit(I::Mov(Op::Reg(Reg::Rsp), Op::Reg(Reg::Rbp)));
                self.emit(I::Pop(Op::Reg(Reg::Rbp)));
                self.emit(I::Ret);
            }
        }
    }

    fn bind_lvalue(&mut self, lvalue: &LValue, ty: &ResolvedType) {
        match lvalue {
            LValue::Var { name, .. } => self.stack.add_lvalue(name.clone()),
            LValue::Array { name, indices, .. } => {
                self.stack.add_lvalue(name.clone());
                let base_off = self.stack.offset_of(name).unwrap();
                for (i, index_name) in indices.iter().enumerate() {
                    // Dimension lengths live right after the data pointer in the array value.
                    self.params.insert(
                        index_name.clone(),
                        ParamSlot {
                            offset: base_off + 8 + i as i64 * 8,
                            is_float: false,
                        },
                    );
                }
                let _ = ty;
            }
        }
    }

    fn compile_assert(&mut self, expr: &Expr<ResolvedType>, message: &str) {
        self.compile_expr(expr);
        self.pop_int(Reg::Rax);
        self.emit(I::Cmp(Op::Reg(Reg::Rax), Op::Imm(0)));
        let ok = self.new_label("assert_ok");
        self.emit(I::Jne(ok.clone()));
        let label = self.str_label(message);
        self.emit(I::Lea(Op::Reg(Reg::Rdi), Op::mem(format!("rel {label}"))));
        self.emit(I::Call("_fail_assertion".to_string()));
        self.emit(I::Label(ok));
    }

    fn compile_cmd(&mut self, cmd: &Cmd<ResolvedType>) {
        match cmd {
            Cmd::Read { file, lvalue, .. } => {
                let ty = ResolvedType::array(ResolvedType::Struct("rgba".to_string()), 2);
                let size = ty.size(self.ctx);
                self.emit(I::Sub(Op::Reg(Reg::Rsp), Op::Imm(size)));
                self.stack.push(size);
                self.stack.align(0);
                self.emit(I::Lea(Op::Reg(Reg::Rdi), Op::mem("rsp")));
                let label = self.str_label(file);
                self.emit(I::Lea(Op::Reg(Reg::Rsi), Op::mem(format!("rel {label}"))));
                self.emit(I::Call("_read_image".to_string()));
                self.stack.unalign();
                self.bind_lvalue(lvalue, &ty);
            }
            Cmd::Write { expr, file, .. } => {
                self.compile_expr(expr);
                self.stack.align(0);
                self.emit(I::Lea(Op::Reg(Reg::Rdi), Op::mem("rsp")));
                let label = self.str_label(file);
                self.emit(I::Lea(Op::Reg(Reg::Rsi), Op::mem(format!("rel {label}"))));
                self.emit(I::Call("_write_image".to_string()));
                self.stack.unalign();
                self.drop_bytes(expr.info().size(self.ctx));
            }
            Cmd::Let { lvalue, expr, .. } => {
                self.compile_expr(expr);
                self.bind_lvalue(lvalue, expr.info());
            }
            Cmd::Assert { expr, message, .. } => self.compile_assert(expr, message),
            Cmd::Print { message, .. } => {
                let label = self.str_label(message);
                self.emit(I::Lea(Op::Reg(Reg::Rdi), Op::mem(format!("rel {label}"))));
                self.stack.align(0);
                self.emit(I::Call("_print".to_string()));
                self.stack.unalign();
            }
            Cmd::Show { expr, .. } => {
                self.compile_expr(expr);
                self.stack.align(0);
                let type_desc = crate::printer::sexpr_type_for_show(expr.info(), self.ctx);
                let label = self.str_label(&type_desc);
                self.emit(I::Lea(Op::Reg(Reg::Rdi), Op::mem(format!("rel {label}"))));
                self.emit(I::Lea(Op::Reg(Reg::Rsi), Op::mem("rsp")));
                self.emit(I::Call("_show".to_string()));
                self.stack.unalign();
                self.drop_bytes(expr.info().size(self.ctx));
            }
            Cmd::Time { cmd, .. } => {
                self.stack.align(0);
                self.emit(I::Call("_get_time".to_string()));
                self.stack.unalign();
                self.push_float_reg(0);
                self.compile_cmd(cmd);
                self.stack.align(0);
                self.emit(I::Call("_get_time".to_string()));
                self.stack.unalign();
                self.push_float_reg(0);
                self.pop_float(1);
                self.pop_float(0);
                self.stack.align(0);
                self.emit(I::Call("_print_time".to_string()));
                self.stack.unalign();
            }
            Cmd::Fn { .. } | Cmd::Struct { .. } => {}
        }
    }

    fn compile_fn(&mut self, name: &str, params: &[crate::parser::ast::Binding], body: &[Stmt<ResolvedType>], out: &mut Vec<I>) {
        self.stack.reset();
        self.params.clear();
        self.text.clear();

        self.emit(I::Label(name.to_string()));
        self.emit(I::Push(Op::Reg(Reg::Rbp)));
        self.emit(I::Mov(Op::Reg(Reg::Rbp), Op::Reg(Reg::Rsp)));

        // Spill register-passed parameters onto the frame so every parameter, float or int, has
        // a stable `rbp`-relative home the rest of codegen can address uniformly. Stack-passed
        // aggregates already live at a fixed positive `rbp` offset established by the caller
        // (spec.md §11): `rbp+16` for the first, growing by each prior stack argument's size.
        let mut int_i = 0usize;
        let mut float_i = 0u8;
        let mut stack_off = 16i64;
        for param in params {
            let name = param.lvalue.name().to_string();
            let ty = param.ty.to_resolved();
            match ty {
                ResolvedType::Float => {
                    self.emit(I::Sub(Op::Reg(Reg::Rsp), Op::Imm(8)));
                    self.emit(I::Movsd(Op::mem("rsp"), Op::Reg(Reg::xmm(float_i))));
                    self.stack.push_named(name.clone(), 8);
                    float_i += 1;
                }
                ResolvedType::Int | ResolvedType::Bool => {
                    let reg = Reg::INT_ARGS[int_i];
                    self.push_int_reg(reg);
                    self.stack.add_lvalue(name.clone());
                    int_i += 1;
                }
                _ => {
                    self.params.insert(
                        name.clone(),
                        ParamSlot {
                            offset: stack_off,
                            is_float: false,
                        },
                    );
                    if let LValue::Array { indices, .. } = &param.lvalue {
                        for (i, idx_name) in indices.iter().enumerate() {
                            self.params.insert(
                                idx_name.clone(),
                                ParamSlot {
                                    offset: stack_off + 8 + i as i64 * 8,
                                    is_float: false,
                                },
                            );
                        }
                    }
                    stack_off += ty.size(self.ctx);
                }
            }
        }

        for stmt in body {
            self.compile_stmt(stmt);
        }

        // A `Void` function with no explicit `return` still needs an epilogue.
        self.emit(I::Mov(Op::Reg(Reg::Rsp), Op::Reg(Reg::Rbp)));
        self.emit(I::Pop(Op::Reg(Reg::Rbp)));
        self.emit(I::Ret);

        out.append(&mut self.text);
    }

    fn compile_jpl_main(&mut self, program: &Program<ResolvedType>, out: &mut Vec<I>) {
        self.stack.reset();
        self.params.clear();
        self.text.clear();

        self.emit(I::Label("jpl_main".to_string()));
        self.emit(I::Push(Op::Reg(Reg::Rbp)));
        self.emit(I::Push(Op::Reg(Reg::R12)));
        self.emit(I::Mov(Op::Reg(Reg::Rbp), Op::Reg(Reg::Rsp)));
        self.emit(I::Mov(Op::Reg(Reg::R12), Op::Reg(Reg::Rbp)));

        self.params.insert(
            "argnum".to_string(),
            ParamSlot { offset: 16, is_float: false },
        );
        self.params.insert(
            "args".to_string(),
            ParamSlot { offset: 24, is_float: false },
        );

        for cmd in &program.cmds {
            self.compile_cmd(cmd);
        }

        self.emit(I::Pop(Op::Reg(Reg::R12)));
        self.emit(I::Pop(Op::Reg(Reg::Rbp)));
        self.emit(I::Ret);

        out.append(&mut self.text);
    }
}

fn is_bool_literal(expr: &Expr<ResolvedType>, want_true: bool) -> bool {
    matches!(
        (expr, want_true),
        (Expr::Int { value: 1, .. }, true) | (Expr::Int { value: 0, .. }, false)
    )
}

/// Emit complete NASM source for a type-checked program.
pub fn emit_asm(program: &Program<ResolvedType>, ctx: &Context, opt: bool) -> String {
    let mut gen = AsmGen::new(ctx, opt);
    let mut text = vec![
        I::Raw("default rel".to_string()),
        I::Global("jpl_main".to_string()),
        I::Global("_jpl_main".to_string()),
        I::Extern("_fail_assertion".to_string()),
        I::Extern("_jpl_alloc".to_string()),
        I::Extern("_read_image".to_string()),
        I::Extern("_write_image".to_string()),
        I::Extern("_show".to_string()),
        I::Extern("_print".to_string()),
        I::Extern("_get_time".to_string()),
        I::Extern("_print_time".to_string()),
        I::Extern("_fmod".to_string()),
        I::Extern("_sqrt".to_string()),
        I::Extern("_exp".to_string()),
        I::Extern("_sin".to_string()),
        I::Extern("_cos".to_string()),
        I::Extern("_tan".to_string()),
        I::Extern("_asin".to_string()),
        I::Extern("_acos".to_string()),
        I::Extern("_atan".to_string()),
        I::Extern("_atan2".to_string()),
        I::Extern("_log".to_string()),
        I::Extern("_pow".to_string()),
        I::Extern("_to_int".to_string()),
        I::Extern("_to_float".to_string()),
        I::Section(".text".to_string()),
    ];

    for cmd in &program.cmds {
        if let Cmd::Fn { name, params, body, .. } = cmd {
            gen.compile_fn(name, params, body, &mut text);
        }
    }
    gen.compile_jpl_main(program, &mut text);

    let mut data = Vec::new();
    gen.emit_data_section(&mut data);

    let mut out = String::new();
    for instr in data.into_iter().chain(text) {
        out.push_str(&instr.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;
    use crate::typechecker::typecheck_program;

    fn compile(src: &str, opt: bool) -> String {
        let program = parse_program(src).unwrap();
        let (typed, ctx) = typecheck_program(&program).unwrap();
        emit_asm(&typed, &ctx, opt)
    }

    #[test]
    fn emits_jpl_main_label_and_epilogue() {
        let asm = compile("show 3+4\n", false);
        assert!(asm.contains("jpl_main:"));
        assert!(asm.contains("global jpl_main"));
        assert!(asm.contains("\tret"));
    }

    #[test]
    fn function_uses_system_v_argument_registers() {
        let asm = compile("fn f(a : int, b : float) : float {\n  return b + to_float(a)\n}\nshow f(3, 1.5)\n", false);
        assert!(asm.contains("f:"));
        assert!(asm.contains("push\trdi"));
        assert!(asm.contains("movsd\t[rsp], xmm0"));
    }

    #[test]
    fn int_division_checks_for_zero() {
        let asm = compile("show 3/0\n", false);
        assert!(asm.contains("divide by zero"));
    }

    #[test]
    fn minus_one_opt_materializes_immediate_not_data_label() {
        let asm = compile("show 1+2\n", true);
        assert!(asm.contains("mov\trax, 1"));
    }

    #[test]
    fn call_with_two_int_args_pops_arg0_into_first_register() {
        let asm = compile("fn sub(a : int, b : int) : int {\n  return a - b\n}\nshow sub(10, 3)\n", false);
        let call_site = asm.find("call\tsub").expect("call to sub emitted");
        let preceding = &asm[..call_site];
        let rdi_pop = preceding.rfind("pop\trdi").expect("arg0 popped into rdi");
        let rsi_pop = preceding.rfind("pop\trsi").expect("arg1 popped into rsi");
        assert!(rdi_pop < rsi_pop, "arg0 (top of stack) must pop into rdi before arg1 pops into rsi");
    }

    #[test]
    fn if_expression_leaves_shadow_stack_balanced() {
        let asm = compile(
            "fn f() : int {\n  let x = if true then 1 else 2\n  let y = x + 1\n  return y\n}\nshow f()\n",
            false,
        );
        assert!(asm.contains("f:"));
    }
}
