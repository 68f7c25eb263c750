//! NASM instruction emission.
//!
//! Follows the teacher's `Instruction`/`InstructionOperand` enum shape (`src/asm/mod.rs`): each
//! variant is one mnemonic, rendered by a `Display` impl instead of being assembled by hand at
//! each call site. Extended with the SSE and comparison/jump variants x86-64 System V float and
//! control-flow lowering need that the teacher's integer-only Y backend didn't.

use std::fmt;

use super::reg::Reg;

#[derive(Debug, Clone)]
pub enum Operand {
    Reg(Reg),
    Imm(i64),
    /// `[rel label]` or `[rbp-16]`-style memory reference, already fully rendered.
    Mem(String),
    Label(String),
}

impl Operand {
    pub fn mem(expr: impl Into<String>) -> Self {
        Operand::Mem(expr.into())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(r) => write!(f, "{r}"),
            Operand::Imm(v) => write!(f, "{v}"),
            Operand::Mem(expr) => write!(f, "[{expr}]"),
            Operand::Label(l) => write!(f, "{l}"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Instruction {
    Comment(String),
    Label(String),
    Global(String),
    Extern(String),
    Section(String),
    DataQword(String, i64),
    DataFloat(String, f64),
    DataString(String, String),
    Mov(Operand, Operand),
    Movsd(Operand, Operand),
    Movzx(Operand, Operand),
    Lea(Operand, Operand),
    Add(Operand, Operand),
    Sub(Operand, Operand),
    Imul(Operand, Operand),
    Idiv(Operand),
    Cqo,
    Neg(Operand),
    Not(Operand),
    Shl(Operand, i64),
    Sar(Operand, i64),
    And(Operand, Operand),
    Or(Operand, Operand),
    Xor(Operand, Operand),
    Addsd(Operand, Operand),
    Subsd(Operand, Operand),
    Mulsd(Operand, Operand),
    Divsd(Operand, Operand),
    Comisd(Operand, Operand),
    Cvtsi2sd(Operand, Operand),
    Cvttsd2si(Operand, Operand),
    Cmp(Operand, Operand),
    Sete(Operand),
    Setne(Operand),
    Setl(Operand),
    Setle(Operand),
    Setg(Operand),
    Setge(Operand),
    Setb(Operand),
    Setbe(Operand),
    Seta(Operand),
    Setae(Operand),
    Jmp(String),
    Je(String),
    Jne(String),
    Jl(String),
    Jle(String),
    Jg(String),
    Jge(String),
    Jno(String),
    Call(String),
    Push(Operand),
    Pop(Operand),
    Ret,
    Raw(String),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        let value = match self {
            Comment(c) => format!(" ; {c}"),
            Label(l) => format!("{l}:"),
            Global(name) => format!("global {name}"),
            Extern(name) => format!("extern {name}"),
            Section(name) => format!("section {name}"),
            DataQword(label, v) => format!("\t{label}: dq {v}"),
            DataFloat(label, v) => format!("\t{label}: dq {v:?}"),
            DataString(label, s) => format!("\t{label}: db `{}`, 0", escape_nasm(s)),
            Mov(t, s) => format!("\tmov\t{t}, {s}"),
            Movsd(t, s) => format!("\tmovsd\t{t}, {s}"),
            Movzx(t, s) => format!("\tmovzx\t{t}, {s}"),
            Lea(t, s) => format!("\tlea\t{t}, {s}"),
            Add(t, s) => format!("\tadd\t{t}, {s}"),
            Sub(t, s) => format!("\tsub\t{t}, {s}"),
            Imul(t, s) => format!("\timul\t{t}, {s}"),
            Idiv(s) => format!("\tidiv\t{s}"),
            Cqo => "\tcqo".to_string(),
            Neg(t) => format!("\tneg\t{t}"),
            Not(t) => format!("\tnot\t{t}"),
            Shl(t, n) => format!("\tshl\t{t}, {n}"),
            Sar(t, n) => format!("\tsar\t{t}, {n}"),
            And(t, s) => format!("\tand\t{t}, {s}"),
            Or(t, s) => format!("\tor\t{t}, {s}"),
            Xor(t, s) => format!("\txor\t{t}, {s}"),
            Addsd(t, s) => format!("\taddsd\t{t}, {s}"),
            Subsd(t, s) => format!("\tsubsd\t{t}, {s}"),
            Mulsd(t, s) => format!("\tmulsd\t{t}, {s}"),
            Divsd(t, s) => format!("\tdivsd\t{t}, {s}"),
            Comisd(t, s) => format!("\tcomisd\t{t}, {s}"),
            Cvtsi2sd(t, s) => format!("\tcvtsi2sd\t{t}, {s}"),
            Cvttsd2si(t, s) => format!("\tcvttsd2si\t{t}, {s}"),
            Cmp(t, s) => format!("\tcmp\t{t}, {s}"),
            Sete(t) => format!("\tsete\t{t}"),
            Setne(t) => format!("\tsetne\t{t}"),
            Setl(t) => format!("\tsetl\t{t}"),
            Setle(t) => format!("\tsetle\t{t}"),
            Setg(t) => format!("\tsetg\t{t}"),
            Setge(t) => format!("\tsetge\t{t}"),
            Setb(t) => format!("\tsetb\t{t}"),
            Setbe(t) => format!("\tsetbe\t{t}"),
            Seta(t) => format!("\tseta\t{t}"),
            Setae(t) => format!("\tsetae\t{t}"),
            Jmp(l) => format!("\tjmp\t{l}"),
            Je(l) => format!("\tje\t{l}"),
            Jne(l) => format!("\tjne\t{l}"),
            Jl(l) => format!("\tjl\t{l}"),
            Jle(l) => format!("\tjle\t{l}"),
            Jg(l) => format!("\tjg\t{l}"),
            Jge(l) => format!("\tjge\t{l}"),
            Jno(l) => format!("\tjno\t{l}"),
            Call(name) => format!("\tcall\t{name}"),
            Push(s) => format!("\tpush\t{s}"),
            Pop(t) => format!("\tpop\t{t}"),
            Ret => "\tret".to_string(),
            Raw(s) => format!("\t{s}"),
        };
        f.write_str(&value)
    }
}

fn escape_nasm(s: &str) -> String {
    s.replace('`', "\\`")
}
