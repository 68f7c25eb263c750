//! AST node definitions.
//!
//! One module per node category (commands, statements, expressions, syntactic types, lvalues,
//! bindings) rather than one file per concrete node the way the teacher's OOP-flavored AST does
//! it: each category here is a single tagged `enum`, so splitting further would just scatter one
//! `match` arm per file for no benefit. `Program` is generic over the same `Info` annotation
//! parameter as `Expr` so the whole tree's annotation state flows through one type parameter.

pub mod binding;
pub mod cmd;
pub mod expr;
pub mod lvalue;
pub mod resolved_type;
pub mod stmt;
pub mod ty;

pub use binding::Binding;
pub use cmd::Cmd;
pub use expr::{BinOp, Expr, UnOp};
pub use lvalue::LValue;
pub use resolved_type::ResolvedType;
pub use stmt::Stmt;
pub use ty::Type;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program<Info = ()> {
    pub cmds: Vec<Cmd<Info>>,
}

impl<Info> Program<Info> {
    pub fn new(cmds: Vec<Cmd<Info>>) -> Self {
        Self { cmds }
    }
}
