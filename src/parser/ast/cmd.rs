//! Top-level commands.

use super::{binding::Binding, expr::Expr, lvalue::LValue, stmt::Stmt, ty::Type};

#[derive(Debug, Clone, PartialEq)]
pub enum Cmd<Info = ()> {
    Read {
        file: String,
        lvalue: LValue,
        offset: usize,
    },
    Write {
        expr: Expr<Info>,
        file: String,
        offset: usize,
    },
    Let {
        lvalue: LValue,
        expr: Expr<Info>,
        offset: usize,
    },
    Assert {
        expr: Expr<Info>,
        message: String,
        offset: usize,
    },
    Print {
        message: String,
        offset: usize,
    },
    Show {
        expr: Expr<Info>,
        offset: usize,
    },
    Time {
        cmd: Box<Cmd<Info>>,
        offset: usize,
    },
    Fn {
        name: String,
        params: Vec<Binding>,
        ret: Type,
        body: Vec<Stmt<Info>>,
        offset: usize,
    },
    Struct {
        name: String,
        fields: Vec<(String, Type)>,
        offset: usize,
    },
}

impl<Info> Cmd<Info> {
    pub fn offset(&self) -> usize {
        match self {
            Cmd::Read { offset, .. }
            | Cmd::Write { offset, .. }
            | Cmd::Let { offset, .. }
            | Cmd::Assert { offset, .. }
            | Cmd::Print { offset, .. }
            | Cmd::Show { offset, .. }
            | Cmd::Time { offset, .. }
            | Cmd::Fn { offset, .. }
            | Cmd::Struct { offset, .. } => *offset,
        }
    }
}
