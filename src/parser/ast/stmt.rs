//! Statements, which only appear inside `fn` bodies.

use super::{expr::Expr, lvalue::LValue};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<Info = ()> {
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
    Return {
        expr: Expr<Info>,
        offset: usize,
    },
}

impl<Info> Stmt<Info> {
    pub fn offset(&self) -> usize {
        match self {
            Stmt::Let { offset, .. } | Stmt::Assert { offset, .. } | Stmt::Return { offset, .. } => {
                *offset
            }
        }
    }
}
