//! A function parameter: an lvalue paired with its declared syntactic type.

use super::{lvalue::LValue, ty::Type};

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub lvalue: LValue,
    pub ty: Type,
}
