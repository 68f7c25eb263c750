//! Scoped symbol table.
//!
//! A stack of maps rather than a parent-linked chain of heap-allocated nodes: pushing/popping a
//! scope is just `Vec::push`/`Vec::pop`, and lookup walks the stack from innermost to outermost.
//! This is the same "nest via a parent link, lookups walk outward" behavior spec.md §3 describes,
//! without needing shared/reference-counted pointers between contexts (spec.md §9, "Manual
//! shared pointers to types" / borrow-graph concerns do not arise because scopes never outlive
//! the traversal that pushed them).

use std::collections::HashMap;

use crate::parser::ast::ResolvedType;

#[derive(Debug, Clone)]
pub enum NameInfo {
    Value(ResolvedType),
    Fn {
        params: Vec<ResolvedType>,
        ret: ResolvedType,
    },
    Struct(Vec<(String, ResolvedType)>),
}

pub struct Context {
    scopes: Vec<HashMap<String, NameInfo>>,
}

impl Context {
    /// A fresh context with the root scope pre-bound per spec.md §3: the `rgba` struct, the
    /// `args`/`argnum` command-line values, and the math intrinsics.
    pub fn with_prelude() -> Self {
        let mut ctx = Self { scopes: vec![HashMap::new()] };

        ctx.add(
            "rgba".to_string(),
            NameInfo::Struct(vec![
                ("r".to_string(), ResolvedType::Float),
                ("g".to_string(), ResolvedType::Float),
                ("b".to_string(), ResolvedType::Float),
                ("a".to_string(), ResolvedType::Float),
            ]),
        );
        ctx.add(
            "args".to_string(),
            NameInfo::Value(ResolvedType::array(ResolvedType::Int, 1)),
        );
        ctx.add("argnum".to_string(), NameInfo::Value(ResolvedType::Int));

        let unary_float = |ctx: &mut Context, name: &str| {
            ctx.add(
                name.to_string(),
                NameInfo::Fn {
                    params: vec![ResolvedType::Float],
                    ret: ResolvedType::Float,
                },
            );
        };
        for name in ["sin", "cos", "tan", "asin", "acos", "atan", "log", "exp", "sqrt"] {
            unary_float(&mut ctx, name);
        }
        ctx.add(
            "pow".to_string(),
            NameInfo::Fn {
                params: vec![ResolvedType::Float, ResolvedType::Float],
                ret: ResolvedType::Float,
            },
        );
        ctx.add(
            "atan2".to_string(),
            NameInfo::Fn {
                params: vec![ResolvedType::Float, ResolvedType::Float],
                ret: ResolvedType::Float,
            },
        );
        ctx.add(
            "to_int".to_string(),
            NameInfo::Fn {
                params: vec![ResolvedType::Float],
                ret: ResolvedType::Int,
            },
        );
        ctx.add(
            "to_float".to_string(),
            NameInfo::Fn {
                params: vec![ResolvedType::Int],
                ret: ResolvedType::Float,
            },
        );

        ctx
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// `true` if `name` is already bound in the *current* (innermost) scope -- used to enforce
    /// "names are unique within a single scope" without rejecting shadowing across scopes.
    pub fn declared_in_current_scope(&self, name: &str) -> bool {
        self.scopes.last().map(|s| s.contains_key(name)).unwrap_or(false)
    }

    pub fn add(&mut self, name: String, info: NameInfo) {
        self.scopes.last_mut().expect("at least one scope").insert(name, info);
    }

    pub fn lookup(&self, name: &str) -> Option<&NameInfo> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn lookup_value(&self, name: &str) -> Option<&ResolvedType> {
        match self.lookup(name)? {
            NameInfo::Value(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn lookup_fn(&self, name: &str) -> Option<(&[ResolvedType], &ResolvedType)> {
        match self.lookup(name)? {
            NameInfo::Fn { params, ret } => Some((params, ret)),
            _ => None,
        }
    }

    pub fn lookup_struct(&self, name: &str) -> Option<&[(String, ResolvedType)]> {
        match self.lookup(name)? {
            NameInfo::Struct(fields) => Some(fields),
            _ => None,
        }
    }
}
