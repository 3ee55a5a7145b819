//! Flat storage for expressions and statements.

use std::fmt;

use crate::{Expr, Stmt};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

define_id!(
    /// Index of an expression in its [`ExprArena`].
    ExprId
);
define_id!(
    /// Index of a statement in its [`ExprArena`].
    StmtId
);
define_id!(
    /// Identity of a declaration (type, function, generic parameter, ...).
    ///
    /// Declaration-site types are memoized by this id.
    DeclId
);

/// Owner of all expression and statement nodes of one module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    next_decl: u32,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an expression and return its id.
    ///
    /// # Panics
    /// Panics if the arena exceeds `u32::MAX` expressions.
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = u32::try_from(self.exprs.len())
            .unwrap_or_else(|_| panic!("expression arena exceeded u32::MAX"));
        self.exprs.push(expr);
        ExprId::new(id)
    }

    /// Store a statement and return its id.
    ///
    /// # Panics
    /// Panics if the arena exceeds `u32::MAX` statements.
    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = u32::try_from(self.stmts.len())
            .unwrap_or_else(|_| panic!("statement arena exceeded u32::MAX"));
        self.stmts.push(stmt);
        StmtId::new(id)
    }

    /// Mint a fresh declaration id.
    pub fn fresh_decl(&mut self) -> DeclId {
        let id = DeclId::new(self.next_decl);
        self.next_decl += 1;
        id
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }
}
