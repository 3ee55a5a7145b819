//! Vela IR: the syntax-side data the type checker consumes.
//!
//! - [`Span`] source ranges for diagnostics
//! - [`Name`] interned identifiers and the [`StringInterner`]
//! - the AST ([`Module`], [`Item`], [`Expr`], [`Stmt`]) stored flat in an
//!   [`ExprArena`] and addressed by [`ExprId`]/[`StmtId`]/[`DeclId`]
//! - [`ensure_sufficient_stack`] for the recursive passes downstream
//!
//! Node ids are the identity the checker keys its annotations on; they never
//! change once allocated.

mod arena;
pub mod ast;
mod interner;
mod name;
mod span;
mod stack;

pub use arena::{DeclId, ExprArena, ExprId, StmtId};
pub use ast::{
    AliasDecl, AstBuilder, BinaryOp, Block, CallArg, ConformDecl, ConstDecl, EnumDecl, Expr,
    ExprKind, FieldDecl, FieldInit, FunctionDecl, GenericParam, Item, Literal, Module, Param,
    ParsedType, ParsedTypeKind, Receiver, StandardDecl, Stmt, StmtKind, StructDecl, UnaryOp,
    VariantDecl,
};
pub use interner::StringInterner;
pub use name::Name;
pub use span::Span;
pub use stack::ensure_sufficient_stack;
