//! Syntax tree handed over by the parser.
//!
//! The parser itself lives outside this workspace; [`AstBuilder`] is the
//! construction API it (and the test suites) use.

mod builder;
mod expr;
mod items;
mod operators;
mod parsed_type;

pub use builder::AstBuilder;
pub use expr::{Block, CallArg, Expr, ExprKind, FieldInit, Literal, Stmt, StmtKind};
pub use items::{
    AliasDecl, ConformDecl, ConstDecl, EnumDecl, FieldDecl, FunctionDecl, GenericParam, Item,
    Module, Param, Receiver, StandardDecl, StructDecl, VariantDecl,
};
pub use operators::{BinaryOp, UnaryOp};
pub use parsed_type::{ParsedType, ParsedTypeKind};

#[cfg(test)]
mod tests;
