//! Expression and statement nodes.
//!
//! Nodes are stored flat in an [`ExprArena`](crate::ExprArena) and refer to
//! their children through [`ExprId`]/[`StmtId`]. The ids double as the stable
//! node identity the checker annotates.

use crate::{BinaryOp, ExprId, Name, ParsedType, Span, StmtId, UnaryOp};

/// Literal value. Floats are stored as raw bits so the node stays `Eq + Hash`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Int(i64),
    Float(u64),
    Bool(bool),
    Str(Name),
    Char(char),
    Nil,
}

impl Literal {
    pub fn float(value: f64) -> Self {
        Literal::Float(value.to_bits())
    }

    /// The float payload, if this is a float literal.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Literal::Float(bits) => Some(f64::from_bits(bits)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// One call argument, optionally labelled: `ping(station: 4)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallArg {
    pub label: Option<Name>,
    pub value: ExprId,
    pub span: Span,
}

/// One `name: value` pair in a struct literal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldInit {
    pub name: Name,
    pub value: ExprId,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Literal(Literal),
    Ident(Name),
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    /// `callee<type_args>(args)`
    Call {
        callee: ExprId,
        type_args: Vec<ParsedType>,
        args: Vec<CallArg>,
    },
    /// `base.name`: field access, or a method when used as a callee.
    Member { base: ExprId, name: Name },
    /// `Type.member`: static method or enum variant.
    TypeMember { ty: ParsedType, member: Name },
    /// `Type { field: value, ... }`
    StructLit {
        ty: ParsedType,
        fields: Vec<FieldInit>,
    },
}

/// A braced statement sequence.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Block {
    pub stmts: Vec<StmtId>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StmtKind {
    /// `let [mut] name [: ty] [= init]`
    Let {
        name: Name,
        mutable: bool,
        ty: Option<ParsedType>,
        init: Option<ExprId>,
    },
    Expr(ExprId),
    /// `target = value`
    Assign { target: ExprId, value: ExprId },
    Return(Option<ExprId>),
    If {
        cond: ExprId,
        then_block: Block,
        else_block: Option<Block>,
    },
    While { cond: ExprId, body: Block },
    Block(Block),
}
