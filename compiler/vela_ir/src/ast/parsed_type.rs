//! Type annotations as written in source.
//!
//! These are unresolved: the checker turns them into pool types by looking
//! names up in scope.

use crate::{Name, Span};

/// A type annotation node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParsedType {
    pub kind: ParsedTypeKind,
    pub span: Span,
}

/// Shape of a type annotation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParsedTypeKind {
    /// `Name` or `Name<Arg, ...>`.
    Named { name: Name, args: Vec<ParsedType> },
    /// `*T`
    Pointer(Box<ParsedType>),
    /// `[T]`
    Array(Box<ParsedType>),
    /// `[K: V]`
    Map(Box<ParsedType>, Box<ParsedType>),
}

impl ParsedType {
    pub fn named(name: Name, span: Span) -> Self {
        ParsedType {
            kind: ParsedTypeKind::Named {
                name,
                args: Vec::new(),
            },
            span,
        }
    }

    pub fn generic(name: Name, args: Vec<ParsedType>, span: Span) -> Self {
        ParsedType {
            kind: ParsedTypeKind::Named { name, args },
            span,
        }
    }

    pub fn pointer(pointee: ParsedType, span: Span) -> Self {
        ParsedType {
            kind: ParsedTypeKind::Pointer(Box::new(pointee)),
            span,
        }
    }

    pub fn array(elem: ParsedType, span: Span) -> Self {
        ParsedType {
            kind: ParsedTypeKind::Array(Box::new(elem)),
            span,
        }
    }

    pub fn map(key: ParsedType, value: ParsedType, span: Span) -> Self {
        ParsedType {
            kind: ParsedTypeKind::Map(Box::new(key), Box::new(value)),
            span,
        }
    }

    /// The head name for `Named` annotations.
    pub fn head_name(&self) -> Option<Name> {
        match &self.kind {
            ParsedTypeKind::Named { name, .. } => Some(*name),
            _ => None,
        }
    }
}
