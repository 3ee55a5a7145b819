//! Basic (primitive) type kinds.

use crate::Idx;

/// Kind of a basic type. The discriminant is the type's fixed [`Idx`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BasicKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Int,
    Uint,
    Float,
    Double,
    String,
    Char,
    Byte,
    Void,
    Any,
    Unresolved,
    Placeholder,
    IntegerLiteral,
    FloatLiteral,
    NilLiteral,
}

impl BasicKind {
    /// All kinds in index order.
    pub const ALL: [BasicKind; 23] = [
        BasicKind::Bool,
        BasicKind::I8,
        BasicKind::I16,
        BasicKind::I32,
        BasicKind::I64,
        BasicKind::U8,
        BasicKind::U16,
        BasicKind::U32,
        BasicKind::U64,
        BasicKind::Int,
        BasicKind::Uint,
        BasicKind::Float,
        BasicKind::Double,
        BasicKind::String,
        BasicKind::Char,
        BasicKind::Byte,
        BasicKind::Void,
        BasicKind::Any,
        BasicKind::Unresolved,
        BasicKind::Placeholder,
        BasicKind::IntegerLiteral,
        BasicKind::FloatLiteral,
        BasicKind::NilLiteral,
    ];

    /// The shared handle of this basic type.
    #[inline]
    pub const fn idx(self) -> Idx {
        Idx::from_raw(self as u32)
    }

    /// Source spelling. Markers use angle brackets and cannot be written.
    pub const fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::I8 => "i8",
            BasicKind::I16 => "i16",
            BasicKind::I32 => "i32",
            BasicKind::I64 => "i64",
            BasicKind::U8 => "u8",
            BasicKind::U16 => "u16",
            BasicKind::U32 => "u32",
            BasicKind::U64 => "u64",
            BasicKind::Int => "int",
            BasicKind::Uint => "uint",
            BasicKind::Float => "float",
            BasicKind::Double => "double",
            BasicKind::String => "string",
            BasicKind::Char => "char",
            BasicKind::Byte => "byte",
            BasicKind::Void => "void",
            BasicKind::Any => "any",
            BasicKind::Unresolved => "<unresolved>",
            BasicKind::Placeholder => "<placeholder>",
            BasicKind::IntegerLiteral => "<integer literal>",
            BasicKind::FloatLiteral => "<float literal>",
            BasicKind::NilLiteral => "nil",
        }
    }

    /// Look up a basic type by its source spelling.
    ///
    /// Only nameable kinds are found; markers never are.
    pub fn from_name(name: &str) -> Option<BasicKind> {
        BasicKind::ALL
            .iter()
            .copied()
            .find(|k| k.is_nameable() && k.name() == name)
    }

    /// Whether source code can spell this kind.
    pub const fn is_nameable(self) -> bool {
        !matches!(
            self,
            BasicKind::Unresolved
                | BasicKind::Placeholder
                | BasicKind::IntegerLiteral
                | BasicKind::FloatLiteral
                | BasicKind::NilLiteral
        )
    }

    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            BasicKind::I8
                | BasicKind::I16
                | BasicKind::I32
                | BasicKind::I64
                | BasicKind::U8
                | BasicKind::U16
                | BasicKind::U32
                | BasicKind::U64
                | BasicKind::Int
                | BasicKind::Uint
                | BasicKind::Byte
        )
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            BasicKind::I8 | BasicKind::I16 | BasicKind::I32 | BasicKind::I64 | BasicKind::Int
        )
    }

    pub const fn is_floating(self) -> bool {
        matches!(self, BasicKind::Float | BasicKind::Double)
    }

    /// Integer or floating point.
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_floating()
    }

    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            BasicKind::IntegerLiteral | BasicKind::FloatLiteral | BasicKind::NilLiteral
        )
    }
}
