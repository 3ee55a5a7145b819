//! Type data stored in the pool.
//!
//! `TypeData` is a closed sum: every pass matches on it exhaustively, so a
//! new kind of type cannot be added without every consumer noticing.

use vela_ir::{DeclId, Name};

use crate::{BasicKind, Idx, ScopeId};

/// A named, typed slot: struct field or enum payload field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: Name,
    pub ty: Idx,
}

/// One enum variant. Payload fields are in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Variant {
    pub name: Name,
    pub discriminant: i64,
    pub fields: Vec<Field>,
}

impl Variant {
    pub fn has_payload(&self) -> bool {
        !self.fields.is_empty()
    }
}

/// A named value slot: parameter, local or field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Var {
    pub name: Name,
    pub ty: Idx,
    pub mutable: bool,
    /// Call-site label of a parameter.
    pub label: Option<Name>,
    /// Position of the field this var stands for, if any.
    pub struct_index: Option<u32>,
}

impl Var {
    pub fn param(name: Name, label: Option<Name>, ty: Idx) -> Self {
        Var {
            name,
            ty,
            mutable: false,
            label,
            struct_index: None,
        }
    }
}

/// The identity-bearing wrapper of a named struct or enum declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DefinedType {
    pub name: Name,
    pub decl: DeclId,
    /// Generic iff non-empty. Each entry is a `TypeParam`.
    pub type_params: Vec<Idx>,
    /// The `Struct` or `Enum` body; `UNRESOLVED` until registration fills it.
    pub underlying: Idx,
    /// Methods attached by the declaration and by `conform` blocks.
    pub members: ScopeId,
}

impl DefinedType {
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AliasType {
    pub name: Name,
    pub decl: DeclId,
    pub target: Idx,
    /// Standards values of this alias must conform to.
    pub constraints: Vec<Idx>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParam {
    pub name: Name,
    pub decl: DeclId,
    /// Standards a binding must conform to.
    pub constraints: Vec<Idx>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionSig {
    /// Type parameters introduced by the function itself.
    pub type_params: Vec<Idx>,
    pub params: Vec<Var>,
    pub result: Idx,
    /// Scope the parameters were declared in, if it came from source.
    pub scope: Option<ScopeId>,
}

impl FunctionSig {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A trait-like contract: a list of method requirements.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Standard {
    pub name: Name,
    pub decl: DeclId,
    /// Required methods in declaration order; each value is a function type.
    pub methods: Vec<(Name, Idx)>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Basic(BasicKind),
    Pointer(Idx),
    Array(Idx),
    Map(Idx, Idx),
    /// Field order is the layout order.
    Struct(Vec<Field>),
    Enum(Vec<Variant>),
    Defined(DefinedType),
    Alias(AliasType),
    TypeParam(TypeParam),
    Function(FunctionSig),
    Standard(Standard),
    /// A generic defined type with its parameters bound positionally.
    Specialized { instance_of: Idx, args: Vec<Idx> },
    /// A generic function signature with its parameters bound positionally.
    SpecializedFunction { signature: Idx, args: Vec<Idx> },
}

impl TypeData {
    /// Short name of the variant, for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeData::Basic(_) => "basic",
            TypeData::Pointer(_) => "pointer",
            TypeData::Array(_) => "array",
            TypeData::Map(..) => "map",
            TypeData::Struct(_) => "struct",
            TypeData::Enum(_) => "enum",
            TypeData::Defined(_) => "defined",
            TypeData::Alias(_) => "alias",
            TypeData::TypeParam(_) => "type parameter",
            TypeData::Function(_) => "function",
            TypeData::Standard(_) => "standard",
            TypeData::Specialized { .. } => "specialized type",
            TypeData::SpecializedFunction { .. } => "specialized function",
        }
    }
}
