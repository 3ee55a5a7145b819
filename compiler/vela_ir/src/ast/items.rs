//! Top-level declarations.

use crate::{Block, DeclId, ExprId, Name, ParsedType, Span};

/// `T: StdA + StdB` in a generic parameter list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GenericParam {
    pub id: DeclId,
    pub name: Name,
    pub constraints: Vec<ParsedType>,
    pub span: Span,
}

/// How an instance method receives `self`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Receiver {
    Value,
    Mutating,
}

/// A function parameter. `label` is the name callers must write.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: Name,
    pub label: Option<Name>,
    pub ty: Option<ParsedType>,
    pub span: Span,
}

/// A function, method, or (with no body) a standard's method requirement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionDecl {
    pub id: DeclId,
    pub name: Name,
    pub generics: Vec<GenericParam>,
    /// `Some` for instance methods.
    pub receiver: Option<Receiver>,
    pub params: Vec<Param>,
    pub result: Option<ParsedType>,
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: ParsedType,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StructDecl {
    pub id: DeclId,
    pub name: Name,
    pub generics: Vec<GenericParam>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<FunctionDecl>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariantDecl {
    pub name: Name,
    /// Explicit discriminant; otherwise one past the previous variant.
    pub discriminant: Option<i64>,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumDecl {
    pub id: DeclId,
    pub name: Name,
    pub generics: Vec<GenericParam>,
    pub variants: Vec<VariantDecl>,
    pub methods: Vec<FunctionDecl>,
    pub span: Span,
}

/// `alias Name = Target [: StdA, StdB]`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AliasDecl {
    pub id: DeclId,
    pub name: Name,
    pub target: ParsedType,
    pub constraints: Vec<ParsedType>,
    pub span: Span,
}

/// `standard Name { fn method(...) -> R }`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StandardDecl {
    pub id: DeclId,
    pub name: Name,
    pub methods: Vec<FunctionDecl>,
    pub span: Span,
}

/// `conform Target [to Standard] { methods }`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConformDecl {
    pub id: DeclId,
    pub target: ParsedType,
    pub standard: Option<ParsedType>,
    pub methods: Vec<FunctionDecl>,
    pub span: Span,
}

/// `const NAME [: ty] = literal`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConstDecl {
    pub id: DeclId,
    pub name: Name,
    pub ty: Option<ParsedType>,
    pub value: ExprId,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Item {
    Function(FunctionDecl),
    Struct(StructDecl),
    Enum(EnumDecl),
    Alias(AliasDecl),
    Standard(StandardDecl),
    Conform(ConformDecl),
    Const(ConstDecl),
}

impl Item {
    pub fn span(&self) -> Span {
        match self {
            Item::Function(d) => d.span,
            Item::Struct(d) => d.span,
            Item::Enum(d) => d.span,
            Item::Alias(d) => d.span,
            Item::Standard(d) => d.span,
            Item::Conform(d) => d.span,
            Item::Const(d) => d.span,
        }
    }
}

/// One compilation unit as produced by the parser.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Module {
    pub items: Vec<Item>,
}
