//! Type checker output.
//!
//! [`TypedModule`] is the annotation layer the LIR builder reads: a type for
//! every expression, and for names, calls and member accesses the entity
//! the checker resolved them to. Keys are the arena's node ids.

use rustc_hash::FxHashMap;
use vela_ir::{DeclId, ExprId, Literal, Name, Receiver, StmtId};

use crate::{FuncId, Idx, Pool, Scopes, TypeCheckError};

/// What an identifier expression refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    Local(StmtId),
    /// Declared parameter by position (not counting `self`).
    Param(u32),
    SelfParam,
    /// A function used as a value.
    Function(FuncId),
    Const { value: Literal, ty: Idx },
}

/// The callee a call expression resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallKind {
    /// A free function, or a static method through `Type.name(...)`.
    Function(FuncId),
    /// An instance method; the receiver is the callee's `Member` base.
    Method(FuncId),
    /// A method required by the constraints of a type-parameter receiver.
    /// Resolved by name once the receiver is concrete.
    ConstrainedMethod { name: Name },
    /// `Enum.Variant(payload...)`.
    VariantConstruct { enum_ty: Idx, variant: u32 },
    /// A call through a function-typed value.
    Indirect,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallResolution {
    pub kind: CallKind,
    /// Bindings for the callee's generic parameters (owner's, then its own),
    /// in declaration order. Empty for non-generic callees.
    pub type_args: Vec<Idx>,
}

/// What a `Member` or `TypeMember` expression resolved to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemberResolution {
    Field {
        index: u32,
        /// The struct type the field belongs to.
        owner: Idx,
        /// The base was a pointer and is dereferenced first.
        through_pointer: bool,
    },
    /// The method half of a method call; the call carries the resolution.
    Method,
    /// A payload-free enum variant used as a value.
    Variant { enum_ty: Idx, index: u32 },
}

/// Everything the lowering needs to know about one checked function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: Name,
    pub decl: DeclId,
    /// The type declaring the method (or the type a `conform` block
    /// extends). `None` for free functions.
    pub owner: Option<Idx>,
    pub receiver: Option<Receiver>,
    /// The `Function` type: parameters exclude `self`.
    pub sig: Idx,
    /// Owner's type parameters followed by the function's own.
    pub generic_params: Vec<Idx>,
    pub has_body: bool,
}

impl FunctionInfo {
    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }

    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }
}

/// Annotations produced by checking one module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypedModule {
    /// Type of each expression, indexed by [`ExprId`]. Unvisited
    /// expressions hold [`Idx::UNRESOLVED`].
    pub expr_types: Vec<Idx>,
    /// Declared or inferred type of each `let`.
    pub local_types: FxHashMap<StmtId, Idx>,
    pub bindings: FxHashMap<ExprId, Binding>,
    pub calls: FxHashMap<ExprId, CallResolution>,
    pub members: FxHashMap<ExprId, MemberResolution>,
    /// Indexed by [`FuncId`].
    pub functions: Vec<FunctionInfo>,
}

impl TypedModule {
    pub fn expr_type(&self, id: ExprId) -> Idx {
        self.expr_types
            .get(id.index())
            .copied()
            .unwrap_or(Idx::UNRESOLVED)
    }

    pub fn local_type(&self, stmt: StmtId) -> Option<Idx> {
        self.local_types.get(&stmt).copied()
    }

    pub fn binding(&self, id: ExprId) -> Option<Binding> {
        self.bindings.get(&id).copied()
    }

    pub fn call(&self, id: ExprId) -> Option<&CallResolution> {
        self.calls.get(&id)
    }

    pub fn member(&self, id: ExprId) -> Option<MemberResolution> {
        self.members.get(&id).copied()
    }

    pub fn function(&self, id: FuncId) -> &FunctionInfo {
        &self.functions[id.index()]
    }

    /// The function declared by `decl`, if it was checked.
    pub fn function_by_decl(&self, decl: DeclId) -> Option<FuncId> {
        self.functions
            .iter()
            .position(|f| f.decl == decl)
            .and_then(|i| u32::try_from(i).ok())
            .map(FuncId::new)
    }
}

/// Result of [`check_module`](crate::check_module).
#[derive(Debug)]
pub struct CheckOutput {
    pub typed: TypedModule,
    pub pool: Pool,
    pub scopes: Scopes,
    pub errors: Vec<TypeCheckError>,
}

impl CheckOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
