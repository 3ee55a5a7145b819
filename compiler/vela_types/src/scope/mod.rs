//! Nested symbol tables and overload sets.
//!
//! Scopes live in one arena ([`Scopes`]) and chain to their parent by
//! [`ScopeId`]. Defining a function under a name that already holds a
//! function grows an overload set instead of failing; every other
//! collision is a redeclaration.

use std::collections::hash_map::Entry;
use std::fmt;

use rustc_hash::FxHashMap;
use vela_ir::{Literal, Name, StmtId};

use crate::Idx;

/// Handle of a scope in [`Scopes`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
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

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

/// Identity of a checked function or method.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct FuncId(u32);

impl FuncId {
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

impl fmt::Debug for FuncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FuncId({})", self.0)
    }
}

/// A parameter type as overloads compare it: aliases followed, literal
/// types settled, and the function's own generic parameters named by
/// position so that `f<T>(a: T)` and `f<U>(a: U)` collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamShape {
    Type(Idx),
    /// The n-th generic parameter of the function itself.
    Generic {
        position: usize,
        constraints: Vec<Idx>,
    },
    Pointer(Box<ParamShape>),
    Array(Box<ParamShape>),
    Map(Box<ParamShape>, Box<ParamShape>),
    Specialized {
        generic: Idx,
        args: Vec<ParamShape>,
    },
    Function {
        labels: Vec<Option<Name>>,
        params: Vec<ParamShape>,
        result: Box<ParamShape>,
    },
}

impl ParamShape {
    /// A concrete type, with literal types settled to their defaults.
    pub fn of(ty: Idx) -> Self {
        ParamShape::Type(match ty {
            Idx::INT_LITERAL => Idx::INT,
            Idx::FLOAT_LITERAL => Idx::DOUBLE,
            other => other,
        })
    }
}

/// The shape that makes two overloads indistinguishable: arity, ordered
/// labels and parameter shapes. The result type is not part of it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OverloadKey {
    pub labels: Vec<Option<Name>>,
    pub params: Vec<ParamShape>,
}

impl OverloadKey {
    pub fn new(labels: Vec<Option<Name>>, params: impl IntoIterator<Item = Idx>) -> Self {
        Self::from_shapes(labels, params.into_iter().map(ParamShape::of).collect())
    }

    pub fn from_shapes(labels: Vec<Option<Name>>, params: Vec<ParamShape>) -> Self {
        OverloadKey { labels, params }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSymbol {
    pub id: FuncId,
    /// The function's signature type.
    pub sig: Idx,
    pub key: OverloadKey,
}

/// Where a variable's storage comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LocalKind {
    /// A `let` binding, identified by its statement.
    Local(StmtId),
    /// The n-th declared parameter (not counting `self`).
    Param(u32),
    SelfParam,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VarSymbol {
    pub ty: Idx,
    pub mutable: bool,
    pub kind: LocalKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Symbol {
    Type(Idx),
    Var(VarSymbol),
    Function(FunctionSymbol),
    FunctionSet(Vec<FunctionSymbol>),
    Const { ty: Idx, value: Literal },
}

impl Symbol {
    /// The function candidates this symbol offers to a call.
    pub fn functions(&self) -> &[FunctionSymbol] {
        match self {
            Symbol::Function(f) => std::slice::from_ref(f),
            Symbol::FunctionSet(set) => set,
            _ => &[],
        }
    }
}

/// Why a definition was rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DefineError {
    Redeclaration,
    /// An overload with the same key already exists.
    DuplicateOverload { existing: FuncId },
}

#[derive(Clone, Debug, Default)]
struct Scope {
    parent: Option<ScopeId>,
    symbols: FxHashMap<Name, Symbol>,
}

/// Arena of all scopes of one compilation.
#[derive(Clone, Debug, Default)]
pub struct Scopes {
    scopes: Vec<Scope>,
    /// Member scopes for types that have no declaration of their own
    /// (basic, pointer, array and map types), filled by `conform` blocks.
    extensions: FxHashMap<Idx, ScopeId>,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope chained to `parent`.
    pub fn push(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let raw = u32::try_from(self.scopes.len())
            .unwrap_or_else(|_| panic!("scope arena exceeded u32::MAX entries"));
        self.scopes.push(Scope {
            parent,
            symbols: FxHashMap::default(),
        });
        ScopeId::new(raw)
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].parent
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Define `name` in `scope`.
    ///
    /// Functions merge into overload sets; anything else colliding with an
    /// existing name is a [`DefineError::Redeclaration`].
    pub fn define(&mut self, scope: ScopeId, name: Name, symbol: Symbol) -> Result<(), DefineError> {
        let existing = match self.scopes[scope.index()].symbols.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(symbol);
                return Ok(());
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        let Symbol::Function(new_fn) = symbol else {
            return Err(DefineError::Redeclaration);
        };

        match existing {
            Symbol::Function(old_fn) => {
                if old_fn.key == new_fn.key {
                    return Err(DefineError::DuplicateOverload { existing: old_fn.id });
                }
                let old_fn = old_fn.clone();
                *existing = Symbol::FunctionSet(vec![old_fn, new_fn]);
                Ok(())
            }
            Symbol::FunctionSet(set) => {
                if let Some(dup) = set.iter().find(|f| f.key == new_fn.key) {
                    return Err(DefineError::DuplicateOverload { existing: dup.id });
                }
                set.push(new_fn);
                Ok(())
            }
            _ => Err(DefineError::Redeclaration),
        }
    }

    /// Look `name` up in `scope` and its ancestors.
    pub fn resolve(&self, scope: ScopeId, name: Name) -> Option<&Symbol> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id.index()];
            if let Some(symbol) = s.symbols.get(&name) {
                return Some(symbol);
            }
            current = s.parent;
        }
        None
    }

    /// Look `name` up in `scope` only.
    pub fn resolve_in_current(&self, scope: ScopeId, name: Name) -> Option<&Symbol> {
        self.scopes[scope.index()].symbols.get(&name)
    }

    /// The member scope attached to a declaration-less type, if any.
    pub fn extension_scope(&self, ty: Idx) -> Option<ScopeId> {
        self.extensions.get(&ty).copied()
    }

    /// The member scope attached to `ty`, created on first use.
    pub fn ensure_extension_scope(&mut self, ty: Idx) -> ScopeId {
        if let Some(scope) = self.extension_scope(ty) {
            return scope;
        }
        let scope = self.push(None);
        self.extensions.insert(ty, scope);
        scope
    }
}
