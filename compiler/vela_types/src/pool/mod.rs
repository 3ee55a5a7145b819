//! The type pool: arena owning every type of one compilation unit.
//!
//! Basic types sit at their fixed indices. Structural types that have no
//! identity of their own (pointers, arrays, maps, specializations) are
//! interned so that equal shapes share one handle. Declaration-site types
//! are memoized by the declaring node's [`DeclId`].

mod format;

use rustc_hash::FxHashMap;
use vela_ir::{DeclId, Name};

use crate::{
    AliasType, BasicKind, DefinedType, Field, FunctionSig, Idx, Standard, TypeData, TypeParam,
    Variant,
};

const GENERIC_SCAN_DEPTH: u32 = 64;

/// Owner of all type data.
#[derive(Clone, Debug)]
pub struct Pool {
    items: Vec<TypeData>,
    pointers: FxHashMap<Idx, Idx>,
    arrays: FxHashMap<Idx, Idx>,
    maps: FxHashMap<(Idx, Idx), Idx>,
    /// `(generic, args)` to the specialization handle. Shared by type and
    /// function specializations; the generic handle tells them apart.
    specializations: FxHashMap<(Idx, Vec<Idx>), Idx>,
    declarations: FxHashMap<DeclId, Idx>,
    /// Specialized function signature to its substituted `Function`.
    materialized: FxHashMap<Idx, Idx>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    /// Create a pool with every basic type pre-interned.
    pub fn new() -> Self {
        let mut items = Vec::with_capacity(256);
        items.extend(BasicKind::ALL.iter().copied().map(TypeData::Basic));
        // Reserved range up to FIRST_DYNAMIC; never handed out.
        while items.len() < Idx::FIRST_DYNAMIC as usize {
            items.push(TypeData::Basic(BasicKind::Unresolved));
        }
        Pool {
            items,
            pointers: FxHashMap::default(),
            arrays: FxHashMap::default(),
            maps: FxHashMap::default(),
            specializations: FxHashMap::default(),
            declarations: FxHashMap::default(),
            materialized: FxHashMap::default(),
        }
    }

    fn push(&mut self, data: TypeData) -> Idx {
        let raw = u32::try_from(self.items.len())
            .unwrap_or_else(|_| panic!("type pool exceeded u32::MAX entries"));
        self.items.push(data);
        Idx::from_raw(raw)
    }

    #[inline]
    pub fn get(&self, idx: Idx) -> &TypeData {
        &self.items[idx.index()]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // Basic types

    #[inline]
    pub fn basic(&self, kind: BasicKind) -> Idx {
        kind.idx()
    }

    /// Look up a basic type by spelling. Unknown names yield
    /// [`Idx::UNRESOLVED`] rather than failing.
    pub fn lookup_basic(&self, name: &str) -> Idx {
        BasicKind::from_name(name).map_or(Idx::UNRESOLVED, BasicKind::idx)
    }

    pub fn basic_kind(&self, idx: Idx) -> Option<BasicKind> {
        match self.get(idx) {
            TypeData::Basic(kind) => Some(*kind),
            _ => None,
        }
    }

    // Interned structural types

    pub fn pointer(&mut self, pointee: Idx) -> Idx {
        if let Some(&idx) = self.pointers.get(&pointee) {
            return idx;
        }
        let idx = self.push(TypeData::Pointer(pointee));
        self.pointers.insert(pointee, idx);
        idx
    }

    pub fn array(&mut self, elem: Idx) -> Idx {
        if let Some(&idx) = self.arrays.get(&elem) {
            return idx;
        }
        let idx = self.push(TypeData::Array(elem));
        self.arrays.insert(elem, idx);
        idx
    }

    pub fn map(&mut self, key: Idx, value: Idx) -> Idx {
        if let Some(&idx) = self.maps.get(&(key, value)) {
            return idx;
        }
        let idx = self.push(TypeData::Map(key, value));
        self.maps.insert((key, value), idx);
        idx
    }

    /// The specialization of `generic` at `args`, created on first request.
    ///
    /// `generic` is a generic `Defined` type or a generic `Function`
    /// signature; repeated requests with equal arguments return the same
    /// handle.
    pub fn specialize(&mut self, generic: Idx, args: Vec<Idx>) -> Idx {
        let key = (generic, args);
        if let Some(&idx) = self.specializations.get(&key) {
            return idx;
        }
        let (generic, args) = key;
        let data = match self.get(generic) {
            TypeData::Function(_) => TypeData::SpecializedFunction {
                signature: generic,
                args: args.clone(),
            },
            _ => TypeData::Specialized {
                instance_of: generic,
                args: args.clone(),
            },
        };
        let idx = self.push(data);
        self.specializations.insert((generic, args), idx);
        idx
    }

    /// A generic defined type applied to its own parameters: the type of
    /// `self` inside its methods. Non-generic types are returned unchanged.
    pub fn self_instance(&mut self, defined: Idx) -> Idx {
        match self.get(defined) {
            TypeData::Defined(d) if d.is_generic() => {
                let params = d.type_params.clone();
                self.specialize(defined, params)
            }
            _ => defined,
        }
    }

    // Fresh (non-interned) types

    pub fn struct_type(&mut self, fields: Vec<Field>) -> Idx {
        self.push(TypeData::Struct(fields))
    }

    pub fn enum_type(&mut self, variants: Vec<Variant>) -> Idx {
        self.push(TypeData::Enum(variants))
    }

    pub fn function(&mut self, sig: FunctionSig) -> Idx {
        self.push(TypeData::Function(sig))
    }

    pub fn materialized(&self, specialized: Idx) -> Option<Idx> {
        self.materialized.get(&specialized).copied()
    }

    pub fn record_materialized(&mut self, specialized: Idx, function: Idx) {
        self.materialized.insert(specialized, function);
    }

    // Declaration-site types

    /// The type declared by `decl`, created by `make` on first request.
    ///
    /// Declaration-site types compare by identity, so a declaration must
    /// map to exactly one handle for the whole compilation.
    pub fn declare(&mut self, decl: DeclId, make: impl FnOnce() -> TypeData) -> Idx {
        if let Some(&idx) = self.declarations.get(&decl) {
            return idx;
        }
        let idx = self.push(make());
        self.declarations.insert(decl, idx);
        idx
    }

    pub fn declared(&self, decl: DeclId) -> Option<Idx> {
        self.declarations.get(&decl).copied()
    }

    pub fn set_underlying(&mut self, defined: Idx, underlying: Idx) {
        if let TypeData::Defined(d) = &mut self.items[defined.index()] {
            d.underlying = underlying;
        }
    }

    pub fn set_alias_target(&mut self, alias: Idx, target: Idx, constraints: Vec<Idx>) {
        if let TypeData::Alias(a) = &mut self.items[alias.index()] {
            a.target = target;
            a.constraints = constraints;
        }
    }

    pub fn set_type_param_constraints(&mut self, param: Idx, constraints: Vec<Idx>) {
        if let TypeData::TypeParam(p) = &mut self.items[param.index()] {
            p.constraints = constraints;
        }
    }

    pub fn set_standard_methods(&mut self, standard: Idx, methods: Vec<(Name, Idx)>) {
        if let TypeData::Standard(s) = &mut self.items[standard.index()] {
            s.methods = methods;
        }
    }

    // Typed accessors

    pub fn defined(&self, idx: Idx) -> Option<&DefinedType> {
        match self.get(idx) {
            TypeData::Defined(d) => Some(d),
            _ => None,
        }
    }

    pub fn alias(&self, idx: Idx) -> Option<&AliasType> {
        match self.get(idx) {
            TypeData::Alias(a) => Some(a),
            _ => None,
        }
    }

    pub fn type_param(&self, idx: Idx) -> Option<&TypeParam> {
        match self.get(idx) {
            TypeData::TypeParam(p) => Some(p),
            _ => None,
        }
    }

    pub fn function_sig(&self, idx: Idx) -> Option<&FunctionSig> {
        match self.get(idx) {
            TypeData::Function(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn standard(&self, idx: Idx) -> Option<&Standard> {
        match self.get(idx) {
            TypeData::Standard(s) => Some(s),
            _ => None,
        }
    }

    pub fn pointee(&self, idx: Idx) -> Option<Idx> {
        match self.get(idx) {
            TypeData::Pointer(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_pointer(&self, idx: Idx) -> bool {
        matches!(self.get(idx), TypeData::Pointer(_))
    }

    /// Integer, float or double basic type (literal markers excluded).
    pub fn is_numeric(&self, idx: Idx) -> bool {
        self.basic_kind(idx).is_some_and(BasicKind::is_numeric)
    }

    pub fn is_integer(&self, idx: Idx) -> bool {
        self.basic_kind(idx).is_some_and(BasicKind::is_integer)
    }

    pub fn is_floating(&self, idx: Idx) -> bool {
        self.basic_kind(idx).is_some_and(BasicKind::is_floating)
    }

    /// Whether `idx` mentions a type parameter anywhere a substitution
    /// could reach.
    ///
    /// Alias chains are followed at most [`GENERIC_SCAN_DEPTH`] steps; a
    /// longer chain is a cycle that resolution reports on its own.
    pub fn is_generic(&self, idx: Idx) -> bool {
        self.is_generic_bounded(idx, GENERIC_SCAN_DEPTH)
    }

    fn is_generic_bounded(&self, idx: Idx, fuel: u32) -> bool {
        if fuel == 0 {
            return false;
        }
        let fuel = fuel - 1;
        match self.get(idx) {
            TypeData::Basic(_) | TypeData::Standard(_) => false,
            TypeData::TypeParam(_) => true,
            TypeData::Pointer(inner) | TypeData::Array(inner) => {
                self.is_generic_bounded(*inner, fuel)
            }
            TypeData::Map(k, v) => {
                self.is_generic_bounded(*k, fuel) || self.is_generic_bounded(*v, fuel)
            }
            TypeData::Struct(fields) => fields
                .iter()
                .any(|f| self.is_generic_bounded(f.ty, fuel)),
            TypeData::Enum(variants) => variants
                .iter()
                .flat_map(|v| &v.fields)
                .any(|f| self.is_generic_bounded(f.ty, fuel)),
            TypeData::Defined(d) => d.is_generic(),
            TypeData::Alias(a) => self.is_generic_bounded(a.target, fuel),
            TypeData::Function(sig) => {
                !sig.type_params.is_empty()
                    || self.is_generic_bounded(sig.result, fuel)
                    || sig
                        .params
                        .iter()
                        .any(|p| self.is_generic_bounded(p.ty, fuel))
            }
            TypeData::Specialized { args, .. } | TypeData::SpecializedFunction { args, .. } => {
                args.iter().any(|a| self.is_generic_bounded(*a, fuel))
            }
        }
    }
}
