//! Composite layouts for concrete struct and enum types.
//!
//! Layouts are computed on first request and only for types a lowered body
//! actually mentions. Sizes follow a fixed table with no alignment padding
//! between members.
//!
//! # Enums
//!
//! An enum without payloads is a single discriminant byte. An enum with at
//! least one payload variant is a tagged union: the base composite is the
//! discriminant followed by padding as large as the biggest payload, and
//! each payload variant has its own composite of the same total size
//! (discriminant, padding up to the largest payload, then its fields). Code
//! holding the base can reinterpret the bytes through a variant composite
//! once the discriminant is known.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use vela_ir::StringInterner;
use vela_types::{BasicKind, FunctionSig, Idx, InternalError, TypeData, TypeEngine};

use crate::LowerError;

/// One slot of a composite.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Member {
    Type(Idx),
    /// Opaque filler bytes.
    Padding(u32),
}

/// A named fixed-layout aggregate, members in memory order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Composite {
    /// Source spelling of the type: `Pair<int>`, or `Opt<i8>.Some` for a
    /// variant view.
    pub name: String,
    pub members: Vec<Member>,
    pub size: u32,
}

/// The composite one payload variant is read and written through.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariantLayout {
    pub composite: Composite,
    /// Member index of the first payload field (after discriminant and
    /// padding).
    pub first_field: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeLayout {
    Struct(Composite),
    Enum {
        base: Composite,
        /// Indexed by variant position; `None` for payload-free variants.
        variants: Vec<Option<VariantLayout>>,
    },
}

impl TypeLayout {
    pub fn base(&self) -> &Composite {
        match self {
            TypeLayout::Struct(composite) | TypeLayout::Enum { base: composite, .. } => composite,
        }
    }

    pub fn size(&self) -> u32 {
        self.base().size
    }

    /// Layout of payload variant `index`, if it carries one.
    pub fn variant(&self, index: u32) -> Option<&VariantLayout> {
        match self {
            TypeLayout::Struct(_) => None,
            TypeLayout::Enum { variants, .. } => variants.get(index as usize)?.as_ref(),
        }
    }
}

/// The specializations of one generic declaration that were laid out,
/// keyed by bound arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericType {
    pub target: Idx,
    /// Bound arguments to the specialized type holding the layout.
    pub specializations: BTreeMap<Vec<Idx>, Idx>,
}

/// Every composite layout of one module.
#[derive(Clone, Debug, Default)]
pub struct LayoutTable {
    layouts: FxHashMap<Idx, TypeLayout>,
    generics: FxHashMap<Idx, GenericType>,
    /// Aggregates whose members are being sized right now.
    computing: FxHashSet<Idx>,
    /// Pointees and function components still to lay out. Deferred so that
    /// a type reachable through a pointer never counts as nested by value.
    deferred: Vec<Idx>,
}

impl LayoutTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout of a concrete struct or enum type.
    pub fn get(&self, ty: Idx) -> Option<&TypeLayout> {
        self.layouts.get(&ty)
    }

    /// The laid-out specializations of a generic declaration.
    pub fn generic(&self, defined: Idx) -> Option<&GenericType> {
        self.generics.get(&defined)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Idx, &TypeLayout)> {
        self.layouts.iter().map(|(ty, layout)| (*ty, layout))
    }

    /// Make sure `ty` and every aggregate it mentions has a layout.
    /// `ty` must already be normalized.
    pub(crate) fn require(
        &mut self,
        engine: &mut TypeEngine<'_>,
        interner: &StringInterner,
        ty: Idx,
    ) -> Result<(), LowerError> {
        self.size_of(engine, interner, ty)?;
        while let Some(next) = self.deferred.pop() {
            if !self.layouts.contains_key(&next) {
                self.size_of(engine, interner, next)?;
            }
        }
        Ok(())
    }

    /// Byte size of a normalized type, laying out aggregates on the way.
    pub(crate) fn size_of(
        &mut self,
        engine: &mut TypeEngine<'_>,
        interner: &StringInterner,
        ty: Idx,
    ) -> Result<u32, LowerError> {
        if let Some(layout) = self.layouts.get(&ty) {
            return Ok(layout.size());
        }
        match engine.pool().get(ty).clone() {
            TypeData::Basic(kind) => basic_size(kind).ok_or(LowerError::UnresolvedType { ty }),
            TypeData::Pointer(pointee) => {
                self.deferred.push(pointee);
                Ok(8)
            }
            TypeData::Array(elem) => {
                self.deferred.push(elem);
                Ok(16)
            }
            TypeData::Map(key, value) => {
                self.deferred.extend([key, value]);
                Ok(8)
            }
            TypeData::Function(FunctionSig { params, result, .. }) => {
                self.deferred.extend(params.iter().map(|p| p.ty));
                self.deferred.push(result);
                Ok(8)
            }
            TypeData::SpecializedFunction { .. } => Ok(8),
            TypeData::Defined(_) | TypeData::Specialized { .. } => {
                self.lay_out(engine, interner, ty)
            }
            TypeData::TypeParam(_) => {
                Err(InternalError::UnboundTypeParameter { param: ty }.into())
            }
            TypeData::Alias(_)
            | TypeData::Struct(_)
            | TypeData::Enum(_)
            | TypeData::Standard(_) => Err(LowerError::MissingLayout { ty }),
        }
    }

    fn lay_out(
        &mut self,
        engine: &mut TypeEngine<'_>,
        interner: &StringInterner,
        ty: Idx,
    ) -> Result<u32, LowerError> {
        if !self.computing.insert(ty) {
            tracing::debug!(?ty, "aggregate contains itself by value");
            return Err(LowerError::RecursiveLayout { ty });
        }
        let name = engine.pool().format_type(ty, interner);
        let layout = if let Some(fields) = engine.struct_fields(ty)? {
            let mut members = Vec::with_capacity(fields.len());
            let mut size = 0u32;
            for field in fields {
                let field_ty = normalize(engine, field.ty)?;
                size = size.saturating_add(self.size_of(engine, interner, field_ty)?);
                members.push(Member::Type(field_ty));
            }
            TypeLayout::Struct(Composite {
                name,
                members,
                size,
            })
        } else if let Some(variants) = engine.enum_variants(ty)? {
            let mut payloads = Vec::with_capacity(variants.len());
            for variant in &variants {
                let mut fields = Vec::with_capacity(variant.fields.len());
                let mut size = 0u32;
                for field in &variant.fields {
                    let field_ty = normalize(engine, field.ty)?;
                    size = size.saturating_add(self.size_of(engine, interner, field_ty)?);
                    fields.push(field_ty);
                }
                let label = interner.lookup(variant.name);
                payloads.push(variant.has_payload().then_some((label, fields, size)));
            }
            union_layout(name, payloads)
        } else {
            self.computing.remove(&ty);
            return Err(LowerError::MissingLayout { ty });
        };
        self.computing.remove(&ty);

        tracing::trace!(?ty, size = layout.size(), "laid out composite");
        if let TypeData::Specialized { instance_of, args } = engine.pool().get(ty) {
            self.generics
                .entry(*instance_of)
                .or_insert_with(|| GenericType {
                    target: *instance_of,
                    specializations: BTreeMap::new(),
                })
                .specializations
                .insert(args.clone(), ty);
        }
        let size = layout.size();
        self.layouts.insert(ty, layout);
        Ok(size)
    }
}

/// Layout of an enum from its variants' payloads: `(name, field types,
/// payload size)` for payload variants, `None` for the rest.
fn union_layout(name: String, payloads: Vec<Option<(&str, Vec<Idx>, u32)>>) -> TypeLayout {
    let max = payloads
        .iter()
        .flatten()
        .map(|(_, _, size)| *size)
        .max();
    let Some(max) = max else {
        return TypeLayout::Enum {
            base: Composite {
                name,
                members: vec![Member::Type(Idx::BYTE)],
                size: 1,
            },
            variants: payloads.iter().map(|_| None).collect(),
        };
    };

    let size = max.saturating_add(1);
    let variants = payloads
        .into_iter()
        .map(|payload| {
            let (label, fields, own) = payload?;
            let pad = max - own;
            let mut members = Vec::with_capacity(fields.len() + 2);
            members.push(Member::Type(Idx::BYTE));
            if pad > 0 {
                members.push(Member::Padding(pad));
            }
            let first_field = u32::try_from(members.len()).unwrap_or(u32::MAX);
            members.extend(fields.into_iter().map(Member::Type));
            Some(VariantLayout {
                composite: Composite {
                    name: format!("{name}.{label}"),
                    members,
                    size,
                },
                first_field,
            })
        })
        .collect();

    let mut members = vec![Member::Type(Idx::BYTE)];
    if max > 0 {
        members.push(Member::Padding(max));
    }
    TypeLayout::Enum {
        base: Composite {
            name,
            members,
            size,
        },
        variants,
    }
}

/// Byte size of a basic type. `None` for the markers, which never have a
/// runtime representation.
pub fn basic_size(kind: BasicKind) -> Option<u32> {
    Some(match kind {
        BasicKind::Void => 0,
        BasicKind::Bool | BasicKind::I8 | BasicKind::U8 | BasicKind::Byte => 1,
        BasicKind::I16 | BasicKind::U16 => 2,
        BasicKind::I32 | BasicKind::U32 | BasicKind::Char | BasicKind::Float => 4,
        BasicKind::I64
        | BasicKind::U64
        | BasicKind::Int
        | BasicKind::Uint
        | BasicKind::Double
        | BasicKind::String => 8,
        BasicKind::Any => 16,
        BasicKind::Unresolved
        | BasicKind::Placeholder
        | BasicKind::IntegerLiteral
        | BasicKind::FloatLiteral
        | BasicKind::NilLiteral => return None,
    })
}

/// Rewrite `ty` without aliases anywhere in it, and with specialized
/// function signatures materialized. Components are rebuilt only when one
/// of them changed, so already-normal types keep their handle.
pub(crate) fn normalize(engine: &mut TypeEngine<'_>, ty: Idx) -> Result<Idx, LowerError> {
    let ty = engine.strip_aliases(ty)?;
    let normalized = match engine.pool().get(ty).clone() {
        TypeData::Pointer(inner) => {
            let inner_n = normalize(engine, inner)?;
            if inner_n == inner {
                ty
            } else {
                engine.pool_mut().pointer(inner_n)
            }
        }
        TypeData::Array(elem) => {
            let elem_n = normalize(engine, elem)?;
            if elem_n == elem {
                ty
            } else {
                engine.pool_mut().array(elem_n)
            }
        }
        TypeData::Map(key, value) => {
            let key_n = normalize(engine, key)?;
            let value_n = normalize(engine, value)?;
            if (key_n, value_n) == (key, value) {
                ty
            } else {
                engine.pool_mut().map(key_n, value_n)
            }
        }
        TypeData::Specialized { instance_of, args } => {
            let mut args_n = Vec::with_capacity(args.len());
            for &arg in &args {
                args_n.push(normalize(engine, arg)?);
            }
            if args_n == args {
                ty
            } else {
                engine.pool_mut().specialize(instance_of, args_n)
            }
        }
        TypeData::SpecializedFunction { .. } => {
            let function = engine.materialize_function(ty)?;
            normalize(engine, function)?
        }
        TypeData::Function(sig) => {
            let mut changed = false;
            let mut params = sig.params.clone();
            for param in &mut params {
                let param_ty = normalize(engine, param.ty)?;
                changed |= param_ty != param.ty;
                param.ty = param_ty;
            }
            let result = normalize(engine, sig.result)?;
            changed |= result != sig.result;
            if changed {
                engine.pool_mut().function(FunctionSig {
                    params,
                    result,
                    ..sig
                })
            } else {
                ty
            }
        }
        _ => ty,
    };
    Ok(normalized)
}
